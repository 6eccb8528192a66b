//! Catalog commands - regions, VM sizes and image publishers
//!
//! This module implements the read-only `locations`, `sizes` and
//! `publishers` subcommands.

use super::CommandContext;
use anyhow::Result;
use azprov::provision::{find_publishers, list_vm_sizes, RegionSet};
use clap::Parser;
use serde_json::json;

/// Arguments for the sizes command
#[derive(Parser, Debug, Clone)]
pub struct SizesArgs {
    /// Region (defaults to `defaults.location` from the configuration)
    pub location: Option<String>,
}

/// Arguments for the publishers command
#[derive(Parser, Debug, Clone)]
pub struct PublishersArgs {
    /// Region (defaults to `defaults.location` from the configuration)
    pub location: Option<String>,

    /// Name filter; `*` is ignored and matching is case-insensitive
    #[arg(long, short = 'f', default_value = "*")]
    pub filter: String,
}

/// List the regions available to the subscription
pub async fn locations(ctx: &mut CommandContext) -> Result<i32> {
    let provider = ctx.provider().await?;
    let regions = ctx
        .with_spinner("Listing regions", RegionSet::fetch(provider.as_ref()))
        .await?;

    if ctx.output.is_json() {
        ctx.output.json(&regions.regions())?;
        return Ok(0);
    }

    let rows: Vec<Vec<String>> = regions
        .regions()
        .iter()
        .map(|r| vec![r.name.clone(), r.display_name.clone()])
        .collect();
    ctx.output.table(&["NAME", "DISPLAY NAME"], &rows);
    Ok(0)
}

impl SizesArgs {
    /// Execute the sizes command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let location = ctx.location(self.location.as_ref())?;
        let provider = ctx.provider().await?;

        let sizes = ctx
            .with_spinner(&format!("Listing VM sizes in {}", location), async {
                let regions = RegionSet::fetch(provider.as_ref()).await?;
                let region = regions.resolve(&location)?;
                list_vm_sizes(provider.as_ref(), &region).await
            })
            .await?;

        if ctx.output.is_json() {
            ctx.output.json(&sizes)?;
            return Ok(0);
        }

        let rows: Vec<Vec<String>> = sizes
            .iter()
            .map(|s| {
                vec![
                    s.name.clone(),
                    s.cores.to_string(),
                    s.memory_mb.to_string(),
                    s.max_data_disks.to_string(),
                ]
            })
            .collect();
        ctx.output
            .table(&["NAME", "CORES", "MEMORY (MB)", "MAX DATA DISKS"], &rows);
        Ok(0)
    }
}

impl PublishersArgs {
    /// Execute the publishers command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let location = ctx.location(self.location.as_ref())?;
        let provider = ctx.provider().await?;

        let publishers = ctx
            .with_spinner(&format!("Listing image publishers in {}", location), async {
                let regions = RegionSet::fetch(provider.as_ref()).await?;
                let region = regions.resolve(&location)?;
                find_publishers(provider.as_ref(), &region, &self.filter).await
            })
            .await?;

        if ctx.output.is_json() {
            let names: Vec<&str> = publishers.iter().map(|p| p.name.as_str()).collect();
            ctx.output.json(&json!({
                "location": location,
                "filter": self.filter,
                "publishers": names,
            }))?;
            return Ok(0);
        }

        if publishers.is_empty() {
            ctx.output.warning(&format!(
                "No publishers in {} match '{}'",
                location, self.filter
            ));
            return Ok(0);
        }
        for publisher in &publishers {
            println!("{}", publisher.name);
        }
        Ok(0)
    }
}

//! RDP command
//!
//! This module implements the `rdp` subcommand.

use super::CommandContext;
use anyhow::Result;
use azprov::provision::resolve_rdp_target;
use clap::Parser;
use serde_json::json;

/// Arguments for the rdp command
#[derive(Parser, Debug, Clone)]
pub struct RdpArgs {
    /// Resource group holding the VM
    pub resource_group: String,

    /// VM name
    pub vm: String,

    /// Print the address instead of starting a client
    #[arg(long)]
    pub print_only: bool,
}

impl RdpArgs {
    /// Execute the rdp command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        if !self.print_only {
            let params = [
                ("resource_group".to_string(), json!(self.resource_group)),
                ("name".to_string(), json!(self.vm)),
            ]
            .into_iter()
            .collect();
            return ctx
                .run_module(
                    "azure_rdp",
                    params,
                    &format!("Connecting to {}", self.vm),
                )
                .await;
        }

        let provider = ctx.provider().await?;
        let target = ctx
            .with_spinner(
                &format!("Resolving address of {}", self.vm),
                resolve_rdp_target(provider.as_ref(), &self.resource_group, &self.vm),
            )
            .await?;

        if ctx.output.is_json() {
            ctx.output.json(&target)?;
        } else {
            println!("{}", target.address);
        }
        Ok(0)
    }
}

//! Resource group command
//!
//! This module implements the `resource-group` subcommand.

use super::CommandContext;
use anyhow::Result;
use clap::Parser;
use serde_json::json;

/// Arguments for the resource-group command
#[derive(Parser, Debug, Clone)]
pub struct ResourceGroupArgs {
    /// Resource group name
    pub name: String,

    /// Region (defaults to `defaults.location` from the configuration)
    pub location: Option<String>,
}

impl ResourceGroupArgs {
    /// Execute the resource-group command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let location = ctx.location(self.location.as_ref())?;
        let params = [
            ("name".to_string(), json!(self.name)),
            ("location".to_string(), json!(location)),
        ]
        .into_iter()
        .collect();

        ctx.run_module(
            "azure_resource_group",
            params,
            &format!("Ensuring resource group {}", self.name),
        )
        .await
    }
}

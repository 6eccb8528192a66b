//! Storage account command
//!
//! This module implements the `storage` subcommand.

use super::CommandContext;
use anyhow::Result;
use azprov::provider::StorageSku;
use clap::Parser;
use serde_json::json;

/// Arguments for the storage command
#[derive(Parser, Debug, Clone)]
pub struct StorageArgs {
    /// Resource group to create the account in (created if missing)
    pub resource_group: String,

    /// Storage account name: 3-24 lowercase letters and digits
    pub name: String,

    /// Region (defaults to `defaults.location` from the configuration)
    pub location: Option<String>,

    /// Redundancy class
    #[arg(long, value_enum, ignore_case = true, default_value_t = StorageSku::StandardLrs)]
    pub sku: StorageSku,
}

impl StorageArgs {
    /// Execute the storage command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let location = ctx.location(self.location.as_ref())?;
        let params = [
            ("resource_group".to_string(), json!(self.resource_group)),
            ("name".to_string(), json!(self.name)),
            ("sku".to_string(), json!(self.sku.as_str())),
            ("location".to_string(), json!(location)),
        ]
        .into_iter()
        .collect();

        ctx.run_module(
            "azure_storage_account",
            params,
            &format!("Creating storage account {}", self.name),
        )
        .await
    }
}

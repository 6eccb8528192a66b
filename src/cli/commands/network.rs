//! Network command
//!
//! This module implements the `network` subcommand, which creates the public
//! IP, security group, virtual network and interface a VM attaches to.

use super::CommandContext;
use anyhow::Result;
use azprov::modules::ModuleParams;
use azprov::provider::IpAllocation;
use clap::Parser;
use serde_json::json;

/// Arguments for the network command
#[derive(Parser, Debug, Clone)]
pub struct NetworkArgs {
    /// Resource group holding the network resources
    pub resource_group: String,

    /// Network interface name; the public IP and security group are named after it
    pub interface_name: String,

    /// Region (defaults to `defaults.location` from the configuration)
    pub location: Option<String>,

    /// Public IP allocation method
    #[arg(long, value_enum, ignore_case = true, default_value_t = IpAllocation::Dynamic)]
    pub allocation: IpAllocation,

    /// Virtual network name
    #[arg(long)]
    pub vnet_name: Option<String>,

    /// Subnet name
    #[arg(long)]
    pub subnet_name: Option<String>,

    /// Subnet address prefix
    #[arg(long)]
    pub subnet_prefix: Option<String>,

    /// Virtual network address space
    #[arg(long)]
    pub network_prefix: Option<String>,
}

impl NetworkArgs {
    fn params(&self, location: String) -> ModuleParams {
        let mut params = ModuleParams::new();
        params.insert("resource_group".into(), json!(self.resource_group));
        params.insert("name".into(), json!(self.interface_name));
        params.insert("location".into(), json!(location));
        params.insert("allocation".into(), json!(self.allocation.as_str()));

        let optional = [
            ("vnet_name", &self.vnet_name),
            ("subnet_name", &self.subnet_name),
            ("subnet_prefix", &self.subnet_prefix),
            ("network_prefix", &self.network_prefix),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                params.insert(key.into(), json!(value));
            }
        }
        params
    }

    /// Execute the network command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let location = ctx.location(self.location.as_ref())?;
        let params = self.params(location);

        ctx.run_module(
            "azure_network",
            params,
            &format!("Creating network for {}", self.interface_name),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_options_are_left_to_the_module() {
        let args = NetworkArgs {
            resource_group: "Test".into(),
            interface_name: "vm1-nic".into(),
            location: None,
            allocation: IpAllocation::Static,
            vnet_name: Some("lab-vnet".into()),
            subnet_name: None,
            subnet_prefix: None,
            network_prefix: None,
        };
        let params = args.params("uksouth".into());
        assert_eq!(params["allocation"], json!("Static"));
        assert_eq!(params["vnet_name"], json!("lab-vnet"));
        assert!(!params.contains_key("subnet_prefix"));
    }
}

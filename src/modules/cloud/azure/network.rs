//! ## AzureNetworkModule
//!
//! Creates the public IP, security group, subnet, virtual network and
//! network interface for one VM, in that order. The security group allows
//! inbound RDP (3389) and HTTP (80).
//!
//! | Parameter | Required | Description |
//! |-----------|----------|-------------|
//! | `resource_group` | Yes | Resource group name |
//! | `name` | Yes | Network interface name |
//! | `location` | Yes | Region name or display name |
//! | `allocation` | No | Public IP allocation: Dynamic or Static (default: Dynamic) |
//! | `vnet_name` | No | Virtual network name (default: default-vnet) |
//! | `subnet_name` | No | Subnet name (default: default) |
//! | `subnet_prefix` | No | Subnet CIDR (default: 10.0.0.0/24) |
//! | `network_prefix` | No | Virtual network CIDR (default: 10.0.0.0/16) |

use crate::modules::{Module, ModuleContext, ModuleOutput, ModuleParams, ModuleResult, ParamExt};
use crate::provider::IpAllocation;
use crate::provision::network::{public_ip_name, security_group_name};
use crate::provision::{provision_network, NetworkRequest};
use async_trait::async_trait;

use super::{location_param, would_create};

pub struct AzureNetworkModule;

impl AzureNetworkModule {
    fn request(params: &ModuleParams) -> ModuleResult<NetworkRequest> {
        let mut request = NetworkRequest::new(
            params.get_string_required("resource_group")?,
            params.get_string_required("name")?,
            params.get_string_required("location")?,
        );
        if let Some(allocation) = params.get_parsed::<IpAllocation>("allocation")? {
            request = request.with_allocation(allocation);
        }
        if let Some(vnet_name) = params.get_string("vnet_name")? {
            request = request.with_vnet_name(vnet_name);
        }
        let subnet_name = params
            .get_string("subnet_name")?
            .unwrap_or_else(|| request.subnet_name.clone());
        let subnet_prefix = params
            .get_string("subnet_prefix")?
            .unwrap_or_else(|| request.subnet_prefix.clone());
        request = request.with_subnet(subnet_name, subnet_prefix);
        if let Some(prefix) = params.get_string("network_prefix")? {
            request = request.with_network_prefix(prefix);
        }
        Ok(request)
    }
}

#[async_trait]
impl Module for AzureNetworkModule {
    fn name(&self) -> &'static str {
        "azure_network"
    }

    fn description(&self) -> &'static str {
        "Create a public IP, security group, virtual network and network interface"
    }

    fn required_params(&self) -> &[&'static str] {
        &["resource_group", "name", "location"]
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        Self::request(params)?.validate()?;
        Ok(())
    }

    async fn execute(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let request = Self::request(params)?;

        if context.check_mode {
            request.validate()?;
            let region = location_param(context.provider(), params).await?;
            return Ok(would_create(
                "network interface",
                &request.interface_name,
                &request.resource_group,
            )
            .with_data("location", serde_json::json!(region.as_str()))
            .with_data(
                "resources",
                serde_json::json!({
                    "public_ip": public_ip_name(&request.interface_name),
                    "security_group": security_group_name(&request.interface_name),
                    "virtual_network": request.vnet_name,
                    "subnet": request.subnet_name,
                    "network_interface": request.interface_name,
                }),
            ));
        }

        let outcome = provision_network(context.provider(), &request).await?;
        ModuleOutput::changed(format!(
            "Network interface '{}' ready in resource group '{}'",
            outcome.network_interface.name, request.resource_group
        ))
        .with_data(
            "resource_group_created",
            serde_json::json!(outcome.resource_group.created),
        )
        .with_value("public_ip", &outcome.public_ip)?
        .with_value("security_group", &outcome.security_group)?
        .with_value("virtual_network", &outcome.virtual_network)?
        .with_value("network_interface", &outcome.network_interface)
    }
}

//! Network provisioner.
//!
//! Builds the chain public IP, security group, subnet, virtual network and
//! network interface, strictly in that order. Each step consumes the result
//! of the one before it, and the first failure ends the run without
//! touching what was already created.

use crate::error::{Error, Result};
use crate::provider::{
    CloudProvider, IpAllocation, NetworkInterface, NetworkInterfaceSpec, PublicIp, PublicIpSpec,
    ResourceGroup, SecurityGroup, SecurityGroupSpec, SecurityRule, VirtualNetwork,
    VirtualNetworkSpec,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::location::resolve_region;
use super::naming::{validate_resource_group_name, validate_resource_name, validate_subnet_within};
use super::resource_group::{ensure_resource_group, Ensured};

pub const DEFAULT_VNET_NAME: &str = "default-vnet";
pub const DEFAULT_SUBNET_NAME: &str = "default";
pub const DEFAULT_SUBNET_PREFIX: &str = "10.0.0.0/24";
pub const DEFAULT_NETWORK_PREFIX: &str = "10.0.0.0/16";

/// IP configuration name on every interface created here.
pub const IP_CONFIGURATION_NAME: &str = "ipconfig1";

pub const RDP_PORT: u16 = 3389;
pub const HTTP_PORT: u16 = 80;

/// Name of the public IP created for an interface.
pub fn public_ip_name(interface_name: &str) -> String {
    format!("{interface_name}-pip")
}

/// Name of the security group created for an interface.
pub fn security_group_name(interface_name: &str) -> String {
    format!("{interface_name}-nsg")
}

/// Inbound rules applied to every provisioned network: RDP, then HTTP.
pub fn inbound_rules() -> Vec<SecurityRule> {
    vec![
        SecurityRule::allow_inbound_tcp("rdp", "Allow RDP", RDP_PORT, 1000),
        SecurityRule::allow_inbound_tcp("web", "Allow HTTP", HTTP_PORT, 1001),
    ]
}

/// A network to provision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRequest {
    pub resource_group: String,
    pub interface_name: String,
    pub allocation: IpAllocation,
    pub vnet_name: String,
    pub subnet_name: String,
    pub subnet_prefix: String,
    pub network_prefix: String,
    /// Region as given by the caller; resolved before use.
    pub location: String,
}

impl NetworkRequest {
    /// A request using the default network layout.
    pub fn new(
        resource_group: impl Into<String>,
        interface_name: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            resource_group: resource_group.into(),
            interface_name: interface_name.into(),
            allocation: IpAllocation::default(),
            vnet_name: DEFAULT_VNET_NAME.to_string(),
            subnet_name: DEFAULT_SUBNET_NAME.to_string(),
            subnet_prefix: DEFAULT_SUBNET_PREFIX.to_string(),
            network_prefix: DEFAULT_NETWORK_PREFIX.to_string(),
            location: location.into(),
        }
    }

    pub fn with_allocation(mut self, allocation: IpAllocation) -> Self {
        self.allocation = allocation;
        self
    }

    pub fn with_vnet_name(mut self, name: impl Into<String>) -> Self {
        self.vnet_name = name.into();
        self
    }

    pub fn with_subnet(mut self, name: impl Into<String>, prefix: impl Into<String>) -> Self {
        self.subnet_name = name.into();
        self.subnet_prefix = prefix.into();
        self
    }

    pub fn with_network_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.network_prefix = prefix.into();
        self
    }

    /// Checks names and address prefixes without contacting the provider.
    pub fn validate(&self) -> Result<()> {
        validate_resource_group_name(&self.resource_group)?;
        validate_resource_name("interface_name", &self.interface_name)?;
        validate_resource_name("vnet_name", &self.vnet_name)?;
        validate_resource_name("subnet_name", &self.subnet_name)?;
        validate_subnet_within(&self.network_prefix, &self.subnet_prefix)
    }
}

/// Everything a network provisioning run created.
#[derive(Debug, Clone, Serialize)]
pub struct NetworkOutcome {
    pub resource_group: Ensured<ResourceGroup>,
    pub public_ip: PublicIp,
    pub security_group: SecurityGroup,
    pub virtual_network: VirtualNetwork,
    pub network_interface: NetworkInterface,
}

/// Provisions the network chain for one interface.
pub async fn provision_network(
    provider: &dyn CloudProvider,
    request: &NetworkRequest,
) -> Result<NetworkOutcome> {
    request.validate()?;
    let region = resolve_region(provider, &request.location).await?;
    let rg = request.resource_group.as_str();

    let resource_group = ensure_resource_group(provider, rg, &region).await?;

    let public_ip = provider
        .create_public_ip(&PublicIpSpec {
            resource_group: rg.to_string(),
            name: public_ip_name(&request.interface_name),
            location: region.clone(),
            allocation: request.allocation,
        })
        .await?;
    debug!(public_ip = %public_ip.name, "Public IP created");

    let security_group = provider
        .create_security_group(&SecurityGroupSpec {
            resource_group: rg.to_string(),
            name: security_group_name(&request.interface_name),
            location: region.clone(),
            rules: inbound_rules(),
        })
        .await?;
    debug!(security_group = %security_group.name, "Security group created");

    let subnet =
        provider.subnet_config(&request.subnet_name, &request.subnet_prefix, &security_group)?;

    let virtual_network = provider
        .create_virtual_network(&VirtualNetworkSpec {
            resource_group: rg.to_string(),
            name: request.vnet_name.clone(),
            location: region.clone(),
            address_prefix: request.network_prefix.clone(),
            subnets: vec![subnet],
        })
        .await?;
    debug!(virtual_network = %virtual_network.name, "Virtual network created");

    let first_subnet = virtual_network.subnets.first().ok_or_else(|| Error::Other {
        message: format!(
            "Virtual network '{}' was created without subnets",
            virtual_network.name
        ),
        source: None,
    })?;

    let network_interface = provider
        .create_network_interface(&NetworkInterfaceSpec {
            resource_group: rg.to_string(),
            name: request.interface_name.clone(),
            location: region,
            ip_configuration_name: IP_CONFIGURATION_NAME.to_string(),
            subnet_id: first_subnet.id.clone(),
            public_ip_id: Some(public_ip.id.clone()),
        })
        .await?;

    info!(
        network_interface = %network_interface.name,
        resource_group = %rg,
        "Network provisioned"
    );

    Ok(NetworkOutcome {
        resource_group,
        public_ip,
        security_group,
        virtual_network,
        network_interface,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{CallKind, InMemoryProvider};

    #[test]
    fn test_derived_names() {
        assert_eq!(public_ip_name("nic1"), "nic1-pip");
        assert_eq!(security_group_name("nic1"), "nic1-nsg");
    }

    #[test]
    fn test_inbound_rules() {
        let rules = inbound_rules();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name, "rdp");
        assert_eq!(rules[0].destination_port_range, "3389");
        assert_eq!(rules[0].priority, 1000);
        assert_eq!(rules[1].name, "web");
        assert_eq!(rules[1].destination_port_range, "80");
        assert_eq!(rules[1].priority, 1001);
    }

    #[test]
    fn test_request_defaults() {
        let request = NetworkRequest::new("Test", "nic1", "uksouth");
        assert_eq!(request.vnet_name, "default-vnet");
        assert_eq!(request.subnet_name, "default");
        assert_eq!(request.subnet_prefix, "10.0.0.0/24");
        assert_eq!(request.network_prefix, "10.0.0.0/16");
        assert_eq!(request.allocation, IpAllocation::Dynamic);
        assert!(request.validate().is_ok());
    }

    #[tokio::test]
    async fn test_subnet_outside_network_makes_no_calls() {
        let provider = InMemoryProvider::sample();
        let request = NetworkRequest::new("Test", "nic1", "uksouth").with_subnet("default", "192.168.0.0/24");
        let err = provision_network(&provider, &request).await.unwrap_err();
        assert!(err.is_validation());
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn test_wiring() {
        let provider = InMemoryProvider::sample();
        let outcome = provision_network(&provider, &NetworkRequest::new("Test", "nic1", "uksouth"))
            .await
            .unwrap();

        let subnet = &outcome.virtual_network.subnets[0];
        let config = &outcome.network_interface.ip_configurations[0];
        assert_eq!(config.name, "ipconfig1");
        assert_eq!(config.subnet_id.as_deref(), Some(subnet.id.as_str()));
        assert_eq!(config.public_ip_id.as_deref(), Some(outcome.public_ip.id.as_str()));
        assert_eq!(outcome.security_group.rules.len(), 2);
        assert_eq!(provider.count(CallKind::SubnetConfig), 1);
    }
}

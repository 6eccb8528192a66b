//! Cloud provider abstraction.
//!
//! Every remote call azprov makes goes through [`CloudProvider`]. Two
//! implementations ship with the crate:
//!
//! - [`AzureRmClient`]: the Azure Resource Manager REST API
//! - [`InMemoryProvider`]: an in-process fake with a call log
//!
//! Creation calls are create-or-update: submitting the same spec twice
//! succeeds and returns the existing resource.

pub mod azure;
pub mod memory;
pub mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use azure::{AzureRmClient, AzureRmSettings};
pub use memory::{CallKind, InMemoryProvider, ProviderCall};
pub use types::*;

/// Errors raised by a cloud provider.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A long-running operation did not finish in time.
    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    /// A long-running operation finished unsuccessfully.
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication error.
    #[error("Authentication error: {0}")]
    Auth(String),
}

/// Result type for provider calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Operations azprov needs from a cloud provider.
///
/// Resource groups are addressed by name. Every other resource is addressed
/// by (resource group, name).
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Short identifier used in log fields.
    fn name(&self) -> &'static str;

    // ------------------------------------------------------------------------
    // Catalogs
    // ------------------------------------------------------------------------

    /// Lists the regions available to the subscription.
    async fn list_regions(&self) -> ProviderResult<Vec<RegionInfo>>;

    /// Lists the VM sizes offered in a region.
    async fn list_vm_sizes(&self, region: &Region) -> ProviderResult<Vec<VmSize>>;

    /// Lists the image publishers offered in a region.
    async fn list_publishers(&self, region: &Region) -> ProviderResult<Vec<ImagePublisher>>;

    // ------------------------------------------------------------------------
    // Resource groups
    // ------------------------------------------------------------------------

    /// Returns the group, or `None` if it does not exist.
    async fn get_resource_group(&self, name: &str) -> ProviderResult<Option<ResourceGroup>>;

    async fn create_resource_group(
        &self,
        name: &str,
        region: &Region,
    ) -> ProviderResult<ResourceGroup>;

    // ------------------------------------------------------------------------
    // Storage
    // ------------------------------------------------------------------------

    async fn create_storage_account(
        &self,
        spec: &StorageAccountSpec,
    ) -> ProviderResult<StorageAccount>;

    async fn get_storage_account(
        &self,
        resource_group: &str,
        name: &str,
    ) -> ProviderResult<StorageAccount>;

    // ------------------------------------------------------------------------
    // Network
    // ------------------------------------------------------------------------

    async fn create_public_ip(&self, spec: &PublicIpSpec) -> ProviderResult<PublicIp>;

    async fn get_public_ip(&self, resource_group: &str, name: &str) -> ProviderResult<PublicIp>;

    async fn create_security_group(
        &self,
        spec: &SecurityGroupSpec,
    ) -> ProviderResult<SecurityGroup>;

    /// Builds the subnet definition embedded in a virtual network.
    ///
    /// Nothing is sent to the provider; the subnet is created together with
    /// its network.
    fn subnet_config(
        &self,
        name: &str,
        address_prefix: &str,
        security_group: &SecurityGroup,
    ) -> ProviderResult<SubnetConfig> {
        Ok(SubnetConfig {
            name: name.to_string(),
            address_prefix: address_prefix.to_string(),
            security_group_id: Some(security_group.id.clone()),
        })
    }

    async fn create_virtual_network(
        &self,
        spec: &VirtualNetworkSpec,
    ) -> ProviderResult<VirtualNetwork>;

    async fn create_network_interface(
        &self,
        spec: &NetworkInterfaceSpec,
    ) -> ProviderResult<NetworkInterface>;

    async fn get_network_interface(
        &self,
        resource_group: &str,
        name: &str,
    ) -> ProviderResult<NetworkInterface>;

    async fn list_network_interfaces(
        &self,
        resource_group: &str,
    ) -> ProviderResult<Vec<NetworkInterface>>;

    // ------------------------------------------------------------------------
    // Compute
    // ------------------------------------------------------------------------

    async fn create_vm(&self, definition: &VmDefinition) -> ProviderResult<VirtualMachine>;

    async fn get_vm(&self, resource_group: &str, name: &str) -> ProviderResult<VirtualMachine>;
}

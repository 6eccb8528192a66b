//! Cloud provider modules.
//!
//! ```yaml
//! - name: Create a resource group
//!   azure_resource_group:
//!     name: Test
//!     location: uksouth
//! ```

pub mod azure;

pub use azure::{
    AzureImagePublisherInfoModule, AzureLocationInfoModule, AzureNetworkModule, AzureRdpModule,
    AzureResourceGroupModule, AzureStorageAccountModule, AzureVmModule, AzureVmSizeInfoModule,
};

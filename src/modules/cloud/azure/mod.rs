//! Azure modules.
//!
//! Each module wraps one provisioning operation. All of them resolve their
//! `location` parameter against the provider's region list, accepting either
//! the canonical name or the display name.
//!
//! ## Available Modules
//!
//! - [`AzureLocationInfoModule`](info::AzureLocationInfoModule): list regions
//! - [`AzureVmSizeInfoModule`](info::AzureVmSizeInfoModule): list VM sizes in a region
//! - [`AzureImagePublisherInfoModule`](info::AzureImagePublisherInfoModule): find image publishers
//! - [`AzureResourceGroupModule`](resource_group::AzureResourceGroupModule): ensure a resource group
//! - [`AzureStorageAccountModule`](storage::AzureStorageAccountModule): storage account
//! - [`AzureNetworkModule`](network::AzureNetworkModule): public IP through network interface
//! - [`AzureVmModule`](vm::AzureVmModule): virtual machine
//! - [`AzureRdpModule`](rdp::AzureRdpModule): open a remote desktop session
//!
//! ## Example
//!
//! ```yaml
//! - name: Storage for OS disks
//!   azure_storage_account:
//!     resource_group: Test
//!     name: storageacc1
//!     sku: Standard_GRS
//!     location: uksouth
//!
//! - name: Network
//!   azure_network:
//!     resource_group: Test
//!     name: vm1-nic
//!     location: uksouth
//!
//! - name: Web server
//!   azure_vm:
//!     resource_group: Test
//!     name: vm1
//!     location: uksouth
//!     size: Standard_B2s
//!     network_interface: vm1-nic
//!     storage_account: storageacc1
//!     image:
//!       publisher: MicrosoftWindowsServer
//!       offer: WindowsServer
//!       sku: 2022-datacenter
//!     admin_username: azureadmin
//! ```

pub mod info;
pub mod network;
pub mod rdp;
pub mod resource_group;
pub mod storage;
pub mod vm;

pub use info::{AzureImagePublisherInfoModule, AzureLocationInfoModule, AzureVmSizeInfoModule};
pub use network::AzureNetworkModule;
pub use rdp::AzureRdpModule;
pub use resource_group::AzureResourceGroupModule;
pub use storage::AzureStorageAccountModule;
pub use vm::AzureVmModule;

use crate::modules::{Module, ModuleOutput, ModuleParams, ModuleResult, ParamExt};
use crate::provider::{CloudProvider, Region};
use crate::provision::resolve_region;
use std::sync::Arc;

/// Every Azure module, in registration order.
pub fn builtin_modules() -> Vec<Arc<dyn Module>> {
    vec![
        Arc::new(AzureLocationInfoModule),
        Arc::new(AzureVmSizeInfoModule),
        Arc::new(AzureImagePublisherInfoModule),
        Arc::new(AzureResourceGroupModule),
        Arc::new(AzureStorageAccountModule),
        Arc::new(AzureNetworkModule),
        Arc::new(AzureVmModule),
        Arc::new(AzureRdpModule),
    ]
}

/// Resolves the required `location` parameter.
pub(crate) async fn location_param(
    provider: &dyn CloudProvider,
    params: &ModuleParams,
) -> ModuleResult<Region> {
    let location = params.get_string_required("location")?;
    Ok(resolve_region(provider, &location).await?)
}

/// Check-mode result for a resource that would be created.
pub(crate) fn would_create(kind: &str, name: &str, resource_group: &str) -> ModuleOutput {
    ModuleOutput::changed(format!(
        "Would create {} '{}' in resource group '{}'",
        kind, name, resource_group
    ))
    .with_data("action", serde_json::json!("create"))
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::modules::{ModuleContext, ModuleParams};
    use crate::provider::InMemoryProvider;
    use std::sync::Arc;

    pub fn context(provider: &Arc<InMemoryProvider>) -> ModuleContext {
        ModuleContext::new(provider.clone())
    }

    pub fn params(pairs: &[(&str, serde_json::Value)]) -> ModuleParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }
}

//! Shared test utilities and fixtures for the azprov test suite.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;
use tempfile::NamedTempFile;

use azprov::error::Result;
use azprov::modules::{ModuleContext, ModuleParams};
use azprov::provider::{
    Credentials, DiskCreateOption, ImageReference, InMemoryProvider, OsPlatform, StorageSku,
};
use azprov::provision::{NetworkRequest, RdpLauncher, StorageRequest, VmRequest};

pub const REGION: &str = "uksouth";
pub const RESOURCE_GROUP: &str = "Test";
pub const STORAGE_ACCOUNT: &str = "storageacc1";
pub const INTERFACE: &str = "vm1-nic";
pub const VM_NAME: &str = "vm1";

/// The sample provider, shared so tests can inspect the call log.
pub fn provider() -> Arc<InMemoryProvider> {
    Arc::new(InMemoryProvider::sample())
}

pub fn storage_request() -> StorageRequest {
    StorageRequest {
        resource_group: RESOURCE_GROUP.into(),
        name: STORAGE_ACCOUNT.into(),
        sku: StorageSku::StandardGrs,
        location: REGION.into(),
    }
}

pub fn network_request() -> NetworkRequest {
    NetworkRequest::new(RESOURCE_GROUP, INTERFACE, REGION)
}

pub fn vm_request() -> VmRequest {
    VmRequest {
        credentials: Credentials::new("azureadmin", "P@ssw0rd1234"),
        resource_group: RESOURCE_GROUP.into(),
        name: VM_NAME.into(),
        size: "Standard_B2s".into(),
        platform: OsPlatform::Windows,
        computer_name: None,
        image: ImageReference {
            publisher: "MicrosoftWindowsServer".into(),
            offer: "WindowsServer".into(),
            sku: "2022-datacenter".into(),
            version: "latest".into(),
        },
        network_interface: INTERFACE.into(),
        storage_account: STORAGE_ACCOUNT.into(),
        storage_sku: StorageSku::StandardLrs,
        disk_create_option: DiskCreateOption::FromImage,
        provision_vm_agent: true,
        enable_auto_update: true,
        location: REGION.into(),
    }
}

/// Builds module parameters from key/value pairs.
pub fn params(pairs: &[(&str, serde_json::Value)]) -> ModuleParams {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

/// A module context over `provider` that records RDP launches.
pub fn module_context(
    provider: &Arc<InMemoryProvider>,
    check_mode: bool,
) -> (ModuleContext, Arc<RecordingLauncher>) {
    let launcher = Arc::new(RecordingLauncher::default());
    let context = ModuleContext::new(provider.clone())
        .with_check_mode(check_mode)
        .with_rdp_launcher(launcher.clone());
    (context, launcher)
}

/// RDP launcher that remembers every address it was asked to open.
#[derive(Default)]
pub struct RecordingLauncher {
    addresses: Mutex<Vec<String>>,
}

impl RecordingLauncher {
    pub fn addresses(&self) -> Vec<String> {
        self.addresses.lock().clone()
    }
}

impl RdpLauncher for RecordingLauncher {
    fn launch(&self, address: &str) -> Result<()> {
        self.addresses.lock().push(address.to_string());
        Ok(())
    }
}

/// A full environment: group, storage, network and VM.
pub const FULL_DEPLOYMENT: &str = r#"---
- name: Resource group
  azure_resource_group:
    name: Test
    location: uksouth

- name: Storage for OS disks
  azure_storage_account:
    resource_group: Test
    name: storageacc1
    sku: Standard_GRS
    location: uksouth

- name: Network for vm1
  azure_network:
    resource_group: Test
    name: vm1-nic
    location: uksouth

- name: Windows VM
  azure_vm:
    resource_group: Test
    name: vm1
    location: uksouth
    size: Standard_B2s
    network_interface: vm1-nic
    storage_account: storageacc1
    image: MicrosoftWindowsServer:WindowsServer:2022-datacenter
    admin_username: azureadmin
    admin_password: P@ssw0rd1234
"#;

/// Writes `content` to a temporary file with the given extension.
pub fn temp_file(content: &str, extension: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(&format!(".{}", extension))
        .tempfile()
        .unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

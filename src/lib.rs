//! # azprov - Azure VM provisioning
//!
//! azprov provisions Azure virtual machines together with the resources they
//! depend on (resource group, storage account, public IP, security group,
//! virtual network, network interface) and opens RDP sessions to them.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │        CLI (clap) / deployment files (YAML task lists)       │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │        Module registry (azure_* modules, check mode)         │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │   Provisioning operations (validate, then ordered creates)   │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//!                ┌──────────────┴──────────────┐
//!                ▼                             ▼
//! ┌─────────────────────────────┐ ┌─────────────────────────────┐
//! │  AzureRmClient (ARM REST)   │ │  InMemoryProvider (offline) │
//! └─────────────────────────────┘ └─────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use azprov::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let provider = InMemoryProvider::sample();
//!     let request = StorageRequest {
//!         resource_group: "Test".into(),
//!         name: "storageacc1".into(),
//!         sku: StorageSku::StandardGrs,
//!         location: "uksouth".into(),
//!     };
//!     let outcome = provision_storage(&provider, &request).await?;
//!     println!("{:?}", outcome.account.blob_endpoint);
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::deployment::{Deployment, DeploymentReport, Task, TaskEvent};
    pub use crate::error::{Error, ErrorContext, Result};
    pub use crate::modules::{
        Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleRegistry, ParamExt,
    };
    pub use crate::provider::{
        AzureRmClient, AzureRmSettings, CloudProvider, Credentials, DiskCreateOption,
        ImageReference, InMemoryProvider, IpAllocation, OsPlatform, ProviderError, Region,
        StorageSku,
    };
    pub use crate::provision::{
        ensure_resource_group, find_publishers, launch_rdp, list_vm_sizes, provision_network,
        provision_storage, provision_vm, resolve_region, NetworkRequest, RdpLauncher,
        StorageRequest, SystemRdpLauncher, VmRequest,
    };
}

/// Error types and result aliases.
///
/// [`Error`](error::Error) covers validation, provider, deployment and I/O
/// failures and maps each to a process exit code.
pub mod error;

/// Cloud provider abstraction.
///
/// The [`CloudProvider`](provider::CloudProvider) trait is implemented by the
/// ARM REST client and by an in-memory provider used for simulation and tests.
pub mod provider;

/// Provisioning operations built on [`provider::CloudProvider`].
pub mod provision;

/// Named modules wrapping each provisioning operation.
pub mod modules;

/// YAML deployment files: ordered lists of module invocations.
pub mod deployment;

/// Returns the version of azprov.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

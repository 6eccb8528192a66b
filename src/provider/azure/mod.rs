//! Azure Resource Manager provider.
//!
//! Implements [`CloudProvider`](crate::provider::CloudProvider) over the ARM
//! REST API.
//!
//! ## Services
//!
//! - **Resources**: subscription locations, resource groups
//! - **Storage**: storage accounts
//! - **Network**: public IPs, security groups, virtual networks, interfaces
//! - **Compute**: VM sizes, image publishers, virtual machines
//!
//! Creation uses PUT. Responses carrying an `Azure-AsyncOperation` or
//! `Location` header are polled until the operation finishes, then the
//! resource is read back.

pub mod auth;
mod client;
pub mod models;

pub use auth::{AccessToken, AuthSource, ServicePrincipal, TokenRequest};
pub use client::{AzureRmClient, AzureRmSettings, DEFAULT_ENDPOINT};

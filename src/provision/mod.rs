//! Provisioning operations.
//!
//! Each operation validates its input locally, resolves its region against
//! the provider, and then issues remote calls strictly in dependency order.
//! The first failure is returned as is; nothing already created is undone.
//!
//! Operations do not guard against concurrent runs on the same names.

pub mod catalog;
pub mod location;
pub mod naming;
pub mod network;
pub mod rdp;
pub mod resource_group;
pub mod storage;
pub mod vm;

pub use catalog::{find_publishers, list_vm_sizes, publisher_matches};
pub use location::{resolve_region, RegionSet};
pub use network::{provision_network, NetworkOutcome, NetworkRequest};
pub use rdp::{
    launch_rdp, resolve_rdp_target, DryRunLauncher, RdpLauncher, RdpTarget, SystemRdpLauncher,
};
pub use resource_group::{ensure_resource_group, Ensured};
pub use storage::{provision_storage, StorageOutcome, StorageRequest};
pub use vm::{
    os_disk_uri, provision_vm, validate_vm_request, ValidatedVm, VmConfigBuilder, VmOutcome,
    VmRequest,
};

//! Remote desktop launcher.
//!
//! Resolves a VM's public address through its network interface, then hands
//! the address to an [`RdpLauncher`].

use crate::error::{Error, Result};
use crate::provider::{resource_name_from_id, CloudProvider, NetworkInterface};
use serde::Serialize;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Placeholder replaced by the target address in client arguments.
pub const ADDRESS_PLACEHOLDER: &str = "{address}";

/// Starts a remote desktop session.
pub trait RdpLauncher: Send + Sync {
    /// Launches a client connected to `address`.
    fn launch(&self, address: &str) -> Result<()>;
}

/// Runs an external RDP client without waiting for it to exit.
///
/// The client is spawned on the tokio process driver, which reaps it once it
/// exits, so `launch` must be called from within a runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemRdpLauncher {
    program: String,
    args: Vec<String>,
}

impl SystemRdpLauncher {
    /// A launcher for `program`. Each `{address}` in `args` is replaced by
    /// the target address.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// `mstsc /v:{address}` on Windows, `xfreerdp /v:{address}` elsewhere.
    pub fn platform_default() -> Self {
        let program = if cfg!(windows) { "mstsc" } else { "xfreerdp" };
        Self::new(program, vec![format!("/v:{ADDRESS_PLACEHOLDER}")])
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments for a session to `address`.
    pub fn args_for(&self, address: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(ADDRESS_PLACEHOLDER, address))
            .collect()
    }
}

impl Default for SystemRdpLauncher {
    fn default() -> Self {
        Self::platform_default()
    }
}

impl RdpLauncher for SystemRdpLauncher {
    fn launch(&self, address: &str) -> Result<()> {
        let args = self.args_for(address);
        debug!(program = %self.program, args = ?args, "Spawning RDP client");

        Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Error::rdp_launch(&self.program, e.to_string()))?;
        Ok(())
    }
}

/// A launcher that only logs the address it was given.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunLauncher;

impl RdpLauncher for DryRunLauncher {
    fn launch(&self, address: &str) -> Result<()> {
        info!(address = %address, "Skipping RDP client launch");
        Ok(())
    }
}

/// Where an RDP session for a VM would connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RdpTarget {
    pub vm: String,
    pub network_interface: String,
    pub public_ip: String,
    pub address: String,
}

/// Resolves the public address of `vm_name`.
///
/// The VM's interface reference is matched against every interface in the
/// resource group by resource ID, ignoring case.
pub async fn resolve_rdp_target(
    provider: &dyn CloudProvider,
    resource_group: &str,
    vm_name: &str,
) -> Result<RdpTarget> {
    let vm = provider.get_vm(resource_group, vm_name).await?;
    let interfaces = provider.list_network_interfaces(resource_group).await?;

    let nic: &NetworkInterface = interfaces
        .iter()
        .find(|nic| {
            vm.network_interface_ids
                .iter()
                .any(|id| id.eq_ignore_ascii_case(&nic.id))
        })
        .ok_or_else(|| Error::NoNetworkInterface {
            vm: vm.name.clone(),
            resource_group: resource_group.to_string(),
        })?;

    let public_ip_name = nic
        .public_ip_id()
        .map(resource_name_from_id)
        .ok_or_else(|| Error::NoPublicIp(nic.name.clone()))?;

    let public_ip = provider.get_public_ip(resource_group, public_ip_name).await?;
    let address = public_ip
        .ip_address
        .filter(|a| !a.is_empty())
        .ok_or_else(|| Error::UnallocatedPublicIp(public_ip.name.clone()))?;

    Ok(RdpTarget {
        vm: vm.name,
        network_interface: nic.name.clone(),
        public_ip: public_ip.name,
        address,
    })
}

/// Resolves the VM's address and launches a session to it.
pub async fn launch_rdp(
    provider: &dyn CloudProvider,
    launcher: &dyn RdpLauncher,
    resource_group: &str,
    vm_name: &str,
) -> Result<RdpTarget> {
    let target = resolve_rdp_target(provider, resource_group, vm_name).await?;
    launcher.launch(&target.address)?;
    info!(vm = %target.vm, address = %target.address, "RDP session launched");
    Ok(target)
}

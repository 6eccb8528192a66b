//! ## AzureRdpModule
//!
//! Resolves a VM's public address through its network interface and starts
//! the configured RDP client. Nothing in the cloud changes, so the result is
//! always `ok`. In check mode the address is resolved but no client starts.
//!
//! | Parameter | Required | Description |
//! |-----------|----------|-------------|
//! | `resource_group` | Yes | Resource group name |
//! | `name` | Yes | Virtual machine name |

use crate::modules::{Module, ModuleContext, ModuleOutput, ModuleParams, ModuleResult, ParamExt};
use crate::provision::{launch_rdp, resolve_rdp_target};
use async_trait::async_trait;

pub struct AzureRdpModule;

#[async_trait]
impl Module for AzureRdpModule {
    fn name(&self) -> &'static str {
        "azure_rdp"
    }

    fn description(&self) -> &'static str {
        "Open a remote desktop session to an Azure VM"
    }

    fn required_params(&self) -> &[&'static str] {
        &["resource_group", "name"]
    }

    async fn execute(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let resource_group = params.get_string_required("resource_group")?;
        let name = params.get_string_required("name")?;

        if context.check_mode {
            let target = resolve_rdp_target(context.provider(), &resource_group, &name).await?;
            return ModuleOutput::ok(format!(
                "Would start RDP session to '{}' at {}",
                target.vm, target.address
            ))
            .with_value("target", &target);
        }

        let target = launch_rdp(
            context.provider(),
            context.rdp.as_ref(),
            &resource_group,
            &name,
        )
        .await?;
        ModuleOutput::ok(format!(
            "Started RDP session to '{}' at {}",
            target.vm, target.address
        ))
        .with_value("target", &target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::modules::cloud::azure::test_support::{context, params};
    use crate::modules::cloud::azure::{AzureNetworkModule, AzureVmModule};
    use crate::modules::ModuleError;
    use crate::provider::InMemoryProvider;
    use crate::provision::RdpLauncher;
    use parking_lot::Mutex;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingLauncher {
        addresses: Mutex<Vec<String>>,
    }

    impl RdpLauncher for RecordingLauncher {
        fn launch(&self, address: &str) -> Result<()> {
            self.addresses.lock().push(address.to_string());
            Ok(())
        }
    }

    async fn provisioned() -> Arc<InMemoryProvider> {
        let provider = Arc::new(InMemoryProvider::sample());
        let ctx = context(&provider);
        AzureNetworkModule
            .execute(
                &params(&[
                    ("resource_group", json!("Test")),
                    ("name", json!("vm1-nic")),
                    ("location", json!("uksouth")),
                ]),
                &ctx,
            )
            .await
            .unwrap();
        AzureVmModule
            .execute(
                &params(&[
                    ("resource_group", json!("Test")),
                    ("name", json!("vm1")),
                    ("location", json!("uksouth")),
                    ("size", json!("Standard_B1s")),
                    ("network_interface", json!("vm1-nic")),
                    ("storage_account", json!("storageacc1")),
                    ("image", json!("MicrosoftWindowsServer:WindowsServer:2022-datacenter")),
                    ("admin_username", json!("azureadmin")),
                    ("admin_password", json!("P@ssw0rd1234")),
                ]),
                &ctx,
            )
            .await
            .unwrap();
        provider
    }

    fn rdp_params() -> ModuleParams {
        params(&[("resource_group", json!("Test")), ("name", json!("vm1"))])
    }

    #[tokio::test]
    async fn test_launches_client_with_public_address() {
        let provider = provisioned().await;
        let launcher = Arc::new(RecordingLauncher::default());
        let ctx = context(&provider).with_rdp_launcher(launcher.clone());

        let output = AzureRdpModule.execute(&rdp_params(), &ctx).await.unwrap();
        assert!(!output.changed);
        assert_eq!(output.data["target"]["public_ip"], json!("vm1-nic-pip"));
        assert_eq!(launcher.addresses.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_check_mode_does_not_launch() {
        let provider = provisioned().await;
        let launcher = Arc::new(RecordingLauncher::default());
        let ctx = context(&provider)
            .with_rdp_launcher(launcher.clone())
            .with_check_mode(true);

        let output = AzureRdpModule.execute(&rdp_params(), &ctx).await.unwrap();
        assert!(output.msg.starts_with("Would start"));
        assert!(launcher.addresses.lock().is_empty());
    }

    #[tokio::test]
    async fn test_unallocated_address() {
        let provider = provisioned().await;
        provider.release_public_ip("Test", "vm1-nic-pip");

        let err = AzureRdpModule
            .execute(&rdp_params(), &context(&provider))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ModuleError::Provisioning(Error::UnallocatedPublicIp(ref ip)) if ip == "vm1-nic-pip"
        ));
    }
}

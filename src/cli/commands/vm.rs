//! Virtual machine command
//!
//! This module implements the `vm` subcommand. The network interface and
//! storage account must already exist; see the `network` and `storage`
//! subcommands.

use super::CommandContext;
use anyhow::Result;
use azprov::modules::ModuleParams;
use azprov::provider::{DiskCreateOption, OsPlatform, StorageSku};
use clap::Parser;
use serde_json::json;
use std::io::IsTerminal;

/// Arguments for the vm command
#[derive(Parser, Debug, Clone)]
pub struct VmArgs {
    /// Resource group holding the network interface and storage account
    pub resource_group: String,

    /// VM name
    pub name: String,

    /// Region (defaults to `defaults.location` from the configuration)
    pub location: Option<String>,

    /// VM size, e.g. Standard_B2s
    #[arg(long)]
    pub size: String,

    /// Name of an existing network interface
    #[arg(long = "nic")]
    pub network_interface: String,

    /// Storage account for the OS disk
    #[arg(long)]
    pub storage_account: String,

    /// Image publisher
    #[arg(long)]
    pub publisher: String,

    /// Image offer
    #[arg(long, default_value = "")]
    pub offer: String,

    /// Image SKU
    #[arg(long = "image-sku", default_value = "")]
    pub image_sku: String,

    /// Image version
    #[arg(long = "image-version", default_value = azprov::provision::vm::DEFAULT_IMAGE_VERSION)]
    pub image_version: String,

    /// Administrator account name (defaults to `defaults.admin_username`)
    #[arg(long, short = 'u')]
    pub admin_username: Option<String>,

    /// Administrator password; prompted for when unset on a terminal
    #[arg(long, env = "AZPROV_ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: Option<String>,

    /// Guest operating system
    #[arg(long, value_enum, ignore_case = true, default_value_t = OsPlatform::Windows)]
    pub platform: OsPlatform,

    /// Guest computer name (defaults to the VM name)
    #[arg(long)]
    pub computer_name: Option<String>,

    /// Storage SKU of the OS disk's account
    #[arg(long, value_enum, ignore_case = true, default_value_t = StorageSku::StandardLrs)]
    pub storage_sku: StorageSku,

    /// How the OS disk is created
    #[arg(long, value_enum, ignore_case = true, default_value_t = DiskCreateOption::FromImage)]
    pub disk_create_option: DiskCreateOption,

    /// Do not install the VM agent
    #[arg(long)]
    pub no_vm_agent: bool,

    /// Disable automatic guest updates
    #[arg(long)]
    pub no_auto_update: bool,
}

impl VmArgs {
    fn params(
        &self,
        location: String,
        username: Option<String>,
        password: Option<String>,
    ) -> ModuleParams {
        let mut params = ModuleParams::new();
        params.insert("resource_group".into(), json!(self.resource_group));
        params.insert("name".into(), json!(self.name));
        params.insert("location".into(), json!(location));
        params.insert("size".into(), json!(self.size));
        params.insert("network_interface".into(), json!(self.network_interface));
        params.insert("storage_account".into(), json!(self.storage_account));
        params.insert(
            "image".into(),
            json!({
                "publisher": self.publisher,
                "offer": self.offer,
                "sku": self.image_sku,
                "version": self.image_version,
            }),
        );
        params.insert("platform".into(), json!(self.platform.as_str()));
        params.insert("storage_sku".into(), json!(self.storage_sku.as_str()));
        params.insert(
            "disk_create_option".into(),
            json!(self.disk_create_option.as_str()),
        );
        params.insert("provision_vm_agent".into(), json!(!self.no_vm_agent));
        params.insert("enable_auto_update".into(), json!(!self.no_auto_update));
        if let Some(computer_name) = &self.computer_name {
            params.insert("computer_name".into(), json!(computer_name));
        }
        if let Some(username) = username {
            params.insert("admin_username".into(), json!(username));
        }
        if let Some(password) = password {
            params.insert("admin_password".into(), json!(password));
        }
        params
    }

    fn password(&self, ctx: &CommandContext) -> Result<Option<String>> {
        if self.admin_password.is_some()
            || self.disk_create_option == DiskCreateOption::Attach
            || ctx.output.is_json()
            || !std::io::stdin().is_terminal()
        {
            return Ok(self.admin_password.clone());
        }

        ctx.output.flush();
        let password = dialoguer::Password::new()
            .with_prompt(format!("Administrator password for {}", self.name))
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?;
        Ok(Some(password))
    }

    /// Execute the vm command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let location = ctx.location(self.location.as_ref())?;
        let username = self
            .admin_username
            .clone()
            .or_else(|| ctx.config.defaults.admin_username.clone());
        let password = self.password(ctx)?;
        let params = self.params(location, username, password);

        ctx.run_module(
            "azure_vm",
            params,
            &format!("Creating virtual machine {}", self.name),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};

    fn vm_args(extra: &[&str]) -> VmArgs {
        let mut args = vec![
            "azprov",
            "vm",
            "Test",
            "vm1",
            "uksouth",
            "--size",
            "Standard_B2s",
            "--nic",
            "vm1-nic",
            "--storage-account",
            "storageacc1",
            "--publisher",
            "MicrosoftWindowsServer",
        ];
        args.extend_from_slice(extra);
        match Cli::try_parse_from(args).unwrap().command {
            Commands::Vm(args) => args,
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_defaults() {
        let args = vm_args(&[]);
        assert_eq!(args.platform, OsPlatform::Windows);
        assert_eq!(args.disk_create_option, DiskCreateOption::FromImage);
        assert_eq!(args.image_version, "latest");

        let params = args.params("uksouth".into(), Some("azureuser".into()), None);
        assert_eq!(params["provision_vm_agent"], json!(true));
        assert_eq!(params["image"]["publisher"], json!("MicrosoftWindowsServer"));
        assert!(!params.contains_key("admin_password"));
    }

    #[test]
    fn test_flags_map_to_params() {
        let args = vm_args(&[
            "--platform",
            "linux",
            "--disk-create-option",
            "attach",
            "--no-auto-update",
            "--computer-name",
            "web01",
        ]);
        let params = args.params("uksouth".into(), None, Some("secret".into()));
        assert_eq!(params["platform"], json!("Linux"));
        assert_eq!(params["disk_create_option"], json!("Attach"));
        assert_eq!(params["enable_auto_update"], json!(false));
        assert_eq!(params["computer_name"], json!("web01"));
        assert_eq!(params["admin_password"], json!("secret"));
    }
}

//! ## AzureVmModule
//!
//! Validates the requested size and image publisher against the region's
//! catalogs, then ensures the resource group, creates the storage account
//! holding the OS disk and creates the VM on an existing network interface.
//! Nothing is created when validation fails.
//!
//! ### Parameters
//!
//! | Parameter | Required | Description |
//! |-----------|----------|-------------|
//! | `resource_group` | Yes | Resource group name |
//! | `name` | Yes | Virtual machine name |
//! | `location` | Yes | Region name or display name |
//! | `size` | Yes | VM size, e.g. Standard_B2s |
//! | `network_interface` | Yes | Name of an existing network interface |
//! | `storage_account` | Yes | Storage account for the OS disk VHD |
//! | `image` | Yes | Map with `publisher`, `offer`, `sku`, `version`, or `publisher:offer:sku[:version]` |
//! | `admin_username` | No* | Admin user (*required unless the disk is attached) |
//! | `admin_password` | No* | Admin password; falls back to `AZPROV_ADMIN_PASSWORD` |
//! | `platform` | No | Windows or Linux (default: Windows) |
//! | `computer_name` | No | Guest host name (default: the VM name) |
//! | `storage_sku` | No | SKU if the storage account is created (default: Standard_LRS) |
//! | `disk_create_option` | No | FromImage, Attach or Empty (default: FromImage) |
//! | `provision_vm_agent` | No | Install the VM agent (default: true) |
//! | `enable_auto_update` | No | Windows automatic updates (default: true) |
//!
//! ### Example
//!
//! ```yaml
//! - name: Web server
//!   azure_vm:
//!     resource_group: Test
//!     name: vm1
//!     location: uksouth
//!     size: Standard_B2s
//!     network_interface: vm1-nic
//!     storage_account: storageacc1
//!     image: MicrosoftWindowsServer:WindowsServer:2022-datacenter
//!     admin_username: azureadmin
//! ```

use crate::modules::{
    Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleResult, ParamExt,
};
use crate::provider::{Credentials, DiskCreateOption, ImageReference, OsPlatform, StorageSku};
use crate::provision::vm::DEFAULT_IMAGE_VERSION;
use crate::provision::{provision_vm, validate_vm_request, VmRequest};
use async_trait::async_trait;

use super::would_create;

/// Environment variable consulted when `admin_password` is absent.
pub const ADMIN_PASSWORD_ENV: &str = "AZPROV_ADMIN_PASSWORD";

pub struct AzureVmModule;

/// Reads `image` as either a map or a colon-separated URN.
fn image_param(params: &ModuleParams) -> ModuleResult<ImageReference> {
    let field = |value: &serde_json::Value, key: &str| -> String {
        value
            .get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };

    match params.get("image") {
        Some(serde_json::Value::Object(_)) => {
            let value = &params["image"];
            let version = field(value, "version");
            Ok(ImageReference {
                publisher: field(value, "publisher"),
                offer: field(value, "offer"),
                sku: field(value, "sku"),
                version: if version.is_empty() {
                    DEFAULT_IMAGE_VERSION.to_string()
                } else {
                    version
                },
            })
        }
        Some(serde_json::Value::String(urn)) => {
            let parts: Vec<&str> = urn.split(':').map(str::trim).collect();
            match parts.as_slice() {
                [publisher, offer, sku] => Ok(ImageReference {
                    publisher: publisher.to_string(),
                    offer: offer.to_string(),
                    sku: sku.to_string(),
                    version: DEFAULT_IMAGE_VERSION.to_string(),
                }),
                [publisher, offer, sku, version] => Ok(ImageReference {
                    publisher: publisher.to_string(),
                    offer: offer.to_string(),
                    sku: sku.to_string(),
                    version: version.to_string(),
                }),
                _ => Err(ModuleError::InvalidParameter(format!(
                    "image '{}' must be publisher:offer:sku[:version]",
                    urn
                ))),
            }
        }
        Some(_) => Err(ModuleError::InvalidParameter(
            "image must be a map or a publisher:offer:sku[:version] string".to_string(),
        )),
        None => Err(ModuleError::MissingParameter("image".to_string())),
    }
}

impl AzureVmModule {
    fn request(params: &ModuleParams) -> ModuleResult<VmRequest> {
        let password = match params.get_string("admin_password")? {
            Some(password) => password,
            None => std::env::var(ADMIN_PASSWORD_ENV).unwrap_or_default(),
        };

        Ok(VmRequest {
            credentials: Credentials::new(
                params.get_string("admin_username")?.unwrap_or_default(),
                password,
            ),
            resource_group: params.get_string_required("resource_group")?,
            name: params.get_string_required("name")?,
            size: params.get_string_required("size")?,
            platform: params.get_parsed::<OsPlatform>("platform")?.unwrap_or_default(),
            computer_name: params.get_string("computer_name")?,
            image: image_param(params)?,
            network_interface: params.get_string_required("network_interface")?,
            storage_account: params.get_string_required("storage_account")?,
            storage_sku: params
                .get_parsed::<StorageSku>("storage_sku")?
                .unwrap_or(StorageSku::StandardLrs),
            disk_create_option: params
                .get_parsed::<DiskCreateOption>("disk_create_option")?
                .unwrap_or_default(),
            provision_vm_agent: params.get_bool("provision_vm_agent")?.unwrap_or(true),
            enable_auto_update: params.get_bool("enable_auto_update")?.unwrap_or(true),
            location: params.get_string_required("location")?,
        })
    }
}

#[async_trait]
impl Module for AzureVmModule {
    fn name(&self) -> &'static str {
        "azure_vm"
    }

    fn description(&self) -> &'static str {
        "Validate and create an Azure virtual machine with its OS disk storage"
    }

    fn required_params(&self) -> &[&'static str] {
        &[
            "resource_group",
            "name",
            "location",
            "size",
            "network_interface",
            "storage_account",
            "image",
        ]
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        Self::request(params)?.validate_local()?;
        Ok(())
    }

    async fn execute(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let request = Self::request(params)?;

        if context.check_mode {
            let validated = validate_vm_request(context.provider(), &request).await?;
            return Ok(would_create("VM", &request.name, &request.resource_group)
                .with_data("location", serde_json::json!(validated.region.as_str()))
                .with_data("size", serde_json::json!(validated.size.name))
                .with_data("publisher", serde_json::json!(request.image.publisher.trim()))
                .with_data(
                    "matched_publisher",
                    serde_json::json!(validated.publisher.name),
                ));
        }

        let outcome = provision_vm(context.provider(), &request).await?;
        ModuleOutput::changed(format!(
            "Created VM '{}' in resource group '{}'",
            outcome.vm.name, request.resource_group
        ))
        .with_data(
            "resource_group_created",
            serde_json::json!(outcome.resource_group.created),
        )
        .with_data("os_disk_uri", serde_json::json!(outcome.os_disk_uri))
        .with_data("id", serde_json::json!(outcome.vm.id))
        .with_value("vm", &outcome.vm)
    }
}

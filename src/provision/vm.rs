//! VM provisioner.
//!
//! Provisioning runs in two phases. The validation phase resolves the region
//! and checks the requested size and image publisher against the provider's
//! catalogs; it issues read-only calls only. The mutation phase then ensures
//! the resource group, provisions the storage account backing the OS disk,
//! looks up the network interface and submits a complete [`VmDefinition`]
//! built with [`VmConfigBuilder`].

use crate::error::{Error, Result};
use crate::provider::{
    CloudProvider, Credentials, DiskCreateOption, ImagePublisher, ImageReference,
    NetworkInterface, OsDisk, OsPlatform, OsProfile, Region, ResourceGroup, StorageAccount,
    StorageSku, VirtualMachine, VmDefinition, VmSize,
};
use serde::Serialize;
use tracing::{debug, info};

use super::catalog::{find_publishers, list_vm_sizes};
use super::location::resolve_region;
use super::naming::{
    validate_resource_group_name, validate_resource_name, validate_storage_account_name,
};
use super::resource_group::{ensure_resource_group, Ensured};
use super::storage::{provision_storage_in, storage_spec};

/// Image version used when none is given.
pub const DEFAULT_IMAGE_VERSION: &str = "latest";

/// Name of the OS disk of `vm_name`.
pub fn os_disk_name(vm_name: &str) -> String {
    format!("{vm_name}_OSDisk")
}

/// Location of the OS disk blob: `{blob_endpoint}vhds/{vm_name}_OSDisk.vhd`.
pub fn os_disk_uri(blob_endpoint: &str, vm_name: &str) -> String {
    let separator = if blob_endpoint.ends_with('/') { "" } else { "/" };
    format!(
        "{}{}vhds/{}.vhd",
        blob_endpoint,
        separator,
        os_disk_name(vm_name)
    )
}

/// A VM to provision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmRequest {
    pub credentials: Credentials,
    pub resource_group: String,
    pub name: String,
    pub size: String,
    pub platform: OsPlatform,
    /// Guest computer name; the VM name when absent.
    pub computer_name: Option<String>,
    pub image: ImageReference,
    /// Name of an existing network interface in the resource group.
    pub network_interface: String,
    pub storage_account: String,
    pub storage_sku: StorageSku,
    pub disk_create_option: DiskCreateOption,
    pub provision_vm_agent: bool,
    pub enable_auto_update: bool,
    /// Region as given by the caller; resolved before use.
    pub location: String,
}

impl VmRequest {
    /// Guest computer name.
    pub fn computer_name(&self) -> &str {
        self.computer_name.as_deref().unwrap_or(&self.name)
    }

    /// Checks everything that can be checked without the provider.
    pub fn validate_local(&self) -> Result<()> {
        validate_resource_group_name(&self.resource_group)?;
        validate_resource_name("name", &self.name)?;
        validate_resource_name("network_interface", &self.network_interface)?;
        validate_storage_account_name(&self.storage_account)?;

        let max = self.platform.max_computer_name_len();
        let computer_name = self.computer_name();
        if computer_name.is_empty() || computer_name.len() > max {
            return Err(Error::invalid_parameter(
                "computer_name",
                format!(
                    "'{}' must be 1-{} characters for {} guests",
                    computer_name, max, self.platform
                ),
            ));
        }

        if self.image.publisher.trim().is_empty() {
            return Err(Error::MissingParameter("image publisher".to_string()));
        }

        // An attached disk brings its own OS and accounts.
        if self.disk_create_option != DiskCreateOption::Attach {
            if self.image.offer.trim().is_empty() {
                return Err(Error::MissingParameter("image offer".to_string()));
            }
            if self.image.sku.trim().is_empty() {
                return Err(Error::MissingParameter("image sku".to_string()));
            }
            if self.credentials.username.trim().is_empty() {
                return Err(Error::MissingParameter("admin_username".to_string()));
            }
            if self.credentials.password.is_empty() {
                return Err(Error::MissingParameter("admin_password".to_string()));
            }
        }
        Ok(())
    }
}

/// Catalog entries a request was validated against.
///
/// `publisher` is the catalog entry that satisfied the substring check. The
/// image reference submitted for the VM keeps the requested publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidatedVm {
    pub region: Region,
    pub size: VmSize,
    pub publisher: ImagePublisher,
}

/// Runs the validation phase. Only read-only provider calls are made.
pub async fn validate_vm_request(
    provider: &dyn CloudProvider,
    request: &VmRequest,
) -> Result<ValidatedVm> {
    request.validate_local()?;
    let region = resolve_region(provider, &request.location).await?;

    let size = list_vm_sizes(provider, &region)
        .await?
        .into_iter()
        .find(|s| s.name.eq_ignore_ascii_case(request.size.trim()))
        .ok_or_else(|| Error::InvalidVmSize {
            size: request.size.clone(),
            region: region.to_string(),
        })?;

    let candidates = find_publishers(provider, &region, &request.image.publisher).await?;
    let publisher = candidates
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(request.image.publisher.trim()))
        .or_else(|| candidates.first())
        .cloned()
        .ok_or_else(|| Error::InvalidPublisher {
            publisher: request.image.publisher.clone(),
            region: region.to_string(),
        })?;

    debug!(size = %size.name, publisher = %publisher.name, region = %region, "VM request validated");
    Ok(ValidatedVm {
        region,
        size,
        publisher,
    })
}

/// Builds a [`VmDefinition`] step by step.
///
/// Every step consumes the builder and returns a new one, so a partially
/// configured builder can be cloned and completed in different ways.
#[derive(Debug, Clone)]
#[must_use]
pub struct VmConfigBuilder {
    resource_group: String,
    name: String,
    size: String,
    location: Region,
    os_profile: Option<OsProfile>,
    image: Option<ImageReference>,
    os_disk: Option<OsDisk>,
    network_interface_id: Option<String>,
}

impl VmConfigBuilder {
    /// Starts a definition with a name and size.
    pub fn new(
        resource_group: impl Into<String>,
        name: impl Into<String>,
        size: impl Into<String>,
        location: Region,
    ) -> Self {
        Self {
            resource_group: resource_group.into(),
            name: name.into(),
            size: size.into(),
            location,
            os_profile: None,
            image: None,
            os_disk: None,
            network_interface_id: None,
        }
    }

    /// Sets the guest OS settings.
    pub fn operating_system(self, os_profile: OsProfile) -> Self {
        Self {
            os_profile: Some(os_profile),
            ..self
        }
    }

    /// Sets the source image.
    pub fn source_image(self, image: ImageReference) -> Self {
        Self {
            image: Some(image),
            ..self
        }
    }

    /// Sets the OS disk.
    ///
    /// `Attach` drops the source image and records the OS type of the
    /// attached disk. `FromImage` and `Empty` keep the image.
    pub fn os_disk(
        self,
        name: impl Into<String>,
        vhd_uri: impl Into<String>,
        create_option: DiskCreateOption,
    ) -> Self {
        let attach = create_option == DiskCreateOption::Attach;
        let os_type = if attach {
            self.os_profile.as_ref().map(|os| os.platform)
        } else {
            None
        };
        Self {
            image: if attach { None } else { self.image },
            os_disk: Some(OsDisk {
                name: name.into(),
                vhd_uri: vhd_uri.into(),
                create_option,
                os_type,
            }),
            ..self
        }
    }

    /// Attaches a network interface by resource ID.
    pub fn network_interface(self, id: impl Into<String>) -> Self {
        Self {
            network_interface_id: Some(id.into()),
            ..self
        }
    }

    /// Produces the complete definition.
    pub fn build(self) -> Result<VmDefinition> {
        let incomplete = |part: &str| Error::Other {
            message: format!("VM definition '{}' has no {}", self.name, part),
            source: None,
        };
        let os_profile = self.os_profile.ok_or_else(|| incomplete("OS settings"))?;
        let os_disk = self.os_disk.ok_or_else(|| incomplete("OS disk"))?;
        let network_interface_id = self
            .network_interface_id
            .ok_or_else(|| incomplete("network interface"))?;

        let image = match os_disk.create_option {
            DiskCreateOption::Attach => None,
            _ => Some(self.image.ok_or_else(|| incomplete("source image"))?),
        };

        Ok(VmDefinition {
            resource_group: self.resource_group,
            name: self.name,
            location: self.location,
            size: self.size,
            os_profile,
            image,
            os_disk,
            network_interface_id,
        })
    }
}

/// Everything a VM provisioning run touched.
#[derive(Debug, Clone, Serialize)]
pub struct VmOutcome {
    pub resource_group: Ensured<ResourceGroup>,
    pub storage_account: StorageAccount,
    pub os_disk_uri: String,
    pub network_interface: NetworkInterface,
    pub vm: VirtualMachine,
}

/// Validates the request, then creates the VM and its storage.
pub async fn provision_vm(provider: &dyn CloudProvider, request: &VmRequest) -> Result<VmOutcome> {
    let validated = validate_vm_request(provider, request).await?;
    let region = validated.region;
    let rg = request.resource_group.as_str();

    let resource_group = ensure_resource_group(provider, rg, &region).await?;

    let builder = VmConfigBuilder::new(rg, &request.name, &validated.size.name, region.clone())
        .operating_system(OsProfile {
            platform: request.platform,
            computer_name: request.computer_name().to_string(),
            credentials: request.credentials.clone(),
            provision_vm_agent: request.provision_vm_agent,
            enable_auto_update: request.enable_auto_update,
        })
        .source_image(ImageReference {
            publisher: request.image.publisher.trim().to_string(),
            ..request.image.clone()
        });

    let storage = provision_storage_in(
        provider,
        &storage_spec(rg, &request.storage_account, request.storage_sku, &region),
    )
    .await?;
    let blob_endpoint = storage
        .account
        .blob_endpoint
        .as_deref()
        .ok_or_else(|| Error::Other {
            message: format!(
                "Storage account '{}' reports no blob endpoint",
                storage.account.name
            ),
            source: None,
        })?;
    let vhd_uri = os_disk_uri(blob_endpoint, &request.name);

    let builder = builder.os_disk(
        os_disk_name(&request.name),
        vhd_uri.clone(),
        request.disk_create_option,
    );

    let network_interface = provider
        .get_network_interface(rg, &request.network_interface)
        .await?;

    let definition = builder
        .network_interface(network_interface.id.clone())
        .build()?;

    let vm = provider.create_vm(&definition).await?;
    info!(
        vm = %vm.name,
        resource_group = %rg,
        size = %definition.size,
        "Virtual machine provisioned"
    );

    Ok(VmOutcome {
        resource_group,
        storage_account: storage.account,
        os_disk_uri: vhd_uri,
        network_interface,
        vm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::InMemoryProvider;
    use pretty_assertions::assert_eq;

    fn profile(platform: OsPlatform) -> OsProfile {
        OsProfile {
            platform,
            computer_name: "vm1".into(),
            credentials: Credentials::new("azureadmin", "P@ssw0rd1234"),
            provision_vm_agent: true,
            enable_auto_update: true,
        }
    }

    fn image() -> ImageReference {
        ImageReference {
            publisher: "MicrosoftWindowsServer".into(),
            offer: "WindowsServer".into(),
            sku: "2022-datacenter".into(),
            version: DEFAULT_IMAGE_VERSION.into(),
        }
    }

    fn builder() -> VmConfigBuilder {
        VmConfigBuilder::new("Test", "vm1", "Standard_B1s", Region::new("uksouth"))
            .operating_system(profile(OsPlatform::Windows))
            .source_image(image())
    }

    #[test]
    fn test_os_disk_uri() {
        assert_eq!(
            os_disk_uri("https://acct.blob.core.windows.net/", "vm1"),
            "https://acct.blob.core.windows.net/vhds/vm1_OSDisk.vhd"
        );
        assert_eq!(
            os_disk_uri("https://acct.blob.core.windows.net", "vm1"),
            "https://acct.blob.core.windows.net/vhds/vm1_OSDisk.vhd"
        );
    }

    #[test]
    fn test_builder_from_image_keeps_image() {
        let definition = builder()
            .os_disk("vm1_OSDisk", "https://a/vhds/vm1_OSDisk.vhd", DiskCreateOption::FromImage)
            .network_interface("/nic/id")
            .build()
            .unwrap();
        assert_eq!(definition.image, Some(image()));
        assert_eq!(definition.os_disk.os_type, None);
        assert_eq!(definition.network_interface_id, "/nic/id");
    }

    #[test]
    fn test_builder_attach_drops_image_and_records_os_type() {
        let definition = builder()
            .os_disk("vm1_OSDisk", "https://a/vhds/vm1_OSDisk.vhd", DiskCreateOption::Attach)
            .network_interface("/nic/id")
            .build()
            .unwrap();
        assert_eq!(definition.image, None);
        assert_eq!(definition.os_disk.os_type, Some(OsPlatform::Windows));
    }

    #[test]
    fn test_builder_empty_passes_option_through() {
        let definition = builder()
            .os_disk("vm1_OSDisk", "https://a/vhds/vm1_OSDisk.vhd", DiskCreateOption::Empty)
            .network_interface("/nic/id")
            .build()
            .unwrap();
        assert_eq!(definition.os_disk.create_option, DiskCreateOption::Empty);
        assert!(definition.image.is_some());
    }

    #[test]
    fn test_builder_steps_do_not_affect_earlier_values() {
        let base = builder();
        let windows = base
            .clone()
            .os_disk("d", "u", DiskCreateOption::FromImage)
            .network_interface("/nic/a")
            .build()
            .unwrap();
        let linux = base
            .operating_system(profile(OsPlatform::Linux))
            .os_disk("d", "u", DiskCreateOption::FromImage)
            .network_interface("/nic/b")
            .build()
            .unwrap();
        assert_eq!(windows.os_profile.platform, OsPlatform::Windows);
        assert_eq!(linux.os_profile.platform, OsPlatform::Linux);
    }

    #[test]
    fn test_builder_requires_network_interface() {
        let err = builder()
            .os_disk("d", "u", DiskCreateOption::FromImage)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("network interface"));
    }

    fn request() -> VmRequest {
        VmRequest {
            credentials: Credentials::new("azureadmin", "P@ssw0rd1234"),
            resource_group: "Test".into(),
            name: "vm1".into(),
            size: "standard_b1s".into(),
            platform: OsPlatform::Windows,
            computer_name: None,
            image: image(),
            network_interface: "nic1".into(),
            storage_account: "storageacc1".into(),
            storage_sku: StorageSku::StandardLrs,
            disk_create_option: DiskCreateOption::FromImage,
            provision_vm_agent: true,
            enable_auto_update: false,
            location: "uksouth".into(),
        }
    }

    #[test]
    fn test_windows_computer_name_length() {
        let mut req = request();
        req.name = "a-very-long-vm-name".into();
        assert!(req.validate_local().is_err());
        req.computer_name = Some("shortname".into());
        assert!(req.validate_local().is_ok());
        req.computer_name = None;
        req.platform = OsPlatform::Linux;
        assert!(req.validate_local().is_ok());
    }

    #[test]
    fn test_attach_does_not_require_credentials() {
        let mut req = request();
        req.disk_create_option = DiskCreateOption::Attach;
        req.credentials = Credentials::new("", "");
        assert!(req.validate_local().is_ok());

        req.disk_create_option = DiskCreateOption::FromImage;
        assert!(matches!(
            req.validate_local(),
            Err(Error::MissingParameter(_))
        ));
    }

    #[tokio::test]
    async fn test_validation_matches_size_case_insensitively() {
        let provider = InMemoryProvider::sample();
        let validated = validate_vm_request(&provider, &request()).await.unwrap();
        assert_eq!(validated.size.name, "Standard_B1s");
        assert_eq!(validated.publisher.name, "MicrosoftWindowsServer");
        assert!(provider.mutating_calls().is_empty());
    }

    #[tokio::test]
    async fn test_validation_accepts_publisher_substring() {
        let provider = InMemoryProvider::sample();
        let mut req = request();
        req.image.publisher = "windowsserver".into();
        let validated = validate_vm_request(&provider, &req).await.unwrap();
        assert_eq!(validated.publisher.name, "MicrosoftWindowsServer");
    }
}

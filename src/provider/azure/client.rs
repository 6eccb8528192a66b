//! Azure Resource Manager API client implementation.

use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::models::{
    AddressSpace, ArmImageReference, ArmIpConfiguration, ArmNetworkInterface, ArmOsDisk,
    ArmOsProfile, ArmPublicIp, ArmResourceGroup, ArmSecurityGroup, ArmSecurityRule,
    ArmStorageAccount, ArmSubnet, ArmVirtualMachine, ArmVirtualNetwork, AsyncOperationStatus,
    CreateStorageAccountRequest, CreateVmProperties, CreateVmRequest, ErrorResponse,
    HardwareProfile, IpConfigurationProperties, LinuxConfiguration, ListResponse, Location,
    LocationOnly, NetworkInterfaceProperties, NetworkInterfaceReference,
    NetworkInterfaceReferenceProperties, NetworkProfile, PublicIpProperties, PublisherEntry,
    SecurityGroupProperties, SecurityRuleProperties, Sku, StorageProfile, SubResource,
    SubnetProperties, VirtualHardDisk, VirtualMachineSize, VirtualNetworkProperties,
    WindowsConfiguration,
};
use crate::provider::{
    CloudProvider, DiskCreateOption, ImagePublisher, IpConfiguration, NetworkInterface,
    NetworkInterfaceSpec, OsPlatform, ProviderError, ProviderResult, PublicIp, PublicIpSpec,
    Region, RegionInfo, ResourceGroup, SecurityGroup, SecurityGroupSpec, SecurityRule,
    StorageAccount, StorageAccountSpec, Subnet, VirtualMachine, VirtualNetwork,
    VirtualNetworkSpec, VmDefinition, VmSize,
};

/// Public Azure cloud management endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://management.azure.com";

/// Default timeout for API requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default polling interval for long-running operations.
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default upper bound for a long-running operation.
const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 1800;

/// API version for subscription-level calls.
const SUBSCRIPTION_API_VERSION: &str = "2022-12-01";

/// API version for resource groups.
const RESOURCES_API_VERSION: &str = "2021-04-01";

/// API version for storage accounts.
const STORAGE_API_VERSION: &str = "2023-01-01";

/// API version for networking.
const NETWORK_API_VERSION: &str = "2023-09-01";

/// API version for compute.
const COMPUTE_API_VERSION: &str = "2023-09-01";

/// Header carrying the status resource of an async operation.
const ASYNC_OPERATION_HEADER: &str = "azure-asyncoperation";

/// Connection settings for [`AzureRmClient`].
#[derive(Clone)]
pub struct AzureRmSettings {
    /// Management endpoint, without trailing slash.
    pub endpoint: String,
    pub subscription_id: String,
    /// OAuth2 bearer token for the management endpoint.
    pub access_token: String,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub operation_timeout: Duration,
}

impl AzureRmSettings {
    /// Settings for the public cloud with default timeouts.
    pub fn new(subscription_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            subscription_id: subscription_id.into(),
            access_token: access_token.into(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            operation_timeout: Duration::from_secs(DEFAULT_OPERATION_TIMEOUT_SECS),
        }
    }

    /// Overrides the management endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Overrides the long-running operation polling interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

impl fmt::Debug for AzureRmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureRmSettings")
            .field("endpoint", &self.endpoint)
            .field("subscription_id", &self.subscription_id)
            .field("access_token", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .field("poll_interval", &self.poll_interval)
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}

/// How completion of an accepted request is reported.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OperationMonitor {
    /// Status resource with a `status` field.
    AsyncOperation(String),
    /// URL answering 202 until the operation finishes.
    Location(String),
}

impl OperationMonitor {
    fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string)
        };
        header(ASYNC_OPERATION_HEADER)
            .map(Self::AsyncOperation)
            .or_else(|| header(LOCATION.as_str()).map(Self::Location))
    }
}

/// Azure Resource Manager provider.
#[derive(Clone)]
pub struct AzureRmClient {
    client: Client,
    settings: AzureRmSettings,
}

impl AzureRmClient {
    /// Creates a client.
    ///
    /// # Errors
    /// Returns an error if the endpoint is not a valid URL or the HTTP client
    /// cannot be created.
    pub fn new(mut settings: AzureRmSettings) -> ProviderResult<Self> {
        let endpoint = url::Url::parse(&settings.endpoint).map_err(|e| {
            ProviderError::Config(format!("invalid endpoint '{}': {}", settings.endpoint, e))
        })?;
        if settings.subscription_id.trim().is_empty() {
            return Err(ProviderError::Config(
                "subscription ID is not set".to_string(),
            ));
        }
        settings.endpoint = endpoint.as_str().trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(settings.request_timeout)
            .user_agent(concat!("azprov/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ProviderError::Http)?;

        Ok(Self { client, settings })
    }

    /// Subscription the client operates on.
    pub fn subscription_id(&self) -> &str {
        &self.settings.subscription_id
    }

    fn subscription_url(&self) -> String {
        format!(
            "{}/subscriptions/{}",
            self.settings.endpoint, self.settings.subscription_id
        )
    }

    fn resource_group_url(&self, name: &str) -> String {
        format!("{}/resourcegroups/{}", self.subscription_url(), name)
    }

    fn resource_url(
        &self,
        resource_group: &str,
        resource_type: &str,
        name: &str,
        api_version: &str,
    ) -> String {
        format!(
            "{}/providers/{}/{}?api-version={}",
            self.resource_group_url(resource_group),
            resource_type,
            name,
            api_version
        )
    }

    /// Make an authenticated GET request.
    async fn get<T: DeserializeOwned>(&self, url: &str) -> ProviderResult<T> {
        debug!(url = %url, "GET request");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.settings.access_token)
            .send()
            .await?;

        Self::handle_response(response).await
    }

    /// GET that maps 404 to `None`.
    async fn get_optional<T: DeserializeOwned>(&self, url: &str) -> ProviderResult<Option<T>> {
        match self.get(url).await {
            Ok(value) => Ok(Some(value)),
            Err(ProviderError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// GET a list, following `nextLink` pages.
    async fn get_list<T: DeserializeOwned>(&self, url: &str) -> ProviderResult<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(url.to_string());
        while let Some(url) = next {
            let page: ListResponse<T> = self.get(&url).await?;
            items.extend(page.value);
            next = page.next_link;
        }
        Ok(items)
    }

    /// Make an authenticated PUT request and wait for the resource to settle.
    async fn put<T, B>(&self, url: &str, body: &B) -> ProviderResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        debug!(url = %url, "PUT request");

        let response = self
            .client
            .put(url)
            .bearer_auth(&self.settings.access_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::error_from(response).await);
        }

        let monitor = OperationMonitor::from_headers(response.headers());
        let text = response.text().await?;

        match monitor {
            Some(monitor) if status == StatusCode::CREATED || status == StatusCode::ACCEPTED => {
                self.wait_for_operation(&monitor).await?;
                self.get(url).await
            }
            _ if text.trim().is_empty() => self.get(url).await,
            _ => Self::parse_body(&text),
        }
    }

    /// Poll a long-running operation until it finishes.
    async fn wait_for_operation(&self, monitor: &OperationMonitor) -> ProviderResult<()> {
        let started = Instant::now();
        debug!(monitor = ?monitor, "Waiting for long-running operation");

        loop {
            match monitor {
                OperationMonitor::AsyncOperation(url) => {
                    let operation: AsyncOperationStatus = self.get(url).await?;
                    match operation.status.as_str() {
                        "Succeeded" => return Ok(()),
                        "Failed" | "Canceled" => {
                            let message = operation
                                .error
                                .map(|e| format!("{}: {}", e.code, e.message))
                                .unwrap_or(operation.status);
                            return Err(ProviderError::OperationFailed(message));
                        }
                        other => debug!(status = %other, "Operation in progress"),
                    }
                }
                OperationMonitor::Location(url) => {
                    let response = self
                        .client
                        .get(url)
                        .bearer_auth(&self.settings.access_token)
                        .send()
                        .await?;
                    let status = response.status();
                    if status == StatusCode::ACCEPTED {
                        debug!("Operation in progress");
                    } else if status.is_success() {
                        return Ok(());
                    } else {
                        return Err(Self::error_from(response).await);
                    }
                }
            }

            if started.elapsed() >= self.settings.operation_timeout {
                warn!(
                    timeout_secs = self.settings.operation_timeout.as_secs(),
                    "Long-running operation did not finish in time"
                );
                return Err(ProviderError::Timeout(
                    self.settings.operation_timeout.as_secs(),
                ));
            }
            tokio::time::sleep(self.settings.poll_interval).await;
        }
    }

    /// Handle API response.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> ProviderResult<T> {
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        let text = response.text().await?;
        Self::parse_body(&text)
    }

    fn parse_body<T: DeserializeOwned>(text: &str) -> ProviderResult<T> {
        serde_json::from_str(text).map_err(|e| {
            warn!(error = %e, body = %text, "Failed to parse response");
            ProviderError::Serialization(e)
        })
    }

    /// Map an unsuccessful response to a typed error.
    async fn error_from(response: reqwest::Response) -> ProviderError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|body| format!("{}: {}", body.error.code, body.error.message))
            .unwrap_or(text);

        match status {
            StatusCode::NOT_FOUND => ProviderError::NotFound(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::Auth(message),
            _ => ProviderError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }

    // ------------------------------------------------------------------------
    // Conversions
    // ------------------------------------------------------------------------

    fn to_storage_account(resource_group: &str, account: ArmStorageAccount) -> StorageAccount {
        StorageAccount {
            id: account.id,
            name: account.name,
            resource_group: resource_group.to_string(),
            location: account.location,
            sku: account.sku.name,
            blob_endpoint: account
                .properties
                .primary_endpoints
                .and_then(|endpoints| endpoints.blob),
        }
    }

    fn to_public_ip(ip: ArmPublicIp, fallback_name: &str) -> PublicIp {
        PublicIp {
            id: ip.id.unwrap_or_default(),
            name: ip.name.unwrap_or_else(|| fallback_name.to_string()),
            location: ip.location,
            allocation: ip
                .properties
                .public_ip_allocation_method
                .parse()
                .unwrap_or_default(),
            ip_address: ip.properties.ip_address,
        }
    }

    fn to_rule(rule: &SecurityRule) -> ArmSecurityRule {
        ArmSecurityRule {
            name: rule.name.clone(),
            properties: SecurityRuleProperties {
                description: rule.description.clone(),
                protocol: rule.protocol.clone(),
                source_port_range: rule.source_port_range.clone(),
                destination_port_range: rule.destination_port_range.clone(),
                source_address_prefix: rule.source_address_prefix.clone(),
                destination_address_prefix: rule.destination_address_prefix.clone(),
                access: rule.access.clone(),
                priority: rule.priority,
                direction: rule.direction.clone(),
            },
        }
    }

    fn from_rule(rule: ArmSecurityRule) -> SecurityRule {
        let p = rule.properties;
        SecurityRule {
            name: rule.name,
            description: p.description,
            protocol: p.protocol,
            direction: p.direction,
            access: p.access,
            priority: p.priority,
            source_address_prefix: p.source_address_prefix,
            source_port_range: p.source_port_range,
            destination_address_prefix: p.destination_address_prefix,
            destination_port_range: p.destination_port_range,
        }
    }

    fn to_network_interface(nic: ArmNetworkInterface, fallback_name: &str) -> NetworkInterface {
        NetworkInterface {
            id: nic.id.unwrap_or_default(),
            name: nic.name.unwrap_or_else(|| fallback_name.to_string()),
            location: nic.location,
            ip_configurations: nic
                .properties
                .ip_configurations
                .into_iter()
                .map(|config| IpConfiguration {
                    name: config.name,
                    subnet_id: config.properties.subnet.map(|s| s.id),
                    public_ip_id: config.properties.public_ip_address.map(|p| p.id),
                    private_ip_address: config.properties.private_ip_address,
                })
                .collect(),
        }
    }

    fn to_vm(vm: ArmVirtualMachine) -> VirtualMachine {
        VirtualMachine {
            id: vm.id,
            name: vm.name,
            location: vm.location,
            size: vm.properties.hardware_profile.map(|hp| hp.vm_size),
            provisioning_state: vm.properties.provisioning_state,
            network_interface_ids: vm
                .properties
                .network_profile
                .map(|np| np.network_interfaces.into_iter().map(|n| n.id).collect())
                .unwrap_or_default(),
        }
    }

    fn vm_request(definition: &VmDefinition) -> CreateVmRequest {
        let os = &definition.os_profile;
        let attach = definition.os_disk.create_option == DiskCreateOption::Attach;

        // An attached disk already carries a provisioned OS.
        let os_profile = (!attach).then(|| ArmOsProfile {
            computer_name: os.computer_name.clone(),
            admin_username: os.credentials.username.clone(),
            admin_password: os.credentials.password.clone(),
            windows_configuration: (os.platform == OsPlatform::Windows).then(|| {
                WindowsConfiguration {
                    provision_vm_agent: os.provision_vm_agent,
                    enable_automatic_updates: os.enable_auto_update,
                }
            }),
            linux_configuration: (os.platform == OsPlatform::Linux).then(|| LinuxConfiguration {
                provision_vm_agent: os.provision_vm_agent,
                disable_password_authentication: false,
            }),
        });

        CreateVmRequest {
            location: definition.location.to_string(),
            properties: CreateVmProperties {
                hardware_profile: HardwareProfile {
                    vm_size: definition.size.clone(),
                },
                os_profile,
                storage_profile: StorageProfile {
                    image_reference: definition.image.as_ref().map(|image| ArmImageReference {
                        publisher: image.publisher.clone(),
                        offer: image.offer.clone(),
                        sku: image.sku.clone(),
                        version: image.version.clone(),
                    }),
                    os_disk: ArmOsDisk {
                        name: definition.os_disk.name.clone(),
                        vhd: VirtualHardDisk {
                            uri: definition.os_disk.vhd_uri.clone(),
                        },
                        create_option: definition.os_disk.create_option.to_string(),
                        os_type: definition.os_disk.os_type.map(|t| t.to_string()),
                        caching: "ReadWrite".to_string(),
                    },
                },
                network_profile: NetworkProfile {
                    network_interfaces: vec![NetworkInterfaceReference {
                        id: definition.network_interface_id.clone(),
                        properties: Some(NetworkInterfaceReferenceProperties { primary: true }),
                    }],
                },
            },
        }
    }
}

#[async_trait]
impl CloudProvider for AzureRmClient {
    fn name(&self) -> &'static str {
        "azure"
    }

    // ========================================================================
    // Catalogs
    // ========================================================================

    async fn list_regions(&self) -> ProviderResult<Vec<RegionInfo>> {
        let url = format!(
            "{}/locations?api-version={}",
            self.subscription_url(),
            SUBSCRIPTION_API_VERSION
        );
        let locations: Vec<Location> = self.get_list(&url).await?;

        // Logical regions (geographies) cannot host resources.
        Ok(locations
            .into_iter()
            .filter(|l| {
                l.metadata
                    .as_ref()
                    .and_then(|m| m.region_type.as_deref())
                    .map_or(true, |t| t != "Logical")
            })
            .map(|l| RegionInfo::new(l.name, l.display_name))
            .collect())
    }

    async fn list_vm_sizes(&self, region: &Region) -> ProviderResult<Vec<VmSize>> {
        let url = format!(
            "{}/providers/Microsoft.Compute/locations/{}/vmSizes?api-version={}",
            self.subscription_url(),
            region,
            COMPUTE_API_VERSION
        );
        let sizes: Vec<VirtualMachineSize> = self.get_list(&url).await?;
        Ok(sizes
            .into_iter()
            .map(|s| VmSize::new(s.name, s.number_of_cores, s.memory_in_mb, s.max_data_disk_count))
            .collect())
    }

    async fn list_publishers(&self, region: &Region) -> ProviderResult<Vec<ImagePublisher>> {
        let url = format!(
            "{}/providers/Microsoft.Compute/locations/{}/publishers?api-version={}",
            self.subscription_url(),
            region,
            COMPUTE_API_VERSION
        );
        let publishers: Vec<PublisherEntry> = self.get(&url).await?;
        Ok(publishers
            .into_iter()
            .map(|p| ImagePublisher {
                name: p.name,
                location: p.location,
            })
            .collect())
    }

    // ========================================================================
    // Resource groups
    // ========================================================================

    async fn get_resource_group(&self, name: &str) -> ProviderResult<Option<ResourceGroup>> {
        let url = format!(
            "{}?api-version={}",
            self.resource_group_url(name),
            RESOURCES_API_VERSION
        );
        let group: Option<ArmResourceGroup> = self.get_optional(&url).await?;
        Ok(group.map(|g| ResourceGroup {
            id: g.id,
            name: g.name,
            location: g.location,
        }))
    }

    async fn create_resource_group(
        &self,
        name: &str,
        region: &Region,
    ) -> ProviderResult<ResourceGroup> {
        info!(name = %name, region = %region, "Creating resource group");

        let url = format!(
            "{}?api-version={}",
            self.resource_group_url(name),
            RESOURCES_API_VERSION
        );
        let group: ArmResourceGroup = self
            .put(
                &url,
                &LocationOnly {
                    location: region.as_str(),
                },
            )
            .await?;

        Ok(ResourceGroup {
            id: group.id,
            name: group.name,
            location: group.location,
        })
    }

    // ========================================================================
    // Storage
    // ========================================================================

    async fn create_storage_account(
        &self,
        spec: &StorageAccountSpec,
    ) -> ProviderResult<StorageAccount> {
        info!(
            name = %spec.name,
            resource_group = %spec.resource_group,
            sku = %spec.sku,
            "Creating storage account"
        );

        let url = self.resource_url(
            &spec.resource_group,
            "Microsoft.Storage/storageAccounts",
            &spec.name,
            STORAGE_API_VERSION,
        );
        let body = CreateStorageAccountRequest {
            sku: Sku {
                name: spec.sku.to_string(),
            },
            kind: "StorageV2".to_string(),
            location: spec.location.to_string(),
        };
        let account: ArmStorageAccount = self.put(&url, &body).await?;
        Ok(Self::to_storage_account(&spec.resource_group, account))
    }

    async fn get_storage_account(
        &self,
        resource_group: &str,
        name: &str,
    ) -> ProviderResult<StorageAccount> {
        let url = self.resource_url(
            resource_group,
            "Microsoft.Storage/storageAccounts",
            name,
            STORAGE_API_VERSION,
        );
        let account: ArmStorageAccount = self.get(&url).await?;
        Ok(Self::to_storage_account(resource_group, account))
    }

    // ========================================================================
    // Network
    // ========================================================================

    async fn create_public_ip(&self, spec: &PublicIpSpec) -> ProviderResult<PublicIp> {
        info!(
            name = %spec.name,
            resource_group = %spec.resource_group,
            allocation = %spec.allocation,
            "Creating public IP address"
        );

        let url = self.resource_url(
            &spec.resource_group,
            "Microsoft.Network/publicIPAddresses",
            &spec.name,
            NETWORK_API_VERSION,
        );
        let body = ArmPublicIp {
            id: None,
            name: None,
            location: spec.location.to_string(),
            properties: PublicIpProperties {
                public_ip_allocation_method: spec.allocation.to_string(),
                ip_address: None,
            },
        };
        let ip: ArmPublicIp = self.put(&url, &body).await?;
        Ok(Self::to_public_ip(ip, &spec.name))
    }

    async fn get_public_ip(&self, resource_group: &str, name: &str) -> ProviderResult<PublicIp> {
        let url = self.resource_url(
            resource_group,
            "Microsoft.Network/publicIPAddresses",
            name,
            NETWORK_API_VERSION,
        );
        let ip: ArmPublicIp = self.get(&url).await?;
        Ok(Self::to_public_ip(ip, name))
    }

    async fn create_security_group(
        &self,
        spec: &SecurityGroupSpec,
    ) -> ProviderResult<SecurityGroup> {
        info!(
            name = %spec.name,
            resource_group = %spec.resource_group,
            rules = spec.rules.len(),
            "Creating network security group"
        );

        let url = self.resource_url(
            &spec.resource_group,
            "Microsoft.Network/networkSecurityGroups",
            &spec.name,
            NETWORK_API_VERSION,
        );
        let body = ArmSecurityGroup {
            id: None,
            name: None,
            location: spec.location.to_string(),
            properties: SecurityGroupProperties {
                security_rules: spec.rules.iter().map(Self::to_rule).collect(),
            },
        };
        let group: ArmSecurityGroup = self.put(&url, &body).await?;
        Ok(SecurityGroup {
            id: group.id.unwrap_or_default(),
            name: group.name.unwrap_or_else(|| spec.name.clone()),
            location: group.location,
            rules: group
                .properties
                .security_rules
                .into_iter()
                .map(Self::from_rule)
                .collect(),
        })
    }

    async fn create_virtual_network(
        &self,
        spec: &VirtualNetworkSpec,
    ) -> ProviderResult<VirtualNetwork> {
        info!(
            name = %spec.name,
            resource_group = %spec.resource_group,
            address_prefix = %spec.address_prefix,
            "Creating virtual network"
        );

        let url = self.resource_url(
            &spec.resource_group,
            "Microsoft.Network/virtualNetworks",
            &spec.name,
            NETWORK_API_VERSION,
        );
        let body = ArmVirtualNetwork {
            id: None,
            name: None,
            location: spec.location.to_string(),
            properties: VirtualNetworkProperties {
                address_space: AddressSpace {
                    address_prefixes: vec![spec.address_prefix.clone()],
                },
                subnets: spec
                    .subnets
                    .iter()
                    .map(|subnet| ArmSubnet {
                        id: None,
                        name: subnet.name.clone(),
                        properties: SubnetProperties {
                            address_prefix: subnet.address_prefix.clone(),
                            network_security_group: subnet
                                .security_group_id
                                .clone()
                                .map(|id| SubResource { id }),
                        },
                    })
                    .collect(),
            },
        };
        let network: ArmVirtualNetwork = self.put(&url, &body).await?;
        Ok(VirtualNetwork {
            id: network.id.unwrap_or_default(),
            name: network.name.unwrap_or_else(|| spec.name.clone()),
            location: network.location,
            address_prefixes: network.properties.address_space.address_prefixes,
            subnets: network
                .properties
                .subnets
                .into_iter()
                .map(|s| Subnet {
                    id: s.id.unwrap_or_default(),
                    name: s.name,
                    address_prefix: s.properties.address_prefix,
                })
                .collect(),
        })
    }

    async fn create_network_interface(
        &self,
        spec: &NetworkInterfaceSpec,
    ) -> ProviderResult<NetworkInterface> {
        info!(
            name = %spec.name,
            resource_group = %spec.resource_group,
            "Creating network interface"
        );

        let url = self.resource_url(
            &spec.resource_group,
            "Microsoft.Network/networkInterfaces",
            &spec.name,
            NETWORK_API_VERSION,
        );
        let body = ArmNetworkInterface {
            id: None,
            name: None,
            location: spec.location.to_string(),
            properties: NetworkInterfaceProperties {
                ip_configurations: vec![ArmIpConfiguration {
                    name: spec.ip_configuration_name.clone(),
                    properties: IpConfigurationProperties {
                        subnet: Some(SubResource {
                            id: spec.subnet_id.clone(),
                        }),
                        public_ip_address: spec
                            .public_ip_id
                            .clone()
                            .map(|id| SubResource { id }),
                        private_ip_allocation_method: Some("Dynamic".to_string()),
                        private_ip_address: None,
                    },
                }],
            },
        };
        let nic: ArmNetworkInterface = self.put(&url, &body).await?;
        Ok(Self::to_network_interface(nic, &spec.name))
    }

    async fn get_network_interface(
        &self,
        resource_group: &str,
        name: &str,
    ) -> ProviderResult<NetworkInterface> {
        let url = self.resource_url(
            resource_group,
            "Microsoft.Network/networkInterfaces",
            name,
            NETWORK_API_VERSION,
        );
        let nic: ArmNetworkInterface = self.get(&url).await?;
        Ok(Self::to_network_interface(nic, name))
    }

    async fn list_network_interfaces(
        &self,
        resource_group: &str,
    ) -> ProviderResult<Vec<NetworkInterface>> {
        let url = format!(
            "{}/providers/Microsoft.Network/networkInterfaces?api-version={}",
            self.resource_group_url(resource_group),
            NETWORK_API_VERSION
        );
        let nics: Vec<ArmNetworkInterface> = self.get_list(&url).await?;
        Ok(nics
            .into_iter()
            .map(|nic| Self::to_network_interface(nic, ""))
            .collect())
    }

    // ========================================================================
    // Compute
    // ========================================================================

    async fn create_vm(&self, definition: &VmDefinition) -> ProviderResult<VirtualMachine> {
        info!(
            name = %definition.name,
            resource_group = %definition.resource_group,
            size = %definition.size,
            create_option = %definition.os_disk.create_option,
            "Creating virtual machine"
        );

        let url = self.resource_url(
            &definition.resource_group,
            "Microsoft.Compute/virtualMachines",
            &definition.name,
            COMPUTE_API_VERSION,
        );
        let vm: ArmVirtualMachine = self.put(&url, &Self::vm_request(definition)).await?;
        Ok(Self::to_vm(vm))
    }

    async fn get_vm(&self, resource_group: &str, name: &str) -> ProviderResult<VirtualMachine> {
        let url = self.resource_url(
            resource_group,
            "Microsoft.Compute/virtualMachines",
            name,
            COMPUTE_API_VERSION,
        );
        let vm: ArmVirtualMachine = self.get(&url).await?;
        Ok(Self::to_vm(vm))
    }
}

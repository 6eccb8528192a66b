//! Azure Resource Manager request and response models.

use serde::{Deserialize, Serialize};

// ============================================================================
// Common
// ============================================================================

/// Reference to another resource by ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubResource {
    pub id: String,
}

/// Generic list envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    /// Continuation URL for paged results.
    pub next_link: Option<String>,
}

/// Error body returned by ARM.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Body of an `Azure-AsyncOperation` status resource.
#[derive(Debug, Clone, Deserialize)]
pub struct AsyncOperationStatus {
    /// `InProgress`, `Succeeded`, `Failed` or `Canceled`.
    pub status: String,
    pub error: Option<ErrorDetail>,
}

/// Minimal request body: a location and nothing else.
#[derive(Debug, Serialize)]
pub struct LocationOnly<'a> {
    pub location: &'a str,
}

// ============================================================================
// Subscription catalogs
// ============================================================================

/// Subscription location.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub name: String,
    pub display_name: String,
    pub metadata: Option<LocationMetadata>,
}

/// Location metadata.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationMetadata {
    /// `Physical` or `Logical`.
    pub region_type: Option<String>,
}

/// VM size descriptor.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineSize {
    pub name: String,
    pub number_of_cores: u32,
    #[serde(rename = "memoryInMB")]
    pub memory_in_mb: u64,
    pub max_data_disk_count: u32,
}

/// Image publisher entry. The publishers endpoint returns a bare array.
#[derive(Debug, Clone, Deserialize)]
pub struct PublisherEntry {
    pub name: String,
    pub location: String,
}

// ============================================================================
// Resource groups
// ============================================================================

/// Resource group.
#[derive(Debug, Clone, Deserialize)]
pub struct ArmResourceGroup {
    pub id: String,
    pub name: String,
    pub location: String,
}

// ============================================================================
// Storage
// ============================================================================

/// SKU block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sku {
    pub name: String,
}

/// Create storage account request.
#[derive(Debug, Serialize)]
pub struct CreateStorageAccountRequest {
    pub sku: Sku,
    pub kind: String,
    pub location: String,
}

/// Storage account.
#[derive(Debug, Clone, Deserialize)]
pub struct ArmStorageAccount {
    pub id: String,
    pub name: String,
    pub location: String,
    pub sku: Sku,
    #[serde(default)]
    pub properties: StorageAccountProperties,
}

/// Storage account properties.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountProperties {
    pub provisioning_state: Option<String>,
    pub primary_endpoints: Option<PrimaryEndpoints>,
}

/// Storage service endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrimaryEndpoints {
    pub blob: Option<String>,
}

// ============================================================================
// Public IP
// ============================================================================

/// Public IP address resource (request and response).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmPublicIp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub location: String,
    pub properties: PublicIpProperties,
}

/// Public IP properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicIpProperties {
    #[serde(rename = "publicIPAllocationMethod")]
    pub public_ip_allocation_method: String,
    #[serde(
        rename = "ipAddress",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub ip_address: Option<String>,
}

// ============================================================================
// Network security group
// ============================================================================

/// Network security group resource (request and response).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmSecurityGroup {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub location: String,
    #[serde(default)]
    pub properties: SecurityGroupProperties,
}

/// Security group properties.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroupProperties {
    #[serde(default)]
    pub security_rules: Vec<ArmSecurityRule>,
}

/// Security rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmSecurityRule {
    pub name: String,
    pub properties: SecurityRuleProperties,
}

/// Security rule properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRuleProperties {
    #[serde(default)]
    pub description: String,
    pub protocol: String,
    pub source_port_range: String,
    pub destination_port_range: String,
    pub source_address_prefix: String,
    pub destination_address_prefix: String,
    pub access: String,
    pub priority: u32,
    pub direction: String,
}

// ============================================================================
// Virtual network
// ============================================================================

/// Virtual network resource (request and response).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmVirtualNetwork {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub location: String,
    pub properties: VirtualNetworkProperties,
}

/// Virtual network properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualNetworkProperties {
    pub address_space: AddressSpace,
    #[serde(default)]
    pub subnets: Vec<ArmSubnet>,
}

/// Address space.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSpace {
    pub address_prefixes: Vec<String>,
}

/// Subnet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmSubnet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub properties: SubnetProperties,
}

/// Subnet properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubnetProperties {
    #[serde(default)]
    pub address_prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_security_group: Option<SubResource>,
}

// ============================================================================
// Network interface
// ============================================================================

/// Network interface resource (request and response).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmNetworkInterface {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub location: String,
    pub properties: NetworkInterfaceProperties,
}

/// Network interface properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceProperties {
    #[serde(default)]
    pub ip_configurations: Vec<ArmIpConfiguration>,
}

/// IP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmIpConfiguration {
    pub name: String,
    pub properties: IpConfigurationProperties,
}

/// IP configuration properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpConfigurationProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet: Option<SubResource>,
    #[serde(
        rename = "publicIPAddress",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub public_ip_address: Option<SubResource>,
    #[serde(
        rename = "privateIPAllocationMethod",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub private_ip_allocation_method: Option<String>,
    #[serde(
        rename = "privateIPAddress",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub private_ip_address: Option<String>,
}

// ============================================================================
// Virtual machine
// ============================================================================

/// Virtual machine as returned by ARM.
#[derive(Debug, Clone, Deserialize)]
pub struct ArmVirtualMachine {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(default)]
    pub properties: VirtualMachineProperties,
}

/// Virtual machine properties (response subset).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineProperties {
    pub provisioning_state: Option<String>,
    pub hardware_profile: Option<HardwareProfile>,
    pub network_profile: Option<NetworkProfile>,
}

/// Create VM request.
#[derive(Debug, Serialize)]
pub struct CreateVmRequest {
    pub location: String,
    pub properties: CreateVmProperties,
}

/// Create VM properties.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVmProperties {
    pub hardware_profile: HardwareProfile,
    /// Omitted when an existing OS disk is attached.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_profile: Option<ArmOsProfile>,
    pub storage_profile: StorageProfile,
    pub network_profile: NetworkProfile,
}

/// Hardware profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareProfile {
    pub vm_size: String,
}

/// OS profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmOsProfile {
    pub computer_name: String,
    pub admin_username: String,
    pub admin_password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub windows_configuration: Option<WindowsConfiguration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linux_configuration: Option<LinuxConfiguration>,
}

/// Windows guest configuration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowsConfiguration {
    #[serde(rename = "provisionVMAgent")]
    pub provision_vm_agent: bool,
    pub enable_automatic_updates: bool,
}

/// Linux guest configuration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinuxConfiguration {
    #[serde(rename = "provisionVMAgent")]
    pub provision_vm_agent: bool,
    pub disable_password_authentication: bool,
}

/// Storage profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_reference: Option<ArmImageReference>,
    pub os_disk: ArmOsDisk,
}

/// Image reference.
#[derive(Debug, Serialize)]
pub struct ArmImageReference {
    pub publisher: String,
    pub offer: String,
    pub sku: String,
    pub version: String,
}

/// Unmanaged OS disk backed by a VHD blob.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmOsDisk {
    pub name: String,
    pub vhd: VirtualHardDisk,
    pub create_option: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_type: Option<String>,
    pub caching: String,
}

/// VHD location.
#[derive(Debug, Serialize)]
pub struct VirtualHardDisk {
    pub uri: String,
}

/// Network profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkProfile {
    #[serde(default)]
    pub network_interfaces: Vec<NetworkInterfaceReference>,
}

/// Reference to a network interface from a VM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInterfaceReference {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<NetworkInterfaceReferenceProperties>,
}

/// Network interface reference properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkInterfaceReferenceProperties {
    pub primary: bool,
}

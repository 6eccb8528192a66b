//! Resource types exchanged with a [`CloudProvider`](super::CloudProvider).
//!
//! `*Spec` types describe a resource to create; the plain types describe a
//! resource as the provider reports it.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Returns the last path segment of an ARM resource ID.
///
/// Names pass through unchanged.
pub fn resource_name_from_id(id: &str) -> &str {
    id.trim_end_matches('/').rsplit('/').next().unwrap_or(id)
}

// ============================================================================
// Regions
// ============================================================================

/// A canonical region name such as `uksouth`.
///
/// Obtain one through [`RegionSet::resolve`](crate::provision::RegionSet::resolve)
/// so that it is known to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Region(String);

impl Region {
    /// Wraps a canonical region name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the canonical name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A region as listed by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
    /// Canonical name (`uksouth`).
    pub name: String,
    /// Human readable name (`UK South`).
    pub display_name: String,
}

impl RegionInfo {
    /// Creates a region entry.
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
        }
    }
}

// ============================================================================
// Enumerations
// ============================================================================

fn parse_choice<T: Copy>(
    field: &str,
    input: &str,
    choices: &[T],
    name: impl Fn(&T) -> &'static str,
) -> Result<T, Error> {
    choices
        .iter()
        .find(|choice| name(*choice).eq_ignore_ascii_case(input.trim()))
        .copied()
        .ok_or_else(|| {
            let valid: Vec<&str> = choices.iter().map(&name).collect();
            Error::invalid_parameter(
                field,
                format!("'{}' is not one of: {}", input, valid.join(", ")),
            )
        })
}

/// Storage account redundancy class.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum StorageSku {
    /// Premium locally redundant storage
    #[serde(rename = "Premium_LRS")]
    #[value(name = "Premium_LRS")]
    PremiumLrs,
    /// Standard geo-redundant storage
    #[serde(rename = "Standard_GRS")]
    #[value(name = "Standard_GRS")]
    StandardGrs,
    /// Standard locally redundant storage
    #[serde(rename = "Standard_LRS")]
    #[value(name = "Standard_LRS")]
    StandardLrs,
    /// Standard read-access geo-redundant storage
    #[serde(rename = "Standard_RAGRS")]
    #[value(name = "Standard_RAGRS")]
    StandardRagrs,
    /// Standard zone-redundant storage
    #[serde(rename = "Standard_ZRS")]
    #[value(name = "Standard_ZRS")]
    StandardZrs,
}

impl StorageSku {
    /// Every redundancy class.
    pub const ALL: [StorageSku; 5] = [
        StorageSku::PremiumLrs,
        StorageSku::StandardGrs,
        StorageSku::StandardLrs,
        StorageSku::StandardRagrs,
        StorageSku::StandardZrs,
    ];

    /// Returns the provider's name for this class.
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageSku::PremiumLrs => "Premium_LRS",
            StorageSku::StandardGrs => "Standard_GRS",
            StorageSku::StandardLrs => "Standard_LRS",
            StorageSku::StandardRagrs => "Standard_RAGRS",
            StorageSku::StandardZrs => "Standard_ZRS",
        }
    }
}

impl fmt::Display for StorageSku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageSku {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice("sku", s, &Self::ALL, StorageSku::as_str)
    }
}

/// Public IP allocation method.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum IpAllocation {
    /// Address assigned when the IP is associated with a running resource
    #[default]
    #[value(name = "Dynamic")]
    Dynamic,
    /// Address reserved at creation
    #[value(name = "Static")]
    Static,
}

impl IpAllocation {
    /// Every allocation method.
    pub const ALL: [IpAllocation; 2] = [IpAllocation::Dynamic, IpAllocation::Static];

    /// Returns the provider's name for this method.
    pub fn as_str(&self) -> &'static str {
        match self {
            IpAllocation::Dynamic => "Dynamic",
            IpAllocation::Static => "Static",
        }
    }
}

impl fmt::Display for IpAllocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IpAllocation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice("allocation_method", s, &Self::ALL, IpAllocation::as_str)
    }
}

/// Guest operating system family.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum OsPlatform {
    #[default]
    #[value(name = "Windows")]
    Windows,
    #[value(name = "Linux")]
    Linux,
}

impl OsPlatform {
    /// Every platform.
    pub const ALL: [OsPlatform; 2] = [OsPlatform::Windows, OsPlatform::Linux];

    /// Returns the provider's name for this platform.
    pub fn as_str(&self) -> &'static str {
        match self {
            OsPlatform::Windows => "Windows",
            OsPlatform::Linux => "Linux",
        }
    }

    /// Longest computer name the guest accepts.
    pub fn max_computer_name_len(&self) -> usize {
        match self {
            OsPlatform::Windows => 15,
            OsPlatform::Linux => 64,
        }
    }
}

impl fmt::Display for OsPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OsPlatform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice("os_type", s, &Self::ALL, OsPlatform::as_str)
    }
}

/// How the OS disk is created.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum DiskCreateOption {
    /// Disk is written from the source image
    #[default]
    #[value(name = "FromImage")]
    FromImage,
    /// An existing VHD is attached; no image is used
    #[value(name = "Attach")]
    Attach,
    /// A blank disk is created
    #[value(name = "Empty")]
    Empty,
}

impl DiskCreateOption {
    /// Every creation mode.
    pub const ALL: [DiskCreateOption; 3] = [
        DiskCreateOption::FromImage,
        DiskCreateOption::Attach,
        DiskCreateOption::Empty,
    ];

    /// Returns the provider's name for this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiskCreateOption::FromImage => "FromImage",
            DiskCreateOption::Attach => "Attach",
            DiskCreateOption::Empty => "Empty",
        }
    }
}

impl fmt::Display for DiskCreateOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DiskCreateOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_choice("create_option", s, &Self::ALL, DiskCreateOption::as_str)
    }
}

// ============================================================================
// Catalog entries
// ============================================================================

/// A compute size offered in a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmSize {
    /// Size name (`Standard_B2s`).
    pub name: String,
    /// Number of virtual cores.
    pub cores: u32,
    /// Memory in MB.
    pub memory_mb: u64,
    /// Maximum number of data disks.
    pub max_data_disks: u32,
}

impl VmSize {
    /// Creates a size descriptor.
    pub fn new(name: impl Into<String>, cores: u32, memory_mb: u64, max_data_disks: u32) -> Self {
        Self {
            name: name.into(),
            cores,
            memory_mb,
            max_data_disks,
        }
    }
}

/// An image publisher offered in a region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePublisher {
    /// Publisher name (`MicrosoftWindowsServer`).
    pub name: String,
    /// Region the publisher was listed for.
    pub location: String,
}

// ============================================================================
// Resources
// ============================================================================

/// A resource group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub id: String,
    pub name: String,
    pub location: String,
}

/// Storage account to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageAccountSpec {
    pub resource_group: String,
    pub name: String,
    pub sku: StorageSku,
    pub location: Region,
}

/// A storage account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageAccount {
    pub id: String,
    pub name: String,
    pub resource_group: String,
    pub location: String,
    /// Redundancy class as reported by the provider.
    pub sku: String,
    /// Primary blob endpoint, e.g. `https://acct.blob.core.windows.net/`.
    pub blob_endpoint: Option<String>,
}

/// Public IP to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicIpSpec {
    pub resource_group: String,
    pub name: String,
    pub location: Region,
    pub allocation: IpAllocation,
}

/// A public IP address resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicIp {
    pub id: String,
    pub name: String,
    pub location: String,
    pub allocation: IpAllocation,
    /// Allocated address, absent until the provider assigns one.
    pub ip_address: Option<String>,
}

/// One network security rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityRule {
    pub name: String,
    pub description: String,
    pub protocol: String,
    pub direction: String,
    pub access: String,
    pub priority: u32,
    pub source_address_prefix: String,
    pub source_port_range: String,
    pub destination_address_prefix: String,
    pub destination_port_range: String,
}

impl SecurityRule {
    /// Allows inbound TCP traffic from anywhere to `port`.
    pub fn allow_inbound_tcp(
        name: impl Into<String>,
        description: impl Into<String>,
        port: u16,
        priority: u32,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            protocol: "Tcp".to_string(),
            direction: "Inbound".to_string(),
            access: "Allow".to_string(),
            priority,
            source_address_prefix: "Internet".to_string(),
            source_port_range: "*".to_string(),
            destination_address_prefix: "*".to_string(),
            destination_port_range: port.to_string(),
        }
    }
}

/// Network security group to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupSpec {
    pub resource_group: String,
    pub name: String,
    pub location: Region,
    pub rules: Vec<SecurityRule>,
}

/// A network security group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub id: String,
    pub name: String,
    pub location: String,
    pub rules: Vec<SecurityRule>,
}

/// Subnet definition embedded in a virtual network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetConfig {
    pub name: String,
    pub address_prefix: String,
    /// Resource ID of the security group applied to the subnet.
    pub security_group_id: Option<String>,
}

/// Virtual network to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualNetworkSpec {
    pub resource_group: String,
    pub name: String,
    pub location: Region,
    pub address_prefix: String,
    pub subnets: Vec<SubnetConfig>,
}

/// A subnet as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    pub id: String,
    pub name: String,
    pub address_prefix: String,
}

/// A virtual network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualNetwork {
    pub id: String,
    pub name: String,
    pub location: String,
    pub address_prefixes: Vec<String>,
    pub subnets: Vec<Subnet>,
}

/// Network interface to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterfaceSpec {
    pub resource_group: String,
    pub name: String,
    pub location: Region,
    pub ip_configuration_name: String,
    pub subnet_id: String,
    pub public_ip_id: Option<String>,
}

/// An IP configuration on a network interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpConfiguration {
    pub name: String,
    pub subnet_id: Option<String>,
    pub public_ip_id: Option<String>,
    pub private_ip_address: Option<String>,
}

/// A network interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInterface {
    pub id: String,
    pub name: String,
    pub location: String,
    pub ip_configurations: Vec<IpConfiguration>,
}

impl NetworkInterface {
    /// Returns the public IP resource ID of the first configuration carrying one.
    pub fn public_ip_id(&self) -> Option<&str> {
        self.ip_configurations
            .iter()
            .find_map(|config| config.public_ip_id.as_deref())
    }
}

// ============================================================================
// Virtual machines
// ============================================================================

/// Administrator credentials for a new VM.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Guest OS settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsProfile {
    pub platform: OsPlatform,
    pub computer_name: String,
    pub credentials: Credentials,
    pub provision_vm_agent: bool,
    pub enable_auto_update: bool,
}

/// Marketplace image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    pub publisher: String,
    pub offer: String,
    pub sku: String,
    pub version: String,
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.publisher, self.offer, self.sku, self.version
        )
    }
}

/// Storage-backed OS disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsDisk {
    pub name: String,
    pub vhd_uri: String,
    pub create_option: DiskCreateOption,
    /// Set when an existing disk is attached.
    pub os_type: Option<OsPlatform>,
}

/// A complete VM definition, submitted whole to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmDefinition {
    pub resource_group: String,
    pub name: String,
    pub location: Region,
    pub size: String,
    pub os_profile: OsProfile,
    /// Absent when an existing disk is attached.
    pub image: Option<ImageReference>,
    pub os_disk: OsDisk,
    pub network_interface_id: String,
}

/// A virtual machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualMachine {
    pub id: String,
    pub name: String,
    pub location: String,
    pub size: Option<String>,
    pub provisioning_state: Option<String>,
    /// Resource IDs of attached network interfaces.
    pub network_interface_ids: Vec<String>,
}

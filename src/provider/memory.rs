//! In-process cloud provider.
//!
//! [`InMemoryProvider`] keeps resources in memory and records every call it
//! receives. It backs the `--simulate` CLI flag and the test suite, where the
//! call log is used to assert ordering and the absence of mutating calls.
//!
//! Names are matched case-insensitively, like ARM does. Child resources
//! require their resource group to exist.

use super::*;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Subscription ID used in generated resource IDs.
pub const SIMULATED_SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000000";

/// Kinds of provider calls, in trait order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallKind {
    ListRegions,
    ListVmSizes,
    ListPublishers,
    GetResourceGroup,
    CreateResourceGroup,
    CreateStorageAccount,
    GetStorageAccount,
    CreatePublicIp,
    GetPublicIp,
    CreateSecurityGroup,
    SubnetConfig,
    CreateVirtualNetwork,
    CreateNetworkInterface,
    GetNetworkInterface,
    ListNetworkInterfaces,
    CreateVm,
    GetVm,
}

impl CallKind {
    /// Returns true for calls that create or change a remote resource.
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            CallKind::CreateResourceGroup
                | CallKind::CreateStorageAccount
                | CallKind::CreatePublicIp
                | CallKind::CreateSecurityGroup
                | CallKind::CreateVirtualNetwork
                | CallKind::CreateNetworkInterface
                | CallKind::CreateVm
        )
    }
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCall {
    pub kind: CallKind,
    /// Name of the resource or region the call addressed.
    pub target: String,
}

type Key = (String, String);

fn key(resource_group: &str, name: &str) -> Key {
    (resource_group.to_lowercase(), name.to_lowercase())
}

#[derive(Default)]
struct State {
    regions: Vec<RegionInfo>,
    vm_sizes: HashMap<String, Vec<VmSize>>,
    publishers: HashMap<String, Vec<String>>,
    resource_groups: BTreeMap<String, ResourceGroup>,
    storage_accounts: BTreeMap<Key, StorageAccount>,
    public_ips: BTreeMap<Key, PublicIp>,
    security_groups: BTreeMap<Key, SecurityGroup>,
    virtual_networks: BTreeMap<Key, VirtualNetwork>,
    network_interfaces: BTreeMap<Key, NetworkInterface>,
    vms: BTreeMap<Key, VirtualMachine>,
    last_definition: Option<VmDefinition>,
    calls: Vec<ProviderCall>,
    failures: HashMap<CallKind, String>,
    next_address: u8,
}

/// An in-memory [`CloudProvider`].
#[derive(Default)]
pub struct InMemoryProvider {
    state: Mutex<State>,
}

impl InMemoryProvider {
    /// Creates a provider with no regions or catalogs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a provider with a small catalog in `uksouth`, `westeurope`
    /// and `eastus`.
    pub fn sample() -> Self {
        let common_sizes = vec![
            VmSize::new("Standard_B1s", 1, 1024, 2),
            VmSize::new("Standard_B2s", 2, 4096, 4),
            VmSize::new("Standard_D2s_v3", 2, 8192, 4),
            VmSize::new("Standard_DS1_v2", 1, 3584, 4),
        ];
        let publishers = [
            "Canonical",
            "MicrosoftSQLServer",
            "MicrosoftWindowsDesktop",
            "MicrosoftWindowsServer",
            "RedHat",
        ];

        let mut uk_sizes = common_sizes.clone();
        uk_sizes.push(VmSize::new("Standard_A1", 1, 1792, 2));

        Self::new()
            .with_region("uksouth", "UK South")
            .with_region("westeurope", "West Europe")
            .with_region("eastus", "East US")
            .with_vm_sizes("uksouth", uk_sizes)
            .with_vm_sizes("westeurope", common_sizes.clone())
            .with_vm_sizes("eastus", common_sizes)
            .with_publishers("uksouth", publishers)
            .with_publishers("westeurope", publishers)
            .with_publishers("eastus", &publishers[..3])
    }

    /// Adds a region.
    pub fn with_region(self, name: &str, display_name: &str) -> Self {
        self.state
            .lock()
            .regions
            .push(RegionInfo::new(name, display_name));
        self
    }

    /// Sets the sizes offered in a region.
    pub fn with_vm_sizes(self, region: &str, sizes: Vec<VmSize>) -> Self {
        self.state.lock().vm_sizes.insert(region.to_string(), sizes);
        self
    }

    /// Sets the image publishers offered in a region.
    pub fn with_publishers<I, S>(self, region: &str, publishers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names = publishers
            .into_iter()
            .map(|p| p.as_ref().to_string())
            .collect();
        self.state
            .lock()
            .publishers
            .insert(region.to_string(), names);
        self
    }

    /// Seeds an existing resource group without recording a call.
    pub fn with_resource_group(self, name: &str, region: &str) -> Self {
        let group = ResourceGroup {
            id: group_id(name),
            name: name.to_string(),
            location: region.to_string(),
        };
        self.state
            .lock()
            .resource_groups
            .insert(name.to_lowercase(), group);
        self
    }

    /// Makes every future call of `kind` fail with an API error.
    pub fn fail_on(&self, kind: CallKind, message: impl Into<String>) {
        self.state.lock().failures.insert(kind, message.into());
    }

    /// Clears the address of a public IP, as if the provider had not assigned one.
    pub fn release_public_ip(&self, resource_group: &str, name: &str) {
        if let Some(ip) = self.state.lock().public_ips.get_mut(&key(resource_group, name)) {
            ip.ip_address = None;
        }
    }

    /// Returns every call received so far.
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.lock().calls.clone()
    }

    /// Returns the kinds of every call received so far.
    pub fn call_kinds(&self) -> Vec<CallKind> {
        self.state.lock().calls.iter().map(|c| c.kind).collect()
    }

    /// Returns the mutating calls received so far.
    pub fn mutating_calls(&self) -> Vec<ProviderCall> {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.kind.is_mutating())
            .cloned()
            .collect()
    }

    /// Number of calls of `kind` received so far.
    pub fn count(&self, kind: CallKind) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.kind == kind)
            .count()
    }

    /// Returns the stored VM, if any.
    pub fn vm(&self, resource_group: &str, name: &str) -> Option<VirtualMachine> {
        self.state
            .lock()
            .vms
            .get(&key(resource_group, name))
            .cloned()
    }

    /// Returns the last definition submitted through `create_vm`.
    pub fn last_vm_definition(&self) -> Option<VmDefinition> {
        self.state.lock().last_definition.clone()
    }

    fn record(&self, state: &mut State, kind: CallKind, target: &str) -> ProviderResult<()> {
        debug!(provider = self.name(), call = ?kind, target, "Provider call");
        state.calls.push(ProviderCall {
            kind,
            target: target.to_string(),
        });
        match state.failures.get(&kind) {
            Some(message) => Err(ProviderError::Api {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

fn group_id(name: &str) -> String {
    format!("/subscriptions/{SIMULATED_SUBSCRIPTION}/resourceGroups/{name}")
}

fn resource_id(resource_group: &str, provider_type: &str, name: &str) -> String {
    format!(
        "{}/providers/{}/{}",
        group_id(resource_group),
        provider_type,
        name
    )
}

fn require_group(state: &State, resource_group: &str) -> ProviderResult<()> {
    if state
        .resource_groups
        .contains_key(&resource_group.to_lowercase())
    {
        Ok(())
    } else {
        Err(ProviderError::NotFound(format!(
            "Resource group '{resource_group}' could not be found"
        )))
    }
}

fn find<T: Clone>(map: &BTreeMap<Key, T>, resource_group: &str, name: &str, kind: &str) -> ProviderResult<T> {
    map.get(&key(resource_group, name)).cloned().ok_or_else(|| {
        ProviderError::NotFound(format!(
            "{kind} '{name}' was not found in resource group '{resource_group}'"
        ))
    })
}

#[async_trait]
impl CloudProvider for InMemoryProvider {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list_regions(&self) -> ProviderResult<Vec<RegionInfo>> {
        let mut state = self.state.lock();
        self.record(&mut state, CallKind::ListRegions, "")?;
        Ok(state.regions.clone())
    }

    async fn list_vm_sizes(&self, region: &Region) -> ProviderResult<Vec<VmSize>> {
        let mut state = self.state.lock();
        self.record(&mut state, CallKind::ListVmSizes, region.as_str())?;
        Ok(state
            .vm_sizes
            .get(region.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn list_publishers(&self, region: &Region) -> ProviderResult<Vec<ImagePublisher>> {
        let mut state = self.state.lock();
        self.record(&mut state, CallKind::ListPublishers, region.as_str())?;
        Ok(state
            .publishers
            .get(region.as_str())
            .map(|names| {
                names
                    .iter()
                    .map(|name| ImagePublisher {
                        name: name.clone(),
                        location: region.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_resource_group(&self, name: &str) -> ProviderResult<Option<ResourceGroup>> {
        let mut state = self.state.lock();
        self.record(&mut state, CallKind::GetResourceGroup, name)?;
        Ok(state.resource_groups.get(&name.to_lowercase()).cloned())
    }

    async fn create_resource_group(
        &self,
        name: &str,
        region: &Region,
    ) -> ProviderResult<ResourceGroup> {
        let mut state = self.state.lock();
        self.record(&mut state, CallKind::CreateResourceGroup, name)?;
        let group = state
            .resource_groups
            .entry(name.to_lowercase())
            .or_insert_with(|| ResourceGroup {
                id: group_id(name),
                name: name.to_string(),
                location: region.to_string(),
            });
        Ok(group.clone())
    }

    async fn create_storage_account(
        &self,
        spec: &StorageAccountSpec,
    ) -> ProviderResult<StorageAccount> {
        let mut state = self.state.lock();
        self.record(&mut state, CallKind::CreateStorageAccount, &spec.name)?;
        require_group(&state, &spec.resource_group)?;
        let account = StorageAccount {
            id: resource_id(
                &spec.resource_group,
                "Microsoft.Storage/storageAccounts",
                &spec.name,
            ),
            name: spec.name.clone(),
            resource_group: spec.resource_group.clone(),
            location: spec.location.to_string(),
            sku: spec.sku.to_string(),
            blob_endpoint: Some(format!("https://{}.blob.core.windows.net/", spec.name)),
        };
        state
            .storage_accounts
            .insert(key(&spec.resource_group, &spec.name), account.clone());
        Ok(account)
    }

    async fn get_storage_account(
        &self,
        resource_group: &str,
        name: &str,
    ) -> ProviderResult<StorageAccount> {
        let mut state = self.state.lock();
        self.record(&mut state, CallKind::GetStorageAccount, name)?;
        find(&state.storage_accounts, resource_group, name, "Storage account")
    }

    async fn create_public_ip(&self, spec: &PublicIpSpec) -> ProviderResult<PublicIp> {
        let mut state = self.state.lock();
        self.record(&mut state, CallKind::CreatePublicIp, &spec.name)?;
        require_group(&state, &spec.resource_group)?;
        let k = key(&spec.resource_group, &spec.name);
        if let Some(existing) = state.public_ips.get(&k) {
            return Ok(existing.clone());
        }
        state.next_address = state.next_address.wrapping_add(1);
        let ip = PublicIp {
            id: resource_id(
                &spec.resource_group,
                "Microsoft.Network/publicIPAddresses",
                &spec.name,
            ),
            name: spec.name.clone(),
            location: spec.location.to_string(),
            allocation: spec.allocation,
            ip_address: Some(format!("20.0.0.{}", state.next_address)),
        };
        state.public_ips.insert(k, ip.clone());
        Ok(ip)
    }

    async fn get_public_ip(&self, resource_group: &str, name: &str) -> ProviderResult<PublicIp> {
        let mut state = self.state.lock();
        self.record(&mut state, CallKind::GetPublicIp, name)?;
        find(&state.public_ips, resource_group, name, "Public IP")
    }

    async fn create_security_group(
        &self,
        spec: &SecurityGroupSpec,
    ) -> ProviderResult<SecurityGroup> {
        let mut state = self.state.lock();
        self.record(&mut state, CallKind::CreateSecurityGroup, &spec.name)?;
        require_group(&state, &spec.resource_group)?;
        let group = SecurityGroup {
            id: resource_id(
                &spec.resource_group,
                "Microsoft.Network/networkSecurityGroups",
                &spec.name,
            ),
            name: spec.name.clone(),
            location: spec.location.to_string(),
            rules: spec.rules.clone(),
        };
        state
            .security_groups
            .insert(key(&spec.resource_group, &spec.name), group.clone());
        Ok(group)
    }

    fn subnet_config(
        &self,
        name: &str,
        address_prefix: &str,
        security_group: &SecurityGroup,
    ) -> ProviderResult<SubnetConfig> {
        let mut state = self.state.lock();
        self.record(&mut state, CallKind::SubnetConfig, name)?;
        Ok(SubnetConfig {
            name: name.to_string(),
            address_prefix: address_prefix.to_string(),
            security_group_id: Some(security_group.id.clone()),
        })
    }

    async fn create_virtual_network(
        &self,
        spec: &VirtualNetworkSpec,
    ) -> ProviderResult<VirtualNetwork> {
        let mut state = self.state.lock();
        self.record(&mut state, CallKind::CreateVirtualNetwork, &spec.name)?;
        require_group(&state, &spec.resource_group)?;
        let id = resource_id(
            &spec.resource_group,
            "Microsoft.Network/virtualNetworks",
            &spec.name,
        );
        let network = VirtualNetwork {
            subnets: spec
                .subnets
                .iter()
                .map(|subnet| Subnet {
                    id: format!("{}/subnets/{}", id, subnet.name),
                    name: subnet.name.clone(),
                    address_prefix: subnet.address_prefix.clone(),
                })
                .collect(),
            id,
            name: spec.name.clone(),
            location: spec.location.to_string(),
            address_prefixes: vec![spec.address_prefix.clone()],
        };
        state
            .virtual_networks
            .insert(key(&spec.resource_group, &spec.name), network.clone());
        Ok(network)
    }

    async fn create_network_interface(
        &self,
        spec: &NetworkInterfaceSpec,
    ) -> ProviderResult<NetworkInterface> {
        let mut state = self.state.lock();
        self.record(&mut state, CallKind::CreateNetworkInterface, &spec.name)?;
        require_group(&state, &spec.resource_group)?;
        let nic = NetworkInterface {
            id: resource_id(
                &spec.resource_group,
                "Microsoft.Network/networkInterfaces",
                &spec.name,
            ),
            name: spec.name.clone(),
            location: spec.location.to_string(),
            ip_configurations: vec![IpConfiguration {
                name: spec.ip_configuration_name.clone(),
                subnet_id: Some(spec.subnet_id.clone()),
                public_ip_id: spec.public_ip_id.clone(),
                private_ip_address: Some("10.0.0.4".to_string()),
            }],
        };
        state
            .network_interfaces
            .insert(key(&spec.resource_group, &spec.name), nic.clone());
        Ok(nic)
    }

    async fn get_network_interface(
        &self,
        resource_group: &str,
        name: &str,
    ) -> ProviderResult<NetworkInterface> {
        let mut state = self.state.lock();
        self.record(&mut state, CallKind::GetNetworkInterface, name)?;
        find(&state.network_interfaces, resource_group, name, "Network interface")
    }

    async fn list_network_interfaces(
        &self,
        resource_group: &str,
    ) -> ProviderResult<Vec<NetworkInterface>> {
        let mut state = self.state.lock();
        self.record(&mut state, CallKind::ListNetworkInterfaces, resource_group)?;
        require_group(&state, resource_group)?;
        let group = resource_group.to_lowercase();
        Ok(state
            .network_interfaces
            .iter()
            .filter(|((rg, _), _)| *rg == group)
            .map(|(_, nic)| nic.clone())
            .collect())
    }

    async fn create_vm(&self, definition: &VmDefinition) -> ProviderResult<VirtualMachine> {
        let mut state = self.state.lock();
        self.record(&mut state, CallKind::CreateVm, &definition.name)?;
        require_group(&state, &definition.resource_group)?;
        let vm = VirtualMachine {
            id: resource_id(
                &definition.resource_group,
                "Microsoft.Compute/virtualMachines",
                &definition.name,
            ),
            name: definition.name.clone(),
            location: definition.location.to_string(),
            size: Some(definition.size.clone()),
            provisioning_state: Some("Succeeded".to_string()),
            network_interface_ids: vec![definition.network_interface_id.clone()],
        };
        state
            .vms
            .insert(key(&definition.resource_group, &definition.name), vm.clone());
        state.last_definition = Some(definition.clone());
        Ok(vm)
    }

    async fn get_vm(&self, resource_group: &str, name: &str) -> ProviderResult<VirtualMachine> {
        let mut state = self.state.lock();
        self.record(&mut state, CallKind::GetVm, name)?;
        find(&state.vms, resource_group, name, "Virtual machine")
    }
}

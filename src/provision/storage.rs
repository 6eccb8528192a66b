//! Storage account provisioner.

use crate::error::Result;
use crate::provider::{CloudProvider, Region, ResourceGroup, StorageAccount, StorageAccountSpec, StorageSku};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::location::resolve_region;
use super::naming::{validate_resource_group_name, validate_storage_account_name};
use super::resource_group::{ensure_resource_group, Ensured};

/// A storage account to provision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageRequest {
    pub resource_group: String,
    pub name: String,
    pub sku: StorageSku,
    /// Region as given by the caller; resolved before use.
    pub location: String,
}

/// Result of a storage provisioning run.
#[derive(Debug, Clone, Serialize)]
pub struct StorageOutcome {
    pub resource_group: Ensured<ResourceGroup>,
    pub account: StorageAccount,
}

/// Validates the request, resolves its region, ensures the resource group
/// and creates the account.
///
/// Running it again with the same request succeeds.
pub async fn provision_storage(
    provider: &dyn CloudProvider,
    request: &StorageRequest,
) -> Result<StorageOutcome> {
    validate_resource_group_name(&request.resource_group)?;
    validate_storage_account_name(&request.name)?;
    let region = resolve_region(provider, &request.location).await?;

    provision_storage_in(
        provider,
        &StorageAccountSpec {
            resource_group: request.resource_group.clone(),
            name: request.name.clone(),
            sku: request.sku,
            location: region,
        },
    )
    .await
}

/// Ensures the resource group and creates the account in an already
/// resolved region.
pub async fn provision_storage_in(
    provider: &dyn CloudProvider,
    spec: &StorageAccountSpec,
) -> Result<StorageOutcome> {
    validate_storage_account_name(&spec.name)?;
    let resource_group = ensure_resource_group(provider, &spec.resource_group, &spec.location).await?;

    let account = provider.create_storage_account(spec).await?;
    info!(
        storage_account = %account.name,
        resource_group = %spec.resource_group,
        sku = %spec.sku,
        "Storage account ready"
    );

    Ok(StorageOutcome {
        resource_group,
        account,
    })
}

/// Builds the spec for an account in a resolved region.
pub fn storage_spec(resource_group: &str, name: &str, sku: StorageSku, region: &Region) -> StorageAccountSpec {
    StorageAccountSpec {
        resource_group: resource_group.to_string(),
        name: name.to_string(),
        sku,
        location: region.clone(),
    }
}

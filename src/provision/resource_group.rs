//! Resource group ensurer.

use crate::error::Result;
use crate::provider::{CloudProvider, Region, ResourceGroup};
use serde::Serialize;
use tracing::{error, info, warn};

use super::naming::validate_resource_group_name;

/// A resource that is known to exist, and whether this call created it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ensured<T> {
    pub resource: T,
    pub created: bool,
}

/// Ensures a resource group named `name` exists, creating it in `region` if
/// it does not.
///
/// An existing group is left untouched, even when it lives in another
/// region. A failed creation is returned as an error, so `Ok` always means
/// the group exists.
pub async fn ensure_resource_group(
    provider: &dyn CloudProvider,
    name: &str,
    region: &Region,
) -> Result<Ensured<ResourceGroup>> {
    validate_resource_group_name(name)?;

    if let Some(existing) = provider.get_resource_group(name).await? {
        if !existing.location.eq_ignore_ascii_case(region.as_str()) {
            warn!(
                resource_group = %name,
                existing_location = %existing.location,
                requested_location = %region,
                "Resource group already exists in a different region"
            );
        }
        info!(resource_group = %name, "Resource group already exists");
        return Ok(Ensured {
            resource: existing,
            created: false,
        });
    }

    match provider.create_resource_group(name, region).await {
        Ok(group) => {
            info!(resource_group = %name, region = %region, "Created resource group");
            Ok(Ensured {
                resource: group,
                created: true,
            })
        }
        Err(e) => {
            error!(resource_group = %name, region = %region, error = %e, "Failed to create resource group");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::provider::{CallKind, InMemoryProvider};

    #[tokio::test]
    async fn test_creates_missing_group() {
        let provider = InMemoryProvider::sample();
        let ensured = ensure_resource_group(&provider, "Test", &Region::new("uksouth"))
            .await
            .unwrap();
        assert!(ensured.created);
        assert_eq!(ensured.resource.location, "uksouth");
        assert_eq!(
            provider.call_kinds(),
            vec![CallKind::GetResourceGroup, CallKind::CreateResourceGroup]
        );
    }

    #[tokio::test]
    async fn test_existing_group_is_not_recreated() {
        let provider = InMemoryProvider::sample().with_resource_group("Test", "westeurope");
        let ensured = ensure_resource_group(&provider, "test", &Region::new("uksouth"))
            .await
            .unwrap();
        assert!(!ensured.created);
        assert_eq!(ensured.resource.location, "westeurope");
        assert_eq!(provider.count(CallKind::CreateResourceGroup), 0);
    }

    #[tokio::test]
    async fn test_creation_failure_is_fatal() {
        let provider = InMemoryProvider::sample();
        provider.fail_on(CallKind::CreateResourceGroup, "quota exceeded");
        let err = ensure_resource_group(&provider, "Test", &Region::new("uksouth"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Provider(_)));
    }

    #[tokio::test]
    async fn test_invalid_name_makes_no_calls() {
        let provider = InMemoryProvider::sample();
        let err = ensure_resource_group(&provider, "bad name", &Region::new("uksouth"))
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(provider.calls().is_empty());
    }
}

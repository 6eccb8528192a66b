//! Read-only catalog modules.
//!
//! These never mutate anything, so check mode and normal mode behave the
//! same and always report `ok`.
//!
//! ## AzureLocationInfoModule
//!
//! Lists the regions the subscription can deploy to. Takes no parameters.
//!
//! ## AzureVmSizeInfoModule
//!
//! | Parameter | Required | Description |
//! |-----------|----------|-------------|
//! | `location` | Yes | Region name or display name |
//!
//! ## AzureImagePublisherInfoModule
//!
//! | Parameter | Required | Description |
//! |-----------|----------|-------------|
//! | `location` | Yes | Region name or display name |
//! | `filter` | No | Case-insensitive substring, `*` ignored (default: `*`) |

use crate::modules::{Module, ModuleContext, ModuleOutput, ModuleParams, ModuleResult, ParamExt};
use crate::provision::{find_publishers, list_vm_sizes, RegionSet};
use async_trait::async_trait;

use super::location_param;

pub struct AzureLocationInfoModule;

#[async_trait]
impl Module for AzureLocationInfoModule {
    fn name(&self) -> &'static str {
        "azure_location_info"
    }

    fn description(&self) -> &'static str {
        "List the Azure regions available to the subscription"
    }

    async fn execute(
        &self,
        _params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let regions = RegionSet::fetch(context.provider()).await?;
        ModuleOutput::ok(format!("Found {} regions", regions.regions().len()))
            .with_value("locations", &regions.regions())
    }
}

pub struct AzureVmSizeInfoModule;

#[async_trait]
impl Module for AzureVmSizeInfoModule {
    fn name(&self) -> &'static str {
        "azure_vm_size_info"
    }

    fn description(&self) -> &'static str {
        "List the VM sizes offered in a region"
    }

    fn required_params(&self) -> &[&'static str] {
        &["location"]
    }

    async fn execute(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let region = location_param(context.provider(), params).await?;
        let sizes = list_vm_sizes(context.provider(), &region).await?;
        ModuleOutput::ok(format!("Found {} VM sizes in {}", sizes.len(), region))
            .with_value("location", &region)?
            .with_value("vm_sizes", &sizes)
    }
}

pub struct AzureImagePublisherInfoModule;

#[async_trait]
impl Module for AzureImagePublisherInfoModule {
    fn name(&self) -> &'static str {
        "azure_image_publisher_info"
    }

    fn description(&self) -> &'static str {
        "Find VM image publishers in a region"
    }

    fn required_params(&self) -> &[&'static str] {
        &["location"]
    }

    async fn execute(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let region = location_param(context.provider(), params).await?;
        let filter = params.get_string("filter")?.unwrap_or_else(|| "*".to_string());
        let publishers = find_publishers(context.provider(), &region, &filter).await?;
        ModuleOutput::ok(format!(
            "Found {} publishers matching '{}' in {}",
            publishers.len(),
            filter,
            region
        ))
        .with_value("location", &region)?
        .with_value("publishers", &publishers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::ModuleError;
    use crate::provider::InMemoryProvider;
    use serde_json::json;
    use std::sync::Arc;

    fn context() -> ModuleContext {
        ModuleContext::new(Arc::new(InMemoryProvider::sample()))
    }

    fn params(pairs: &[(&str, serde_json::Value)]) -> ModuleParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_location_info() {
        let output = AzureLocationInfoModule
            .execute(&ModuleParams::new(), &context())
            .await
            .unwrap();
        assert!(!output.changed);
        let names: Vec<&str> = output.data["locations"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["eastus", "uksouth", "westeurope"]);
    }

    #[tokio::test]
    async fn test_size_info_accepts_display_name() {
        let output = AzureVmSizeInfoModule
            .execute(&params(&[("location", json!("UK South"))]), &context())
            .await
            .unwrap();
        assert_eq!(output.data["location"], json!("uksouth"));
        assert_eq!(output.data["vm_sizes"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_publisher_info_filter() {
        let output = AzureImagePublisherInfoModule
            .execute(
                &params(&[("location", json!("eastus")), ("filter", json!("*windows*"))]),
                &context(),
            )
            .await
            .unwrap();
        let publishers = output.data["publishers"].as_array().unwrap();
        assert_eq!(publishers.len(), 1);
        assert_eq!(publishers[0]["name"], json!("MicrosoftWindowsDesktop"));
    }

    #[tokio::test]
    async fn test_unknown_location_is_rejected() {
        let err = AzureVmSizeInfoModule
            .execute(&params(&[("location", json!("atlantis"))]), &context())
            .await
            .unwrap_err();
        assert!(matches!(err, ModuleError::Provisioning(ref e) if e.is_validation()));
    }
}

//! ## AzureStorageAccountModule
//!
//! Ensures the resource group, then creates the storage account. Creation is
//! create-or-update on the provider side, so repeating a run succeeds.
//!
//! | Parameter | Required | Description |
//! |-----------|----------|-------------|
//! | `resource_group` | Yes | Resource group name |
//! | `name` | Yes | Account name, 3-24 lowercase letters or digits |
//! | `sku` | Yes | Premium_LRS, Standard_GRS, Standard_LRS, Standard_RAGRS or Standard_ZRS |
//! | `location` | Yes | Region name or display name |

use crate::modules::{
    Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleResult, ParamExt,
};
use crate::provider::StorageSku;
use crate::provision::naming::{validate_resource_group_name, validate_storage_account_name};
use crate::provision::{provision_storage, StorageRequest};
use async_trait::async_trait;

use super::{location_param, would_create};

pub struct AzureStorageAccountModule;

impl AzureStorageAccountModule {
    fn request(params: &ModuleParams) -> ModuleResult<StorageRequest> {
        Ok(StorageRequest {
            resource_group: params.get_string_required("resource_group")?,
            name: params.get_string_required("name")?,
            sku: params
                .get_parsed::<StorageSku>("sku")?
                .ok_or_else(|| ModuleError::MissingParameter("sku".to_string()))?,
            location: params.get_string_required("location")?,
        })
    }
}

#[async_trait]
impl Module for AzureStorageAccountModule {
    fn name(&self) -> &'static str {
        "azure_storage_account"
    }

    fn description(&self) -> &'static str {
        "Create an Azure storage account, ensuring its resource group"
    }

    fn required_params(&self) -> &[&'static str] {
        &["resource_group", "name", "sku", "location"]
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        let request = Self::request(params)?;
        validate_resource_group_name(&request.resource_group)?;
        validate_storage_account_name(&request.name)?;
        Ok(())
    }

    async fn execute(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let request = Self::request(params)?;

        if context.check_mode {
            let region = location_param(context.provider(), params).await?;
            return Ok(
                would_create("storage account", &request.name, &request.resource_group)
                    .with_data("location", serde_json::json!(region.as_str()))
                    .with_data("sku", serde_json::json!(request.sku.as_str())),
            );
        }

        let outcome = provision_storage(context.provider(), &request).await?;
        ModuleOutput::changed(format!(
            "Storage account '{}' ready in resource group '{}'",
            outcome.account.name, request.resource_group
        ))
        .with_data(
            "resource_group_created",
            serde_json::json!(outcome.resource_group.created),
        )
        .with_value("storage_account", &outcome.account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::cloud::azure::test_support::{context, params};
    use crate::provider::{CallKind, InMemoryProvider};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn storage_params() -> ModuleParams {
        params(&[
            ("resource_group", json!("Test")),
            ("name", json!("storageacc1")),
            ("sku", json!("Standard_GRS")),
            ("location", json!("uksouth")),
        ])
    }

    #[tokio::test]
    async fn test_creates_group_then_account() {
        let provider = Arc::new(InMemoryProvider::sample());
        let output = AzureStorageAccountModule
            .execute(&storage_params(), &context(&provider))
            .await
            .unwrap();

        assert!(output.changed);
        assert_eq!(output.data["resource_group_created"], json!(true));
        assert_eq!(
            output.data["storage_account"]["blob_endpoint"],
            json!("https://storageacc1.blob.core.windows.net/")
        );
        assert_eq!(
            provider
                .mutating_calls()
                .iter()
                .map(|c| c.kind)
                .collect::<Vec<_>>(),
            vec![CallKind::CreateResourceGroup, CallKind::CreateStorageAccount]
        );
    }

    #[tokio::test]
    async fn test_check_mode() {
        let provider = Arc::new(InMemoryProvider::sample());
        let output = AzureStorageAccountModule
            .execute(&storage_params(), &context(&provider).with_check_mode(true))
            .await
            .unwrap();
        assert_eq!(output.data["action"], json!("create"));
        assert_eq!(output.data["sku"], json!("Standard_GRS"));
        assert!(provider.mutating_calls().is_empty());
    }

    #[test]
    fn test_validation() {
        let mut bad_name = storage_params();
        bad_name.insert("name".into(), json!("Storage_Acc"));
        assert!(AzureStorageAccountModule.validate_params(&bad_name).is_err());

        let mut bad_sku = storage_params();
        bad_sku.insert("sku".into(), json!("Gold"));
        assert!(AzureStorageAccountModule.validate_params(&bad_sku).is_err());

        assert!(AzureStorageAccountModule
            .validate_params(&storage_params())
            .is_ok());
    }
}

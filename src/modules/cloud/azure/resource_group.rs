//! ## AzureResourceGroupModule
//!
//! Ensures a resource group exists. An existing group is reported as `ok`
//! and left untouched.
//!
//! | Parameter | Required | Description |
//! |-----------|----------|-------------|
//! | `name` | Yes | Resource group name |
//! | `location` | Yes | Region used when the group has to be created |

use crate::error::Error;
use crate::modules::{
    Module, ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleResult, ParamExt,
};
use crate::provision::ensure_resource_group;
use crate::provision::naming::validate_resource_group_name;
use async_trait::async_trait;

use super::location_param;

pub struct AzureResourceGroupModule;

#[async_trait]
impl Module for AzureResourceGroupModule {
    fn name(&self) -> &'static str {
        "azure_resource_group"
    }

    fn description(&self) -> &'static str {
        "Ensure an Azure resource group exists"
    }

    fn required_params(&self) -> &[&'static str] {
        &["name", "location"]
    }

    fn validate_params(&self, params: &ModuleParams) -> ModuleResult<()> {
        validate_resource_group_name(&params.get_string_required("name")?)
            .map_err(ModuleError::from)
    }

    async fn execute(
        &self,
        params: &ModuleParams,
        context: &ModuleContext,
    ) -> ModuleResult<ModuleOutput> {
        let name = params.get_string_required("name")?;
        let region = location_param(context.provider(), params).await?;

        if context.check_mode {
            let existing = context
                .provider()
                .get_resource_group(&name)
                .await
                .map_err(Error::from)?;
            return match existing {
                Some(group) => {
                    ModuleOutput::ok(format!("Resource group '{}' already exists", name))
                        .with_value("resource_group", &group)
                }
                None => Ok(ModuleOutput::changed(format!(
                    "Would create resource group '{}' in {}",
                    name, region
                ))
                .with_data("action", serde_json::json!("create"))),
            };
        }

        let ensured = ensure_resource_group(context.provider(), &name, &region).await?;
        let output = if ensured.created {
            ModuleOutput::changed(format!("Created resource group '{}' in {}", name, region))
        } else {
            ModuleOutput::ok(format!("Resource group '{}' already exists", name))
        };
        output.with_value("resource_group", &ensured.resource)
    }
}

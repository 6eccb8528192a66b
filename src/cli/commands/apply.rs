//! Apply command - run a deployment file
//!
//! This module implements the `apply` subcommand. Every task is validated
//! before the first one runs; the run stops at the first failing task.

use super::CommandContext;
use crate::config::Defaults;
use anyhow::Result;
use azprov::deployment::{Deployment, TaskEvent};
use azprov::modules::ModuleRegistry;
use clap::Parser;
use indicatif::ProgressBar;
use std::path::PathBuf;

/// Arguments for the apply command
#[derive(Parser, Debug, Clone)]
pub struct ApplyArgs {
    /// Path to the deployment file
    #[arg(required = true)]
    pub deployment: PathBuf,

    /// Only parse and validate the deployment
    #[arg(long)]
    pub syntax_check: bool,
}

impl ApplyArgs {
    /// Execute the apply command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let mut deployment = Deployment::from_file(&self.deployment).await?;
        let registry = ModuleRegistry::with_builtins();
        fill_defaults(&mut deployment, &ctx.config.defaults, &registry);

        if self.syntax_check {
            deployment.validate(&registry)?;
            if ctx.output.is_json() {
                ctx.output.json(&serde_json::json!({
                    "deployment": self.deployment,
                    "tasks": deployment.tasks,
                    "valid": true,
                }))?;
            } else {
                ctx.output.success(&format!(
                    "{}: {} task(s), syntax OK",
                    self.deployment.display(),
                    deployment.task_count()
                ));
            }
            return Ok(0);
        }

        let context = ctx.module_context().await?;
        if ctx.check_mode {
            ctx.output
                .warning("Running in check mode - no changes will be made");
        }
        ctx.output
            .section(&format!("DEPLOYMENT [{}]", self.deployment.display()));

        let output = &ctx.output;
        let mut spinner: Option<ProgressBar> = None;
        let (mut ok, mut changed, mut failed) = (0usize, 0usize, 0usize);

        let result = deployment
            .run(&registry, &context, |event| match event {
                TaskEvent::Started { index, total, task } => {
                    output.task_header(task.display_name());
                    spinner = output.create_spinner(&format!(
                        "[{}/{}] {}",
                        index + 1,
                        total,
                        task.module
                    ));
                }
                TaskEvent::Finished { output: result, .. } => {
                    if let Some(sp) = spinner.take() {
                        sp.finish_and_clear();
                    }
                    if result.changed {
                        changed += 1;
                    } else {
                        ok += 1;
                    }
                    output.module_result(result);
                }
                TaskEvent::Failed { .. } => {
                    if let Some(sp) = spinner.take() {
                        sp.finish_and_clear();
                    }
                    failed += 1;
                }
            })
            .await;

        match result {
            Ok(report) => {
                if ctx.output.is_json() {
                    ctx.output.json(&report)?;
                } else {
                    ctx.output.recap(report.ok(), report.changed(), failed);
                }
                Ok(0)
            }
            Err(e) => {
                if failed > 0 {
                    ctx.output.recap(ok, changed, failed);
                }
                Err(e.into())
            }
        }
    }
}

/// Fills parameters a task leaves out from the configured defaults.
///
/// `location` and `resource_group` are filled for modules that require them;
/// `admin_username` only for `azure_vm`.
fn fill_defaults(deployment: &mut Deployment, defaults: &Defaults, registry: &ModuleRegistry) {
    let candidates = [
        ("location", &defaults.location),
        ("resource_group", &defaults.resource_group),
    ];

    for task in &mut deployment.tasks {
        let Some(module) = registry.get(&task.module) else {
            continue;
        };
        for (key, value) in &candidates {
            if let Some(value) = value {
                if module.required_params().contains(key) && !task.params.contains_key(*key) {
                    task.params
                        .insert((*key).to_string(), serde_json::json!(value));
                }
            }
        }
        if task.module == "azure_vm" && !task.params.contains_key("admin_username") {
            if let Some(username) = &defaults.admin_username {
                task.params
                    .insert("admin_username".to_string(), serde_json::json!(username));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_only_missing_required_params() {
        let yaml = r#"
- azure_resource_group:
    name: Test
- azure_storage_account:
    resource_group: Other
    name: storageacc1
    sku: Standard_GRS
    location: westeurope
- azure_rdp:
    name: vm1
"#;
        let mut deployment = Deployment::from_yaml(yaml, None).unwrap();
        let defaults = Defaults {
            location: Some("uksouth".into()),
            resource_group: Some("Test".into()),
            admin_username: Some("azureuser".into()),
        };
        fill_defaults(&mut deployment, &defaults, &ModuleRegistry::with_builtins());

        let tasks = &deployment.tasks;
        assert_eq!(tasks[0].params["location"], "uksouth");
        assert!(!tasks[0].params.contains_key("resource_group"));
        assert_eq!(tasks[1].params["location"], "westeurope");
        assert_eq!(tasks[1].params["resource_group"], "Other");
        assert_eq!(tasks[2].params["resource_group"], "Test");
        assert!(!tasks[2].params.contains_key("location"));
        assert!(!tasks[2].params.contains_key("admin_username"));
    }
}

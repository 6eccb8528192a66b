//! Deployment files.
//!
//! A deployment is a YAML list of tasks. Each task has an optional `name`
//! and exactly one module key whose value is the module's parameter map:
//!
//! ```yaml
//! - name: Storage for OS disks
//!   azure_storage_account:
//!     resource_group: Test
//!     name: storageacc1
//!     sku: Standard_GRS
//!     location: uksouth
//! ```
//!
//! Tasks run strictly in order and the first failure stops the run.

use indexmap::IndexMap;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::error::{Error, Result};
use crate::modules::{ModuleContext, ModuleError, ModuleOutput, ModuleParams, ModuleRegistry};

/// One module invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub module: String,
    pub params: ModuleParams,
}

impl Task {
    /// The task's name, or its module name when unnamed.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.module)
    }
}

/// A parsed deployment file.
#[derive(Debug, Clone, Default)]
pub struct Deployment {
    pub tasks: Vec<Task>,
    /// Path to the file (set when loaded from disk)
    pub source_path: Option<PathBuf>,
}

/// Progress notifications emitted while a deployment runs.
#[derive(Debug)]
pub enum TaskEvent<'a> {
    Started {
        index: usize,
        total: usize,
        task: &'a Task,
    },
    Finished {
        index: usize,
        task: &'a Task,
        output: &'a ModuleOutput,
    },
    Failed {
        index: usize,
        task: &'a Task,
        error: &'a ModuleError,
    },
}

/// Outcome of one completed task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskReport {
    pub task: String,
    pub module: String,
    pub output: ModuleOutput,
}

/// Outcome of a completed deployment.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeploymentReport {
    pub check_mode: bool,
    pub tasks: Vec<TaskReport>,
}

impl DeploymentReport {
    pub fn changed(&self) -> usize {
        self.tasks.iter().filter(|t| t.output.changed).count()
    }

    pub fn ok(&self) -> usize {
        self.tasks.len() - self.changed()
    }
}

impl Deployment {
    /// Loads a deployment from a YAML file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::DeploymentParse {
                path: path.to_path_buf(),
                message: format!("Failed to read file: {}", e),
            })?;

        Self::from_yaml(&content, Some(path.to_path_buf()))
    }

    /// Parses a deployment from a YAML string.
    pub fn from_yaml(yaml: &str, source_path: Option<PathBuf>) -> Result<Self> {
        let path = source_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("<string>"));
        let parse_error = |message: String| Error::DeploymentParse {
            path: path.clone(),
            message,
        };

        let raw: Option<Vec<IndexMap<String, serde_yaml::Value>>> =
            serde_yaml::from_str(yaml).map_err(|e| parse_error(e.to_string()))?;

        let mut tasks = Vec::new();
        for (idx, mut entry) in raw.unwrap_or_default().into_iter().enumerate() {
            let position = idx + 1;
            let name = match entry.shift_remove("name") {
                None | Some(serde_yaml::Value::Null) => None,
                Some(serde_yaml::Value::String(name)) => Some(name),
                Some(_) => {
                    return Err(parse_error(format!(
                        "task {}: 'name' must be a string",
                        position
                    )))
                }
            };

            if entry.len() != 1 {
                let keys: Vec<&str> = entry.keys().map(String::as_str).collect();
                return Err(parse_error(format!(
                    "task {} must name exactly one module, found [{}]",
                    position,
                    keys.join(", ")
                )));
            }

            let Some((module, value)) = entry.into_iter().next() else {
                continue;
            };
            let params: ModuleParams = match value {
                serde_yaml::Value::Null => ModuleParams::new(),
                value @ serde_yaml::Value::Mapping(_) => serde_json::to_value(value)
                    .and_then(serde_json::from_value)
                    .map_err(|e| {
                        parse_error(format!("task {} ({}): {}", position, module, e))
                    })?,
                _ => {
                    return Err(parse_error(format!(
                        "task {} ({}): parameters must be a mapping",
                        position, module
                    )))
                }
            };

            tasks.push(Task {
                name,
                module,
                params,
            });
        }

        Ok(Self { tasks, source_path })
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Checks every task against the registry before anything runs.
    ///
    /// Unknown modules are reported as parse errors; parameter problems
    /// carry the module's own exit code.
    pub fn validate(&self, registry: &ModuleRegistry) -> Result<()> {
        for task in &self.tasks {
            match registry.validate(&task.module, &task.params) {
                Ok(_) => {}
                Err(ModuleError::NotFound(module)) => {
                    return Err(Error::DeploymentParse {
                        path: self
                            .source_path
                            .clone()
                            .unwrap_or_else(|| PathBuf::from("<string>")),
                        message: format!(
                            "task '{}' uses unknown module '{}'",
                            task.display_name(),
                            module
                        ),
                    })
                }
                Err(e) => return Err(task_failed(task, &e)),
            }
        }
        Ok(())
    }

    /// Runs every task in order, stopping at the first failure.
    pub async fn run<F>(
        &self,
        registry: &ModuleRegistry,
        context: &ModuleContext,
        mut on_event: F,
    ) -> Result<DeploymentReport>
    where
        F: FnMut(TaskEvent<'_>),
    {
        self.validate(registry)?;

        let total = self.tasks.len();
        let mut report = DeploymentReport {
            check_mode: context.check_mode,
            tasks: Vec::with_capacity(total),
        };

        for (index, task) in self.tasks.iter().enumerate() {
            on_event(TaskEvent::Started { index, total, task });
            info!(task = %task.display_name(), module = %task.module, "Running task");

            match registry.execute(&task.module, &task.params, context).await {
                Ok(output) => {
                    on_event(TaskEvent::Finished {
                        index,
                        task,
                        output: &output,
                    });
                    report.tasks.push(TaskReport {
                        task: task.display_name().to_string(),
                        module: task.module.clone(),
                        output,
                    });
                }
                Err(e) => {
                    error!(task = %task.display_name(), error = %e, "Task failed");
                    on_event(TaskEvent::Failed {
                        index,
                        task,
                        error: &e,
                    });
                    return Err(task_failed(task, &e));
                }
            }
        }

        info!(
            tasks = total,
            changed = report.changed(),
            check_mode = context.check_mode,
            "Deployment finished"
        );
        Ok(report)
    }
}

fn task_failed(task: &Task, error: &ModuleError) -> Error {
    Error::TaskFailed {
        task: task.display_name().to_string(),
        message: error.to_string(),
        exit_code: error.exit_code(),
    }
}

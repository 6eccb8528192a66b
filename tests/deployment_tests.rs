//! Integration tests for deployment files.

mod common;

use azprov::deployment::{Deployment, TaskEvent};
use azprov::error::Error;
use azprov::modules::ModuleRegistry;
use azprov::provider::CallKind;
use common::*;
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_full_deployment_runs_in_order() {
    let provider = provider();
    let (context, _) = module_context(&provider, false);
    let registry = ModuleRegistry::with_builtins();
    let deployment = Deployment::from_yaml(FULL_DEPLOYMENT, None).unwrap();

    let mut started = Vec::new();
    let report = deployment
        .run(&registry, &context, |event| {
            if let TaskEvent::Started { task, total, .. } = event {
                assert_eq!(total, 4);
                started.push(task.module.clone());
            }
        })
        .await
        .unwrap();

    assert_eq!(
        started,
        vec![
            "azure_resource_group",
            "azure_storage_account",
            "azure_network",
            "azure_vm"
        ]
    );
    assert_eq!(report.tasks.len(), 4);
    assert_eq!(report.changed(), 4);
    assert!(!report.check_mode);
    assert!(provider.vm(RESOURCE_GROUP, VM_NAME).is_some());
    assert_eq!(provider.count(CallKind::CreateResourceGroup), 1);
}

#[tokio::test]
async fn test_check_mode_deployment_changes_nothing() {
    let provider = provider();
    let (context, _) = module_context(&provider, true);
    let registry = ModuleRegistry::with_builtins();
    let deployment = Deployment::from_yaml(FULL_DEPLOYMENT, None).unwrap();

    let report = deployment.run(&registry, &context, |_| {}).await.unwrap();

    assert!(report.check_mode);
    assert_eq!(report.changed(), 4);
    assert!(provider.mutating_calls().is_empty());
}

#[tokio::test]
async fn test_rerun_reports_existing_group_as_ok() {
    let provider = provider();
    let (context, _) = module_context(&provider, false);
    let registry = ModuleRegistry::with_builtins();
    let deployment = Deployment::from_yaml(FULL_DEPLOYMENT, None).unwrap();

    deployment.run(&registry, &context, |_| {}).await.unwrap();
    let second = deployment.run(&registry, &context, |_| {}).await.unwrap();

    assert!(!second.tasks[0].output.changed);
    assert_eq!(second.ok(), 1);
    assert_eq!(provider.count(CallKind::CreateResourceGroup), 1);
}

#[tokio::test]
async fn test_unknown_module_is_a_parse_error() {
    let provider = provider();
    let (context, _) = module_context(&provider, false);
    let registry = ModuleRegistry::with_builtins();
    let deployment = Deployment::from_yaml(
        r#"
- azure_resource_group:
    name: Test
    location: uksouth
- name: Load balancer
  azure_load_balancer:
    name: lb1
"#,
        None,
    )
    .unwrap();

    let err = deployment.run(&registry, &context, |_| {}).await.unwrap_err();
    assert!(matches!(err, Error::DeploymentParse { .. }));
    assert_eq!(err.exit_code(), 4);
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_missing_parameter_fails_before_any_task_runs() {
    let provider = provider();
    let (context, _) = module_context(&provider, false);
    let registry = ModuleRegistry::with_builtins();
    let deployment = Deployment::from_yaml(
        r#"
- azure_resource_group:
    name: Test
    location: uksouth
- name: Storage without a name
  azure_storage_account:
    resource_group: Test
    location: uksouth
"#,
        None,
    )
    .unwrap();

    let err = deployment.run(&registry, &context, |_| {}).await.unwrap_err();
    match &err {
        Error::TaskFailed { task, .. } => assert_eq!(task, "Storage without a name"),
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(err.exit_code(), 2);
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn test_first_failure_stops_the_run() {
    let provider = provider();
    provider.fail_on(CallKind::CreatePublicIp, "quota exceeded");
    let (context, _) = module_context(&provider, false);
    let registry = ModuleRegistry::with_builtins();
    let deployment = Deployment::from_yaml(FULL_DEPLOYMENT, None).unwrap();

    let mut failed = Vec::new();
    let err = deployment
        .run(&registry, &context, |event| {
            if let TaskEvent::Failed { task, .. } = event {
                failed.push(task.display_name().to_string());
            }
        })
        .await
        .unwrap_err();

    assert_eq!(failed, vec!["Network for vm1"]);
    assert!(matches!(err, Error::TaskFailed { ref task, .. } if task == "Network for vm1"));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(provider.count(CallKind::CreateVm), 0);
}

#[tokio::test]
async fn test_rdp_task_uses_the_context_launcher() {
    let provider = provider();
    let (context, launcher) = module_context(&provider, false);
    let registry = ModuleRegistry::with_builtins();
    let yaml = format!(
        "{}\n- name: Connect\n  azure_rdp:\n    resource_group: Test\n    name: vm1\n",
        FULL_DEPLOYMENT
    );
    let deployment = Deployment::from_yaml(&yaml, None).unwrap();

    let report = deployment.run(&registry, &context, |_| {}).await.unwrap();

    assert_eq!(report.tasks.len(), 5);
    let addresses = launcher.addresses();
    assert_eq!(addresses.len(), 1);
    assert!(addresses[0].starts_with("20.0.0."));
}

#[tokio::test]
async fn test_from_file() {
    let file = temp_file(FULL_DEPLOYMENT, "yml");
    let deployment = Deployment::from_file(file.path()).await.unwrap();

    assert_eq!(deployment.task_count(), 4);
    assert_eq!(deployment.source_path.as_deref(), Some(file.path()));
    assert_eq!(deployment.tasks[3].display_name(), "Windows VM");
}

#[tokio::test]
async fn test_from_missing_file() {
    let err = Deployment::from_file("/nonexistent/deploy.yml")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::DeploymentParse { .. }));
    assert_eq!(err.exit_code(), 4);
}

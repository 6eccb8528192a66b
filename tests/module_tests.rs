//! Integration tests for the azure_* modules through the registry.

mod common;

use azprov::error::Error;
use azprov::modules::{ModuleError, ModuleRegistry, ModuleStatus};
use azprov::provider::CallKind;
use common::*;
use serde_json::json;

fn storage_params() -> azprov::modules::ModuleParams {
    params(&[
        ("resource_group", json!("Test")),
        ("name", json!("storageacc1")),
        ("sku", json!("Standard_GRS")),
        ("location", json!("uksouth")),
    ])
}

fn network_params() -> azprov::modules::ModuleParams {
    params(&[
        ("resource_group", json!("Test")),
        ("name", json!("vm1-nic")),
        ("location", json!("uksouth")),
    ])
}

fn vm_params() -> azprov::modules::ModuleParams {
    params(&[
        ("resource_group", json!("Test")),
        ("name", json!("vm1")),
        ("location", json!("UK South")),
        ("size", json!("standard_b2s")),
        ("network_interface", json!("vm1-nic")),
        ("storage_account", json!("storageacc1")),
        (
            "image",
            json!({"publisher": "MicrosoftWindowsServer", "offer": "WindowsServer", "sku": "2022-datacenter"}),
        ),
        ("admin_username", json!("azureadmin")),
        ("admin_password", json!("P@ssw0rd1234")),
    ])
}

#[test]
fn test_builtin_registry_lists_every_module() {
    let registry = ModuleRegistry::with_builtins();
    assert_eq!(
        registry.names(),
        vec![
            "azure_image_publisher_info",
            "azure_location_info",
            "azure_network",
            "azure_rdp",
            "azure_resource_group",
            "azure_storage_account",
            "azure_vm",
            "azure_vm_size_info",
        ]
    );
}

#[tokio::test]
async fn test_check_mode_issues_no_mutating_calls() {
    let provider = provider();
    let (context, _) = module_context(&provider, true);
    let registry = ModuleRegistry::with_builtins();

    let group = registry
        .execute(
            "azure_resource_group",
            &params(&[("name", json!("Test")), ("location", json!("uksouth"))]),
            &context,
        )
        .await
        .unwrap();
    assert!(group.changed);

    for (module, params) in [
        ("azure_storage_account", storage_params()),
        ("azure_network", network_params()),
        ("azure_vm", vm_params()),
    ] {
        let output = registry.execute(module, &params, &context).await.unwrap();
        assert_eq!(output.status, ModuleStatus::Changed, "{}", module);
        assert!(output.msg.starts_with("Would create"), "{}", output.msg);
    }

    assert!(provider.mutating_calls().is_empty());
}

#[tokio::test]
async fn test_check_mode_still_validates_the_catalog() {
    let provider = provider();
    let (context, _) = module_context(&provider, true);
    let registry = ModuleRegistry::with_builtins();

    let mut params = vm_params();
    params.insert("location".into(), json!("westeurope"));
    params.insert("size".into(), json!("Standard_A1"));

    let err = registry
        .execute("azure_vm", &params, &context)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ModuleError::Provisioning(Error::InvalidVmSize { .. })
    ));
    assert_eq!(err.exit_code(), 2);
}

#[tokio::test]
async fn test_modules_build_a_full_environment() {
    let provider = provider();
    let (context, launcher) = module_context(&provider, false);
    let registry = ModuleRegistry::with_builtins();

    let storage = registry
        .execute("azure_storage_account", &storage_params(), &context)
        .await
        .unwrap();
    assert!(storage.changed);
    assert_eq!(storage.data["resource_group_created"], json!(true));

    registry
        .execute("azure_network", &network_params(), &context)
        .await
        .unwrap();

    let vm = registry
        .execute("azure_vm", &vm_params(), &context)
        .await
        .unwrap();
    assert_eq!(
        vm.data["os_disk_uri"],
        json!("https://storageacc1.blob.core.windows.net/vhds/vm1_OSDisk.vhd")
    );
    assert_eq!(provider.count(CallKind::CreateResourceGroup), 1);

    let rdp = registry
        .execute(
            "azure_rdp",
            &params(&[("resource_group", json!("Test")), ("name", json!("vm1"))]),
            &context,
        )
        .await
        .unwrap();
    assert!(!rdp.changed);
    let address = rdp.data["target"]["address"].as_str().unwrap().to_string();
    assert_eq!(launcher.addresses(), vec![address]);
}

#[tokio::test]
async fn test_info_modules() {
    let provider = provider();
    let (context, _) = module_context(&provider, false);
    let registry = ModuleRegistry::with_builtins();

    let locations = registry
        .execute("azure_location_info", &params(&[]), &context)
        .await
        .unwrap();
    assert_eq!(locations.data["locations"].as_array().unwrap().len(), 3);

    let sizes = registry
        .execute(
            "azure_vm_size_info",
            &params(&[("location", json!("uksouth"))]),
            &context,
        )
        .await
        .unwrap();
    assert_eq!(sizes.data["vm_sizes"].as_array().unwrap().len(), 5);

    let publishers = registry
        .execute(
            "azure_image_publisher_info",
            &params(&[("location", json!("eastus")), ("filter", json!("*windows*"))]),
            &context,
        )
        .await
        .unwrap();
    assert_eq!(
        publishers.data["publishers"][0]["name"],
        json!("MicrosoftWindowsDesktop")
    );
    assert!(provider.mutating_calls().is_empty());
}

#[tokio::test]
async fn test_parameter_errors() {
    let provider = provider();
    let (context, _) = module_context(&provider, false);
    let registry = ModuleRegistry::with_builtins();

    let err = registry
        .execute("azure_storage_account", &params(&[]), &context)
        .await
        .unwrap_err();
    assert!(matches!(err, ModuleError::MissingParameter(_)));
    assert_eq!(err.exit_code(), 2);

    let mut bad_sku = storage_params();
    bad_sku.insert("sku".into(), json!("Gold"));
    let err = registry
        .execute("azure_storage_account", &bad_sku, &context)
        .await
        .unwrap_err();
    assert_eq!(err.exit_code(), 2);

    let err = registry
        .execute("azure_nope", &params(&[]), &context)
        .await
        .unwrap_err();
    assert!(matches!(err, ModuleError::NotFound(_)));
    assert!(provider.calls().is_empty());
}

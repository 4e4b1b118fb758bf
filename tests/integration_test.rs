use openapi2crd::extensions::KUBERNETES_MAPPING;
use openapi2crd::openapi::PathLoader;
use openapi2crd::{Config, CustomResourceDefinition, Generator};
use std::path::PathBuf;

fn test_data() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("test-data")
}

async fn generate_fixture() -> Vec<CustomResourceDefinition> {
    let config = Config::from_file(&test_data().join("config.yaml")).unwrap();
    let mut generator = Generator::new(&config)
        .unwrap()
        .with_path_loader(PathLoader::with_base_dir(test_data()));

    let output = generator
        .generate_all(&config.spec.crd, true)
        .await
        .unwrap();
    assert!(output.report.is_success());
    assert!(output.report.warnings.is_empty(), "{:?}", output.report.warnings);
    assert_eq!(output.report.documents.len(), 1);
    output.crds
}

fn annotation(crd: &CustomResourceDefinition) -> serde_json::Value {
    serde_json::from_str(&crd.metadata.annotations["api-mappings"]).unwrap()
}

#[tokio::test]
async fn test_group_crd() {
    let crds = generate_fixture().await;
    let group = &crds[0];
    assert_eq!(group.metadata.name, "groups.atlas.generated.mongodb.com");
    assert_eq!(group.spec.names.short_names, vec!["ag"]);

    let root = group.schema().unwrap();
    let version = root.descend(&["spec", "v20250312"]).unwrap();
    assert_eq!(
        version.properties.keys().collect::<Vec<_>>(),
        vec!["entry", "projectOwnerId"]
    );
    assert!(version.required.is_empty());

    let entry = version.property("entry").unwrap();
    assert_eq!(
        entry.properties.keys().collect::<Vec<_>>(),
        vec!["name", "orgId", "tags"]
    );
    assert_eq!(entry.required, vec!["name", "orgId"]);

    let status = root.descend(&["status", "v20250312"]).unwrap();
    assert_eq!(
        status.properties.keys().collect::<Vec<_>>(),
        vec!["created", "id"]
    );
    assert!(root.descend(&["status", "conditions"]).is_some());
    assert_eq!(group.spec.additional_printer_columns.len(), 3);

    let mappings = annotation(group);
    assert_eq!(
        mappings["properties"]["spec"]["properties"]["v20250312"]["x-openapi-mapping"]["version"],
        "2.0"
    );
}

#[tokio::test]
async fn test_cluster_crd_references_and_secrets() {
    let crds = generate_fixture().await;
    let cluster = &crds[1];
    assert_eq!(cluster.metadata.name, "clusters.atlas.generated.mongodb.com");

    let root = cluster.schema().unwrap();
    let spec = root.property("spec").unwrap();
    assert!(spec.properties.contains_key("connectionSecretRef"));
    assert!(spec
        .x_kubernetes_validations
        .iter()
        .any(|r| r.message
            == "spec.connectionSecretRef must be set if spec.v20250312.groupId is set."));

    let version = spec.property("v20250312").unwrap();
    assert!(version.properties.contains_key("groupId"));
    assert!(version.properties.contains_key("groupRef"));
    assert!(version.required.is_empty());
    assert_eq!(
        version.x_kubernetes_validations[0].rule,
        "(has(self.groupId) && !has(self.groupRef)) || (!has(self.groupId) && has(self.groupRef))"
    );

    let entry = version.property("entry").unwrap();
    assert!(entry.properties.contains_key("backupPasswordSecretRef"));
    assert!(!entry.properties.contains_key("backupPassword"));
    assert!(!entry.properties.contains_key("groupId"));
    assert_eq!(entry.required, vec!["name"]);

    let status = root.descend(&["status", "v20250312"]).unwrap();
    assert!(status.properties.contains_key("stateName"));
    assert!(!status.properties.contains_key("name"));

    let mappings = annotation(cluster);
    let version_mappings = &mappings["properties"]["spec"]["properties"]["v20250312"];
    assert_eq!(
        version_mappings["properties"]["groupRef"][KUBERNETES_MAPPING]["type"]["kind"],
        "Group"
    );
    assert_eq!(
        version_mappings["properties"]["entry"]["properties"]["backupPasswordSecretRef"]
            [KUBERNETES_MAPPING]["type"]["kind"],
        "Secret"
    );
}

#[tokio::test]
async fn test_generate_with_builtin_loaders() {
    let mut config = Config::from_file(&test_data().join("config.yaml")).unwrap();
    config.spec.openapi[0].path = Some(
        test_data()
            .join("openapi.yaml")
            .to_string_lossy()
            .into_owned(),
    );

    let output = openapi2crd::generate(&config).await.unwrap();
    assert_eq!(
        output.report.crds,
        vec![
            "groups.atlas.generated.mongodb.com",
            "clusters.atlas.generated.mongodb.com"
        ]
    );
}

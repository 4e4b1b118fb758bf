use openapi2crd::cli::CliApp;
use serde::Deserialize;
use std::path::PathBuf;
use tempfile::TempDir;

fn config_path() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test-data")
        .join("config.yaml")
        .to_string_lossy()
        .into_owned()
}

async fn run(args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["openapi2crd"];
    argv.extend_from_slice(args);
    let matches = CliApp::app().try_get_matches_from(argv)?;
    CliApp::run(&matches).await
}

#[tokio::test]
async fn test_generate_writes_multi_document_yaml() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("out").join("crds.yaml");
    let output_arg = output.to_string_lossy().into_owned();
    let config = config_path();

    run(&["generate", "--config", &config, "--output", &output_arg])
        .await
        .unwrap();

    let content = std::fs::read_to_string(&output).unwrap();
    let documents: Vec<serde_yaml::Value> = serde_yaml::Deserializer::from_str(&content)
        .map(|d| serde_yaml::Value::deserialize(d).unwrap())
        .collect();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0]["kind"], "CustomResourceDefinition");
    assert_eq!(documents[0]["apiVersion"], "apiextensions.k8s.io/v1");
    assert_eq!(
        documents[1]["metadata"]["name"],
        "clusters.atlas.generated.mongodb.com"
    );
    assert!(documents[1]["spec"]["versions"][0]["schema"]["openAPIV3Schema"].is_mapping());
}

#[tokio::test]
async fn test_generate_refuses_to_overwrite() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("crds.yaml");
    std::fs::write(&output, "keep me").unwrap();
    let output_arg = output.to_string_lossy().into_owned();
    let config = config_path();

    let err = run(&["generate", "--config", &config, "--output", &output_arg])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "keep me");

    run(&["generate", "--config", &config, "--output", &output_arg, "--force"])
        .await
        .unwrap();
    assert_ne!(std::fs::read_to_string(&output).unwrap(), "keep me");
}

#[tokio::test]
async fn test_generate_requires_output() {
    let config = config_path();
    assert!(run(&["generate", "--config", &config]).await.is_err());
}

#[tokio::test]
async fn test_validate_and_plugins_commands() {
    let config = config_path();
    run(&["validate", "--config", &config]).await.unwrap();
    run(&["plugins", "--config", &config]).await.unwrap();
    run(&["plugins"]).await.unwrap();
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("config.yaml");
    std::fs::write(&config, "kind: Other\napiVersion: v1\nspec: {}\n").unwrap();
    let config_arg = config.to_string_lossy().into_owned();

    let err = run(&["validate", "--config", &config_arg]).await.unwrap_err();
    assert!(format!("{err:#}").contains("unsupported configuration document"));
}

//! Generate command implementation

use crate::cli::utils;
use crate::generator::{GenerationReport, Generator};
use crate::openapi::PathLoader;
use anyhow::{bail, Context, Result};
use clap::{ArgMatches, Command};
use openapi2crd_crd::CustomResourceDefinition;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn command() -> Command {
    Command::new("generate")
        .about("Generate CustomResourceDefinitions from the configured OpenAPI documents")
        .arg(utils::config_arg())
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .help("Output file for the multi-document CRD YAML")
                .value_name("FILE")
                .required(true),
        )
        .arg(
            clap::Arg::new("force")
                .short('f')
                .long("force")
                .help("Overwrite the output file if it exists")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("fail-fast")
                .long("fail-fast")
                .help("Stop on first failing CRD")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn run(matches: &ArgMatches) -> Result<()> {
    info!("Starting CRD generation");

    let mut config = utils::load_config(matches)?;
    if matches.get_flag("fail-fast") {
        config.spec.fail_fast = true;
    }

    let output = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .context("--output is required")?;
    check_output(&output, matches.get_flag("force"))?;

    let mut generator = Generator::new(&config)?.with_path_loader(PathLoader::with_base_dir(
        config_dir(matches).unwrap_or_else(|| PathBuf::from(".")),
    ));
    let result = generator
        .generate_all(&config.spec.crd, config.spec.fail_fast)
        .await?;

    write_crds(&output, &result.crds)?;
    info!("Wrote {} CRDs to {}", result.crds.len(), output.display());
    print_report(&result.report, &output);

    if !result.report.is_success() {
        bail!(
            "{} of {} CRDs failed to generate",
            result.report.failures.len(),
            config.spec.crd.len()
        );
    }
    Ok(())
}

/// Directory of the configuration file; relative document paths resolve against it
fn config_dir(matches: &ArgMatches) -> Option<PathBuf> {
    let config = Path::new(matches.get_one::<String>("config")?);
    config.parent().map(Path::to_path_buf)
}

/// Refuse to clobber an existing file unless forced
pub fn check_output(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        bail!(
            "output file {} already exists, use --force to overwrite",
            output.display()
        );
    }
    Ok(())
}

/// Render CRDs as `apiextensions.k8s.io/v1` documents separated by `---`
pub fn render_crds(crds: &[CustomResourceDefinition]) -> Result<String> {
    let mut documents = Vec::with_capacity(crds.len());
    for crd in crds {
        documents.push(
            serde_yaml::to_string(&crd.to_v1())
                .with_context(|| format!("failed to render CRD {}", crd.metadata.name))?,
        );
    }
    Ok(documents
        .iter()
        .map(|d| format!("---\n{d}"))
        .collect::<String>())
}

fn write_crds(output: &Path, crds: &[CustomResourceDefinition]) -> Result<()> {
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    std::fs::write(output, render_crds(crds)?)
        .with_context(|| format!("failed to write {}", output.display()))
}

fn print_report(report: &GenerationReport, output: &Path) {
    println!("Generation completed at {}", report.generated_at.to_rfc3339());
    println!("CRDs written to {}: {}", output.display(), report.crds.len());
    for crd in &report.crds {
        println!("  {crd}");
    }

    if !report.documents.is_empty() {
        println!("OpenAPI definitions:");
        for (name, digest) in &report.documents {
            println!("  {name}: sha256:{digest}");
        }
    }

    for warning in &report.warnings {
        println!("  Warning: {warning}");
    }
    for failure in &report.failures {
        eprintln!("  Error: {failure}");
    }
}

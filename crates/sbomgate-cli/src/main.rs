use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sbomgate_core::policy::config::{PolicyConfig, parse_input};
use sbomgate_core::report::model::{Report, ToolInfo};
use sbomgate_core::report::render;
use sbomgate_core::sbom::SbomFormat;
use sbomgate_core::store::reference::OCI_MANIFEST_MEDIA_TYPE;
use sbomgate_core::store::{Digest, LayoutStore, ReferenceDescriptor, SubjectReference};
use sbomgate_core::{TOOL_NAME, verify_documents, verify_reference};

mod args;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    }
}

fn run() -> Result<i32> {
    let args = args::Args::parse();
    init_tracing(args.verbose);

    let config = load_config(args.config.as_deref())?;
    debug!(
        name = %config.name,
        licenses = config.disallowed_licenses.len(),
        packages = config.disallowed_packages.len(),
        "policy loaded"
    );

    let tool = ToolInfo {
        name: TOOL_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    let report = match &args.command {
        args::Command::Verify {
            layout,
            subject,
            manifest,
        } => {
            if !layout.is_dir() {
                bail!("OCI layout {} is not a directory", layout.display());
            }
            let subject = SubjectReference::parse(subject)?;
            let descriptor = ReferenceDescriptor {
                media_type: OCI_MANIFEST_MEDIA_TYPE.to_string(),
                digest: Digest::parse(manifest)?,
                size: 0,
                artifact_type: None,
            };
            let store = LayoutStore::new(layout);

            let verdict = verify_reference(&subject, &descriptor, &config, &store);
            Report::new(tool, &subject, &verdict)
        }
        args::Command::Check { sboms, subject } => {
            let subject = SubjectReference::parse(subject)?;
            let documents = sboms
                .iter()
                .map(|path| read_sbom(path))
                .collect::<Result<Vec<_>>>()?;

            let verdict = verify_documents(&subject, documents, &config);
            Report::new(tool, &subject, &verdict)
        }
    };

    let output = match args.format {
        args::OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        args::OutputFormat::Text => render::render_text(&report),
    };

    match &args.out {
        Some(path) => std::fs::write(path, &output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => print!("{output}"),
    }

    Ok(report.exit_code)
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();
}

fn load_config(path: Option<&Path>) -> Result<PolicyConfig> {
    let raw = match path {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("failed to read policy {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read policy from stdin")?;
            buf
        }
    };
    Ok(parse_input(&raw)?)
}

fn read_sbom(path: &Path) -> Result<(String, Vec<u8>)> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read SBOM {}", path.display()))?;

    let format = match path.extension().and_then(|e| e.to_str()) {
        Some("json") => SbomFormat::SpdxJson,
        _ => SbomFormat::SpdxTagValue,
    };

    // Informational only: decoding sniffs the content regardless.
    Ok((format.media_type().to_string(), bytes))
}

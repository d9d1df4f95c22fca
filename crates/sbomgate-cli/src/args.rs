use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(
    name = "sbomgate",
    version,
    about = "Verify SBOM attestations against license and package-version denylists"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Policy input JSON (read from stdin when omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(long, global = true)]
    pub out: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Verify the SBOM referrer of an artifact held in an OCI image layout
    Verify {
        /// OCI image-layout directory holding the referrer manifest and blobs
        #[arg(long)]
        layout: PathBuf,

        /// Subject artifact reference, e.g. registry.example.com/app:v1
        #[arg(long)]
        subject: String,

        /// Digest of the referrer manifest
        #[arg(long)]
        manifest: String,
    },

    /// Verify local SBOM files, checked in the order given
    Check {
        /// SPDX JSON or tag:value documents
        #[arg(required = true)]
        sboms: Vec<PathBuf>,

        /// Subject name used in messages
        #[arg(long, default_value = "local")]
        subject: String,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Text,
}

//! Operator policy input.
//!
//! Hosts hand the policy over as JSON, either wrapped in the plugin
//! envelope (`{"config": {...}}`) or as the bare policy object.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::DEFAULT_VERIFIER_NAME;

/// A single disallowed `(name, version)` pair.
///
/// `version` is either an exact string or a SemVer ceiling; see
/// [`crate::policy::version`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagePolicy {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyConfig {
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default, alias = "disAllowedLicenses")]
    pub disallowed_licenses: Vec<String>,

    #[serde(default)]
    pub disallowed_packages: Vec<PackagePolicy>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            disallowed_licenses: Vec::new(),
            disallowed_packages: Vec::new(),
        }
    }
}

fn default_name() -> String {
    DEFAULT_VERIFIER_NAME.to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse policy input: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PolicyInput {
    Wrapped { config: PolicyConfig },
    Bare(PolicyConfig),
}

/// Parse policy input as delivered by a host.
pub fn parse_input(raw: &[u8]) -> Result<PolicyConfig, ConfigError> {
    // Decode to a value first so syntax errors keep their position;
    // untagged enums replace them with a generic message.
    let value: serde_json::Value = serde_json::from_slice(raw)?;
    let input = PolicyInput::deserialize(value)?;

    Ok(match input {
        PolicyInput::Wrapped { config } => config,
        PolicyInput::Bare(config) => config,
    })
}

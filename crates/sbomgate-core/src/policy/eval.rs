//! Policy evaluation over a decoded SBOM.
//!
//! Every package is checked, in document order, against both rules:
//!
//!   - license: exact membership in the license denylist
//!   - version: the package's version entries, first match wins
//!
//! All violations are collected, not just the first. Message ordering
//! follows document order so identical inputs render identical text.

use std::fmt;

use thiserror::Error;

use crate::policy::index::PolicyIndex;
use crate::policy::version::{self, VersionParseError};
use crate::sbom::model::SbomDocument;

pub const SUCCESS_MESSAGE: &str = "successful verification";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LicenseViolation {
    pub name: String,
    pub license: String,
}

impl fmt::Display for LicenseViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{} {}}}", self.name, self.license)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionViolation {
    pub name: String,
    pub version: String,
}

impl fmt::Display for VersionViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{} {}}}", self.name, self.version)
    }
}

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("unable to compute versions for package {package}")]
    Version {
        package: String,
        #[source]
        source: VersionParseError,
    },
}

impl EvalError {
    pub fn package(&self) -> &str {
        match self {
            EvalError::Version { package, .. } => package,
        }
    }
}

/// Violations found in one document, each list in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Violations {
    pub licenses: Vec<LicenseViolation>,
    pub versions: Vec<VersionViolation>,
}

impl Violations {
    pub fn is_clean(&self) -> bool {
        self.licenses.is_empty() && self.versions.is_empty()
    }

    /// Human-readable verdict text.
    ///
    /// The license summary, when present, always comes before the version
    /// summary.
    pub fn message(&self) -> String {
        let mut parts = Vec::new();
        if !self.licenses.is_empty() {
            parts.push(format!(
                "disallowed licenses found: {}",
                bracketed(&self.licenses)
            ));
        }
        if !self.versions.is_empty() {
            parts.push(format!(
                "disallowed package versions found: {}",
                bracketed(&self.versions)
            ));
        }

        if parts.is_empty() {
            SUCCESS_MESSAGE.to_string()
        } else {
            parts.join(", ")
        }
    }
}

fn bracketed<T: fmt::Display>(items: &[T]) -> String {
    let inner: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("[{}]", inner.join(" "))
}

/// Check every package of `doc` against `index`.
///
/// An unparseable version aborts the whole evaluation; skipping it would
/// let the package through unchecked.
pub fn evaluate(doc: &SbomDocument, index: &PolicyIndex) -> Result<Violations, EvalError> {
    let mut found = Violations::default();

    for pkg in &doc.packages {
        if index.denies_license(&pkg.concluded_license) {
            found.licenses.push(LicenseViolation {
                name: pkg.name.clone(),
                license: pkg.concluded_license.clone(),
            });
        }

        let Some(versions) = index.versions_for(&pkg.name) else {
            continue;
        };

        let matched =
            version::matches_any(versions, &pkg.version).map_err(|source| EvalError::Version {
                package: pkg.name.clone(),
                source,
            })?;

        if matched {
            found.versions.push(VersionViolation {
                name: pkg.name.clone(),
                version: pkg.version.clone(),
            });
        }
    }

    Ok(found)
}

//! SPDX 2.x JSON reader.
//!
//! Only the fields policy evaluation needs are read; everything else in the
//! document is ignored. A payload is accepted when it is a JSON object whose
//! `spdxVersion` names an SPDX 2 release.

use serde::Deserialize;
use thiserror::Error;

use crate::sbom::model::{NormalizedPackage, SbomDocument, SbomFormat};

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("invalid SPDX JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("unsupported SPDX version {0:?}")]
    UnsupportedVersion(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    spdx_version: String,
    #[serde(default)]
    packages: Option<Vec<RawPackage>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPackage {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version_info: Option<String>,
    #[serde(default)]
    license_concluded: Option<String>,
}

impl From<RawPackage> for NormalizedPackage {
    fn from(raw: RawPackage) -> Self {
        NormalizedPackage {
            name: raw.name.unwrap_or_default(),
            version: raw.version_info.unwrap_or_default(),
            concluded_license: raw.license_concluded.unwrap_or_default(),
        }
    }
}

pub fn read(raw: &[u8]) -> Result<SbomDocument, JsonError> {
    let doc: RawDocument = serde_json::from_slice(raw)?;

    if !super::is_spdx2(&doc.spdx_version) {
        return Err(JsonError::UnsupportedVersion(doc.spdx_version));
    }

    Ok(SbomDocument {
        format: SbomFormat::SpdxJson,
        packages: doc
            .packages
            .unwrap_or_default()
            .into_iter()
            .map(NormalizedPackage::from)
            .collect(),
    })
}

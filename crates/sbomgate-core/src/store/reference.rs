//! Artifact references and the OCI descriptors that hang off them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::digest::{Digest, DigestError};

pub const OCI_MANIFEST_MEDIA_TYPE: &str = "application/vnd.oci.image.manifest.v1+json";

#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("empty artifact reference")]
    Empty,

    #[error("invalid artifact reference {reference:?}")]
    Digest {
        reference: String,
        #[source]
        source: DigestError,
    },
}

/// A resolved artifact reference: `[registry/]repository[:tag][@digest]`.
///
/// `Display` yields the string the reference was parsed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectReference {
    pub path: String,
    pub tag: Option<String>,
    pub digest: Option<Digest>,
    pub original: String,
}

impl SubjectReference {
    pub fn parse(input: &str) -> Result<Self, ReferenceError> {
        let original = input.trim();
        if original.is_empty() {
            return Err(ReferenceError::Empty);
        }

        let (name, digest) = match original.split_once('@') {
            Some((name, digest)) => {
                let digest = Digest::parse(digest).map_err(|source| ReferenceError::Digest {
                    reference: original.to_string(),
                    source,
                })?;
                (name, Some(digest))
            }
            None => (original, None),
        };

        // A colon before the last slash belongs to a registry port.
        let last_slash = name.rfind('/').map_or(0, |i| i + 1);
        let (path, tag) = match name[last_slash..].rfind(':') {
            Some(i) => {
                let split = last_slash + i;
                (&name[..split], Some(name[split + 1..].to_string()))
            }
            None => (name, None),
        };

        if path.is_empty() {
            return Err(ReferenceError::Empty);
        }

        Ok(Self {
            path: path.to_string(),
            tag,
            digest,
            original: original.to_string(),
        })
    }
}

impl std::fmt::Display for SubjectReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.original)
    }
}

/// Descriptor of the referrer (SBOM attestation) manifest to verify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceDescriptor {
    #[serde(default)]
    pub media_type: String,
    pub digest: Digest,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,
}

/// Descriptor of one blob listed by a reference manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobDescriptor {
    #[serde(default)]
    pub media_type: String,
    pub digest: Digest,
    #[serde(default)]
    pub size: u64,
}

/// A referrer manifest; only its blob list matters for verification.
///
/// OCI image manifests list blobs under `layers`, artifact manifests
/// under `blobs`; both are read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceManifest {
    #[serde(default)]
    pub media_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,
    #[serde(default, alias = "layers")]
    pub blobs: Vec<BlobDescriptor>,
}

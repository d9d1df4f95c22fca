use std::collections::BTreeMap;

use crate::store::reference::OCI_MANIFEST_MEDIA_TYPE;
use crate::store::{
    BlobDescriptor, Digest, ReferenceDescriptor, ReferenceManifest, ReferrerStore, StoreError,
    SubjectReference,
};

/// Store holding manifests and blobs in memory.
///
/// Lets local SBOM files be verified through the same blob loop as
/// registry-backed referrers.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    manifests: BTreeMap<Digest, ReferenceManifest>,
    blobs: BTreeMap<Digest, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_blob(&mut self, media_type: &str, bytes: Vec<u8>) -> BlobDescriptor {
        let digest = Digest::sha256(&bytes);
        let size = bytes.len() as u64;
        self.blobs.insert(digest.clone(), bytes);

        BlobDescriptor {
            media_type: media_type.to_string(),
            digest,
            size,
        }
    }

    /// Register a manifest listing `blobs` and return its descriptor.
    ///
    /// The digest is computed over the manifest's JSON serialization.
    pub fn insert_manifest(
        &mut self,
        artifact_type: Option<&str>,
        blobs: Vec<BlobDescriptor>,
    ) -> ReferenceDescriptor {
        let manifest = ReferenceManifest {
            media_type: OCI_MANIFEST_MEDIA_TYPE.to_string(),
            artifact_type: artifact_type.map(str::to_string),
            blobs,
        };

        // Derived serde impls over strings and integers cannot fail.
        let bytes = serde_json::to_vec(&manifest).unwrap_or_default();
        let digest = Digest::sha256(&bytes);

        let descriptor = ReferenceDescriptor {
            media_type: manifest.media_type.clone(),
            digest: digest.clone(),
            size: bytes.len() as u64,
            artifact_type: manifest.artifact_type.clone(),
        };
        self.manifests.insert(digest, manifest);
        descriptor
    }
}

impl ReferrerStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get_reference_manifest(
        &self,
        _subject: &SubjectReference,
        descriptor: &ReferenceDescriptor,
    ) -> Result<ReferenceManifest, StoreError> {
        self.manifests
            .get(&descriptor.digest)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(descriptor.digest.clone()))
    }

    fn get_blob_content(
        &self,
        _subject: &SubjectReference,
        digest: &Digest,
    ) -> Result<Vec<u8>, StoreError> {
        self.blobs
            .get(digest)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(digest.clone()))
    }
}

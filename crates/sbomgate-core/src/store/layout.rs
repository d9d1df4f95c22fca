use std::fs;
use std::io;
use std::path::PathBuf;

use tracing::debug;

use crate::store::{
    Digest, ReferenceDescriptor, ReferenceManifest, ReferrerStore, StoreError, SubjectReference,
    ensure_supported, verify_content,
};

/// Store backed by an OCI image-layout directory.
///
/// Blobs live at `<root>/blobs/<algorithm>/<encoded>`; referrer manifests
/// are themselves blobs. Every read is checked against its digest, so a
/// tampered file surfaces as a fetch error.
#[derive(Debug, Clone)]
pub struct LayoutStore {
    root: PathBuf,
}

impl LayoutStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn blob_path(&self, digest: &Digest) -> PathBuf {
        self.root
            .join("blobs")
            .join(digest.algorithm())
            .join(digest.encoded())
    }

    fn read_blob(&self, digest: &Digest) -> Result<Vec<u8>, StoreError> {
        ensure_supported(digest)?;
        let path = self.blob_path(digest);
        debug!(path = %path.display(), "reading blob");

        let bytes = fs::read(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => StoreError::NotFound(digest.clone()),
            _ => StoreError::Io { path, source },
        })?;

        verify_content(digest, &bytes)?;
        Ok(bytes)
    }

    /// Write `bytes` into the layout and return their digest.
    pub fn put_blob(&self, bytes: &[u8]) -> Result<Digest, StoreError> {
        let digest = Digest::sha256(bytes);
        let path = self.blob_path(&digest);

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, bytes).map_err(|source| StoreError::Io { path, source })?;

        Ok(digest)
    }
}

impl ReferrerStore for LayoutStore {
    fn name(&self) -> &str {
        "oci-layout"
    }

    fn get_reference_manifest(
        &self,
        _subject: &SubjectReference,
        descriptor: &ReferenceDescriptor,
    ) -> Result<ReferenceManifest, StoreError> {
        let bytes = self.read_blob(&descriptor.digest)?;
        serde_json::from_slice(&bytes).map_err(|source| StoreError::InvalidManifest {
            digest: descriptor.digest.clone(),
            source,
        })
    }

    fn get_blob_content(
        &self,
        _subject: &SubjectReference,
        digest: &Digest,
    ) -> Result<Vec<u8>, StoreError> {
        self.read_blob(digest)
    }
}

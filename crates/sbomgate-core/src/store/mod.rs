//! Blob retrieval seam.
//!
//! The verifier never talks to a registry itself. It asks a
//! [`ReferrerStore`] for the referrer manifest and for each blob's bytes.
//! Stores own retries and timeouts; their errors surface unchanged.

use std::path::PathBuf;

use thiserror::Error;

pub mod digest;
pub mod layout;
pub mod memory;
pub mod reference;

pub use digest::{Digest, DigestError};
pub use layout::LayoutStore;
pub use memory::MemoryStore;
pub use reference::{
    BlobDescriptor, ReferenceDescriptor, ReferenceError, ReferenceManifest, SubjectReference,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("blob {0} not found")]
    NotFound(Digest),

    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("blob content does not match {expected} (got {actual})")]
    DigestMismatch { expected: Digest, actual: Digest },

    #[error("cannot verify digest algorithm {0:?}")]
    UnsupportedAlgorithm(String),

    #[error("manifest {digest} is not a valid reference manifest")]
    InvalidManifest {
        digest: Digest,
        #[source]
        source: serde_json::Error,
    },
}

pub trait ReferrerStore {
    /// Short store name used in logs.
    fn name(&self) -> &str;

    fn get_reference_manifest(
        &self,
        subject: &SubjectReference,
        descriptor: &ReferenceDescriptor,
    ) -> Result<ReferenceManifest, StoreError>;

    fn get_blob_content(
        &self,
        subject: &SubjectReference,
        digest: &Digest,
    ) -> Result<Vec<u8>, StoreError>;
}

/// Fail unless blobs addressed by `digest` can be verified.
pub fn ensure_supported(digest: &Digest) -> Result<(), StoreError> {
    if digest.algorithm() != digest::SHA256 {
        return Err(StoreError::UnsupportedAlgorithm(
            digest.algorithm().to_string(),
        ));
    }
    Ok(())
}

/// Check that `bytes` hash to `expected`.
pub fn verify_content(expected: &Digest, bytes: &[u8]) -> Result<(), StoreError> {
    ensure_supported(expected)?;

    let actual = Digest::sha256(bytes);
    if &actual != expected {
        return Err(StoreError::DigestMismatch {
            expected: expected.clone(),
            actual,
        });
    }
    Ok(())
}

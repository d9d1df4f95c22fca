//! Blob loop: verify every SBOM blob attached to one referrer manifest.
//!
//! The loop runs blobs in manifest order and stops at the first blob that
//! fails, for any reason. Its result is the only one reported; later blobs
//! are never fetched. An empty manifest fails outright since a missing
//! SBOM is a policy gap, not a pass.
//!
//! A failed [`Verdict`] caused by a policy violation carries no error. One
//! caused by a system failure (fetch, decode, version parsing) carries the
//! underlying [`VerifyError`]. Callers must look at both.

use thiserror::Error;
use tracing::{debug, info, info_span, warn};

use crate::policy::config::PolicyConfig;
use crate::policy::eval::{self, EvalError, Violations};
use crate::policy::index::PolicyIndex;
use crate::report::model::VerifierResult;
use crate::sbom::decode::{self, DecodeError};
use crate::store::{
    BlobDescriptor, Digest, MemoryStore, ReferenceDescriptor, ReferrerStore, StoreError,
    SubjectReference,
};

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("failed to fetch reference manifest {digest}")]
    Manifest {
        digest: Digest,
        #[source]
        source: StoreError,
    },

    #[error("failed to fetch blob {digest}")]
    Fetch {
        digest: Digest,
        #[source]
        source: StoreError,
    },

    #[error("failed to decode blob {digest}")]
    Decode {
        digest: Digest,
        #[source]
        source: DecodeError,
    },

    #[error("failed to evaluate blob {digest}")]
    Evaluate {
        digest: Digest,
        #[source]
        source: EvalError,
    },
}

impl VerifyError {
    /// Result message for this failure, qualified by subject and digest.
    pub fn message(&self, subject: &SubjectReference) -> String {
        match self {
            VerifyError::Manifest { digest, .. } => format!(
                "error fetching reference manifest for subject: {subject} digest: {digest}"
            ),
            VerifyError::Fetch { digest, .. } => {
                format!("error fetching blob for subject: {subject} digest: {digest}")
            }
            VerifyError::Decode { digest, .. } => {
                format!("unknown media type: {subject} digest: {digest}")
            }
            VerifyError::Evaluate { digest, source } => format!(
                "unable to compute versions for package {}: {subject} digest: {digest}",
                source.package()
            ),
        }
    }
}

/// A verifier result, plus the error behind it when one occurred.
#[derive(Debug)]
pub struct Verdict {
    pub result: VerifierResult,
    pub error: Option<VerifyError>,
}

impl Verdict {
    fn passed(name: &str) -> Self {
        Self {
            result: VerifierResult::success(name),
            error: None,
        }
    }

    fn rejected(name: &str, message: String) -> Self {
        Self {
            result: VerifierResult::failure(name, message),
            error: None,
        }
    }

    fn errored(name: &str, subject: &SubjectReference, error: VerifyError) -> Self {
        Self {
            result: VerifierResult::failure(name, error.message(subject)),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.result.is_success
    }

    /// Process exit code: 0 pass, 1 policy failure, 2 system error.
    pub fn exit_code(&self) -> i32 {
        match (&self.error, self.result.is_success) {
            (Some(_), _) => 2,
            (None, true) => 0,
            (None, false) => 1,
        }
    }
}

/// Verify the SBOM blobs of the referrer `descriptor` attached to `subject`.
pub fn verify_reference(
    subject: &SubjectReference,
    descriptor: &ReferenceDescriptor,
    config: &PolicyConfig,
    store: &dyn ReferrerStore,
) -> Verdict {
    let span = info_span!(
        "verify",
        subject = %subject,
        referrer = %descriptor.digest,
        store = store.name()
    );
    let _guard = span.enter();
    let name = config.name.as_str();

    let manifest = match store.get_reference_manifest(subject, descriptor) {
        Ok(manifest) => manifest,
        Err(source) => {
            let error = VerifyError::Manifest {
                digest: descriptor.digest.clone(),
                source,
            };
            warn!(error = %error, "verification failed");
            return Verdict::errored(name, subject, error);
        }
    };

    if manifest.blobs.is_empty() {
        warn!("referrer manifest lists no blobs");
        return Verdict::rejected(
            name,
            format!(
                "verification failed: no blobs found for referrer {}@{}",
                subject.path, descriptor.digest
            ),
        );
    }

    for blob in &manifest.blobs {
        match check_blob(subject, blob, config, store) {
            Ok(violations) if violations.is_clean() => {
                debug!(digest = %blob.digest, "blob passed");
            }
            Ok(violations) => {
                let message = violations.message();
                warn!(digest = %blob.digest, %message, "policy violations found");
                return Verdict::rejected(name, message);
            }
            Err(error) => {
                warn!(error = %error, "verification failed");
                return Verdict::errored(name, subject, error);
            }
        }
    }

    info!(blobs = manifest.blobs.len(), "verification succeeded");
    Verdict::passed(name)
}

fn check_blob(
    subject: &SubjectReference,
    blob: &BlobDescriptor,
    config: &PolicyConfig,
    store: &dyn ReferrerStore,
) -> Result<Violations, VerifyError> {
    debug!(digest = %blob.digest, media_type = %blob.media_type, "fetching blob");

    let raw = store
        .get_blob_content(subject, &blob.digest)
        .map_err(|source| VerifyError::Fetch {
            digest: blob.digest.clone(),
            source,
        })?;

    let doc = decode::decode(&raw).map_err(|source| VerifyError::Decode {
        digest: blob.digest.clone(),
        source,
    })?;
    debug!(
        digest = %blob.digest,
        format = %doc.format,
        packages = doc.packages.len(),
        "decoded SBOM"
    );

    let index = PolicyIndex::build(config);
    eval::evaluate(&doc, &index).map_err(|source| VerifyError::Evaluate {
        digest: blob.digest.clone(),
        source,
    })
}

/// Verify in-memory SBOM payloads as if they were the blobs of one referrer.
///
/// Each `(media_type, bytes)` pair becomes one blob, in the given order.
pub fn verify_documents(
    subject: &SubjectReference,
    documents: Vec<(String, Vec<u8>)>,
    config: &PolicyConfig,
) -> Verdict {
    let mut store = MemoryStore::new();
    let blobs = documents
        .into_iter()
        .map(|(media_type, bytes)| store.insert_blob(&media_type, bytes))
        .collect();
    let descriptor = store.insert_manifest(None, blobs);

    verify_reference(subject, &descriptor, config, &store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::config::PackagePolicy;
    use crate::sbom::model::SbomFormat;
    use std::cell::RefCell;

    const GOOD_JSON: &str = r#"{"spdxVersion": "SPDX-2.3", "packages": [
        {"name": "libfoo", "versionInfo": "3.0.0", "licenseConcluded": "MIT"}
    ]}"#;

    const BAD_LICENSE_TV: &str = "\
SPDXVersion: SPDX-2.3
PackageName: libbar
PackageVersion: 1.0.0
PackageLicenseConcluded: GPL-3.0
";

    fn subject() -> SubjectReference {
        SubjectReference::parse("example.com/app:v1").unwrap()
    }

    fn config() -> PolicyConfig {
        PolicyConfig {
            name: "sbom".into(),
            disallowed_licenses: vec!["GPL-3.0".into()],
            disallowed_packages: vec![PackagePolicy {
                name: "libfoo".into(),
                version: "2.0.0".into(),
            }],
        }
    }

    /// Wraps a store and records every blob fetch.
    struct Recording<'a> {
        inner: &'a MemoryStore,
        fetched: RefCell<Vec<Digest>>,
    }

    impl ReferrerStore for Recording<'_> {
        fn name(&self) -> &str {
            "recording"
        }

        fn get_reference_manifest(
            &self,
            subject: &SubjectReference,
            descriptor: &ReferenceDescriptor,
        ) -> Result<crate::store::ReferenceManifest, StoreError> {
            self.inner.get_reference_manifest(subject, descriptor)
        }

        fn get_blob_content(
            &self,
            subject: &SubjectReference,
            digest: &Digest,
        ) -> Result<Vec<u8>, StoreError> {
            self.fetched.borrow_mut().push(digest.clone());
            self.inner.get_blob_content(subject, digest)
        }
    }

    fn json_blob(store: &mut MemoryStore, body: &str) -> BlobDescriptor {
        store.insert_blob(SbomFormat::SpdxJson.media_type(), body.as_bytes().to_vec())
    }

    #[test]
    fn clean_blobs_pass() {
        let mut store = MemoryStore::new();
        let blob = json_blob(&mut store, GOOD_JSON);
        let desc = store.insert_manifest(None, vec![blob]);

        let verdict = verify_reference(&subject(), &desc, &config(), &store);

        assert!(verdict.is_success());
        assert!(verdict.error.is_none());
        assert_eq!(verdict.result.message, "successful verification");
        assert_eq!(verdict.result.name, "sbom");
        assert_eq!(verdict.exit_code(), 0);
    }

    #[test]
    fn empty_manifest_fails_regardless_of_policy() {
        let mut store = MemoryStore::new();
        let desc = store.insert_manifest(None, vec![]);

        let verdict = verify_reference(&subject(), &desc, &PolicyConfig::default(), &store);

        assert!(!verdict.is_success());
        assert!(verdict.error.is_none());
        assert_eq!(
            verdict.result.message,
            format!(
                "verification failed: no blobs found for referrer example.com/app@{}",
                desc.digest
            )
        );
    }

    #[test]
    fn first_failing_blob_stops_the_loop() {
        let mut store = MemoryStore::new();
        let bad = store.insert_blob(SbomFormat::SpdxTagValue.media_type(), BAD_LICENSE_TV.into());
        let good = json_blob(&mut store, GOOD_JSON);
        let desc = store.insert_manifest(None, vec![bad.clone(), good]);
        let recording = Recording {
            inner: &store,
            fetched: RefCell::new(Vec::new()),
        };

        let verdict = verify_reference(&subject(), &desc, &config(), &recording);

        assert!(!verdict.is_success());
        assert_eq!(
            verdict.result.message,
            "disallowed licenses found: [{libbar GPL-3.0}]"
        );
        assert_eq!(*recording.fetched.borrow(), vec![bad.digest]);
        assert_eq!(verdict.exit_code(), 1);
    }

    #[test]
    fn later_failing_blob_is_still_reported() {
        let mut store = MemoryStore::new();
        let good = json_blob(&mut store, GOOD_JSON);
        let bad = store.insert_blob("text/spdx", BAD_LICENSE_TV.into());
        let desc = store.insert_manifest(None, vec![good, bad]);

        let verdict = verify_reference(&subject(), &desc, &config(), &store);

        assert!(!verdict.is_success());
        assert!(verdict.result.message.contains("libbar"));
    }

    #[test]
    fn missing_manifest_is_a_system_error() {
        let store = MemoryStore::new();
        let desc = ReferenceDescriptor {
            media_type: String::new(),
            digest: Digest::sha256(b"nowhere"),
            size: 0,
            artifact_type: None,
        };

        let verdict = verify_reference(&subject(), &desc, &config(), &store);

        assert!(!verdict.is_success());
        assert!(matches!(verdict.error, Some(VerifyError::Manifest { .. })));
        assert!(verdict.result.message.contains(desc.digest.as_str()));
    }

    #[test]
    fn missing_blob_names_the_digest() {
        let mut store = MemoryStore::new();
        let ghost = BlobDescriptor {
            media_type: "application/spdx+json".into(),
            digest: Digest::sha256(b"ghost"),
            size: 5,
        };
        let desc = store.insert_manifest(None, vec![ghost.clone()]);

        let verdict = verify_reference(&subject(), &desc, &config(), &store);

        assert!(matches!(
            &verdict.error,
            Some(VerifyError::Fetch { source: StoreError::NotFound(_), .. })
        ));
        assert_eq!(
            verdict.result.message,
            format!(
                "error fetching blob for subject: example.com/app:v1 digest: {}",
                ghost.digest
            )
        );
        assert_eq!(verdict.exit_code(), 2);
    }

    #[test]
    fn undecodable_blob_is_unknown_media_type() {
        let mut store = MemoryStore::new();
        let blob = store.insert_blob("application/octet-stream", vec![0, 159, 146, 150]);
        let desc = store.insert_manifest(None, vec![blob.clone()]);

        let verdict = verify_reference(&subject(), &desc, &config(), &store);

        assert!(matches!(verdict.error, Some(VerifyError::Decode { .. })));
        assert_eq!(
            verdict.result.message,
            format!(
                "unknown media type: example.com/app:v1 digest: {}",
                blob.digest
            )
        );
    }

    #[test]
    fn version_parse_error_aborts_with_package_name() {
        let mut store = MemoryStore::new();
        let blob = json_blob(
            &mut store,
            r#"{"spdxVersion": "SPDX-2.3", "packages": [
                {"name": "libfoo", "versionInfo": "nightly", "licenseConcluded": "MIT"}
            ]}"#,
        );
        let desc = store.insert_manifest(None, vec![blob]);

        let verdict = verify_reference(&subject(), &desc, &config(), &store);

        assert!(matches!(verdict.error, Some(VerifyError::Evaluate { .. })));
        assert!(
            verdict
                .result
                .message
                .starts_with("unable to compute versions for package libfoo: example.com/app:v1")
        );
    }

    #[test]
    fn verify_documents_keeps_order() {
        let verdict = verify_documents(
            &subject(),
            vec![
                ("text/spdx".into(), BAD_LICENSE_TV.as_bytes().to_vec()),
                ("application/octet-stream".into(), b"garbage".to_vec()),
            ],
            &config(),
        );

        assert!(verdict.error.is_none());
        assert_eq!(
            verdict.result.message,
            "disallowed licenses found: [{libbar GPL-3.0}]"
        );
    }
}

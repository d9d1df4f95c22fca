use sbomgate_core::policy::config::{PolicyConfig, parse_input};
use sbomgate_core::sbom::{self, SbomFormat};
use sbomgate_core::store::{
    BlobDescriptor, LayoutStore, ReferenceDescriptor, SubjectReference,
};
use sbomgate_core::{Verdict, VerifyError, verify_documents, verify_reference};
use std::path::PathBuf;
use tempfile::TempDir;

/// Path to the fixtures directory relative to the crate root.
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn fixture(name: &str) -> Vec<u8> {
    let path = fixtures_dir().join(name);
    std::fs::read(&path).unwrap_or_else(|e| panic!("failed to read {name}: {e}"))
}

fn policy() -> PolicyConfig {
    parse_input(&fixture("policy.json")).expect("fixture policy parses")
}

fn subject() -> SubjectReference {
    SubjectReference::parse("registry.example.com/team/app:1.0.0").unwrap()
}

/// Runs fixtures through the full blob loop, one blob per fixture.
fn verify_fixtures(names: &[&str], config: &PolicyConfig) -> Verdict {
    let docs = names
        .iter()
        .map(|name| {
            let media_type = if name.ends_with(".json") {
                SbomFormat::SpdxJson.media_type()
            } else {
                SbomFormat::SpdxTagValue.media_type()
            };
            (media_type.to_string(), fixture(name))
        })
        .collect();
    verify_documents(&subject(), docs, config)
}

const EXPECTED_EXAMPLE_MESSAGE: &str = "disallowed licenses found: [{libbar GPL-3.0}], \
     disallowed package versions found: [{libfoo 1.9.0}]";

#[test]
fn json_and_tag_value_fixtures_decode_to_same_packages() {
    let json = sbom::decode(&fixture("example.spdx.json")).unwrap();
    let tv = sbom::decode(&fixture("example.spdx")).unwrap();

    assert_eq!(json.format, SbomFormat::SpdxJson);
    assert_eq!(tv.format, SbomFormat::SpdxTagValue);
    assert_eq!(json.packages, tv.packages);
}

#[test]
fn missing_fields_normalize_alike_in_both_encodings() {
    let json = sbom::decode(&fixture("clean.spdx.json")).unwrap();
    let tv = sbom::decode(&fixture("clean.spdx")).unwrap();

    assert_eq!(json.packages, tv.packages);
    let tool = &tv.packages[2];
    assert_eq!(tool.name, "internal-tool");
    assert_eq!(tool.version, "");
    assert_eq!(tool.concluded_license, "");
}

#[test]
fn example_json_reports_both_violations() {
    let verdict = verify_fixtures(&["example.spdx.json"], &policy());

    assert!(!verdict.is_success());
    assert!(verdict.error.is_none());
    assert_eq!(verdict.result.name, "sbom-policy");
    assert_eq!(verdict.result.message, EXPECTED_EXAMPLE_MESSAGE);
}

#[test]
fn example_tag_value_renders_identical_message() {
    let verdict = verify_fixtures(&["example.spdx"], &policy());

    assert_eq!(verdict.result.message, EXPECTED_EXAMPLE_MESSAGE);
}

#[test]
fn clean_document_passes() {
    let verdict = verify_fixtures(&["clean.spdx.json"], &policy());

    assert!(verdict.is_success());
    assert_eq!(verdict.result.message, "successful verification");
    assert_eq!(verdict.exit_code(), 0);
}

#[test]
fn empty_policy_passes_every_fixture() {
    let open = PolicyConfig::default();

    for name in [
        "example.spdx.json",
        "example.spdx",
        "clean.spdx.json",
        "clean.spdx",
        "nightly.spdx",
    ] {
        let verdict = verify_fixtures(&[name], &open);
        assert!(verdict.is_success(), "{name} should pass an empty policy");
    }
}

#[test]
fn document_without_packages_passes() {
    let verdict = verify_fixtures(&["empty.spdx.json"], &policy());
    assert!(verdict.is_success());
}

#[test]
fn unparseable_package_version_is_an_error() {
    let verdict = verify_fixtures(&["nightly.spdx"], &policy());

    assert!(!verdict.is_success());
    assert!(matches!(verdict.error, Some(VerifyError::Evaluate { .. })));
    assert!(verdict.result.message.contains("package libfoo"));
    assert_eq!(verdict.exit_code(), 2);
}

#[test]
fn unsupported_sbom_format_is_rejected() {
    let verdict = verify_fixtures(&["cyclonedx.json"], &policy());

    assert!(matches!(verdict.error, Some(VerifyError::Decode { .. })));
    assert!(verdict.result.message.starts_with("unknown media type: "));
}

#[test]
fn first_failing_blob_wins_over_later_ones() {
    let verdict = verify_fixtures(&["clean.spdx.json", "example.spdx", "cyclonedx.json"], &policy());

    assert!(verdict.error.is_none());
    assert_eq!(verdict.result.message, EXPECTED_EXAMPLE_MESSAGE);
}

#[test]
fn layout_store_end_to_end() {
    let dir = TempDir::new().unwrap();
    let store = LayoutStore::new(dir.path());

    let sbom_bytes = fixture("example.spdx.json");
    let layer = BlobDescriptor {
        media_type: "application/spdx+json".into(),
        digest: store.put_blob(&sbom_bytes).unwrap(),
        size: sbom_bytes.len() as u64,
    };
    let manifest = serde_json::json!({
        "schemaVersion": 2,
        "mediaType": "application/vnd.oci.image.manifest.v1+json",
        "artifactType": "application/spdx+json",
        "layers": [layer]
    });
    let manifest_bytes = serde_json::to_vec(&manifest).unwrap();
    let descriptor = ReferenceDescriptor {
        media_type: "application/vnd.oci.image.manifest.v1+json".into(),
        digest: store.put_blob(&manifest_bytes).unwrap(),
        size: manifest_bytes.len() as u64,
        artifact_type: Some("application/spdx+json".into()),
    };

    let verdict = verify_reference(&subject(), &descriptor, &policy(), &store);

    assert_eq!(verdict.result.message, EXPECTED_EXAMPLE_MESSAGE);
}

#[test]
fn layout_store_reports_missing_blob_digest() {
    let dir = TempDir::new().unwrap();
    let store = LayoutStore::new(dir.path());
    let manifest = br#"{"layers": [{"mediaType": "text/spdx", "digest": "sha256:1111111111111111111111111111111111111111111111111111111111111111", "size": 1}]}"#;
    let descriptor = ReferenceDescriptor {
        media_type: String::new(),
        digest: store.put_blob(manifest).unwrap(),
        size: manifest.len() as u64,
        artifact_type: None,
    };

    let verdict = verify_reference(&subject(), &descriptor, &policy(), &store);

    assert!(matches!(verdict.error, Some(VerifyError::Fetch { .. })));
    assert_eq!(
        verdict.result.message,
        "error fetching blob for subject: registry.example.com/team/app:1.0.0 \
         digest: sha256:1111111111111111111111111111111111111111111111111111111111111111"
    );
}

#[test]
fn verification_is_deterministic() {
    let first = verify_fixtures(&["example.spdx.json"], &policy());
    let second = verify_fixtures(&["example.spdx.json"], &policy());

    assert_eq!(first.result, second.result);
}

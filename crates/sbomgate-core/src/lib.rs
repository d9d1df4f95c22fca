pub mod policy;
pub mod report;
pub mod sbom;
pub mod store;
pub mod verify;

pub use verify::{Verdict, VerifyError, verify_documents, verify_reference};

pub const TOOL_NAME: &str = "sbomgate";

/// Verifier name reported when the policy input does not set one.
pub const DEFAULT_VERIFIER_NAME: &str = "sbom";

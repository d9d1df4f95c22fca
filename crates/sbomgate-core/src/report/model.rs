use serde::{Deserialize, Serialize};

use crate::policy::eval::SUCCESS_MESSAGE;
use crate::store::SubjectReference;
use crate::verify::Verdict;

/// Outcome of one verification, as seen by the host.
///
/// Serialized with the host protocol's camelCase keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifierResult {
    pub name: String,
    pub is_success: bool,
    pub message: String,
}

impl VerifierResult {
    pub fn success(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_success: true,
            message: SUCCESS_MESSAGE.to_string(),
        }
    }

    pub fn failure(name: &str, message: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            is_success: false,
            message: message.into(),
        }
    }
}

/// Tool metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Top-level CLI report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub tool: ToolInfo,
    pub subject: String,
    pub result: VerifierResult,
    /// Error chain, outermost first, when verification hit a system error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub exit_code: i32,
}

impl Report {
    pub fn new(tool: ToolInfo, subject: &SubjectReference, verdict: &Verdict) -> Self {
        Self {
            tool,
            subject: subject.to_string(),
            result: verdict.result.clone(),
            error: verdict.error.as_ref().map(|e| error_chain(e)),
            exit_code: verdict.exit_code(),
        }
    }
}

/// Render an error and its sources as `outer: inner: root`.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

//! Version ceiling matching.
//!
//! A policy version names the highest disallowed release of a package:
//! every declared version *at or below* it is a match. The comparison runs
//! `policy >= actual`, never the other way around.
//!
//! Matching order:
//!
//!   1. exact string equality (works for tags like `latest` or git revisions)
//!   2. strict SemVer parse of both sides, then precedence comparison
//!
//! A string that is neither an exact match nor valid SemVer is an error,
//! not a miss. Treating it as a miss would let an unparseable entry bypass
//! the denylist.

use std::cmp::Ordering;

use semver::Version;
use thiserror::Error;

/// A version string that could not be read as semantic version.
#[derive(Debug, Error)]
#[error("invalid semantic version {input:?}")]
pub struct VersionParseError {
    pub input: String,
    #[source]
    pub source: semver::Error,
}

/// Returns `true` when `actual` falls at or below the `policy` ceiling.
pub fn matches(policy: &str, actual: &str) -> Result<bool, VersionParseError> {
    if policy == actual {
        return Ok(true);
    }

    let ceiling = parse(policy)?;
    let declared = parse(actual)?;

    Ok(precedence(&ceiling, &declared) != Ordering::Less)
}

/// Checks `actual` against each policy entry in order; the first match wins.
///
/// A parse error raised before any entry matched aborts the check.
pub fn matches_any<S: AsRef<str>>(policies: &[S], actual: &str) -> Result<bool, VersionParseError> {
    for policy in policies {
        if matches(policy.as_ref(), actual)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn parse(input: &str) -> Result<Version, VersionParseError> {
    Version::parse(input).map_err(|source| VersionParseError {
        input: input.to_string(),
        source,
    })
}

// SemVer precedence: build metadata is ignored.
fn precedence(a: &Version, b: &Version) -> Ordering {
    (a.major, a.minor, a.patch, &a.pre).cmp(&(b.major, b.minor, b.patch, &b.pre))
}

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use thiserror::Error;

pub const SHA256: &str = "sha256";

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid digest {0:?}: expected `algorithm:encoded`")]
pub struct DigestError(pub String);

/// Content address of a blob, `algorithm:encoded`.
///
/// `sha256` digests must carry 64 lowercase hex characters. Other
/// algorithms are accepted syntactically but cannot be verified.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest(String);

impl Digest {
    pub fn parse(input: &str) -> Result<Self, DigestError> {
        let invalid = || DigestError(input.to_string());

        let (algorithm, encoded) = input.split_once(':').ok_or_else(invalid)?;

        let algorithm_ok = algorithm.split(['+', '.', '_', '-']).all(|component| {
            !component.is_empty()
                && component
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        });
        let encoded_ok = !encoded.is_empty()
            && encoded
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "=_-".contains(c));
        if !algorithm_ok || !encoded_ok {
            return Err(invalid());
        }

        if algorithm == SHA256
            && (encoded.len() != 64
                || !encoded
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)))
        {
            return Err(invalid());
        }

        Ok(Self(input.to_string()))
    }

    /// sha256 digest of `bytes`.
    pub fn sha256(bytes: &[u8]) -> Self {
        Self(format!("{SHA256}:{}", hex::encode(Sha256::digest(bytes))))
    }

    pub fn algorithm(&self) -> &str {
        self.0.split_once(':').map(|(a, _)| a).unwrap_or_default()
    }

    pub fn encoded(&self) -> &str {
        self.0.split_once(':').map(|(_, e)| e).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Digest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Digest {
    type Error = DigestError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Digest> for String {
    fn from(d: Digest) -> Self {
        d.0
    }
}

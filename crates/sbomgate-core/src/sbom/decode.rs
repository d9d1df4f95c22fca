use thiserror::Error;
use tracing::debug;

use crate::sbom::model::SbomDocument;
use crate::sbom::{json, tagvalue};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is neither SPDX JSON nor SPDX tag:value")]
    UnsupportedFormat,
}

/// Decode a raw SBOM payload of unknown encoding.
///
/// SPDX JSON is tried first, then SPDX tag:value. Why each attempt failed
/// is only logged; the returned error does not carry it.
pub fn decode(raw: &[u8]) -> Result<SbomDocument, DecodeError> {
    let json_err = match json::read(raw) {
        Ok(doc) => return Ok(doc),
        Err(e) => e,
    };

    match tagvalue::read(raw) {
        Ok(doc) => {
            debug!(json = %json_err, "decoded SBOM as SPDX tag:value");
            Ok(doc)
        }
        Err(tv_err) => {
            debug!(json = %json_err, tag_value = %tv_err, "no SBOM decoder accepted payload");
            Err(DecodeError::UnsupportedFormat)
        }
    }
}

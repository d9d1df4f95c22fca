//! SBOM payload decoding.
//!
//! Two SPDX 2.x encodings are understood: JSON (`json`) and tag:value
//! (`tagvalue`). `decode` sniffs between them and yields a format-agnostic
//! `SbomDocument`.

pub mod decode;
pub mod json;
pub mod model;
pub mod tagvalue;

pub use decode::{DecodeError, decode};
pub use model::{NormalizedPackage, SbomDocument, SbomFormat};

fn is_spdx2(version: &str) -> bool {
    version.trim().starts_with("SPDX-2.")
}

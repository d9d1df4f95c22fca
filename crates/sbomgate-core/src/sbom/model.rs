/// Encoding an SBOM payload was decoded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SbomFormat {
    SpdxJson,
    SpdxTagValue,
}

impl SbomFormat {
    pub fn media_type(self) -> &'static str {
        match self {
            SbomFormat::SpdxJson => "application/spdx+json",
            SbomFormat::SpdxTagValue => "text/spdx",
        }
    }
}

impl std::fmt::Display for SbomFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SbomFormat::SpdxJson => f.write_str("spdx-json"),
            SbomFormat::SpdxTagValue => f.write_str("spdx-tag-value"),
        }
    }
}

/// One package as declared by the SBOM producer.
///
/// Fields are free-form. A field the producer left out is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedPackage {
    pub name: String,
    pub version: String,
    pub concluded_license: String,
}

/// Format-agnostic view of one blob.
///
/// Package order is the order of the source document and is preserved
/// through evaluation into result messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SbomDocument {
    pub format: SbomFormat,
    pub packages: Vec<NormalizedPackage>,
}

//! SPDX 2.x tag:value reader.
//!
//! The format is line oriented: `Tag: value`, with `<text>...</text>`
//! values allowed to span several lines. Blank lines and `#` comments
//! carry no data. A `PackageName` tag opens a package record; the record
//! stays open until the next package, or until a file or snippet section
//! starts, so that file-level fields are never attributed to a package.

use thiserror::Error;

use crate::sbom::model::{NormalizedPackage, SbomDocument, SbomFormat};

const TEXT_OPEN: &str = "<text>";
const TEXT_CLOSE: &str = "</text>";

#[derive(Debug, Error)]
pub enum TagValueError {
    #[error("payload is not UTF-8 text")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("line {line}: expected `Tag: value`")]
    MalformedLine { line: usize },

    #[error("line {line}: <text> value is never closed")]
    UnterminatedText { line: usize },

    #[error("missing SPDXVersion tag")]
    MissingVersion,

    #[error("unsupported SPDX version {0:?}")]
    UnsupportedVersion(String),
}

#[derive(Default)]
struct Builder {
    spdx_version: Option<String>,
    open: Option<NormalizedPackage>,
    packages: Vec<NormalizedPackage>,
}

impl Builder {
    fn apply(&mut self, tag: &str, value: &str) {
        match tag {
            "SPDXVersion" => {
                if self.spdx_version.is_none() {
                    self.spdx_version = Some(value.to_string());
                }
            }
            "PackageName" => {
                self.close();
                self.open = Some(NormalizedPackage {
                    name: value.to_string(),
                    ..Default::default()
                });
            }
            "PackageVersion" => {
                if let Some(pkg) = self.open.as_mut() {
                    pkg.version = value.to_string();
                }
            }
            "PackageLicenseConcluded" => {
                if let Some(pkg) = self.open.as_mut() {
                    pkg.concluded_license = value.to_string();
                }
            }
            "FileName" | "SnippetSPDXID" => self.close(),
            _ => {}
        }
    }

    fn close(&mut self) {
        if let Some(pkg) = self.open.take() {
            self.packages.push(pkg);
        }
    }

    fn finish(mut self) -> Result<SbomDocument, TagValueError> {
        self.close();

        let version = self.spdx_version.ok_or(TagValueError::MissingVersion)?;
        if !super::is_spdx2(&version) {
            return Err(TagValueError::UnsupportedVersion(version));
        }

        Ok(SbomDocument {
            format: SbomFormat::SpdxTagValue,
            packages: self.packages,
        })
    }
}

/// A `<text>` value still waiting for its closing tag.
struct PendingText {
    tag: String,
    body: String,
    start_line: usize,
}

pub fn read(raw: &[u8]) -> Result<SbomDocument, TagValueError> {
    let text = std::str::from_utf8(raw)?;

    let mut builder = Builder::default();
    let mut pending: Option<PendingText> = None;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;

        if let Some(mut open) = pending.take() {
            match line.find(TEXT_CLOSE) {
                Some(end) => {
                    open.body.push_str(&line[..end]);
                    builder.apply(&open.tag, open.body.trim());
                }
                None => {
                    open.body.push_str(line);
                    open.body.push('\n');
                    pending = Some(open);
                }
            }
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let (tag, value) = trimmed
            .split_once(':')
            .ok_or(TagValueError::MalformedLine { line: line_no })?;
        let tag = tag.trim();
        if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TagValueError::MalformedLine { line: line_no });
        }

        let value = value.trim();
        match value.strip_prefix(TEXT_OPEN) {
            Some(rest) => match rest.find(TEXT_CLOSE) {
                Some(end) => builder.apply(tag, rest[..end].trim()),
                None => {
                    let mut body = rest.to_string();
                    body.push('\n');
                    pending = Some(PendingText {
                        tag: tag.to_string(),
                        body,
                        start_line: line_no,
                    });
                }
            },
            None => builder.apply(tag, value),
        }
    }

    if let Some(open) = pending {
        return Err(TagValueError::UnterminatedText {
            line: open.start_line,
        });
    }

    builder.finish()
}

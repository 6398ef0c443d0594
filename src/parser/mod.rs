//! Source document parsing.
//!
//! Both grammars produce the same [`Catalogue`] shape. Parsing is best-effort:
//! anything a parser could not classify is reported as a [`Diagnostic`] next
//! to the (possibly degraded) catalogue. Only a document that cannot be decoded
//! at all yields a [`ParseError`].

pub mod blueprint;
pub mod openapi;

use crate::catalogue::Catalogue;
use crate::error::ParseError;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported documentation grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocFormat {
    #[serde(alias = "apib")]
    Blueprint,
    #[serde(alias = "swagger")]
    OpenApi,
}

impl DocFormat {
    /// Infers the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "apib" | "md" => Some(Self::Blueprint),
            "json" | "yaml" | "yml" => Some(Self::OpenApi),
            _ => None,
        }
    }
}

impl FromStr for DocFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blueprint" | "apib" => Ok(Self::Blueprint),
            "openapi" | "swagger" => Ok(Self::OpenApi),
            other => Err(format!("unknown document format '{}'", other)),
        }
    }
}

impl fmt::Display for DocFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blueprint => f.write_str("blueprint"),
            Self::OpenApi => f.write_str("openapi"),
        }
    }
}

/// Per-source settings that do not come from the document itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SourceMetadata {
    pub description: Option<String>,
    /// Overrides the base URL declared in the document.
    pub base_url: Option<String>,
    /// Name of the header carrying the API token.
    pub auth_header: Option<String>,
}

/// One raw document handed to the core by whoever fetched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub api_name: String,
    pub format: DocFormat,
    pub content: String,
    pub metadata: SourceMetadata,
}

impl SourceDocument {
    pub fn new(api_name: impl Into<String>, format: DocFormat, content: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            format,
            content: content.into(),
            metadata: SourceMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: SourceMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn from_bytes(
        api_name: impl Into<String>,
        format: DocFormat,
        bytes: Vec<u8>,
    ) -> Result<Self, ParseError> {
        Ok(Self::new(api_name, format, String::from_utf8(bytes)?))
    }
}

/// Something a parser skipped or could only partly understand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// 1-based line number, when the grammar is line oriented.
    pub line: Option<usize>,
    /// Nearest preceding heading, or the document location of the block.
    pub context: String,
    pub message: String,
}

impl Diagnostic {
    pub(crate) fn at_line(line: usize, context: &str, message: impl Into<String>) -> Self {
        Self {
            line: Some(line),
            context: context.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn at(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            line: None,
            context: context.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.context.is_empty()) {
            (Some(line), false) => write!(f, "line {} (under '{}'): {}", line, self.context, self.message),
            (Some(line), true) => write!(f, "line {}: {}", line, self.message),
            (None, false) => write!(f, "{}: {}", self.context, self.message),
            (None, true) => f.write_str(&self.message),
        }
    }
}

/// A parsed catalogue plus everything the parser could not classify.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub catalogue: Catalogue,
    pub diagnostics: Vec<Diagnostic>,
}

impl ParseOutcome {
    /// True when some blocks were skipped and the catalogue may be incomplete.
    pub fn is_degraded(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Parses one source document according to its declared format and applies
/// its configured metadata.
pub fn parse_document(source: &SourceDocument) -> Result<ParseOutcome, ParseError> {
    let mut outcome = match source.format {
        DocFormat::Blueprint => blueprint::parse(&source.api_name, &source.content),
        DocFormat::OpenApi => openapi::parse(&source.api_name, &source.content)?,
    };
    outcome.catalogue = outcome.catalogue.with_metadata(&source.metadata);
    Ok(outcome)
}

/// Per-source result of [`ingest`].
#[derive(Debug)]
pub struct SourceReport {
    pub api_name: String,
    pub format: DocFormat,
    pub endpoint_count: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub error: Option<ParseError>,
}

impl SourceReport {
    pub const fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Catalogues ready for indexing, plus one report per source.
#[derive(Debug, Default)]
pub struct Ingested {
    pub catalogues: Vec<Catalogue>,
    pub reports: Vec<SourceReport>,
}

/// Parses a batch of sources. A source that fails to decode contributes an
/// empty catalogue and a report carrying the error; the rest are unaffected,
/// including other sources for the same API.
pub fn ingest(sources: impl IntoIterator<Item = SourceDocument>) -> Ingested {
    let mut ingested = Ingested::default();

    for source in sources {
        match parse_document(&source) {
            Ok(ParseOutcome {
                catalogue,
                diagnostics,
            }) => {
                if !diagnostics.is_empty() {
                    tracing::warn!(
                        "{} ({}): {} block(s) could not be classified",
                        source.api_name,
                        source.format,
                        diagnostics.len()
                    );
                }
                ingested.reports.push(SourceReport {
                    api_name: source.api_name,
                    format: source.format,
                    endpoint_count: catalogue.len(),
                    diagnostics,
                    error: None,
                });
                ingested.catalogues.push(catalogue);
            }
            Err(e) => {
                tracing::warn!("Failed to parse {} ({}): {}", source.api_name, source.format, e);
                ingested
                    .catalogues
                    .push(Catalogue::empty(&source.api_name).with_metadata(&source.metadata));
                ingested.reports.push(SourceReport {
                    api_name: source.api_name,
                    format: source.format,
                    endpoint_count: 0,
                    diagnostics: Vec::new(),
                    error: Some(e),
                });
            }
        }
    }

    ingested
}

//! Loading raw documentation files from disk.
//!
//! Sources come either from a `sources.toml` manifest or, when there is none,
//! from walking the docs directory and inferring formats from extensions.

use crate::error::Result;
use crate::parser::{DocFormat, SourceDocument, SourceMetadata};
use anyhow::{Context, bail};
use ignore::WalkBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// File name looked up inside the docs directory when no manifest is given.
pub const MANIFEST_FILE: &str = "sources.toml";

/// Parsed `sources.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    #[serde(rename = "source", default)]
    pub sources: Vec<ManifestEntry>,
}

/// One `[[source]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    /// Relative paths resolve against the manifest's directory.
    pub path: PathBuf,
    /// Inferred from the extension when omitted.
    pub format: Option<DocFormat>,
    /// `description`, `base_url` and `auth_header`.
    #[serde(flatten)]
    pub metadata: SourceMetadata,
}

impl Manifest {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse source manifest")
    }
}

/// A file that was found but could not be turned into a [`SourceDocument`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

/// Documents ready for parsing, plus the files that were skipped.
#[derive(Debug, Default)]
pub struct Loaded {
    pub documents: Vec<SourceDocument>,
    pub skipped: Vec<Skipped>,
}

/// Where documentation lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub docs_dir: PathBuf,
    pub manifest: Option<PathBuf>,
}

impl SourceConfig {
    pub fn new(docs_dir: impl Into<PathBuf>) -> Self {
        Self {
            docs_dir: docs_dir.into(),
            manifest: None,
        }
    }

    pub fn with_manifest(mut self, manifest: impl Into<PathBuf>) -> Self {
        self.manifest = Some(manifest.into());
        self
    }

    /// The explicit manifest, or `<docs_dir>/sources.toml`.
    pub fn manifest_path(&self) -> PathBuf {
        self.manifest
            .clone()
            .unwrap_or_else(|| self.docs_dir.join(MANIFEST_FILE))
    }

    /// Reads every configured document.
    ///
    /// A missing or malformed manifest given explicitly is an error, as is a
    /// missing docs directory. Individual unreadable files are only skipped.
    pub fn load(&self) -> Result<Loaded> {
        let manifest_path = self.manifest_path();
        if manifest_path.is_file() {
            return load_manifest(&manifest_path);
        }
        if let Some(explicit) = &self.manifest {
            bail!("Source manifest not found: {}", explicit.display());
        }
        if !self.docs_dir.is_dir() {
            bail!("Docs directory not found: {}", self.docs_dir.display());
        }
        Ok(walk_docs_dir(&self.docs_dir))
    }
}

fn load_manifest(path: &Path) -> Result<Loaded> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let manifest = Manifest::parse(&content).with_context(|| path.display().to_string())?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    tracing::debug!(
        "Manifest {} lists {} sources",
        path.display(),
        manifest.sources.len()
    );

    let mut loaded = Loaded::default();
    for entry in manifest.sources {
        let file = base.join(&entry.path);
        let Some(format) = entry.format.or_else(|| DocFormat::from_path(&file)) else {
            loaded.skip(file, "cannot infer format; set `format` in the manifest");
            continue;
        };
        loaded.read(entry.name, format, file, entry.metadata);
    }
    Ok(loaded)
}

/// Collects every file with a recognized extension, honouring ignore files.
fn walk_docs_dir(dir: &Path) -> Loaded {
    let mut files: Vec<(PathBuf, DocFormat)> = WalkBuilder::new(dir)
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|ty| ty.is_file()))
        .filter_map(|entry| {
            let format = DocFormat::from_path(entry.path())?;
            Some((entry.into_path(), format))
        })
        .collect();

    files.sort_by(|(a, _), (b, _)| a.cmp(b));
    tracing::debug!("Found {} documentation files under {}", files.len(), dir.display());

    let mut loaded = Loaded::default();
    for (path, format) in files {
        let Some(api_name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            loaded.skip(path, "file name is not valid UTF-8");
            continue;
        };
        let api_name = api_name.to_string();
        loaded.read(api_name, format, path, SourceMetadata::default());
    }
    loaded
}

impl Loaded {
    fn skip(&mut self, path: PathBuf, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!("Skipping {}: {}", path.display(), reason);
        self.skipped.push(Skipped { path, reason });
    }

    fn read(&mut self, api_name: String, format: DocFormat, path: PathBuf, metadata: SourceMetadata) {
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => return self.skip(path, e.to_string()),
        };
        match SourceDocument::from_bytes(api_name, format, bytes) {
            Ok(document) => self.documents.push(document.with_metadata(metadata)),
            Err(e) => self.skip(path, e.to_string()),
        }
    }
}

//! Per-API endpoint collections.

use crate::model::Endpoint;
use crate::parser::SourceMetadata;
use indexmap::IndexMap;

/// All endpoints parsed from one source document.
///
/// Immutable once built: a re-parse produces a new catalogue instead of
/// patching this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalogue {
    api_name: String,
    base_url: Option<String>,
    description: Option<String>,
    auth_header: Option<String>,
    endpoints: Vec<Endpoint>,
    /// Section name → endpoint keys, both in first-seen order.
    sections: IndexMap<String, Vec<String>>,
}

impl Catalogue {
    /// Builds a catalogue, collapsing endpoints with the same key.
    ///
    /// A later duplicate replaces the earlier record but keeps its position.
    pub fn new(
        api_name: impl Into<String>,
        base_url: Option<String>,
        endpoints: impl IntoIterator<Item = Endpoint>,
    ) -> Self {
        let api_name = api_name.into();
        let mut by_key: IndexMap<String, Endpoint> = IndexMap::new();
        for endpoint in endpoints {
            let key = endpoint.key();
            if let Some(previous) = by_key.insert(key, endpoint) {
                tracing::debug!(
                    "{}: duplicate endpoint {} {} replaced",
                    api_name,
                    previous.method,
                    previous.path
                );
            }
        }

        let mut sections: IndexMap<String, Vec<String>> = IndexMap::new();
        for (key, endpoint) in &by_key {
            sections
                .entry(endpoint.section.clone())
                .or_default()
                .push(key.clone());
        }

        Self {
            api_name,
            base_url,
            description: None,
            auth_header: None,
            endpoints: by_key.into_values().collect(),
            sections,
        }
    }

    /// Applies configured source metadata. A configured base URL overrides
    /// the one found in the document.
    pub fn with_metadata(mut self, metadata: &SourceMetadata) -> Self {
        if metadata.base_url.is_some() {
            self.base_url.clone_from(&metadata.base_url);
        }
        if metadata.description.is_some() {
            self.description.clone_from(&metadata.description);
        }
        if metadata.auth_header.is_some() {
            self.auth_header.clone_from(&metadata.auth_header);
        }
        self
    }

    /// Combines two catalogues of the same API as if `later` had been
    /// appended to this document: endpoint keys are last-write-wins, section
    /// order stays first-seen, and metadata set by `later` takes precedence.
    pub fn merge(self, later: Self) -> Self {
        let base_url = later.base_url.or(self.base_url);
        let description = later.description.or(self.description);
        let auth_header = later.auth_header.or(self.auth_header);

        let mut merged = Self::new(
            self.api_name,
            base_url,
            self.endpoints.into_iter().chain(later.endpoints),
        );
        merged.description = description;
        merged.auth_header = auth_header;
        merged
    }

    /// An empty catalogue, used for sources that failed to parse.
    pub fn empty(api_name: impl Into<String>) -> Self {
        Self::new(api_name, None, Vec::new())
    }

    pub fn api_name(&self) -> &str {
        &self.api_name
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn auth_header(&self) -> Option<&str> {
        self.auth_header.as_deref()
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn sections(&self) -> &IndexMap<String, Vec<String>> {
        &self.sections
    }

    pub(crate) fn into_endpoints(self) -> Vec<Endpoint> {
        self.endpoints
    }
}

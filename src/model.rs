//! Normalized endpoint records shared by both parsers and the search index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a parameter is carried in the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Body,
}

impl ParamLocation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Body => "body",
        }
    }

    /// Maps an OpenAPI / Swagger `in` value. `formData` travels in the body and
    /// cookies are a header on the wire.
    pub fn from_openapi(value: &str) -> Option<Self> {
        match value {
            "path" => Some(Self::Path),
            "query" => Some(Self::Query),
            "header" | "cookie" => Some(Self::Header),
            "body" | "formData" => Some(Self::Body),
            _ => None,
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One endpoint parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub location: ParamLocation,
    /// Free text, not validated.
    #[serde(rename = "type")]
    pub ty: String,
    pub required: bool,
    pub description: String,
    pub default: Option<String>,
    pub example: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, location: ParamLocation) -> Self {
        Self {
            name: name.into(),
            location,
            ty: "string".to_string(),
            required: false,
            description: String::new(),
            default: None,
            example: None,
        }
    }
}

/// Endpoint fields that contribute text to the index, each with its own weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Method,
    Path,
    Summary,
    Section,
    Description,
    Parameters,
    Examples,
}

/// One documented API operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub api_name: String,
    /// Upper-cased HTTP verb.
    pub method: String,
    /// URI template as written in the source document.
    pub path: String,
    /// Blueprint group or first OpenAPI tag; may be empty.
    pub section: String,
    pub summary: String,
    pub description: String,
    pub parameters: Vec<Parameter>,
    pub request_examples: Vec<String>,
    pub response_examples: Vec<String>,
}

impl Endpoint {
    pub fn new(
        api_name: impl Into<String>,
        method: &str,
        path: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        Self {
            api_name: api_name.into(),
            method: method.to_ascii_uppercase(),
            path: path.into(),
            section: section.into(),
            summary: String::new(),
            description: String::new(),
            parameters: Vec::new(),
            request_examples: Vec::new(),
            response_examples: Vec::new(),
        }
    }

    /// `api_name:METHOD:path`, unique within a catalogue.
    pub fn key(&self) -> String {
        endpoint_key(&self.api_name, &self.method, &self.path)
    }

    /// The searchable text of the endpoint: method, path, summary, section,
    /// description, parameter names and descriptions, and examples, each
    /// fragment tagged with its field so the index can weight it. Empty
    /// fragments are left out. Read once per endpoint when the index is built.
    pub fn fields(&self) -> Vec<(Field, &str)> {
        let mut fields = vec![
            (Field::Method, self.method.as_str()),
            (Field::Path, self.path.as_str()),
            (Field::Summary, self.summary.as_str()),
            (Field::Section, self.section.as_str()),
            (Field::Description, self.description.as_str()),
        ];
        for param in &self.parameters {
            fields.push((Field::Parameters, param.name.as_str()));
            fields.push((Field::Parameters, param.description.as_str()));
        }
        for example in self.request_examples.iter().chain(&self.response_examples) {
            fields.push((Field::Examples, example.as_str()));
        }
        fields.retain(|(_, text)| !text.is_empty());
        fields
    }
}

/// Builds the lookup key for an endpoint without constructing one.
pub fn endpoint_key(api_name: &str, method: &str, path: &str) -> String {
    format!("{}:{}:{}", api_name, method.to_ascii_uppercase(), path)
}

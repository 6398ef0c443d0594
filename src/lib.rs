//! Searchable catalogue of REST API documentation.
//!
//! API Blueprint and OpenAPI / Swagger documents are parsed into one
//! [`Endpoint`] model, grouped per API into [`Catalogue`]s, and indexed for
//! keyword search by [`SearchIndex`]. The binary serves the index as MCP tools.

pub mod catalogue;
pub mod cli;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod parser;
pub mod search;
pub mod server;
pub mod sources;
pub mod state;
pub mod tools;

pub use catalogue::Catalogue;
pub use error::{InvalidQuery, NotFound, ParseError, QueryError, Result};
pub use model::{Endpoint, ParamLocation, Parameter};
pub use parser::{
    DocFormat, Ingested, ParseOutcome, SourceDocument, SourceMetadata, ingest, parse_document,
};
pub use search::{Query, SearchHit, SearchIndex, SectionView};
pub use state::DocState;

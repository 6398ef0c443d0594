//! Keyword search over parsed API catalogues.
//!
//! Endpoints are tokenized field by field, weighted per field, and ranked by a
//! TF-IDF-like score. Listing and lookup operations read the catalogue
//! metadata kept beside the inverted index.

pub(crate) mod index;
pub(crate) mod scoring;
pub(crate) mod tokenize;

pub use index::{ApiInfo, DEFAULT_LIMIT, Query, SearchHit, SearchIndex, SectionSummary, SectionView};
pub use scoring::{FieldWeights, suggest};
pub use tokenize::{query_terms, tokenize};

//! Keyword search over every loaded API.

use crate::format::format_search_results;
use crate::search::{DEFAULT_LIMIT, Query};
use crate::state::DocState;
use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchEndpointsRequest {
    /// Free-text keywords, e.g. "create table" or "storage-api buckets"
    pub query: String,
    /// Only return endpoints of this API (exact, case-sensitive name)
    pub api_filter: Option<String>,
    /// Only return endpoints with this HTTP method (e.g. GET, POST)
    pub method_filter: Option<String>,
    /// Maximum number of results to return (default: 20)
    #[serde(default = "default_limit")]
    pub limit: Option<i64>,
}

#[allow(clippy::unnecessary_wraps)]
const fn default_limit() -> Option<i64> {
    Some(DEFAULT_LIMIT)
}

/// Runs a ranked search. An empty result is `Ok`; a malformed request is `Err`.
pub async fn handle_search_endpoints(
    state: &DocState,
    request: SearchEndpointsRequest,
) -> Result<String, String> {
    let index = state.current().await;

    let query = Query {
        text: &request.query,
        api_filter: request.api_filter.as_deref(),
        method_filter: request.method_filter.as_deref(),
        limit: request.limit.unwrap_or(DEFAULT_LIMIT),
    };
    let hits = index
        .search(&query)
        .map_err(|e| format!("Invalid search request: {}", e))?;

    Ok(format_search_results(&request.query, &hits))
}

//! Full details of one endpoint.

use crate::format::{format_endpoint, format_not_found};
use crate::state::DocState;
use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct EndpointDetailsRequest {
    /// Endpoint key as shown in search results ("api_name:METHOD:path").
    /// Alternatively pass api_name, method and path.
    pub key: Option<String>,
    pub api_name: Option<String>,
    /// HTTP method, case-insensitive
    pub method: Option<String>,
    /// URI template exactly as documented, e.g. /v2/storage/tables/{table_id}
    pub path: Option<String>,
}

pub async fn handle_endpoint_details(
    state: &DocState,
    request: EndpointDetailsRequest,
) -> Result<String, String> {
    let index = state.current().await;

    let found = match request {
        EndpointDetailsRequest { key: Some(key), .. } => index.get_by_key(&key),
        EndpointDetailsRequest {
            api_name: Some(api_name),
            method: Some(method),
            path: Some(path),
            ..
        } => index.get_endpoint(&api_name, &method, &path),
        _ => return Err("Provide either `key` or all of `api_name`, `method` and `path`.".to_string()),
    };
    let endpoint = found.map_err(|e| format_not_found(&e))?;

    Ok(format_endpoint(endpoint, index.api(&endpoint.api_name).ok()))
}

use crate::format::format_api_list;
use crate::state::DocState;

/// Lists every loaded API.
pub async fn handle_list_apis(state: &DocState) -> Result<String, String> {
    let index = state.current().await;
    Ok(format_api_list(index.list_apis()))
}

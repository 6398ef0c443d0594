use crate::format::format_load_summary;
use crate::state::DocState;

/// Re-reads all documentation sources and swaps in a fresh index.
pub async fn handle_reload(state: &DocState) -> Result<String, String> {
    let summary = state
        .reload()
        .await
        .map_err(|e| format!("Reload failed, previous index kept: {:#}", e))?;
    Ok(format_load_summary(&summary))
}

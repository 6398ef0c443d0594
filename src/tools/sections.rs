//! Section listing and browsing.

use crate::format::{format_not_found, format_section, format_sections};
use crate::search::SectionView;
use crate::state::DocState;
use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListSectionsRequest {
    /// API name as shown by list_apis
    pub api_name: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ApiSectionRequest {
    /// API name as shown by list_apis
    pub api_name: String,
    /// Section (group or tag) to show; omit to list all sections
    pub section_name: Option<String>,
}

pub async fn handle_list_sections(
    state: &DocState,
    request: ListSectionsRequest,
) -> Result<String, String> {
    let index = state.current().await;
    let sections = index
        .list_sections(&request.api_name)
        .map_err(|e| format_not_found(&e))?;
    Ok(format_sections(&request.api_name, &sections))
}

pub async fn handle_api_section(
    state: &DocState,
    request: ApiSectionRequest,
) -> Result<String, String> {
    let index = state.current().await;
    let view = index
        .get_section(&request.api_name, request.section_name.as_deref())
        .map_err(|e| format_not_found(&e))?;

    Ok(match view {
        SectionView::All(sections) => format_sections(&request.api_name, &sections),
        SectionView::Section { name, endpoints } => format_section(&request.api_name, name, &endpoints),
    })
}

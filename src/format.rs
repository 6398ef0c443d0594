//! Plain-text rendering of query results.
//!
//! Tool handlers and the one-shot CLI print the same text, so all layout lives
//! here.

use crate::error::NotFound;
use crate::model::Endpoint;
use crate::search::{ApiInfo, SearchHit, SectionSummary};
use crate::state::LoadSummary;
use std::fmt::Write as _;

/// First non-blank line of a possibly multi-line text.
fn first_line(text: &str) -> &str {
    text.lines().map(str::trim).find(|line| !line.is_empty()).unwrap_or("")
}

/// Ranked search hits, one block per endpoint.
pub fn format_search_results(query: &str, hits: &[SearchHit<'_>]) -> String {
    if hits.is_empty() {
        return format!("No endpoints matched '{}'.", query);
    }

    let mut output = format!("Search results for '{}' ({}):\n\n", query, hits.len());
    let max_score = hits.first().map_or(1.0, |hit| hit.score).max(f32::EPSILON);

    for (idx, hit) in hits.iter().enumerate() {
        let endpoint = hit.endpoint;
        let relevance = ((hit.score / max_score) * 100.0).round() as u8;
        let _ = writeln!(
            output,
            "{}. {} {} [{}] - relevance: {}%",
            idx + 1,
            endpoint.method,
            endpoint.path,
            endpoint.api_name,
            relevance
        );
        if !endpoint.summary.is_empty() {
            let _ = writeln!(output, "   {}", endpoint.summary);
        }
        if !endpoint.section.is_empty() {
            let _ = writeln!(output, "   Section: {}", endpoint.section);
        }
        let _ = writeln!(output, "   Key: {}", hit.key);
        output.push('\n');
    }

    output
}

/// Full endpoint record, with base URL and auth header from its API.
pub fn format_endpoint(endpoint: &Endpoint, api: Option<&ApiInfo>) -> String {
    let mut output = format!("{} {}\n", endpoint.method, endpoint.path);
    let _ = writeln!(output, "API: {}", endpoint.api_name);
    if let Some(base_url) = api.and_then(|api| api.base_url.as_deref()) {
        let _ = writeln!(output, "Base URL: {}", base_url);
    }
    if let Some(auth_header) = api.and_then(|api| api.auth_header.as_deref()) {
        let _ = writeln!(output, "Auth header: {}", auth_header);
    }
    if !endpoint.section.is_empty() {
        let _ = writeln!(output, "Section: {}", endpoint.section);
    }
    if !endpoint.summary.is_empty() {
        let _ = writeln!(output, "Summary: {}", endpoint.summary);
    }
    if !endpoint.description.is_empty() {
        let _ = write!(output, "\n{}\n", endpoint.description.trim());
    }

    if !endpoint.parameters.is_empty() {
        output.push_str("\nParameters:\n");
        for param in &endpoint.parameters {
            let required = if param.required { ", required" } else { "" };
            let _ = write!(output, "  - {} ({}, {}{})", param.name, param.location, param.ty, required);
            if !param.description.is_empty() {
                let _ = write!(output, ": {}", param.description);
            }
            if let Some(default) = &param.default {
                let _ = write!(output, " [default: {}]", default);
            }
            if let Some(example) = &param.example {
                let _ = write!(output, " [example: {}]", example);
            }
            output.push('\n');
        }
    }

    for (title, examples) in [
        ("Request example", &endpoint.request_examples),
        ("Response example", &endpoint.response_examples),
    ] {
        for (idx, example) in examples.iter().enumerate() {
            let _ = write!(output, "\n{} {}:\n```\n{}\n```\n", title, idx + 1, example.trim_end());
        }
    }

    output
}

/// Every API with its endpoint count, configured metadata and sections.
pub fn format_api_list<'a>(apis: impl ExactSizeIterator<Item = &'a ApiInfo>) -> String {
    if apis.len() == 0 {
        return "No APIs loaded.".to_string();
    }

    let mut output = format!("APIs ({}):\n\n", apis.len());
    for api in apis {
        let _ = writeln!(output, "{} ({} endpoints)", api.api_name, api.endpoint_count());
        if let Some(description) = &api.description {
            let _ = writeln!(output, "  {}", description);
        }
        if let Some(base_url) = &api.base_url {
            let _ = writeln!(output, "  Base URL: {}", base_url);
        }
        if let Some(auth_header) = &api.auth_header {
            let _ = writeln!(output, "  Auth header: {}", auth_header);
        }
        let named: Vec<&str> = api
            .sections
            .keys()
            .filter(|name| !name.is_empty())
            .map(String::as_str)
            .collect();
        if !named.is_empty() {
            let _ = writeln!(output, "  Sections: {}", named.join(", "));
        }
        output.push('\n');
    }
    output
}

fn section_label(name: &str) -> &str {
    if name.is_empty() { "(no section)" } else { name }
}

/// Section names of one API with endpoint counts.
pub fn format_sections(api_name: &str, sections: &[SectionSummary<'_>]) -> String {
    if sections.is_empty() {
        return format!("API '{}' has no endpoints.", api_name);
    }

    let mut output = format!("Sections in '{}' ({}):\n", api_name, sections.len());
    for section in sections {
        let _ = writeln!(
            output,
            "  - {} ({} endpoints)",
            section_label(section.name),
            section.endpoint_count
        );
    }
    output
}

/// Endpoints of one section with their one-line summaries.
pub fn format_section(api_name: &str, section: &str, endpoints: &[&Endpoint]) -> String {
    let mut output = format!(
        "{} / {} ({} endpoints):\n\n",
        api_name,
        section_label(section),
        endpoints.len()
    );
    for endpoint in endpoints {
        let _ = write!(output, "{} {}", endpoint.method, endpoint.path);
        let summary = first_line(&endpoint.summary);
        if !summary.is_empty() {
            let _ = write!(output, " - {}", summary);
        }
        output.push('\n');
    }
    output
}

/// Not-found message with "did you mean" suggestions when there are any.
pub fn format_not_found(error: &NotFound) -> String {
    let mut output = error.to_string();
    let suggestions = error.suggestions();
    if !suggestions.is_empty() {
        output.push_str(". Did you mean one of these?\n");
        for suggestion in suggestions {
            let _ = writeln!(output, "  - {}", suggestion);
        }
    }
    output
}

/// Per-source parse results, as printed by `check` and `reload_docs`.
pub fn format_load_summary(summary: &LoadSummary) -> String {
    let mut output = format!(
        "Loaded {} endpoints across {} APIs.\n",
        summary.endpoint_count, summary.api_count
    );

    for report in &summary.reports {
        match &report.error {
            Some(error) => {
                let _ = writeln!(output, "  ✗ {} ({}): {}", report.api_name, report.format, error);
            }
            None => {
                let _ = writeln!(
                    output,
                    "  ✓ {} ({}): {} endpoints",
                    report.api_name, report.format, report.endpoint_count
                );
            }
        }
        for diagnostic in &report.diagnostics {
            let _ = writeln!(output, "      warning: {}", diagnostic);
        }
    }

    for skipped in &summary.skipped {
        let _ = writeln!(output, "  ✗ {}: {}", skipped.path.display(), skipped.reason);
    }
    output
}

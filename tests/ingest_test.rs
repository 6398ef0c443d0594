mod common;

use apidocs_mcp::parser::{DocFormat, SourceDocument, ingest};
use apidocs_mcp::state::build_index;
use apidocs_mcp::{ParseError, Query, SearchIndex};
use assert2::{check, let_assert};
use common::{BROKEN_OPENAPI, QUEUE_OPENAPI, STORAGE_BLUEPRINT, TempDocs, sample_docs};
use rstest::rstest;

#[test]
fn malformed_source_does_not_block_others() {
    let ingested = ingest(vec![
        SourceDocument::new("broken", DocFormat::OpenApi, BROKEN_OPENAPI),
        SourceDocument::new("queue", DocFormat::OpenApi, QUEUE_OPENAPI),
    ]);

    let_assert!(Some(ParseError::Json(_)) = &ingested.reports[0].error);
    check!(ingested.reports[1].error.is_none());

    let index = SearchIndex::build(ingested.catalogues);
    let hits = index.search(&Query::new("jobs")).unwrap();
    check!(hits.len() == 3);
    check!(index.list_sections("broken").unwrap().is_empty());
}

#[test]
fn broken_source_keeps_earlier_source_of_same_api() {
    let ingested = ingest(vec![
        SourceDocument::new("Storage API", DocFormat::Blueprint, STORAGE_BLUEPRINT),
        SourceDocument::new("Storage API", DocFormat::OpenApi, BROKEN_OPENAPI),
    ]);
    check!(ingested.reports[1].is_failed());

    let index = SearchIndex::build(ingested.catalogues);
    check!(index.api_count() == 1);
    check!(index.document_count() == 5);
    check!(index.get_endpoint("Storage API", "GET", "/v2/storage/buckets").is_ok());
    check!(!index.search(&Query::new("buckets")).unwrap().is_empty());
}

#[test]
fn sources_sharing_a_name_are_merged() {
    let docs = TempDocs::new();
    docs.create_file("apiary/storage.apib", STORAGE_BLUEPRINT);
    docs.create_file("openapi/queue.yaml", QUEUE_OPENAPI);
    docs.create_file(
        "sources.toml",
        r#"
[[source]]
name = "Keboola"
path = "apiary/storage.apib"
description = "Keboola Connection APIs"
auth_header = "X-StorageApi-Token"

[[source]]
name = "Keboola"
path = "openapi/queue.yaml"
base_url = "https://connection.north-europe.azure.keboola.com"
"#,
    );

    let (index, summary) = build_index(&docs.config()).unwrap();
    check!(!summary.has_failures());
    check!(index.api_count() == 1);
    check!(index.document_count() == 8);
    check!(index.get_endpoint("Keboola", "GET", "/v2/storage/buckets").is_ok());

    let_assert!(Ok(api) = index.api("Keboola"));
    check!(api.description.as_deref() == Some("Keboola Connection APIs"));
    check!(api.auth_header.as_deref() == Some("X-StorageApi-Token"));
    check!(api.base_url.as_deref() == Some("https://connection.north-europe.azure.keboola.com"));
    let sections: Vec<_> = api.sections.keys().map(String::as_str).collect();
    check!(sections == ["Buckets", "Tables", "Jobs"]);
}

#[rstest]
fn broken_file_is_reported_by_check(sample_docs: TempDocs) {
    sample_docs.create_file("broken.json", BROKEN_OPENAPI);

    let (index, summary) = build_index(&sample_docs.config()).unwrap();
    check!(summary.has_failures());
    check!(summary.reports.iter().filter(|r| r.is_failed()).count() == 1);
    check!(summary.endpoint_count == 8);
    check!(index.api_count() == 3);
}

#[test]
fn parsing_twice_yields_equal_catalogues() {
    let sources = || {
        vec![
            SourceDocument::new("storage-api", DocFormat::Blueprint, STORAGE_BLUEPRINT),
            SourceDocument::new("queue", DocFormat::OpenApi, QUEUE_OPENAPI),
        ]
    };

    let first = ingest(sources());
    let second = ingest(sources());
    check!(first.catalogues == second.catalogues);

    for catalogue in &first.catalogues {
        let mut keys: Vec<_> = catalogue.endpoints().iter().map(|e| e.key()).collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        check!(keys.len() == total);
    }
}

#[test]
fn manifest_controls_names() {
    let docs = TempDocs::new();
    docs.create_file("apiary/storage.apib", STORAGE_BLUEPRINT);
    docs.create_file(
        "sources.toml",
        r#"
[[source]]
name = "Storage API"
path = "apiary/storage.apib"
"#,
    );

    let (index, summary) = build_index(&docs.config()).unwrap();
    check!(!summary.has_failures());
    check!(index.get_endpoint("Storage API", "GET", "/v2/storage/buckets").is_ok());
}

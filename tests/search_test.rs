mod common;

use apidocs_mcp::tools::{
    ApiSectionRequest, EndpointDetailsRequest, ListSectionsRequest, SearchEndpointsRequest,
    handle_api_section, handle_endpoint_details, handle_list_apis, handle_list_sections,
    handle_search_endpoints,
};
use assert2::{check, let_assert};
use common::{LoadedDocs, TempDocs, sample_docs};
use rstest::rstest;

fn search(query: &str) -> SearchEndpointsRequest {
    SearchEndpointsRequest {
        query: query.to_string(),
        api_filter: None,
        method_filter: None,
        limit: Some(20),
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn search_spans_both_formats(sample_docs: TempDocs) {
    let loaded = LoadedDocs::load(sample_docs).await;

    let_assert!(Ok(output) = handle_search_endpoints(&loaded.state, search("create")).await);
    check!(output.contains("POST /v2/storage/buckets/{bucket_id}/tables [storage-api]"));
    check!(output.contains("POST /jobs [queue]"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn path_match_ranks_first(sample_docs: TempDocs) {
    let loaded = LoadedDocs::load(sample_docs).await;

    let_assert!(Ok(output) = handle_search_endpoints(&loaded.state, search("buckets")).await);
    let first = output.lines().find(|line| line.starts_with("1. "));
    check!(first.is_some_and(|line| line.contains("/v2/storage/buckets [storage-api]")));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn filters_restrict_results(sample_docs: TempDocs) {
    let loaded = LoadedDocs::load(sample_docs).await;

    let mut request = search("create");
    request.api_filter = Some("queue".to_string());
    let_assert!(Ok(output) = handle_search_endpoints(&loaded.state, request).await);
    check!(output.contains("POST /jobs"));
    check!(!output.contains("storage-api"));

    let mut request = search("buckets");
    request.method_filter = Some("delete".to_string());
    let_assert!(Ok(output) = handle_search_endpoints(&loaded.state, request).await);
    check!(output == "No endpoints matched 'buckets'.");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_api_filter_is_empty_not_error(sample_docs: TempDocs) {
    let loaded = LoadedDocs::load(sample_docs).await;

    let mut request = search("jobs");
    request.api_filter = Some("Queue".to_string());
    let_assert!(Ok(output) = handle_search_endpoints(&loaded.state, request).await);
    check!(output.starts_with("No endpoints matched"));
}

#[rstest]
#[case("", Some(10), "empty query")]
#[case("table", Some(0), "limit must be positive")]
#[case("table", Some(-1), "limit must be positive")]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_requests_are_errors(
    sample_docs: TempDocs,
    #[case] query: &str,
    #[case] limit: Option<i64>,
    #[case] message: &str,
) {
    let loaded = LoadedDocs::load(sample_docs).await;

    let mut request = search(query);
    request.limit = limit;
    let_assert!(Err(error) = handle_search_endpoints(&loaded.state, request).await);
    check!(error.contains(message));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn limit_is_respected(sample_docs: TempDocs) {
    let loaded = LoadedDocs::load(sample_docs).await;

    let mut request = search("create list table jobs buckets");
    request.limit = Some(2);
    let_assert!(Ok(output) = handle_search_endpoints(&loaded.state, request).await);
    check!(output.contains("2. "));
    check!(!output.contains("3. "));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn endpoint_details_by_key_and_parts(sample_docs: TempDocs) {
    let loaded = LoadedDocs::load(sample_docs).await;

    let by_key = EndpointDetailsRequest {
        key: Some("queue:GET:/jobs/{jobId}".to_string()),
        api_name: None,
        method: None,
        path: None,
    };
    let_assert!(Ok(output) = handle_endpoint_details(&loaded.state, by_key).await);
    check!(output.starts_with("GET /jobs/{jobId}\n"));
    check!(output.contains("Base URL: https://queue.keboola.com"));
    check!(output.contains("  - jobId (path, string, required)"));
    check!(output.contains("\"status\": \"success\""));

    let by_parts = EndpointDetailsRequest {
        key: None,
        api_name: Some("storage-api".to_string()),
        method: Some("post".to_string()),
        path: Some("/v2/storage/buckets".to_string()),
    };
    let_assert!(Ok(output) = handle_endpoint_details(&loaded.state, by_parts).await);
    check!(output.contains("Summary: Create Bucket"));
    check!(output.contains("  - name (query, string, required): Bucket name"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn endpoint_lookup_is_exact(sample_docs: TempDocs) {
    let loaded = LoadedDocs::load(sample_docs).await;

    let request = EndpointDetailsRequest {
        key: Some("queue:GET:/job".to_string()),
        api_name: None,
        method: None,
        path: None,
    };
    let_assert!(Err(error) = handle_endpoint_details(&loaded.state, request).await);
    check!(error.contains("endpoint 'queue:GET:/job' not found"));

    let incomplete = EndpointDetailsRequest {
        key: None,
        api_name: Some("queue".to_string()),
        method: None,
        path: Some("/jobs".to_string()),
    };
    check!(handle_endpoint_details(&loaded.state, incomplete).await.is_err());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn list_apis_shows_base_urls_and_sections(sample_docs: TempDocs) {
    let loaded = LoadedDocs::load(sample_docs).await;

    let_assert!(Ok(output) = handle_list_apis(&loaded.state).await);
    check!(output.starts_with("APIs (2):"));
    check!(output.contains("storage-api (5 endpoints)"));
    check!(output.contains("  Base URL: https://connection.keboola.com"));
    check!(output.contains("  Sections: Buckets, Tables"));
    check!(output.contains("queue (3 endpoints)"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sections_listing_and_browsing(sample_docs: TempDocs) {
    let loaded = LoadedDocs::load(sample_docs).await;

    let request = ListSectionsRequest {
        api_name: "storage-api".to_string(),
    };
    let_assert!(Ok(output) = handle_list_sections(&loaded.state, request).await);
    check!(output.contains("  - Buckets (2 endpoints)"));
    check!(output.contains("  - Tables (3 endpoints)"));

    let request = ApiSectionRequest {
        api_name: "storage-api".to_string(),
        section_name: Some("tables".to_string()),
    };
    let_assert!(Ok(output) = handle_api_section(&loaded.state, request).await);
    check!(output.starts_with("storage-api / Tables (3 endpoints):"));
    check!(output.contains("DELETE /v2/storage/tables/{table_id} - Drop Table"));

    let request = ApiSectionRequest {
        api_name: "storage-api".to_string(),
        section_name: None,
    };
    let_assert!(Ok(output) = handle_api_section(&loaded.state, request).await);
    check!(output.starts_with("Sections in 'storage-api' (2):"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_names_suggest_alternatives(sample_docs: TempDocs) {
    let loaded = LoadedDocs::load(sample_docs).await;

    let request = ListSectionsRequest {
        api_name: "storage-apis".to_string(),
    };
    let_assert!(Err(error) = handle_list_sections(&loaded.state, request).await);
    check!(error.contains("API 'storage-apis' not found"));
    check!(error.contains("  - storage-api"));

    let request = ApiSectionRequest {
        api_name: "queue".to_string(),
        section_name: Some("Job".to_string()),
    };
    let_assert!(Err(error) = handle_api_section(&loaded.state, request).await);
    check!(error.contains("section 'Job' not found in API 'queue'"));
    check!(error.contains("  - Jobs"));
}

//! MCP server exposing the documentation tools.

use crate::state::DocState;
use crate::tools::{
    ApiSectionRequest, EndpointDetailsRequest, ListSectionsRequest, SearchEndpointsRequest,
    handle_api_section, handle_endpoint_details, handle_list_apis, handle_list_sections,
    handle_reload, handle_search_endpoints,
};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP server for API documentation queries.
#[derive(Clone)]
pub struct DocsServer {
    state: Arc<DocState>,
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for DocsServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocsServer")
            .field("state", &self.state)
            .finish()
    }
}

#[tool_router]
impl DocsServer {
    pub fn new(state: Arc<DocState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "List every loaded API with its base URL, endpoint count and section names."
    )]
    async fn list_apis(&self) -> std::result::Result<String, String> {
        handle_list_apis(&self.state).await
    }

    #[tool(
        description = "Search API endpoints by keywords. Matches paths, methods, summaries, sections, descriptions, parameters and examples; results are ranked by relevance. Optionally restrict to one API or HTTP method.",
        input_schema = inline_schema_for_type::<SearchEndpointsRequest>()
    )]
    async fn search_endpoints(
        &self,
        Parameters(request): Parameters<SearchEndpointsRequest>,
    ) -> std::result::Result<String, String> {
        handle_search_endpoints(&self.state, request).await
    }

    #[tool(
        description = "Show full documentation of one endpoint: parameters, descriptions and request/response examples. Identify it by the key from search results or by api_name, method and path.",
        input_schema = inline_schema_for_type::<EndpointDetailsRequest>()
    )]
    async fn get_endpoint_details(
        &self,
        Parameters(request): Parameters<EndpointDetailsRequest>,
    ) -> std::result::Result<String, String> {
        handle_endpoint_details(&self.state, request).await
    }

    #[tool(
        description = "List the sections (Blueprint groups or OpenAPI tags) of an API with endpoint counts.",
        input_schema = inline_schema_for_type::<ListSectionsRequest>()
    )]
    async fn list_sections(
        &self,
        Parameters(request): Parameters<ListSectionsRequest>,
    ) -> std::result::Result<String, String> {
        handle_list_sections(&self.state, request).await
    }

    #[tool(
        description = "Show the endpoints of one section of an API. Without a section name, lists all sections.",
        input_schema = inline_schema_for_type::<ApiSectionRequest>()
    )]
    async fn get_api_section(
        &self,
        Parameters(request): Parameters<ApiSectionRequest>,
    ) -> std::result::Result<String, String> {
        handle_api_section(&self.state, request).await
    }

    #[tool(
        description = "Re-read all documentation sources and rebuild the search index. Queries keep using the previous index until the new one is ready."
    )]
    async fn reload_docs(&self) -> std::result::Result<String, String> {
        handle_reload(&self.state).await
    }
}

#[tool_handler]
impl ServerHandler for DocsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "apidocs-mcp: search and browse REST API documentation parsed from API Blueprint \
                 and OpenAPI sources. Start with list_apis or search_endpoints, then use \
                 get_endpoint_details with a key from the results."
                    .to_string(),
            )
    }
}

/// Inline JSON schema for tool parameters.
///
/// Sets `inline_subschemas` so clients render nested types directly instead of
/// following `$ref`s.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let object = match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(object)) => object,
        _ => JsonObject::new(),
    };

    Arc::new(object)
}

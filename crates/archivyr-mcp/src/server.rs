//! MCP server implementation exposing ruleset tools and resources.

use archivyr_core::{Error as StoreFailure, RulesetStore};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::router::tool::ToolRouter,
    model::{
        CallToolResult, Content, Implementation, ListResourcesResult, PaginatedRequestParam,
        ReadResourceRequestParam, ReadResourceResult, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool_handler,
};
use serde::Serialize;
use serde_json::{Value, json};

use crate::resources;

/// MCP server backed by a ruleset store.
#[derive(Clone)]
pub struct RulesetMcpServer {
    /// Store every tool and resource reads from and writes to.
    pub(crate) store: RulesetStore,
    /// Generated router containing all exposed tools.
    pub(crate) tool_router: ToolRouter<Self>,
}

impl RulesetMcpServer {
    /// Create a new server over the provided store.
    #[must_use]
    pub fn new(store: RulesetStore) -> Self {
        Self {
            store,
            tool_router: Self::build_tool_router(),
        }
    }

    /// Runs a blocking store operation on the blocking thread pool.
    pub(crate) async fn run<T, F>(&self, operation: F) -> Result<T, McpError>
    where
        F: FnOnce(&RulesetStore) -> Result<T, StoreFailure> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || operation(&store))
            .await
            .map_err(|error| {
                McpError::internal_error(
                    "ruleset store task failed",
                    Some(json!({ "reason": error.to_string() })),
                )
            })?
            .map_err(Self::store_error)
    }

    /// Maps a store failure onto the closest MCP error.
    pub(crate) fn store_error(error: StoreFailure) -> McpError {
        let message = error.to_string();
        match error {
            StoreFailure::InvalidName(reason) => McpError::invalid_params(
                message,
                Some(json!({ "reason": reason.to_string() })),
            ),
            StoreFailure::EmptyPattern => {
                McpError::invalid_params(message, Some(json!({ "field": "pattern" })))
            }
            StoreFailure::MissingField { name, field } => McpError::invalid_params(
                message,
                Some(json!({ "name": name, "field": field })),
            ),
            StoreFailure::DuplicateName { name, existing } => McpError::invalid_params(
                message,
                Some(json!({ "name": name, "existing": existing })),
            ),
            StoreFailure::NotFound { name, existing } => McpError::resource_not_found(
                message,
                Some(json!({ "name": name, "existing": existing })),
            ),
            StoreFailure::Store(_) => McpError::internal_error(message, None),
        }
    }

    pub(crate) fn serialize<T: Serialize>(value: T, context: &str) -> Result<Value, McpError> {
        serde_json::to_value(value).map_err(|error| {
            McpError::internal_error(
                "failed to serialize response",
                Some(json!({ "context": context, "reason": error.to_string() })),
            )
        })
    }

    pub(crate) fn success(summary: impl Into<String>, data: Value) -> CallToolResult {
        CallToolResult {
            content: vec![Content::text(summary.into())],
            structured_content: Some(data),
            is_error: Some(false),
            meta: None,
        }
    }
}

#[tool_handler]
impl ServerHandler for RulesetMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .build(),
            server_info: Implementation {
                name: "archivyr".to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(
                "Stores AI editor rulesets. Use search_rulesets (pattern '*' lists everything) → \
                 get_ruleset to read one, upsert_ruleset to create or edit, delete_ruleset to \
                 remove. Rulesets are also readable as ruleset://{name} resources."
                    .to_string(),
            ),
            ..ServerInfo::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        resources::list(self).await
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        resources::read(self, &request.uri).await
    }
}

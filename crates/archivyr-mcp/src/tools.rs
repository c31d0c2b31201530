mod editing;
mod query;

use rmcp::{
    ErrorData as McpError, handler::server::wrapper::Parameters, model::CallToolResult, tool,
    tool_router,
};

use crate::server::RulesetMcpServer;

#[tool_router]
impl RulesetMcpServer {
    #[tool(
        description = "Create a new ruleset or update an existing one. For new rulesets, \
                       description and markdown are required. For existing rulesets, only name \
                       is required and other fields are optional updates.",
        annotations(
            title = "Upsert Ruleset",
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = false,
            open_world_hint = false
        )
    )]
    async fn upsert_ruleset(
        &self,
        params: Parameters<editing::UpsertRulesetParams>,
    ) -> Result<CallToolResult, McpError> {
        editing::upsert_ruleset(self, params).await
    }

    #[tool(
        description = "Retrieve a ruleset by exact name, rendered as markdown with a metadata \
                       header",
        annotations(
            title = "Get Ruleset",
            read_only_hint = true,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn get_ruleset(
        &self,
        params: Parameters<query::GetRulesetParams>,
    ) -> Result<CallToolResult, McpError> {
        query::get_ruleset(self, params).await
    }

    #[tool(
        description = "Delete a ruleset by name",
        annotations(
            title = "Delete Ruleset",
            read_only_hint = false,
            destructive_hint = true,
            idempotent_hint = false,
            open_world_hint = false
        )
    )]
    async fn delete_ruleset(
        &self,
        params: Parameters<editing::DeleteRulesetParams>,
    ) -> Result<CallToolResult, McpError> {
        editing::delete_ruleset(self, params).await
    }

    #[tool(
        description = "Search rulesets by glob name pattern ('*' any run, '?' one character). \
                       Omit pattern or use '*' to list all rulesets.",
        annotations(
            title = "Search Rulesets",
            read_only_hint = true,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn search_rulesets(
        &self,
        params: Parameters<query::SearchRulesetsParams>,
    ) -> Result<CallToolResult, McpError> {
        query::search_rulesets(self, params).await
    }

    #[tool(
        description = "List every stored ruleset with its metadata",
        annotations(
            title = "List Rulesets",
            read_only_hint = true,
            idempotent_hint = true,
            open_world_hint = false
        )
    )]
    async fn list_rulesets(&self) -> Result<CallToolResult, McpError> {
        query::list_rulesets(self).await
    }
}

impl RulesetMcpServer {
    pub(crate) fn build_tool_router() -> rmcp::handler::server::router::tool::ToolRouter<Self> {
        Self::tool_router()
    }
}

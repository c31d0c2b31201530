use archivyr_core::{Ruleset, domain::timestamp};
use rmcp::{ErrorData as McpError, handler::server::wrapper::Parameters, model::CallToolResult};
use serde::{Deserialize, Serialize};

use crate::{render, server::RulesetMcpServer};

#[derive(Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetRulesetParams {
    /// Exact ruleset name, e.g. "python_style_guide".
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchRulesetsParams {
    /// Glob pattern (e.g. "*python*", "style_*"). Defaults to "*".
    #[serde(default)]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RulesetDetails {
    /// Ruleset name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Tags in stored order.
    pub tags: Vec<String>,
    /// Markdown content.
    pub markdown: String,
    /// Creation time (RFC 3339).
    pub created_at: String,
    /// Last modification time (RFC 3339).
    pub last_modified: String,
}

impl From<&Ruleset> for RulesetDetails {
    fn from(ruleset: &Ruleset) -> Self {
        Self {
            name: ruleset.name.to_string(),
            description: ruleset.description.clone(),
            tags: ruleset.tags.clone(),
            markdown: ruleset.markdown.clone(),
            created_at: timestamp::format(&ruleset.created_at),
            last_modified: timestamp::format(&ruleset.last_modified),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RulesetSummary {
    /// Ruleset name.
    pub name: String,
    /// Short description.
    pub description: String,
    /// Tags in stored order.
    pub tags: Vec<String>,
    /// Creation time (RFC 3339).
    pub created_at: String,
    /// Last modification time (RFC 3339).
    pub last_modified: String,
}

impl From<&Ruleset> for RulesetSummary {
    fn from(ruleset: &Ruleset) -> Self {
        Self {
            name: ruleset.name.to_string(),
            description: ruleset.description.clone(),
            tags: ruleset.tags.clone(),
            created_at: timestamp::format(&ruleset.created_at),
            last_modified: timestamp::format(&ruleset.last_modified),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchRulesetsResponse {
    /// Pattern that was applied.
    pub pattern: String,
    /// Matching rulesets, in store order.
    pub results: Vec<RulesetSummary>,
}

pub(super) async fn get_ruleset(
    server: &RulesetMcpServer,
    params: Parameters<GetRulesetParams>,
) -> Result<CallToolResult, McpError> {
    let name = params.0.name;
    let ruleset = server.run(move |store| store.get(&name)).await?;

    Ok(RulesetMcpServer::success(
        render::document(&ruleset),
        RulesetMcpServer::serialize(RulesetDetails::from(&ruleset), "get_ruleset response")?,
    ))
}

pub(super) async fn search_rulesets(
    server: &RulesetMcpServer,
    params: Parameters<SearchRulesetsParams>,
) -> Result<CallToolResult, McpError> {
    let pattern = params
        .0
        .pattern
        .filter(|pattern| !pattern.is_empty())
        .unwrap_or_else(|| "*".to_string());

    let rulesets = {
        let pattern = pattern.clone();
        server.run(move |store| store.search(&pattern)).await?
    };

    let summary = render::listing(&rulesets, &pattern);
    let response = SearchRulesetsResponse {
        pattern,
        results: rulesets.iter().map(RulesetSummary::from).collect(),
    };

    Ok(RulesetMcpServer::success(
        summary,
        RulesetMcpServer::serialize(response, "search_rulesets response")?,
    ))
}

pub(super) async fn list_rulesets(server: &RulesetMcpServer) -> Result<CallToolResult, McpError> {
    let rulesets = server.run(|store| store.list()).await?;

    let summary = render::listing(&rulesets, "*");
    let response = SearchRulesetsResponse {
        pattern: "*".to_string(),
        results: rulesets.iter().map(RulesetSummary::from).collect(),
    };

    Ok(RulesetMcpServer::success(
        summary,
        RulesetMcpServer::serialize(response, "list_rulesets response")?,
    ))
}

#[cfg(test)]
mod tests {
    use archivyr_core::NewRuleset;
    use rmcp::model::ErrorCode;
    use serde_json::json;

    use super::*;
    use crate::tools::test_support::{data, server, text};

    fn seeded() -> RulesetMcpServer {
        let server = server();
        for name in [
            "python_style_guide",
            "python_testing_guide",
            "javascript_style_guide",
            "go_conventions",
        ] {
            server
                .store
                .create(NewRuleset {
                    name: name.to_string(),
                    description: format!("About {name}"),
                    tags: vec!["guide".to_string()],
                    markdown: format!("# {name}"),
                })
                .unwrap();
        }
        server
    }

    fn result_names(result: &CallToolResult) -> Vec<String> {
        let mut names: Vec<String> = data(result)["results"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["name"].as_str().unwrap().to_string())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn get_renders_document() {
        let result = get_ruleset(
            &seeded(),
            Parameters(GetRulesetParams {
                name: "go_conventions".to_string(),
            }),
        )
        .await
        .unwrap();

        assert!(text(&result).starts_with("---\nname: go_conventions\n"));
        assert!(text(&result).ends_with("# go_conventions"));
        assert_eq!(data(&result)["tags"], json!(["guide"]));
        assert_eq!(data(&result)["createdAt"], data(&result)["lastModified"]);
    }

    #[tokio::test]
    async fn get_missing_is_resource_not_found() {
        let error = get_ruleset(
            &seeded(),
            Parameters(GetRulesetParams {
                name: "absent".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(error.code, ErrorCode::RESOURCE_NOT_FOUND);
    }

    #[tokio::test]
    async fn get_invalid_name_is_invalid_params() {
        let error = get_ruleset(
            &seeded(),
            Parameters(GetRulesetParams {
                name: "Invalid-Name".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(error.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn search_with_pattern() {
        let result = search_rulesets(
            &seeded(),
            Parameters(SearchRulesetsParams {
                pattern: Some("*_style_guide".to_string()),
            }),
        )
        .await
        .unwrap();

        assert_eq!(
            result_names(&result),
            vec!["javascript_style_guide", "python_style_guide"]
        );
        assert!(text(&result).starts_with("Found 2 ruleset(s) matching '*_style_guide':"));
    }

    #[tokio::test]
    async fn search_defaults_to_everything() {
        for pattern in [None, Some(String::new())] {
            let result = search_rulesets(&seeded(), Parameters(SearchRulesetsParams { pattern }))
                .await
                .unwrap();
            assert_eq!(result_names(&result).len(), 4);
            assert_eq!(data(&result)["pattern"], "*");
            assert!(text(&result).starts_with("Found 4 ruleset(s):"));
        }
    }

    #[tokio::test]
    async fn search_without_matches() {
        let result = search_rulesets(
            &seeded(),
            Parameters(SearchRulesetsParams {
                pattern: Some("nonexistent*".to_string()),
            }),
        )
        .await
        .unwrap();
        assert!(result_names(&result).is_empty());
        assert_eq!(
            text(&result),
            "No rulesets found matching pattern 'nonexistent*'"
        );
    }

    #[tokio::test]
    async fn list_everything() {
        let result = list_rulesets(&seeded()).await.unwrap();
        assert_eq!(result_names(&result).len(), 4);

        let result = list_rulesets(&server()).await.unwrap();
        assert_eq!(text(&result), "No rulesets found");
    }
}

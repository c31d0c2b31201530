use archivyr_core::{RulesetUpdate, UpsertOutcome};
use rmcp::{ErrorData as McpError, handler::server::wrapper::Parameters, model::CallToolResult};
use serde::{Deserialize, Serialize};

use super::query::RulesetDetails;
use crate::server::RulesetMcpServer;

#[derive(Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRulesetParams {
    /// Ruleset name in `snake_case`, e.g. "python_style_guide".
    pub name: String,
    /// Short description. Required when creating.
    #[serde(default)]
    pub description: Option<String>,
    /// Markdown content. Required when creating.
    #[serde(default)]
    pub markdown: Option<String>,
    /// Tags for categorization. Replaces existing tags when given.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteRulesetParams {
    /// Name of the ruleset to delete.
    pub name: String,
}

#[derive(Debug, Clone, Copy, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
enum UpsertStatus {
    Created,
    Updated,
}

#[derive(Debug, Clone, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
struct UpsertRulesetResponse {
    name: String,
    status: UpsertStatus,
    ruleset: RulesetDetails,
}

#[derive(Debug, Clone, Serialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
struct DeleteRulesetResponse {
    name: String,
    deleted: bool,
}

pub(super) async fn upsert_ruleset(
    server: &RulesetMcpServer,
    params: Parameters<UpsertRulesetParams>,
) -> Result<CallToolResult, McpError> {
    let UpsertRulesetParams {
        name,
        description,
        markdown,
        tags,
    } = params.0;
    let update = RulesetUpdate {
        description,
        tags,
        markdown,
    };

    let (status, ruleset) = {
        let name = name.clone();
        server
            .run(move |store| match store.upsert(&name, update)? {
                UpsertOutcome::Created(ruleset) => Ok((UpsertStatus::Created, ruleset)),
                UpsertOutcome::Updated => Ok((UpsertStatus::Updated, store.get(&name)?)),
            })
            .await?
    };

    let verb = match status {
        UpsertStatus::Created => "Created",
        UpsertStatus::Updated => "Updated",
    };
    tracing::info!(%name, "{} ruleset", verb.to_lowercase());

    let response = UpsertRulesetResponse {
        name: name.clone(),
        status,
        ruleset: RulesetDetails::from(&ruleset),
    };

    Ok(RulesetMcpServer::success(
        format!("{verb} ruleset '{name}'"),
        RulesetMcpServer::serialize(response, "upsert_ruleset response")?,
    ))
}

pub(super) async fn delete_ruleset(
    server: &RulesetMcpServer,
    params: Parameters<DeleteRulesetParams>,
) -> Result<CallToolResult, McpError> {
    let name = params.0.name;

    {
        let name = name.clone();
        server.run(move |store| store.delete(&name)).await?;
    }
    tracing::info!(%name, "deleted ruleset");

    let response = DeleteRulesetResponse {
        name: name.clone(),
        deleted: true,
    };

    Ok(RulesetMcpServer::success(
        format!("Deleted ruleset '{name}'"),
        RulesetMcpServer::serialize(response, "delete_ruleset response")?,
    ))
}

#[cfg(test)]
mod tests {
    use rmcp::model::ErrorCode;
    use serde_json::json;

    use super::*;
    use crate::tools::test_support::{data, server, text};

    fn params(name: &str) -> UpsertRulesetParams {
        UpsertRulesetParams {
            name: name.to_string(),
            description: None,
            markdown: None,
            tags: None,
        }
    }

    fn full(name: &str) -> UpsertRulesetParams {
        UpsertRulesetParams {
            description: Some("Python conventions".to_string()),
            markdown: Some("# Python".to_string()),
            tags: Some(vec!["python".to_string(), "style".to_string()]),
            ..params(name)
        }
    }

    #[tokio::test]
    async fn upsert_creates_then_updates() {
        let server = server();

        let created = upsert_ruleset(&server, Parameters(full("python_style")))
            .await
            .unwrap();
        assert_eq!(text(&created), "Created ruleset 'python_style'");
        assert_eq!(data(&created)["status"], "created");
        assert_eq!(data(&created)["ruleset"]["tags"], json!(["python", "style"]));

        let updated = upsert_ruleset(
            &server,
            Parameters(UpsertRulesetParams {
                markdown: Some("# Python 3".to_string()),
                ..params("python_style")
            }),
        )
        .await
        .unwrap();
        assert_eq!(text(&updated), "Updated ruleset 'python_style'");
        assert_eq!(data(&updated)["status"], "updated");
        assert_eq!(data(&updated)["ruleset"]["markdown"], "# Python 3");
        assert_eq!(
            data(&updated)["ruleset"]["description"],
            "Python conventions"
        );
        assert_eq!(data(&updated)["ruleset"]["tags"], json!(["python", "style"]));
    }

    #[tokio::test]
    async fn upsert_create_requires_description_and_markdown() {
        let server = server();

        let error = upsert_ruleset(
            &server,
            Parameters(UpsertRulesetParams {
                markdown: Some("# Python".to_string()),
                ..params("python_style")
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(error.code, ErrorCode::INVALID_PARAMS);
        assert!(error.message.contains("description"));

        let error = upsert_ruleset(
            &server,
            Parameters(UpsertRulesetParams {
                description: Some("Python conventions".to_string()),
                ..params("python_style")
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(error.code, ErrorCode::INVALID_PARAMS);
        assert!(error.message.contains("markdown"));

        assert!(!server.store.exists("python_style").unwrap());
    }

    #[tokio::test]
    async fn upsert_rejects_invalid_name() {
        let error = upsert_ruleset(&server(), Parameters(full("PythonStyle")))
            .await
            .unwrap_err();
        assert_eq!(error.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn delete_existing() {
        let server = server();
        upsert_ruleset(&server, Parameters(full("python_style")))
            .await
            .unwrap();

        let result = delete_ruleset(
            &server,
            Parameters(DeleteRulesetParams {
                name: "python_style".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(text(&result), "Deleted ruleset 'python_style'");
        assert_eq!(data(&result)["deleted"], true);
        assert!(!server.store.exists("python_style").unwrap());
    }

    #[tokio::test]
    async fn delete_missing_lists_existing_names() {
        let server = server();
        upsert_ruleset(&server, Parameters(full("go_rules")))
            .await
            .unwrap();

        let error = delete_ruleset(
            &server,
            Parameters(DeleteRulesetParams {
                name: "python_style".to_string(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(error.code, ErrorCode::RESOURCE_NOT_FOUND);
        assert_eq!(error.data.unwrap()["existing"], json!(["go_rules"]));
    }
}

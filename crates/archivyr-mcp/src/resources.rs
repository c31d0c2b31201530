//! Rulesets exposed as `ruleset://{name}` resources.

use rmcp::{
    ErrorData as McpError,
    model::{AnnotateAble, ListResourcesResult, RawResource, ReadResourceResult, ResourceContents},
};
use serde_json::json;

use crate::{render, server::RulesetMcpServer};

const MIME_TYPE: &str = "text/markdown";

pub(crate) async fn list(server: &RulesetMcpServer) -> Result<ListResourcesResult, McpError> {
    let rulesets = server.run(|store| store.list()).await?;

    let resources = rulesets
        .into_iter()
        .map(|ruleset| {
            let mut resource =
                RawResource::new(render::resource_uri(&ruleset.name), ruleset.name.to_string());
            resource.description = Some(ruleset.description);
            resource.mime_type = Some(MIME_TYPE.to_string());
            resource.no_annotation()
        })
        .collect();

    Ok(ListResourcesResult::with_all_items(resources))
}

pub(crate) async fn read(
    server: &RulesetMcpServer,
    uri: &str,
) -> Result<ReadResourceResult, McpError> {
    let Some(name) = render::name_from_uri(uri) else {
        return Err(McpError::invalid_params(
            format!("invalid URI format: {uri}"),
            Some(json!({ "uri": uri })),
        ));
    };

    let name = name.to_string();
    let ruleset = server.run(move |store| store.get(&name)).await?;

    Ok(ReadResourceResult {
        contents: vec![ResourceContents::text(render::document(&ruleset), uri)],
    })
}

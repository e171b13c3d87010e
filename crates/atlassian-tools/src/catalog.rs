//! The fixed tool catalog: argument validation, dispatch and MCP schemas.
//!
//! One static table maps each tool name to its parameter specs and handler.
//! A dispatch runs validate -> registry lookup -> client call -> normalize,
//! and always returns `{ ...projection, raw }` on success. The catalog holds
//! no client references; handlers reach backends only through the
//! [`ClientRegistry`] passed per call.

use crate::error::{Error, Result};
use crate::normalize;
use crate::registry::ClientRegistry;
use futures::future::BoxFuture;
use reqwest::Method;
use rmcp::model::{Tool, ToolAnnotations};
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Local guard on page-size arguments. Values above this are rejected before
/// any backend call; below it, the backend's own ceiling still applies.
pub const MAX_PAGE_SIZE: u64 = 250;

type Args = Map<String, Value>;
type Handler = for<'a> fn(&'a ClientRegistry, Args) -> BoxFuture<'a, Result<Value>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParamKind {
    String,
    Integer,
    Object,
    Boolean,
}

impl ParamKind {
    fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Object => "object",
            Self::Boolean => "boolean",
        }
    }
}

struct ParamSpec {
    name: &'static str,
    kind: ParamKind,
    required: bool,
    default: Option<Value>,
    max: Option<u64>,
    description: &'static str,
}

impl ParamSpec {
    fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            default: None,
            max: None,
            description,
        }
    }

    fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }

    fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self.required = false;
        self
    }

    fn with_max(mut self, max: u64) -> Self {
        self.max = Some(max);
        self
    }
}

struct ToolSpec {
    name: &'static str,
    description: &'static str,
    /// Semantic HTTP method, used for MCP annotations. `jira_search_issues`
    /// goes over POST on the wire but is annotated as a read.
    method: Method,
    params: Vec<ParamSpec>,
    handler: Handler,
}

pub struct ToolCatalog {
    tools: Vec<ToolSpec>,
}

impl ToolCatalog {
    /// Build the catalog, checking tool and parameter names for uniqueness.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` on a duplicate name (a programming error this
    /// check turns into a startup failure).
    pub fn new() -> Result<Self> {
        let tools = build_specs();
        validate_specs(&tools)?;
        Ok(Self { tools })
    }

    /// The MCP `Tool` descriptors for `tools/list`.
    #[must_use]
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tools
            .iter()
            .map(|t| {
                let schema_obj = build_input_schema(&t.params)
                    .as_object()
                    .cloned()
                    .unwrap_or_default();
                let mut tool = Tool::new(t.name, t.description, Arc::new(schema_obj));
                tool.annotations = Some(annotations_for_method(&t.method));
                tool
            })
            .collect()
    }

    /// Dispatch one tool invocation.
    ///
    /// # Errors
    ///
    /// `Error::Validation` for an unknown tool or bad arguments (the backend
    /// is never contacted); otherwise the handler's error wrapped as
    /// `Error::Operation` carrying the tool name.
    pub async fn call(&self, registry: &ClientRegistry, name: &str, arguments: Args) -> Result<Value> {
        let Some(tool) = self.tools.iter().find(|t| t.name == name) else {
            return Err(Error::Validation(format!("unknown tool: {name}")));
        };

        let args = validate_arguments(tool, arguments)?;
        debug!(tool = tool.name, "dispatching tool call");

        match (tool.handler)(registry, args).await {
            Ok(value) => Ok(value),
            Err(e) => {
                let e = e.for_operation(tool.name);
                warn!(tool = tool.name, error = %e, "tool call failed");
                Err(e)
            }
        }
    }
}

fn validate_specs(tools: &[ToolSpec]) -> Result<()> {
    let mut names: HashSet<&str> = HashSet::new();
    for tool in tools {
        if !names.insert(tool.name) {
            return Err(Error::Config(format!(
                "duplicate tool name in catalog: {}",
                tool.name
            )));
        }
        let mut params: HashSet<&str> = HashSet::new();
        for param in &tool.params {
            if !params.insert(param.name) {
                return Err(Error::Config(format!(
                    "duplicate parameter '{}' in tool '{}'",
                    param.name, tool.name
                )));
            }
        }
    }
    Ok(())
}

/// Check the provided arguments against the parameter specs and return the
/// effective argument map with defaults merged in.
///
/// Rules: required parameters must be present and non-null; strings must be
/// non-empty where required (empty optional strings are treated as absent);
/// integers must be non-negative and within the parameter's bound; unknown
/// extra arguments are ignored.
fn validate_arguments(tool: &ToolSpec, mut provided: Args) -> Result<Args> {
    let mut out = Args::new();

    for param in &tool.params {
        let value = provided
            .remove(param.name)
            .filter(|v| !v.is_null())
            .or_else(|| param.default.clone());

        let Some(value) = value else {
            if param.required {
                return Err(Error::Validation(format!(
                    "missing required argument: {}",
                    param.name
                )));
            }
            continue;
        };

        match param.kind {
            ParamKind::String => {
                let Some(s) = value.as_str() else {
                    return Err(Error::Validation(format!(
                        "argument '{}' must be a string",
                        param.name
                    )));
                };
                if s.trim().is_empty() {
                    if param.required {
                        return Err(Error::Validation(format!(
                            "argument '{}' must be a non-empty string",
                            param.name
                        )));
                    }
                    continue;
                }
            }
            ParamKind::Integer => {
                let Some(n) = value.as_u64() else {
                    return Err(Error::Validation(format!(
                        "argument '{}' must be a non-negative integer",
                        param.name
                    )));
                };
                if let Some(max) = param.max
                    && n > max
                {
                    return Err(Error::Validation(format!(
                        "argument '{}' must be at most {max}",
                        param.name
                    )));
                }
            }
            ParamKind::Object => {
                if !value.is_object() {
                    return Err(Error::Validation(format!(
                        "argument '{}' must be an object",
                        param.name
                    )));
                }
            }
            ParamKind::Boolean => {
                if !value.is_boolean() {
                    return Err(Error::Validation(format!(
                        "argument '{}' must be a boolean",
                        param.name
                    )));
                }
            }
        }

        out.insert(param.name.to_string(), value);
    }

    Ok(out)
}

fn build_input_schema(params: &[ParamSpec]) -> Value {
    let mut properties = json!({});
    let mut required: Vec<String> = Vec::new();

    for param in params {
        let mut prop = json!({
            "type": param.kind.json_type(),
            "description": param.description,
        });
        if let Some(default) = &param.default {
            prop["default"] = default.clone();
        }
        properties[param.name] = prop;

        if param.required && param.default.is_none() {
            required.push(param.name.to_string());
        }
    }

    let mut schema = json!({
        "type": "object",
        "properties": properties,
    });
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}

/// MCP tool annotations from RFC 9110-style method semantics. All tools talk
/// to an external system, so `openWorldHint` is always set.
fn annotations_for_method(method: &Method) -> ToolAnnotations {
    let open_world_hint = Some(true);

    if method == Method::GET {
        return ToolAnnotations {
            title: None,
            read_only_hint: Some(true),
            destructive_hint: Some(false),
            idempotent_hint: Some(true),
            open_world_hint,
        };
    }
    if method == Method::POST {
        return ToolAnnotations {
            title: None,
            read_only_hint: Some(false),
            destructive_hint: Some(false),
            idempotent_hint: Some(false),
            open_world_hint,
        };
    }
    if method == Method::DELETE {
        return ToolAnnotations {
            title: None,
            read_only_hint: Some(false),
            destructive_hint: Some(true),
            idempotent_hint: Some(true),
            open_world_hint,
        };
    }

    ToolAnnotations {
        title: None,
        read_only_hint: None,
        destructive_hint: None,
        idempotent_hint: None,
        open_world_hint,
    }
}

// ---- argument accessors (run after validation) ----

fn required_str<'a>(args: &'a Args, name: &str) -> Result<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::Validation(format!("missing required argument: {name}")))
}

fn opt_str<'a>(args: &'a Args, name: &str) -> Option<&'a str> {
    args.get(name).and_then(Value::as_str)
}

fn int_arg(args: &Args, name: &str, fallback: u64) -> u64 {
    args.get(name).and_then(Value::as_u64).unwrap_or(fallback)
}

fn bool_arg(args: &Args, name: &str, fallback: bool) -> bool {
    args.get(name).and_then(Value::as_bool).unwrap_or(fallback)
}

fn opt_object<'a>(args: &'a Args, name: &str) -> Option<&'a Map<String, Value>> {
    args.get(name).and_then(Value::as_object)
}

/// Attach the unmodified upstream payload under `raw`.
fn with_raw(mut projection: Value, raw: Value) -> Value {
    if let Some(map) = projection.as_object_mut() {
        map.insert("raw".to_string(), raw);
    }
    projection
}

fn raw_field(raw: &Value, key: &str) -> Value {
    raw.get(key).cloned().unwrap_or(Value::Null)
}

// ---- Confluence handlers ----

fn confluence_get_page(registry: &ClientRegistry, args: Args) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let page_id = required_str(&args, "page_id")?.to_string();
        let client = registry.confluence()?;
        let raw = client
            .get_page(&page_id)
            .await
            .map_err(|e| e.not_found_context(format!("page '{page_id}'")))?;
        Ok(with_raw(normalize::page_detail(&raw), raw))
    })
}

fn confluence_search_pages(registry: &ClientRegistry, args: Args) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let cql = required_str(&args, "cql")?.to_string();
        let limit = int_arg(&args, "limit", 25);
        let start = int_arg(&args, "start", 0);
        let client = registry.confluence()?;
        let raw = client.search_pages(&cql, limit, start).await?;

        let results: Vec<Value> = raw
            .get("results")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(normalize::page_summary).collect())
            .unwrap_or_default();

        Ok(json!({
            "size": raw_field(&raw, "size"),
            "limit": raw_field(&raw, "limit"),
            "results": results,
            "raw": raw,
        }))
    })
}

fn confluence_get_spaces(registry: &ClientRegistry, args: Args) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let limit = int_arg(&args, "limit", 100);
        let start = int_arg(&args, "start", 0);
        let client = registry.confluence()?;
        let raw = client.get_spaces(limit, start).await?;

        let spaces: Vec<Value> = raw
            .get("results")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(normalize::space_summary).collect())
            .unwrap_or_default();

        Ok(json!({
            "size": raw_field(&raw, "size"),
            "limit": raw_field(&raw, "limit"),
            "total": spaces.len(),
            "spaces": spaces,
            "raw": raw,
        }))
    })
}

fn confluence_create_page(registry: &ClientRegistry, args: Args) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let space_key = required_str(&args, "space_key")?.to_string();
        let title = required_str(&args, "title")?.to_string();
        let body_storage = required_str(&args, "body_storage")?.to_string();
        let parent = opt_str(&args, "parent_page_id").map(str::to_string);
        let client = registry.confluence()?;
        let raw = client
            .create_page(&space_key, &title, &body_storage, parent.as_deref())
            .await?;
        Ok(with_raw(normalize::created_page(&raw), raw))
    })
}

fn confluence_create_space(registry: &ClientRegistry, args: Args) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let key = required_str(&args, "key")?.to_string();
        let name = required_str(&args, "name")?.to_string();
        let description = opt_str(&args, "description").map(str::to_string);
        let space_type = opt_str(&args, "space_type").unwrap_or("global").to_string();
        let client = registry.confluence()?;
        let raw = client
            .create_space(&key, &name, description.as_deref(), &space_type)
            .await?;
        Ok(with_raw(normalize::created_space(&raw), raw))
    })
}

fn confluence_add_comment(registry: &ClientRegistry, args: Args) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let page_id = required_str(&args, "page_id")?.to_string();
        let body_storage = required_str(&args, "body_storage")?.to_string();
        let client = registry.confluence()?;
        let raw = client
            .add_comment(&page_id, &body_storage)
            .await
            .map_err(|e| e.not_found_context(format!("page '{page_id}'")))?;
        Ok(with_raw(normalize::page_comment(&raw), raw))
    })
}

fn confluence_delete_page(registry: &ClientRegistry, args: Args) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let page_id = required_str(&args, "page_id")?.to_string();
        let status = opt_str(&args, "status").unwrap_or("current").to_string();
        let client = registry.confluence()?;
        let raw = client
            .delete_page(&page_id, &status)
            .await
            .map_err(|e| e.not_found_context(format!("page '{page_id}'")))?;
        Ok(json!({
            "id": page_id,
            "status": "deleted",
            "delete_status_param": status,
            "raw": raw,
        }))
    })
}

fn confluence_delete_space(registry: &ClientRegistry, args: Args) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let key = required_str(&args, "key")?.to_string();
        let client = registry.confluence()?;
        let raw = client
            .delete_space(&key)
            .await
            .map_err(|e| e.not_found_context(format!("space '{key}'")))?;
        Ok(json!({
            "key": key,
            "deleted": true,
            "raw": raw,
        }))
    })
}

// ---- Jira handlers ----

fn jira_get_issue(registry: &ClientRegistry, args: Args) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let issue_key = required_str(&args, "issue_key")?.to_string();
        let fields = opt_str(&args, "fields").map(str::to_string);
        let client = registry.jira()?;
        let raw = client
            .get_issue(&issue_key, fields.as_deref())
            .await
            .map_err(|e| e.not_found_context(format!("issue '{issue_key}'")))?;
        Ok(with_raw(normalize::issue_detail(&raw), raw))
    })
}

fn jira_search_issues(registry: &ClientRegistry, args: Args) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let jql = required_str(&args, "jql")?.to_string();
        let max_results = int_arg(&args, "max_results", 50);
        let start_at = int_arg(&args, "start_at", 0);
        let client = registry.jira()?;
        let raw = client.search_issues(&jql, max_results, start_at).await?;

        let issues: Vec<Value> = raw
            .get("issues")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(normalize::issue_summary).collect())
            .unwrap_or_default();

        Ok(json!({
            "total": raw_field(&raw, "total"),
            "max_results": raw_field(&raw, "maxResults"),
            "start_at": raw_field(&raw, "startAt"),
            "issues": issues,
            "raw": raw,
        }))
    })
}

fn jira_create_issue(registry: &ClientRegistry, args: Args) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let project_key = required_str(&args, "project_key")?.to_string();
        let issue_type = required_str(&args, "issue_type")?.to_string();
        let summary = required_str(&args, "summary")?.to_string();
        let description = opt_str(&args, "description").map(str::to_string);
        let extra_fields = opt_object(&args, "extra_fields").cloned();
        let client = registry.jira()?;
        let raw = client
            .create_issue(
                &project_key,
                &issue_type,
                &summary,
                description.as_deref(),
                extra_fields.as_ref(),
            )
            .await?;
        Ok(with_raw(normalize::created_ref(&raw), raw))
    })
}

fn jira_add_comment(registry: &ClientRegistry, args: Args) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let issue_key = required_str(&args, "issue_key")?.to_string();
        let body = required_str(&args, "body")?.to_string();
        let client = registry.jira()?;
        let raw = client
            .add_comment(&issue_key, &body)
            .await
            .map_err(|e| e.not_found_context(format!("issue '{issue_key}'")))?;
        Ok(with_raw(normalize::issue_comment(&raw), raw))
    })
}

fn jira_delete_issue(registry: &ClientRegistry, args: Args) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let issue_key = required_str(&args, "issue_key")?.to_string();
        let delete_subtasks = bool_arg(&args, "delete_subtasks", false);
        let client = registry.jira()?;
        let raw = client
            .delete_issue(&issue_key, delete_subtasks)
            .await
            .map_err(|e| e.not_found_context(format!("issue '{issue_key}'")))?;
        Ok(json!({
            "key": issue_key,
            "deleted": true,
            "delete_subtasks": delete_subtasks,
            "raw": raw,
        }))
    })
}

fn jira_create_project(registry: &ClientRegistry, args: Args) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let key = required_str(&args, "key")?.to_string();
        let name = required_str(&args, "name")?.to_string();
        let project_type_key = required_str(&args, "project_type_key")?.to_string();
        let lead = required_str(&args, "lead")?.to_string();
        let description = opt_str(&args, "description").map(str::to_string);
        let extra_fields = opt_object(&args, "extra_fields").cloned();
        let client = registry.jira()?;
        let raw = client
            .create_project(
                &key,
                &name,
                &project_type_key,
                &lead,
                description.as_deref(),
                extra_fields.as_ref(),
            )
            .await?;
        Ok(with_raw(normalize::created_ref(&raw), raw))
    })
}

fn jira_delete_project(registry: &ClientRegistry, args: Args) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let key = required_str(&args, "key")?.to_string();
        let client = registry.jira()?;
        let raw = client
            .delete_project(&key)
            .await
            .map_err(|e| e.not_found_context(format!("project '{key}'")))?;
        Ok(json!({
            "key": key,
            "deleted": true,
            "raw": raw,
        }))
    })
}

fn jira_get_createmeta(registry: &ClientRegistry, args: Args) -> BoxFuture<'_, Result<Value>> {
    Box::pin(async move {
        let project_key = required_str(&args, "project_key")?.to_string();
        let issue_type_name = opt_str(&args, "issue_type_name").map(str::to_string);
        let client = registry.jira()?;
        let raw = client
            .get_createmeta(&project_key, issue_type_name.as_deref())
            .await
            .map_err(|e| e.not_found_context(format!("project '{project_key}'")))?;
        Ok(json!({
            "projects": normalize::createmeta_projects(&raw),
            "raw": raw,
        }))
    })
}

#[allow(clippy::too_many_lines)]
fn build_specs() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            name: "confluence_get_page",
            description: "Get a Confluence page by ID. Returns basic metadata plus the full storage-format body.",
            method: Method::GET,
            params: vec![ParamSpec::required(
                "page_id",
                ParamKind::String,
                "Confluence content ID of the page",
            )],
            handler: confluence_get_page,
        },
        ToolSpec {
            name: "confluence_search_pages",
            description: "Search Confluence content via CQL, e.g. space = \"ENG\" AND type = \"page\" AND title ~ \"Karpenter\". The CQL string is passed through uninterpreted.",
            method: Method::GET,
            params: vec![
                ParamSpec::required("cql", ParamKind::String, "CQL query string"),
                ParamSpec::optional("limit", ParamKind::Integer, "Page size (backend may truncate further)")
                    .with_default(json!(25))
                    .with_max(MAX_PAGE_SIZE),
                ParamSpec::optional("start", ParamKind::Integer, "Result offset").with_default(json!(0)),
            ],
            handler: confluence_search_pages,
        },
        ToolSpec {
            name: "confluence_get_spaces",
            description: "List Confluence spaces visible to the configured user.",
            method: Method::GET,
            params: vec![
                ParamSpec::optional("limit", ParamKind::Integer, "Page size (backend may truncate further)")
                    .with_default(json!(100))
                    .with_max(MAX_PAGE_SIZE),
                ParamSpec::optional("start", ParamKind::Integer, "Result offset").with_default(json!(0)),
            ],
            handler: confluence_get_spaces,
        },
        ToolSpec {
            name: "confluence_create_page",
            description: "Create a Confluence page (storage format). WARNING: actually creates content; not idempotent, a blind retry creates a duplicate page.",
            method: Method::POST,
            params: vec![
                ParamSpec::required("space_key", ParamKind::String, "Key of the target space"),
                ParamSpec::required("title", ParamKind::String, "Page title"),
                ParamSpec::required("body_storage", ParamKind::String, "Page body in Confluence storage format"),
                ParamSpec::optional("parent_page_id", ParamKind::String, "Optional parent page ID"),
            ],
            handler: confluence_create_page,
        },
        ToolSpec {
            name: "confluence_create_space",
            description: "Create a Confluence space. WARNING: actually creates a space; not idempotent.",
            method: Method::POST,
            params: vec![
                ParamSpec::required("key", ParamKind::String, "Space key"),
                ParamSpec::required("name", ParamKind::String, "Space name"),
                ParamSpec::optional("description", ParamKind::String, "Plain-text space description"),
                ParamSpec::optional("space_type", ParamKind::String, "Space type").with_default(json!("global")),
            ],
            handler: confluence_create_space,
        },
        ToolSpec {
            name: "confluence_add_comment",
            description: "Add a storage-format comment to a Confluence page. Not idempotent.",
            method: Method::POST,
            params: vec![
                ParamSpec::required("page_id", ParamKind::String, "Confluence content ID of the page"),
                ParamSpec::required("body_storage", ParamKind::String, "Comment body in storage format"),
            ],
            handler: confluence_add_comment,
        },
        ToolSpec {
            name: "confluence_delete_page",
            description: "Delete a Confluence page by ID. WARNING: depending on configuration the page may be trashed or removed permanently.",
            method: Method::DELETE,
            params: vec![
                ParamSpec::required("page_id", ParamKind::String, "Confluence content ID of the page"),
                ParamSpec::optional("status", ParamKind::String, "Which page status to delete").with_default(json!("current")),
            ],
            handler: confluence_delete_page,
        },
        ToolSpec {
            name: "confluence_delete_space",
            description: "Delete a Confluence space by key. WARNING: may remove the space permanently.",
            method: Method::DELETE,
            params: vec![ParamSpec::required("key", ParamKind::String, "Space key")],
            handler: confluence_delete_space,
        },
        ToolSpec {
            name: "jira_get_issue",
            description: "Get a Jira issue by key. `fields` is an optional comma-separated projection, e.g. \"summary,status,assignee\".",
            method: Method::GET,
            params: vec![
                ParamSpec::required("issue_key", ParamKind::String, "Issue key, e.g. ENG-123"),
                ParamSpec::optional("fields", ParamKind::String, "Comma-separated field list"),
            ],
            handler: jira_get_issue,
        },
        ToolSpec {
            name: "jira_search_issues",
            description: "Search Jira issues by JQL, e.g. project = ENG AND statusCategory != Done ORDER BY created DESC. The JQL string is passed through uninterpreted.",
            method: Method::GET,
            params: vec![
                ParamSpec::required("jql", ParamKind::String, "JQL query string"),
                ParamSpec::optional("max_results", ParamKind::Integer, "Page size (backend may truncate further)")
                    .with_default(json!(50))
                    .with_max(MAX_PAGE_SIZE),
                ParamSpec::optional("start_at", ParamKind::Integer, "Result offset").with_default(json!(0)),
            ],
            handler: jira_search_issues,
        },
        ToolSpec {
            name: "jira_create_issue",
            description: "Create a Jira issue. `extra_fields` entries override the base fields (customfield_* allowed). WARNING: not idempotent, a blind retry creates a duplicate issue.",
            method: Method::POST,
            params: vec![
                ParamSpec::required("project_key", ParamKind::String, "Key of the target project"),
                ParamSpec::required("issue_type", ParamKind::String, "Issue type name, e.g. Bug"),
                ParamSpec::required("summary", ParamKind::String, "Issue summary"),
                ParamSpec::optional("description", ParamKind::String, "Issue description"),
                ParamSpec::optional("extra_fields", ParamKind::Object, "Additional Jira fields merged over the base payload"),
            ],
            handler: jira_create_issue,
        },
        ToolSpec {
            name: "jira_add_comment",
            description: "Add a comment to a Jira issue. Not idempotent.",
            method: Method::POST,
            params: vec![
                ParamSpec::required("issue_key", ParamKind::String, "Issue key, e.g. ENG-123"),
                ParamSpec::required("body", ParamKind::String, "Comment body"),
            ],
            handler: jira_add_comment,
        },
        ToolSpec {
            name: "jira_delete_issue",
            description: "Delete a Jira issue by key. WARNING: actually deletes the issue.",
            method: Method::DELETE,
            params: vec![
                ParamSpec::required("issue_key", ParamKind::String, "Issue key, e.g. ENG-123"),
                ParamSpec::optional("delete_subtasks", ParamKind::Boolean, "Also delete all subtasks").with_default(json!(false)),
            ],
            handler: jira_delete_issue,
        },
        ToolSpec {
            name: "jira_create_project",
            description: "Create a Jira project. The caller must pass a type/template/lead combination valid for the target instance. WARNING: not idempotent.",
            method: Method::POST,
            params: vec![
                ParamSpec::required("key", ParamKind::String, "Project key"),
                ParamSpec::required("name", ParamKind::String, "Project name"),
                ParamSpec::required("project_type_key", ParamKind::String, "Project type key, e.g. software"),
                ParamSpec::required("lead", ParamKind::String, "Username of the project lead"),
                ParamSpec::optional("description", ParamKind::String, "Project description"),
                ParamSpec::optional("extra_fields", ParamKind::Object, "Additional project fields merged over the base payload"),
            ],
            handler: jira_create_project,
        },
        ToolSpec {
            name: "jira_delete_project",
            description: "Delete a Jira project by key or ID. WARNING: actually deletes the project.",
            method: Method::DELETE,
            params: vec![ParamSpec::required("key", ParamKind::String, "Project key or ID")],
            handler: jira_delete_project,
        },
        ToolSpec {
            name: "jira_get_createmeta",
            description: "Get Jira create metadata for a project (and optionally one issue type): which fields are required and what values they allow.",
            method: Method::GET,
            params: vec![
                ParamSpec::required("project_key", ParamKind::String, "Key of the project"),
                ParamSpec::optional("issue_type_name", ParamKind::String, "Restrict to one issue type name"),
            ],
            handler: jira_get_createmeta,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use std::time::Duration;

    fn spec(name: &str) -> ToolSpec {
        build_specs()
            .into_iter()
            .find(|t| t.name == name)
            .expect("tool exists")
    }

    fn dead_registry() -> ClientRegistry {
        let cfg = BackendConfig::new("http://127.0.0.1:1", "bot", "t0ken").expect("config");
        ClientRegistry::with_configs(cfg.clone(), cfg, Duration::from_secs(1))
    }

    #[test]
    fn catalog_builds_with_unique_names() {
        let catalog = ToolCatalog::new().expect("catalog");
        assert_eq!(catalog.tools.len(), 16);
    }

    #[test]
    fn validate_specs_rejects_duplicate_tool_names() {
        let dup = vec![spec("confluence_get_page"), spec("confluence_get_page")];
        let err = validate_specs(&dup).unwrap_err();
        assert!(err.to_string().contains("duplicate tool name"));
    }

    #[test]
    fn input_schema_has_required_and_defaults() {
        let t = spec("confluence_search_pages");
        let schema = build_input_schema(&t.params);

        let required = schema
            .get("required")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        assert!(required.contains(&json!("cql")));
        assert!(!required.contains(&json!("limit")));

        assert_eq!(schema["properties"]["limit"]["default"], json!(25));
        assert_eq!(schema["properties"]["limit"]["type"], "integer");
    }

    #[test]
    fn annotations_follow_method_semantics() {
        let catalog = ToolCatalog::new().expect("catalog");
        let tools = catalog.list_tools();

        let get = tools
            .iter()
            .find(|t| t.name == "confluence_get_page")
            .and_then(|t| t.annotations.as_ref())
            .expect("annotations");
        assert_eq!(get.read_only_hint, Some(true));
        assert_eq!(get.idempotent_hint, Some(true));

        let create = tools
            .iter()
            .find(|t| t.name == "jira_create_issue")
            .and_then(|t| t.annotations.as_ref())
            .expect("annotations");
        assert_eq!(create.read_only_hint, Some(false));
        assert_eq!(create.idempotent_hint, Some(false));

        let delete = tools
            .iter()
            .find(|t| t.name == "confluence_delete_page")
            .and_then(|t| t.annotations.as_ref())
            .expect("annotations");
        assert_eq!(delete.destructive_hint, Some(true));

        // Search goes over POST on the wire but is a read.
        let search = tools
            .iter()
            .find(|t| t.name == "jira_search_issues")
            .and_then(|t| t.annotations.as_ref())
            .expect("annotations");
        assert_eq!(search.read_only_hint, Some(true));
    }

    #[test]
    fn validation_rejects_missing_required_argument() {
        let t = spec("confluence_search_pages");
        let err = validate_arguments(&t, Args::new()).unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("cql"));
    }

    #[test]
    fn validation_rejects_empty_required_string() {
        let t = spec("confluence_get_page");
        let mut args = Args::new();
        args.insert("page_id".to_string(), json!("  "));
        let err = validate_arguments(&t, args).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn validation_rejects_negative_and_oversized_integers() {
        let t = spec("confluence_search_pages");

        let mut args = Args::new();
        args.insert("cql".to_string(), json!("type = page"));
        args.insert("limit".to_string(), json!(-1));
        assert!(validate_arguments(&t, args).unwrap_err().is_validation());

        let mut args = Args::new();
        args.insert("cql".to_string(), json!("type = page"));
        args.insert("limit".to_string(), json!(MAX_PAGE_SIZE + 1));
        assert!(validate_arguments(&t, args).unwrap_err().is_validation());
    }

    #[test]
    fn validation_applies_defaults_and_drops_nulls() {
        let t = spec("confluence_search_pages");
        let mut args = Args::new();
        args.insert("cql".to_string(), json!("type = page"));
        args.insert("start".to_string(), Value::Null);
        let out = validate_arguments(&t, args).expect("valid");
        assert_eq!(out["limit"], json!(25));
        assert_eq!(out["start"], json!(0));
    }

    #[test]
    fn validation_accepts_limit_zero() {
        let t = spec("confluence_search_pages");
        let mut args = Args::new();
        args.insert("cql".to_string(), json!("type = page"));
        args.insert("limit".to_string(), json!(0));
        let out = validate_arguments(&t, args).expect("valid");
        assert_eq!(out["limit"], json!(0));
    }

    #[test]
    fn validation_rejects_wrong_shapes() {
        let t = spec("jira_create_issue");
        let mut args = Args::new();
        args.insert("project_key".to_string(), json!("ENG"));
        args.insert("issue_type".to_string(), json!("Bug"));
        args.insert("summary".to_string(), json!("s"));
        args.insert("extra_fields".to_string(), json!("not-an-object"));
        assert!(validate_arguments(&t, args).unwrap_err().is_validation());
    }

    #[test]
    fn validation_ignores_unknown_arguments() {
        let t = spec("confluence_get_page");
        let mut args = Args::new();
        args.insert("page_id".to_string(), json!("1"));
        args.insert("bogus".to_string(), json!(true));
        let out = validate_arguments(&t, args).expect("valid");
        assert!(!out.contains_key("bogus"));
    }

    #[tokio::test]
    async fn unknown_tool_is_a_validation_error() {
        let catalog = ToolCatalog::new().expect("catalog");
        let registry = dead_registry();
        let err = catalog
            .call(&registry, "trello_get_boards", Args::new())
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("trello_get_boards"));
    }
}

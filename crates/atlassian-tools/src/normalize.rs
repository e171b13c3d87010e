//! Pure projections from raw backend JSON to stable minimal shapes.
//!
//! Every function here is total: missing or malformed upstream structure
//! degrades to `null`, never to a panic or an omitted key, so consumers can
//! rely on key presence (but never on value presence). Dispatch attaches the
//! unmodified raw payload separately under `raw`.

use serde_json::{Value, json};

/// Nullable extraction by JSON pointer: `/a/b` -> `raw.a.b` or `null`.
fn field(raw: &Value, pointer: &str) -> Value {
    raw.pointer(pointer).cloned().unwrap_or(Value::Null)
}

/// Search-result projection of a Confluence content item.
#[must_use]
pub fn page_summary(item: &Value) -> Value {
    json!({
        "id": field(item, "/id"),
        "title": field(item, "/title"),
        "space": field(item, "/space/key"),
        "version": field(item, "/version/number"),
        "status": field(item, "/status"),
        "type": field(item, "/type"),
        "url": field(item, "/_links/self"),
    })
}

/// Full-page projection including the storage body.
#[must_use]
pub fn page_detail(raw: &Value) -> Value {
    json!({
        "id": field(raw, "/id"),
        "title": field(raw, "/title"),
        "space": field(raw, "/space/key"),
        "version": field(raw, "/version/number"),
        "status": field(raw, "/status"),
        "body_storage": field(raw, "/body/storage/value"),
    })
}

#[must_use]
pub fn space_summary(space: &Value) -> Value {
    json!({
        "key": field(space, "/key"),
        "name": field(space, "/name"),
        "type": field(space, "/type"),
        "status": field(space, "/status"),
        "description": field(space, "/description/plain"),
        "homepage": field(space, "/homepage/id"),
        "url": field(space, "/_links/self"),
    })
}

#[must_use]
pub fn created_page(raw: &Value) -> Value {
    json!({
        "id": field(raw, "/id"),
        "title": field(raw, "/title"),
        "space": field(raw, "/space/key"),
        "status": field(raw, "/status"),
        "links": field(raw, "/_links"),
    })
}

#[must_use]
pub fn created_space(raw: &Value) -> Value {
    json!({
        "key": field(raw, "/key"),
        "name": field(raw, "/name"),
        "type": field(raw, "/type"),
        "links": field(raw, "/_links"),
    })
}

/// Projection of a newly created Confluence comment.
#[must_use]
pub fn page_comment(raw: &Value) -> Value {
    json!({
        "id": field(raw, "/id"),
        "status": field(raw, "/status"),
        "title": field(raw, "/title"),
        "links": field(raw, "/_links"),
    })
}

/// Search-result projection of a Jira issue.
#[must_use]
pub fn issue_summary(issue: &Value) -> Value {
    json!({
        "key": field(issue, "/key"),
        "id": field(issue, "/id"),
        "summary": field(issue, "/fields/summary"),
        "status": field(issue, "/fields/status/name"),
        "issuetype": field(issue, "/fields/issuetype/name"),
        "project_key": field(issue, "/fields/project/key"),
        "assignee": field(issue, "/fields/assignee/displayName"),
    })
}

/// Full-issue projection (summary fields plus the REST self link).
#[must_use]
pub fn issue_detail(raw: &Value) -> Value {
    let mut out = issue_summary(raw);
    if let Some(map) = out.as_object_mut() {
        map.insert("self".to_string(), field(raw, "/self"));
    }
    out
}

/// Key/id/self reference returned by Jira issue and project creation.
#[must_use]
pub fn created_ref(raw: &Value) -> Value {
    json!({
        "key": field(raw, "/key"),
        "id": field(raw, "/id"),
        "self": field(raw, "/self"),
    })
}

/// Projection of a newly created Jira comment.
#[must_use]
pub fn issue_comment(raw: &Value) -> Value {
    json!({
        "id": field(raw, "/id"),
        "self": field(raw, "/self"),
        "body": field(raw, "/body"),
        "author": field(raw, "/author/displayName"),
        "created": field(raw, "/created"),
    })
}

/// Flatten Jira createmeta into projects -> issue types -> field summaries
/// (required flag, schema, first allowed value as a sample).
#[must_use]
pub fn createmeta_projects(raw: &Value) -> Value {
    let projects = raw
        .get("projects")
        .and_then(Value::as_array)
        .map(|projects| {
            projects
                .iter()
                .map(|project| {
                    json!({
                        "key": field(project, "/key"),
                        "id": field(project, "/id"),
                        "name": field(project, "/name"),
                        "issuetypes": createmeta_issuetypes(project),
                    })
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    Value::Array(projects)
}

fn createmeta_issuetypes(project: &Value) -> Value {
    let issuetypes = project
        .get("issuetypes")
        .and_then(Value::as_array)
        .map(|issuetypes| {
            issuetypes
                .iter()
                .map(|itype| {
                    json!({
                        "id": field(itype, "/id"),
                        "name": field(itype, "/name"),
                        "fields": createmeta_fields(itype),
                    })
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    Value::Array(issuetypes)
}

fn createmeta_fields(itype: &Value) -> Value {
    let fields = itype
        .get("fields")
        .and_then(Value::as_object)
        .map(|fields| {
            fields
                .iter()
                .map(|(field_id, def)| {
                    let sample = def
                        .pointer("/allowedValues/0")
                        .cloned()
                        .unwrap_or(Value::Null);
                    json!({
                        "id": field_id,
                        "name": field(def, "/name"),
                        "required": field(def, "/required"),
                        "schema": field(def, "/schema"),
                        "allowed_values_sample": sample,
                    })
                })
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    Value::Array(fields)
}

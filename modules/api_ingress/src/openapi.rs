use std::collections::BTreeMap;

use modkit::api::{OperationSpec, ParamLocation};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::model::ComponentsRegistry;

#[derive(Serialize)]
pub struct OpenApi {
    pub openapi: &'static str,
    pub info: OpenApiInfo,
    pub paths: BTreeMap<String, BTreeMap<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<OpenApiComponents>,
}

#[derive(Serialize)]
pub struct OpenApiInfo {
    pub title: &'static str,
    pub version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

#[derive(Serialize, Default)]
pub struct OpenApiComponents {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub schemas: BTreeMap<String, Value>,
}

/// `$ref` when the component is known, otherwise a minimal inline schema.
fn schema_for(components: &ComponentsRegistry, content_type: &str, name: Option<&str>) -> Value {
    if let Some(name) = name.filter(|n| components.has_schema(n)) {
        return json!({ "$ref": format!("#/components/schemas/{name}") });
    }
    match content_type {
        "application/json" => json!({ "type": "object" }),
        t if t.starts_with("text/") || t.ends_with("xml") => json!({ "type": "string" }),
        _ => json!({}),
    }
}

fn content(components: &ComponentsRegistry, content_type: &str, name: Option<&str>) -> Value {
    json!({ content_type: { "schema": schema_for(components, content_type, name) } })
}

fn operation_object(spec: &OperationSpec, components: &ComponentsRegistry) -> Value {
    let mut op = Map::new();
    op.insert(
        "operationId".into(),
        Value::String(
            spec.operation_id
                .clone()
                .unwrap_or_else(|| spec.handler_id.clone()),
        ),
    );
    if let Some(summary) = &spec.summary {
        op.insert("summary".into(), Value::String(summary.clone()));
    }
    if let Some(description) = &spec.description {
        op.insert("description".into(), Value::String(description.clone()));
    }
    if !spec.tags.is_empty() {
        op.insert("tags".into(), json!(spec.tags));
    }

    if !spec.params.is_empty() {
        let params: Vec<Value> = spec
            .params
            .iter()
            .map(|p| {
                let mut param = json!({
                    "name": p.name,
                    "in": p.location.as_str(),
                    // OpenAPI requires path params to be required.
                    "required": p.location == ParamLocation::Path || p.required,
                    "schema": { "type": p.param_type },
                });
                if let (Some(desc), Some(obj)) = (&p.description, param.as_object_mut()) {
                    obj.insert("description".into(), Value::String(desc.clone()));
                }
                param
            })
            .collect();
        op.insert("parameters".into(), Value::Array(params));
    }

    if let Some(body) = &spec.request_body {
        let mut rb = Map::new();
        if let Some(desc) = &body.description {
            rb.insert("description".into(), Value::String(desc.clone()));
        }
        rb.insert("required".into(), Value::Bool(body.required));
        rb.insert(
            "content".into(),
            content(components, body.content_type, body.schema_name.as_deref()),
        );
        op.insert("requestBody".into(), Value::Object(rb));
    }

    let mut responses = Map::new();
    for r in &spec.responses {
        responses.insert(
            r.status.to_string(),
            json!({
                "description": r.description,
                "content": content(components, r.content_type, r.schema_name.as_deref()),
            }),
        );
    }
    op.insert("responses".into(), Value::Object(responses));

    Value::Object(op)
}

/// Assemble the OpenAPI 3 document from registered operations and schemas.
pub fn build_document<'a>(
    specs: impl IntoIterator<Item = &'a OperationSpec>,
    components: &ComponentsRegistry,
) -> anyhow::Result<OpenApi> {
    let mut paths: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
    for spec in specs {
        paths
            .entry(spec.path.clone())
            .or_default()
            .insert(spec.method.as_str().to_lowercase(), operation_object(spec, components));
    }

    let mut schemas = BTreeMap::new();
    for (name, schema) in &components.schemas {
        schemas.insert(name.clone(), serde_json::to_value(schema)?);
    }

    Ok(OpenApi {
        openapi: "3.0.3",
        info: OpenApiInfo {
            title: "EventFlow API",
            version: env!("CARGO_PKG_VERSION"),
            description: Some("EventFlow marketplace server API"),
        },
        paths,
        components: Some(OpenApiComponents { schemas }),
    })
}

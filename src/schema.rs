//! JSON schemas for an interface's request and response data, derived from the
//! YApi fields (query/path params, form fields, JSON bodies).

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::catalog::{Interface, Param};

const BODYLESS_METHODS: [&str; 3] = ["GET", "HEAD", "OPTIONS"];

pub fn request_data_schema(interface: &Interface, mapping: &BTreeMap<String, String>) -> Value {
    let mut properties = Map::new();
    let mut required: Vec<String> = Vec::new();

    let mut add_param = |param: &Param, always_required: bool, schema: Value| {
        if param.name.is_empty() {
            return;
        }
        let mut schema = schema;
        if !param.desc.is_empty() {
            schema["description"] = Value::String(param.desc.clone());
        }
        properties.insert(param.name.clone(), schema);
        if (always_required || param.is_required()) && !required.contains(&param.name) {
            required.push(param.name.clone());
        }
    };

    for param in &interface.req_query {
        add_param(param, false, json!({ "type": "string" }));
    }
    for param in &interface.req_params {
        add_param(param, true, json!({ "type": "string" }));
    }

    let method = interface.method.to_uppercase();
    if !BODYLESS_METHODS.contains(&method.as_str()) {
        match interface.req_body_type.as_deref() {
            Some("form") => {
                for field in &interface.req_body_form {
                    let schema = if field.kind == "file" {
                        json!({ "type": "string", "format": "binary" })
                    } else {
                        json!({ "type": "string" })
                    };
                    add_param(field, false, schema);
                }
            }
            Some("json") => {
                let body = interface
                    .req_body_other
                    .as_deref()
                    .map(|raw| body_schema(raw, interface.req_body_is_json_schema))
                    .unwrap_or_else(|| json!({}));
                let body_props = body.get("properties").and_then(Value::as_object).cloned();
                match body_props {
                    Some(body_props) => {
                        properties.extend(body_props);
                        if let Some(body_required) = body.get("required").and_then(Value::as_array) {
                            for name in body_required.iter().filter_map(Value::as_str) {
                                if !required.iter().any(|r| r == name) {
                                    required.push(name.to_string());
                                }
                            }
                        }
                    }
                    None if properties.is_empty() && is_meaningful(&body) => {
                        let mut body = body;
                        apply_type_mapping(&mut body, mapping);
                        return body;
                    }
                    None => {}
                }
            }
            _ => {}
        }
    }

    let mut schema = json!({
        "type": "object",
        "properties": Value::Object(properties),
        "required": required,
    });
    apply_type_mapping(&mut schema, mapping);
    schema
}

pub fn response_data_schema(
    interface: &Interface,
    mapping: &BTreeMap<String, String>,
    data_key: Option<&str>,
) -> Value {
    let mut schema = match (interface.res_body_type.as_deref(), interface.res_body.as_deref()) {
        (Some("json"), Some(raw)) => body_schema(raw, interface.res_body_is_json_schema),
        _ => json!({}),
    };
    if let Some(key) = data_key {
        if let Some(inner) = schema.get("properties").and_then(|p| p.get(key)) {
            schema = inner.clone();
        }
    }
    apply_type_mapping(&mut schema, mapping);
    schema
}

fn body_schema(raw: &str, is_json_schema: bool) -> Value {
    if raw.trim().is_empty() {
        return json!({});
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value) if is_json_schema => value,
        Ok(sample) => infer_schema(&sample),
        Err(e) => {
            debug!(error = %e, "Body is not valid JSON, leaving it untyped");
            json!({})
        }
    }
}

/// Schema describing a JSON sample; every key present in the sample is required.
pub fn infer_schema(sample: &Value) -> Value {
    match sample {
        Value::Null => json!({ "type": "null" }),
        Value::Bool(_) => json!({ "type": "boolean" }),
        Value::Number(n) if n.is_i64() || n.is_u64() => json!({ "type": "integer" }),
        Value::Number(_) => json!({ "type": "number" }),
        Value::String(_) => json!({ "type": "string" }),
        Value::Array(items) => {
            let items = items.first().map(infer_schema).unwrap_or_else(|| json!({}));
            json!({ "type": "array", "items": items })
        }
        Value::Object(map) => {
            let properties: Map<String, Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), infer_schema(v)))
                .collect();
            let required: Vec<&String> = map.keys().collect();
            json!({ "type": "object", "properties": properties, "required": required })
        }
    }
}

/// Rewrites `type` names found in `mapping`, recursively.
pub fn apply_type_mapping(schema: &mut Value, mapping: &BTreeMap<String, String>) {
    if mapping.is_empty() {
        return;
    }
    match schema {
        Value::Object(map) => {
            if let Some(Value::String(ty)) = map.get_mut("type") {
                if let Some(replacement) = mapping.get(ty.as_str()) {
                    *ty = replacement.clone();
                }
            }
            for value in map.values_mut() {
                apply_type_mapping(value, mapping);
            }
        }
        Value::Array(items) => {
            for item in items {
                apply_type_mapping(item, mapping);
            }
        }
        _ => {}
    }
}

fn is_meaningful(schema: &Value) -> bool {
    schema.as_object().is_some_and(|m| !m.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Param;

    fn param(name: &str, required: &str) -> Param {
        Param {
            name: name.to_string(),
            required: required.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn get_requests_merge_query_and_path_params() {
        let interface = Interface {
            method: "GET".to_string(),
            req_query: vec![param("page", "1"), param("q", "0")],
            req_params: vec![param("id", "0")],
            req_body_type: Some("json".to_string()),
            req_body_other: Some(r#"{"ignored":true}"#.to_string()),
            ..Default::default()
        };
        let schema = request_data_schema(&interface, &BTreeMap::new());
        let props = schema["properties"].as_object().expect("properties");
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["id", "page", "q"]);
        assert_eq!(schema["required"], json!(["page", "id"]));
    }

    #[test]
    fn form_file_fields_are_binary() {
        let mut file = param("avatar", "1");
        file.kind = "file".to_string();
        let interface = Interface {
            method: "POST".to_string(),
            req_body_type: Some("form".to_string()),
            req_body_form: vec![file],
            ..Default::default()
        };
        let schema = request_data_schema(&interface, &BTreeMap::new());
        assert_eq!(schema["properties"]["avatar"]["format"], "binary");
    }

    #[test]
    fn data_key_and_type_mapping_apply_to_responses() {
        let interface = Interface {
            res_body_type: Some("json".to_string()),
            res_body: Some(r#"{"code":0,"data":{"id":1,"at":"2020"}}"#.to_string()),
            ..Default::default()
        };
        let mapping = BTreeMap::from([("integer".to_string(), "string".to_string())]);
        let schema = response_data_schema(&interface, &mapping, Some("data"));
        assert_eq!(schema["properties"]["id"]["type"], "string");
        assert_eq!(schema["required"], json!(["at", "id"]));
    }

    #[test]
    fn unparsable_bodies_become_untyped() {
        let interface = Interface {
            res_body_type: Some("json".to_string()),
            res_body: Some("{ not json".to_string()),
            ..Default::default()
        };
        assert_eq!(response_data_schema(&interface, &BTreeMap::new(), None), json!({}));
    }
}

//! JSON schema → TypeScript declarations.
//!
//! Schemas are first lowered into a small [`TsType`] tree and then rendered,
//! so union/array precedence is handled in one place.

use async_trait::async_trait;
use serde_json::Value;

use crate::contract::TypeSynthesizer;
use crate::error::HookError;

#[derive(Debug, Clone, PartialEq)]
pub enum TsType {
    Named(&'static str),
    Literal(String),
    Array(Box<TsType>),
    Tuple(Vec<TsType>),
    Union(Vec<TsType>),
    Intersection(Vec<TsType>),
    Object {
        props: Vec<TsProp>,
        index: Option<Box<TsType>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TsProp {
    pub name: String,
    pub optional: bool,
    pub description: Option<String>,
    pub ty: TsType,
}

impl TsType {
    pub fn from_schema(schema: &Value) -> TsType {
        let Some(map) = schema.as_object() else {
            return TsType::Named("any");
        };
        if map.contains_key("$ref") {
            return TsType::Named("unknown");
        }
        if let Some(values) = map.get("enum").and_then(Value::as_array) {
            return union(values.iter().map(|v| TsType::Literal(v.to_string())).collect());
        }
        if let Some(value) = map.get("const") {
            return TsType::Literal(value.to_string());
        }
        for (keyword, combine) in [
            ("oneOf", union as fn(Vec<TsType>) -> TsType),
            ("anyOf", union),
            ("allOf", intersection),
        ] {
            if let Some(variants) = map.get(keyword).and_then(Value::as_array) {
                return combine(variants.iter().map(TsType::from_schema).collect());
            }
        }
        match map.get("type") {
            Some(Value::String(ty)) => Self::from_type_name(ty, map),
            Some(Value::Array(types)) => union(
                types
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|ty| Self::from_type_name(ty, map))
                    .collect(),
            ),
            _ if map.contains_key("properties") => Self::object(map),
            _ => TsType::Named("any"),
        }
    }

    fn from_type_name(ty: &str, map: &serde_json::Map<String, Value>) -> TsType {
        match ty {
            "string" if map.get("format").and_then(Value::as_str) == Some("binary") => {
                TsType::Named("FileData")
            }
            "string" => TsType::Named("string"),
            "number" | "integer" => TsType::Named("number"),
            "boolean" => TsType::Named("boolean"),
            "null" => TsType::Named("null"),
            "array" => match map.get("items") {
                Some(Value::Array(items)) => {
                    TsType::Tuple(items.iter().map(TsType::from_schema).collect())
                }
                Some(items) => TsType::Array(Box::new(TsType::from_schema(items))),
                None => TsType::Array(Box::new(TsType::Named("any"))),
            },
            "object" => Self::object(map),
            _ => TsType::Named("any"),
        }
    }

    fn object(map: &serde_json::Map<String, Value>) -> TsType {
        let required: Vec<&str> = map
            .get("required")
            .and_then(Value::as_array)
            .map(|r| r.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        let props = map
            .get("properties")
            .and_then(Value::as_object)
            .map(|props| {
                props
                    .iter()
                    .map(|(name, schema)| TsProp {
                        name: name.clone(),
                        optional: !required.contains(&name.as_str()),
                        description: schema
                            .get("description")
                            .and_then(Value::as_str)
                            .filter(|d| !d.trim().is_empty())
                            .map(str::to_string),
                        ty: TsType::from_schema(schema),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let index = match map.get("additionalProperties") {
            Some(Value::Bool(true)) => Some(Box::new(TsType::Named("any"))),
            Some(schema @ Value::Object(_)) => Some(Box::new(TsType::from_schema(schema))),
            _ => None,
        };
        TsType::Object { props, index }
    }

    pub fn render(&self, indent: usize) -> String {
        match self {
            TsType::Named(name) => name.to_string(),
            TsType::Literal(lit) => lit.clone(),
            TsType::Array(inner) => {
                let inner_str = inner.render(indent);
                if matches!(**inner, TsType::Union(_) | TsType::Intersection(_)) {
                    format!("({inner_str})[]")
                } else {
                    format!("{inner_str}[]")
                }
            }
            TsType::Tuple(items) => format!(
                "[{}]",
                items
                    .iter()
                    .map(|t| t.render(indent))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            TsType::Union(types) => types
                .iter()
                .map(|t| t.render(indent))
                .collect::<Vec<_>>()
                .join(" | "),
            TsType::Intersection(types) => types
                .iter()
                .map(|t| match t {
                    TsType::Union(_) => format!("({})", t.render(indent)),
                    _ => t.render(indent),
                })
                .collect::<Vec<_>>()
                .join(" & "),
            TsType::Object { props, index } => {
                if props.is_empty() && index.is_none() {
                    return "{}".to_string();
                }
                let pad = "  ".repeat(indent + 1);
                let mut out = String::from("{\n");
                for prop in props {
                    if let Some(desc) = &prop.description {
                        out.push_str(&format!("{pad}/**\n{pad} * {}\n{pad} */\n", escape_comment(desc)));
                    }
                    out.push_str(&format!(
                        "{pad}{}{}: {}\n",
                        quote_if_needed(&prop.name),
                        if prop.optional { "?" } else { "" },
                        prop.ty.render(indent + 1)
                    ));
                }
                if let Some(value) = index {
                    out.push_str(&format!("{pad}[k: string]: {}\n", value.render(indent + 1)));
                }
                out.push_str(&"  ".repeat(indent));
                out.push('}');
                out
            }
        }
    }
}

fn union(mut types: Vec<TsType>) -> TsType {
    types.dedup();
    match types.len() {
        0 => TsType::Named("any"),
        1 => types.remove(0),
        _ => TsType::Union(types),
    }
}

fn intersection(mut types: Vec<TsType>) -> TsType {
    match types.len() {
        0 => TsType::Named("any"),
        1 => types.remove(0),
        _ => TsType::Intersection(types),
    }
}

fn quote_if_needed(name: &str) -> String {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if valid {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

fn escape_comment(text: &str) -> String {
    text.replace("*/", "*\\/").replace('\n', " ")
}

/// Renders an exported declaration named `type_name` for `schema`: an
/// `interface` for object schemas, a `type` alias for everything else.
pub fn declaration(schema: &Value, type_name: &str) -> String {
    let ty = TsType::from_schema(schema);
    let mut out = String::new();
    if let Some(desc) = schema.get("description").and_then(Value::as_str) {
        out.push_str(&format!("/**\n * {}\n */\n", escape_comment(desc)));
    }
    match &ty {
        TsType::Object { props, index } if !props.is_empty() || index.is_some() => {
            out.push_str(&format!("export interface {type_name} {}", ty.render(0)));
        }
        _ => out.push_str(&format!("export type {type_name} = {}", ty.render(0))),
    }
    out
}

/// The built-in [`TypeSynthesizer`].
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSchemaToTypeScript;

#[async_trait]
impl TypeSynthesizer for JsonSchemaToTypeScript {
    async fn synthesize(&self, schema: &Value, type_name: &str) -> Result<String, HookError> {
        Ok(declaration(schema, type_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_schema_becomes_interface() {
        let schema = json!({
            "type": "object",
            "properties": {
                "id": { "type": "integer", "description": "user id" },
                "tags": { "type": "array", "items": { "type": "string" } },
                "x-trace": { "type": "string" }
            },
            "required": ["id"]
        });
        let out = declaration(&schema, "GetUserResponse");
        assert_eq!(
            out,
            "export interface GetUserResponse {\n  /**\n   * user id\n   */\n  id: number\n  tags?: string[]\n  \"x-trace\"?: string\n}"
        );
    }

    #[test]
    fn non_object_schemas_become_aliases() {
        assert_eq!(declaration(&json!({}), "Empty"), "export type Empty = any");
        assert_eq!(
            declaration(&json!({ "enum": ["a", "b"] }), "Kind"),
            "export type Kind = \"a\" | \"b\""
        );
        assert_eq!(
            declaration(
                &json!({ "type": "array", "items": { "type": ["string", "null"] } }),
                "Names"
            ),
            "export type Names = (string | null)[]"
        );
        assert_eq!(
            declaration(&json!({ "type": "object", "properties": {} }), "Nothing"),
            "export type Nothing = {}"
        );
    }

    #[test]
    fn binary_strings_map_to_file_data() {
        let ty = TsType::from_schema(&json!({ "type": "string", "format": "binary" }));
        assert_eq!(ty.render(0), "FileData");
    }

    #[test]
    fn nested_objects_are_indented() {
        let schema = json!({
            "type": "object",
            "properties": {
                "page": {
                    "type": "object",
                    "properties": { "size": { "type": "number" } },
                    "required": ["size"]
                }
            }
        });
        assert_eq!(
            declaration(&schema, "Req"),
            "export interface Req {\n  page?: {\n    size: number\n  }\n}"
        );
    }
}

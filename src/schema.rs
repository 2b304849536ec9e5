//! Tool schema adapter and parameter-schema utilities.
//!
//! Providers reject a few things that schema reflection happily produces: a
//! top-level `title`, per-property `default`s, and optional properties. The
//! adapter rewrites a tool's parameter schema into the provider-accepted form.
//! Note that this widens `required` to every declared property, so callers
//! going through the provider must always supply every field explicitly.

use crate::toolbox::{ToolBox, ToolDefinition};
use crate::types::tool::{FunctionDefinition, ProviderToolSpec};
use serde_json::{json, Value};

/// Convert a tool definition into the provider's tool declaration.
pub fn describe(definition: &ToolDefinition) -> ProviderToolSpec {
    ProviderToolSpec {
        tool_type: "function".to_string(),
        function: FunctionDefinition {
            name: definition.name().to_string(),
            description: definition.description().map(str::to_string),
            parameters: sanitize_parameters(definition.parameters().clone()),
        },
    }
}

/// Declarations for every tool in the box, ordered by name.
pub fn describe_all(toolbox: &ToolBox) -> Vec<ProviderToolSpec> {
    let mut defs = toolbox.definitions();
    defs.sort_by(|a, b| a.name().cmp(b.name()));
    defs.iter().map(|d| describe(d)).collect()
}

/// Strip `title` and property defaults, and mark every property required.
///
/// Non-object schemas are returned unchanged.
pub fn sanitize_parameters(mut schema: Value) -> Value {
    if let Some(obj) = schema.as_object_mut() {
        strip_and_require(obj);
    }
    schema
}

fn strip_and_require(obj: &mut serde_json::Map<String, Value>) {
    obj.remove("title");

    let mut names = Vec::new();
    if let Some(Value::Object(props)) = obj.get_mut("properties") {
        for (name, prop) in props.iter_mut() {
            if let Some(p) = prop.as_object_mut() {
                p.remove("default");
            }
            names.push(name.clone());
        }
    }

    let required = obj
        .entry("required")
        .or_insert_with(|| Value::Array(Vec::new()));
    if !required.is_array() {
        *required = Value::Array(Vec::new());
    }
    if let Value::Array(list) = required {
        for name in names {
            if !list.iter().any(|v| v.as_str() == Some(name.as_str())) {
                list.push(Value::String(name));
            }
        }
    }
}

/// Empty object schema for tools that take no arguments.
pub fn empty_object_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

/// Reflect a request type's parameter schema.
///
/// The `$schema` marker is dropped; `title` is kept and left to [`sanitize_parameters`].
pub fn json_schema_from_type<T: schemars::JsonSchema>() -> Value {
    let schema = schemars::schema_for!(T);
    let mut value = serde_json::to_value(&schema).unwrap_or_else(|_| empty_object_schema());
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
    }
    value
}

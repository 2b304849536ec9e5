//! Tool calling wire shapes shared by the dispatcher, the run poller and the stream router.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Provider tool declaration (for function calling).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderToolSpec {
    #[serde(rename = "type")]
    pub tool_type: String, // "function"
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: Value, // JSON Schema, provider-sanitized
}

/// Arguments of a tool call, either as the raw string the model produced or
/// as an already structured value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolArguments {
    Raw(String),
    Structured(Value),
}

impl ToolArguments {
    /// Text used when logging the call.
    pub fn display(&self) -> String {
        match self {
            ToolArguments::Raw(s) => s.clone(),
            ToolArguments::Structured(v) => v.to_string(),
        }
    }
}

impl Default for ToolArguments {
    fn default() -> Self {
        ToolArguments::Structured(Value::Object(Default::default()))
    }
}

impl From<String> for ToolArguments {
    fn from(s: String) -> Self {
        ToolArguments::Raw(s)
    }
}

impl From<&str> for ToolArguments {
    fn from(s: &str) -> Self {
        ToolArguments::Raw(s.to_string())
    }
}

impl From<Value> for ToolArguments {
    fn from(v: Value) -> Self {
        ToolArguments::Structured(v)
    }
}

/// One tool invocation attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub name: String,
    #[serde(default)]
    pub arguments: ToolArguments,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
}

impl ToolCallRequest {
    pub fn new(name: impl Into<String>, arguments: impl Into<ToolArguments>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
            call_id: None,
        }
    }

    pub fn with_call_id(mut self, call_id: impl Into<String>) -> Self {
        self.call_id = Some(call_id.into());
        self
    }
}

/// Output envelope handed back to the provider, keyed by the call id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ToolCallResult {
    #[serde(rename = "tool_call_id")]
    pub call_id: String,
    pub output: String,
}

/// Function tool call as reported by a run's required action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

fn function_type() -> String {
    "function".to_string()
}

impl From<&RequiredToolCall> for ToolCallRequest {
    fn from(call: &RequiredToolCall) -> Self {
        ToolCallRequest::new(call.function.name.clone(), call.function.arguments.clone())
            .with_call_id(call.id.clone())
    }
}

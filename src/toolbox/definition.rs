//! Tool definitions: schema, bound function, formatter and fallback text.

use crate::error::{Error, ErrorContext};
use crate::schema::{empty_object_schema, json_schema_from_type};
use crate::Result;
use async_trait::async_trait;
use jsonschema::{Draft, JSONSchema};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

/// Text returned in place of a tool's output when the call fails.
pub const DEFAULT_ERROR_FALLBACK: &str =
    "The service is currently unavailable. Please try again later.";

const MAX_NAME_LEN: usize = 64;

/// Function bound to a tool. Receives the decoded, schema-checked arguments.
#[async_trait]
pub trait ToolFunction: Send + Sync {
    async fn invoke(&self, arguments: Value) -> anyhow::Result<Value>;
}

#[async_trait]
impl<F, Fut> ToolFunction for F
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    async fn invoke(&self, arguments: Value) -> anyhow::Result<Value> {
        (self)(arguments).await
    }
}

/// Arguments did not deserialize into a typed tool's request type.
#[derive(Debug, thiserror::Error)]
#[error("arguments do not match request type: {0}")]
pub struct RequestDecodeError(#[from] pub serde_json::Error);

/// Adapter binding a function over a typed request `T` and response `R`.
pub struct TypedTool<T, R, F> {
    f: F,
    _marker: PhantomData<fn(T) -> R>,
}

impl<T, R, F> TypedTool<T, R, F> {
    pub fn new(f: F) -> Self {
        Self {
            f,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T, R, F, Fut> ToolFunction for TypedTool<T, R, F>
where
    T: DeserializeOwned + Send + 'static,
    R: Serialize + Send + 'static,
    F: Fn(T) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
{
    async fn invoke(&self, arguments: Value) -> anyhow::Result<Value> {
        let request: T = serde_json::from_value(arguments).map_err(RequestDecodeError)?;
        let response = (self.f)(request).await?;
        Ok(serde_json::to_value(response)?)
    }
}

/// Turns a tool's raw response into the text handed back to the model.
pub type ResponseFormatter = Arc<dyn Fn(&Value) -> anyhow::Result<String> + Send + Sync>;

/// Strings pass through, `null` becomes empty, everything else is compact JSON.
pub fn default_formatter(response: &Value) -> anyhow::Result<String> {
    Ok(match response {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => serde_json::to_string(other)?,
    })
}

/// Immutable registration record for one tool.
pub struct ToolDefinition {
    name: String,
    description: Option<String>,
    parameters: Value,
    validator: JSONSchema,
    invocation: Arc<dyn ToolFunction>,
    formatter: ResponseFormatter,
    error_fallback: String,
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .field("error_fallback", &self.error_fallback)
            .finish()
    }
}

impl ToolDefinition {
    pub fn builder(name: impl Into<String>) -> ToolDefinitionBuilder {
        ToolDefinitionBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Parameter schema as registered, before provider sanitizing.
    pub fn parameters(&self) -> &Value {
        &self.parameters
    }

    pub fn error_fallback(&self) -> &str {
        &self.error_fallback
    }

    pub fn invocation(&self) -> &Arc<dyn ToolFunction> {
        &self.invocation
    }

    pub fn format_response(&self, response: &Value) -> anyhow::Result<String> {
        (self.formatter)(response)
    }

    /// Check decoded arguments against the registered schema.
    pub fn validate_arguments(&self, arguments: &Value) -> std::result::Result<(), Vec<String>> {
        self.validator.validate(arguments).map_err(|errors| {
            errors
                .map(|e| {
                    let path = e.instance_path.to_string();
                    if path.is_empty() {
                        e.to_string()
                    } else {
                        format!("{}: {}", path, e)
                    }
                })
                .collect()
        })
    }
}

pub struct ToolDefinitionBuilder {
    name: String,
    description: Option<String>,
    parameters: Option<Value>,
    invocation: Option<Arc<dyn ToolFunction>>,
    formatter: Option<ResponseFormatter>,
    error_fallback: String,
}

impl ToolDefinitionBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            parameters: None,
            invocation: None,
            formatter: None,
            error_fallback: DEFAULT_ERROR_FALLBACK.to_string(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parameter schema given as JSON Schema.
    pub fn parameters(mut self, schema: Value) -> Self {
        self.parameters = Some(schema);
        self
    }

    /// Parameter schema reflected from a request type.
    pub fn parameters_from<T: schemars::JsonSchema>(mut self) -> Self {
        self.parameters = Some(json_schema_from_type::<T>());
        self
    }

    /// Bind a function over the decoded JSON arguments.
    pub fn invoke<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
    {
        self.invocation = Some(Arc::new(f));
        self
    }

    /// Bind any [`ToolFunction`] implementation.
    pub fn function(mut self, function: Arc<dyn ToolFunction>) -> Self {
        self.invocation = Some(function);
        self
    }

    /// Bind a function over a typed request; also reflects the request's schema
    /// unless one was set explicitly.
    pub fn invoke_typed<T, R, F, Fut>(mut self, f: F) -> Self
    where
        T: DeserializeOwned + schemars::JsonSchema + Send + 'static,
        R: Serialize + Send + 'static,
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<R>> + Send + 'static,
    {
        if self.parameters.is_none() {
            self.parameters = Some(json_schema_from_type::<T>());
        }
        self.invocation = Some(Arc::new(TypedTool::<T, R, F>::new(f)));
        self
    }

    pub fn formatter<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(f));
        self
    }

    pub fn error_fallback(mut self, text: impl Into<String>) -> Self {
        self.error_fallback = text.into();
        self
    }

    pub fn build(self) -> Result<ToolDefinition> {
        validate_name(&self.name)?;

        let invocation = self.invocation.ok_or_else(|| {
            Error::configuration_with_context(
                format!("tool '{}' has no bound function", self.name),
                ErrorContext::new()
                    .with_field_path("invocation")
                    .with_source("tool_builder"),
            )
        })?;

        let parameters = self.parameters.unwrap_or_else(empty_object_schema);
        let validator = JSONSchema::options()
            .with_draft(Draft::Draft7)
            .compile(&parameters)
            .map_err(|e| {
                Error::configuration_with_context(
                    format!("tool '{}' has an invalid parameter schema", self.name),
                    ErrorContext::new()
                        .with_field_path("parameters")
                        .with_details(e.to_string())
                        .with_source("tool_builder"),
                )
            })?;

        Ok(ToolDefinition {
            name: self.name,
            description: self.description,
            parameters,
            validator,
            invocation,
            formatter: self
                .formatter
                .unwrap_or_else(|| Arc::new(default_formatter)),
            error_fallback: self.error_fallback,
        })
    }
}

/// Provider constraint on function names: 1-64 of `[A-Za-z0-9_-]`.
fn validate_name(name: &str) -> Result<()> {
    let ok = !name.is_empty()
        && name.len() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(Error::configuration_with_context(
            format!("invalid tool name '{}'", name),
            ErrorContext::new()
                .with_field_path("name")
                .with_details("expected 1-64 characters of [A-Za-z0-9_-]")
                .with_source("tool_builder"),
        ))
    }
}

//! # ToolBox Module
//!
//! Registry of function tools and the dispatcher that runs provider tool calls
//! against them.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ToolDefinition`] | Immutable tool record: schema, bound function, formatter, fallback text |
//! | [`ToolBox`] | Name-keyed registry and dispatcher |
//! | [`ToolBoxConfig`] | Batch parallelism and debug tracing |
//! | [`ToolExecution`] | Dispatch result plus the contained failure, if any |
//!
//! ## Failure containment
//!
//! An unknown tool name is returned as [`Error::NotFound`](crate::Error::NotFound).
//! Everything after lookup (argument decoding, schema validation, invocation,
//! response formatting, even a panic) is logged and turned into a result whose
//! output is the tool's fallback text, carrying the same call id.
//!
//! ## Example
//!
//! ```rust
//! use ai_toolbox::{ToolBox, ToolDefinition};
//! use serde_json::{json, Value};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> ai_toolbox::Result<()> {
//! let time_now = ToolDefinition::builder("get_time_now")
//!     .description("Current time")
//!     .invoke(|_args: Value| async { Ok(json!("2024-01-01T00:00:00Z")) })
//!     .build()?;
//!
//! let toolbox = ToolBox::new([time_now]);
//! let result = toolbox.execute("get_time_now", "{}", Some("call_1".into())).await?;
//! assert_eq!(result.output, "2024-01-01T00:00:00Z");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod definition;
pub mod outcome;

pub use config::ToolBoxConfig;
pub use definition::{
    default_formatter, RequestDecodeError, ResponseFormatter, ToolDefinition,
    ToolDefinitionBuilder, ToolFunction, TypedTool, DEFAULT_ERROR_FALLBACK,
};
pub use outcome::{FailureKind, ToolExecution, ToolFailure};

use crate::ids::random_tool_call_id;
use crate::repair::{parse_with_repair, BestEffortRepair, JsonRepair};
use crate::types::tool::{RequiredToolCall, ToolArguments, ToolCallRequest, ToolCallResult};
use crate::{Error, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

/// Registry of function tools keyed by name.
///
/// Registering a name that already exists replaces the previous definition.
pub struct ToolBox {
    tools: RwLock<HashMap<String, Arc<ToolDefinition>>>,
    config: ToolBoxConfig,
    repair: Arc<dyn JsonRepair>,
}

impl ToolBox {
    pub fn new(definitions: impl IntoIterator<Item = ToolDefinition>) -> Self {
        Self::with_config(definitions, ToolBoxConfig::default())
    }

    pub fn with_config(
        definitions: impl IntoIterator<Item = ToolDefinition>,
        config: ToolBoxConfig,
    ) -> Self {
        let toolbox = Self {
            tools: RwLock::new(HashMap::new()),
            config,
            repair: Arc::new(BestEffortRepair),
        };
        for def in definitions {
            toolbox.register(def);
        }
        toolbox
    }

    /// Replace the argument repair step.
    pub fn with_repair(mut self, repair: impl JsonRepair + 'static) -> Self {
        self.repair = Arc::new(repair);
        self
    }

    pub fn config(&self) -> &ToolBoxConfig {
        &self.config
    }

    /// Insert a definition, returning the one it replaced.
    pub fn register(&self, definition: impl Into<Arc<ToolDefinition>>) -> Option<Arc<ToolDefinition>> {
        let definition = definition.into();
        let name = definition.name().to_string();
        let previous = self
            .tools
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.clone(), definition);
        if previous.is_some() {
            debug!(tool = %name, "replaced registered tool");
        } else {
            debug!(tool = %name, "registered tool");
        }
        previous
    }

    /// Remove a tool. Missing names are an error only with `raise_if_missing`.
    pub fn unregister(&self, name: &str, raise_if_missing: bool) -> Result<Option<Arc<ToolDefinition>>> {
        let removed = self
            .tools
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
        match removed {
            Some(def) => {
                debug!(tool = %name, "unregistered tool");
                Ok(Some(def))
            }
            None if raise_if_missing => Err(self.not_found(name)),
            None => Ok(None),
        }
    }

    pub fn get(&self, name: &str) -> Result<Arc<ToolDefinition>> {
        let found = self
            .tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned();
        // read guard released before `not_found` takes it again
        found.ok_or_else(|| self.not_found(name))
    }

    pub fn has(&self, name: &str) -> bool {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn definitions(&self) -> Vec<Arc<ToolDefinition>> {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tools.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn not_found(&self, name: &str) -> Error {
        Error::not_found(name, self.names())
    }

    /// Run one tool call. Fails only when `name` is not registered.
    pub async fn execute(
        &self,
        name: &str,
        arguments: impl Into<ToolArguments>,
        call_id: Option<String>,
    ) -> Result<ToolCallResult> {
        Ok(self.execute_detailed(name, arguments, call_id).await?.result)
    }

    /// Like [`execute`](Self::execute), also reporting the contained failure.
    pub async fn execute_detailed(
        &self,
        name: &str,
        arguments: impl Into<ToolArguments>,
        call_id: Option<String>,
    ) -> Result<ToolExecution> {
        let definition = self.get(name)?;
        let arguments = arguments.into();
        let call_id = call_id.unwrap_or_else(random_tool_call_id);
        Ok(run_call(
            &definition,
            self.repair.as_ref(),
            arguments,
            call_id,
            self.config.debug,
        )
        .await)
    }

    pub async fn execute_request(&self, request: ToolCallRequest) -> Result<ToolCallResult> {
        self.execute(&request.name, request.arguments, request.call_id)
            .await
    }

    /// Run independent calls concurrently, at most `max_parallelism` at a time.
    ///
    /// Every name is resolved before anything runs, so an unknown name fails
    /// the whole batch up front. Results arrive in completion order; correlate
    /// them by `call_id`.
    pub async fn execute_batch(&self, requests: Vec<ToolCallRequest>) -> Result<Vec<ToolCallResult>> {
        let mut resolved = Vec::with_capacity(requests.len());
        for request in requests {
            let definition = self.get(&request.name)?;
            resolved.push((definition, request));
        }

        let total = resolved.len();
        let semaphore = Arc::new(Semaphore::new(self.config.max_parallelism.max(1)));
        let debug = self.config.debug;
        let mut pending = FuturesUnordered::new();

        for (definition, request) in resolved {
            let call_id = request.call_id.unwrap_or_else(random_tool_call_id);
            let fallback = ToolCallResult {
                call_id: call_id.clone(),
                output: definition.error_fallback().to_string(),
            };
            let tool = definition.name().to_string();
            let semaphore = Arc::clone(&semaphore);
            let repair = Arc::clone(&self.repair);

            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                run_call(&definition, repair.as_ref(), request.arguments, call_id, debug).await
            });
            pending.push(async move { (handle.await, fallback, tool) });
        }

        let mut results = Vec::with_capacity(total);
        while let Some((joined, fallback, tool)) = pending.next().await {
            match joined {
                Ok(execution) => results.push(execution.result),
                Err(e) => {
                    error!(tool = %tool, call_id = %fallback.call_id, error = %e, "tool worker did not complete");
                    results.push(fallback);
                }
            }
        }
        debug!(calls = total, "tool batch finished");
        Ok(results)
    }

    /// Dispatch the tool calls of a run's required action.
    pub async fn handle_tool_calls(&self, calls: &[RequiredToolCall]) -> Result<Vec<ToolCallResult>> {
        self.execute_batch(calls.iter().map(ToolCallRequest::from).collect())
            .await
    }
}

impl Default for ToolBox {
    fn default() -> Self {
        Self::new(std::iter::empty())
    }
}

impl std::fmt::Debug for ToolBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolBox")
            .field("tools", &self.names())
            .field("config", &self.config)
            .finish()
    }
}

async fn run_call(
    definition: &ToolDefinition,
    repair: &dyn JsonRepair,
    arguments: ToolArguments,
    call_id: String,
    debug: bool,
) -> ToolExecution {
    let raw = arguments.display();
    if debug {
        info!(tool = definition.name(), call_id = %call_id, arguments = %raw, "calling tool");
    }

    match invoke_and_format(definition, repair, arguments).await {
        Ok(output) => {
            if debug {
                info!(tool = definition.name(), call_id = %call_id, output = %output, "tool call succeeded");
            } else {
                debug!(tool = definition.name(), call_id = %call_id, "tool call succeeded");
            }
            ToolExecution {
                result: ToolCallResult { call_id, output },
                failure: None,
            }
        }
        Err(failure) => {
            error!(
                tool = definition.name(),
                call_id = %call_id,
                arguments = %raw,
                kind = %failure.kind,
                error = %failure.message,
                "tool call failed, returning fallback"
            );
            ToolExecution {
                result: ToolCallResult {
                    call_id,
                    output: definition.error_fallback().to_string(),
                },
                failure: Some(failure),
            }
        }
    }
}

async fn invoke_and_format(
    definition: &ToolDefinition,
    repair: &dyn JsonRepair,
    arguments: ToolArguments,
) -> std::result::Result<String, ToolFailure> {
    let value = decode_arguments(arguments, repair)?;
    definition
        .validate_arguments(&value)
        .map_err(|errors| ToolFailure::validation(errors.join("; ")))?;

    let response = match AssertUnwindSafe(definition.invocation().invoke(value))
        .catch_unwind()
        .await
    {
        Ok(Ok(response)) => response,
        Ok(Err(e)) if e.downcast_ref::<RequestDecodeError>().is_some() => {
            return Err(ToolFailure::validation(format!("{:#}", e)))
        }
        Ok(Err(e)) => return Err(ToolFailure::invocation(format!("{:#}", e))),
        Err(panic) => {
            return Err(ToolFailure::invocation(format!(
                "panicked: {}",
                panic_message(panic.as_ref())
            )))
        }
    };

    match std::panic::catch_unwind(AssertUnwindSafe(|| definition.format_response(&response))) {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(ToolFailure::formatting(format!("{:#}", e))),
        Err(panic) => Err(ToolFailure::formatting(format!(
            "panicked: {}",
            panic_message(panic.as_ref())
        ))),
    }
}

/// Blank strings and `null` mean "no arguments".
fn decode_arguments(
    arguments: ToolArguments,
    repair: &dyn JsonRepair,
) -> std::result::Result<Value, ToolFailure> {
    match arguments {
        ToolArguments::Raw(s) | ToolArguments::Structured(Value::String(s)) => {
            decode_text(&s, repair)
        }
        ToolArguments::Structured(Value::Null) => Ok(Value::Object(Default::default())),
        ToolArguments::Structured(v) => Ok(v),
    }
}

fn decode_text(text: &str, repair: &dyn JsonRepair) -> std::result::Result<Value, ToolFailure> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    parse_with_repair(text, repair)
        .map_err(|e| ToolFailure::validation(format!("arguments are not valid JSON: {}", e)))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repair::NoRepair;
    use serde_json::json;

    fn adder() -> ToolDefinition {
        ToolDefinition::builder("add")
            .parameters(json!({
                "type": "object",
                "properties": {"a": {"type": "integer"}, "b": {"type": "integer"}},
                "required": ["a"]
            }))
            .invoke(|args: Value| async move {
                let a = args["a"].as_i64().unwrap_or(0);
                let b = args["b"].as_i64().unwrap_or(0);
                Ok(json!(a + b))
            })
            .build()
            .unwrap()
    }

    #[test]
    fn test_decode_arguments() {
        let repair = BestEffortRepair;
        assert_eq!(
            decode_arguments(ToolArguments::Raw("  ".into()), &repair).unwrap(),
            json!({})
        );
        assert_eq!(
            decode_arguments(ToolArguments::Structured(Value::Null), &repair).unwrap(),
            json!({})
        );
        assert_eq!(
            decode_arguments(ToolArguments::Raw("{\"a\": 1,}".into()), &repair).unwrap(),
            json!({"a": 1})
        );
        let failure = decode_arguments(ToolArguments::Raw("{\"a\": 1,}".into()), &NoRepair)
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::Validation);
    }

    #[test]
    fn test_decode_json_string_value_as_text() {
        let repair = BestEffortRepair;
        assert_eq!(
            decode_arguments(ToolArguments::from(json!("{\"a\": 3}")), &repair).unwrap(),
            json!({"a": 3})
        );
        assert_eq!(
            decode_arguments(ToolArguments::from(json!("{\"a\": 3,}")), &repair).unwrap(),
            json!({"a": 3})
        );
        assert_eq!(
            decode_arguments(ToolArguments::from(json!("")), &repair).unwrap(),
            json!({})
        );
    }

    #[tokio::test]
    async fn test_string_valued_arguments_are_parsed() {
        let toolbox = ToolBox::new([adder()]);
        let execution = toolbox
            .execute_detailed("add", json!("{\"a\": 3, \"b\": 4}"), None)
            .await
            .unwrap();
        assert!(execution.succeeded());
        assert_eq!(execution.result.output, "7");
    }

    #[tokio::test]
    async fn test_execute_detailed_classifies_failures() {
        let toolbox = ToolBox::new([adder()]);

        let ok = toolbox
            .execute_detailed("add", json!({"a": 2, "b": 3}), None)
            .await
            .unwrap();
        assert!(ok.succeeded());
        assert_eq!(ok.result.output, "5");

        let invalid = toolbox
            .execute_detailed("add", json!({"a": "two"}), Some("call_x".into()))
            .await
            .unwrap();
        assert_eq!(invalid.result.call_id, "call_x");
        assert_eq!(invalid.result.output, DEFAULT_ERROR_FALLBACK);
        assert_eq!(invalid.failure.unwrap().kind, FailureKind::Validation);
    }

    #[tokio::test]
    async fn test_panics_are_contained() {
        let boom = ToolDefinition::builder("boom")
            .invoke(|_args: Value| async move {
                if true {
                    panic!("kaboom");
                }
                Ok::<_, anyhow::Error>(Value::Null)
            })
            .error_fallback("try later")
            .build()
            .unwrap();
        let bad_format = ToolDefinition::builder("bad_format")
            .invoke(|_args: Value| async { Ok(json!(1)) })
            .formatter(|_v: &Value| -> anyhow::Result<String> { panic!("formatter broke") })
            .build()
            .unwrap();
        let toolbox = ToolBox::new([boom, bad_format]);

        let exec = toolbox.execute_detailed("boom", "{}", None).await.unwrap();
        assert_eq!(exec.result.output, "try later");
        let failure = exec.failure.unwrap();
        assert_eq!(failure.kind, FailureKind::Invocation);
        assert!(failure.message.contains("kaboom"));

        let exec = toolbox.execute_detailed("bad_format", "{}", None).await.unwrap();
        assert_eq!(exec.failure.unwrap().kind, FailureKind::Formatting);
    }

    #[test]
    fn test_register_replaces_and_reports() {
        let toolbox = ToolBox::default();
        assert!(toolbox.is_empty());
        assert!(toolbox.register(adder()).is_none());
        assert!(toolbox.register(adder()).is_some());
        assert_eq!(toolbox.len(), 1);
        assert_eq!(toolbox.names(), vec!["add".to_string()]);
    }

    #[test]
    fn test_unregister_flag() {
        let toolbox = ToolBox::new([adder()]);
        assert!(toolbox.unregister("missing", false).unwrap().is_none());
        assert!(toolbox.unregister("missing", true).unwrap_err().is_not_found());
        assert!(toolbox.unregister("add", true).unwrap().is_some());
        assert!(!toolbox.has("add"));
    }
}

//! # Types Module
//!
//! Wire shapes exchanged with the provider: tool declarations, tool calls and
//! their outputs, run state, and response-stream events.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ProviderToolSpec`] | Tool declaration sent to the provider |
//! | [`ToolCallRequest`] | One tool invocation attempt |
//! | [`ToolCallResult`] | Output envelope keyed by call id |
//! | [`Run`] / [`RunStatus`] | Remote run state used by the poller |
//! | [`ResponseStreamEvent`] | Routed response-stream event |
//!
//! ## Example
//!
//! ```rust
//! use ai_toolbox::types::{ToolArguments, ToolCallRequest};
//!
//! let req = ToolCallRequest::new("get_weather", r#"{"city": "Tokyo"}"#).with_call_id("call_1");
//! assert!(matches!(req.arguments, ToolArguments::Raw(_)));
//! ```

pub mod events;
pub mod run;
pub mod tool;

pub use events::{ResponseEventKind, ResponseStreamEvent};
pub use run::{RequiredAction, Run, RunSnapshot, RunStatus, SubmitToolOutputsAction};
pub use tool::{
    FunctionCall, FunctionDefinition, ProviderToolSpec, RequiredToolCall, ToolArguments,
    ToolCallRequest, ToolCallResult,
};

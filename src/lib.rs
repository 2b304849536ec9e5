//! # ai-toolbox
//!
//! Function-tool registry, schema adapter and fault-contained dispatcher for
//! LLM tool calling.
//!
//! ## Overview
//!
//! A model asks for tools by name with a JSON argument string. This crate keeps
//! the tools a session offers, declares them to the provider in the shape it
//! accepts, and answers each call with exactly one output keyed by the call id.
//! A tool that fails still answers, with its fallback text, so the surrounding
//! conversation never loses track of a call.
//!
//! ## Key Features
//!
//! - **Registry**: [`ToolBox`] maps names to immutable [`ToolDefinition`]s (last registration wins)
//! - **Schema adapter**: [`schema::describe`] strips `title`/`default` and marks every field required
//! - **Argument repair**: near-miss JSON (trailing commas, bare keys, truncation) is recovered via [`repair`]
//! - **Batch dispatch**: independent calls run in parallel, bounded by [`ToolBoxConfig::max_parallelism`]
//! - **Run polling**: [`run::RunPoller`] answers `requires_action` runs automatically
//! - **Stream routing**: [`stream::StreamEventHandler`] receives response-stream events by family
//!
//! ## Quick Start
//!
//! ```rust
//! use ai_toolbox::{schema, ToolBox, ToolDefinition};
//! use schemars::JsonSchema;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, JsonSchema)]
//! struct GetWeather {
//!     city: String,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> ai_toolbox::Result<()> {
//! let weather = ToolDefinition::builder("get_weather")
//!     .description("Current weather for a city")
//!     .invoke_typed(|req: GetWeather| async move { Ok(format!("Sunny in {}", req.city)) })
//!     .build()?;
//!
//! let toolbox = ToolBox::new([weather]);
//! let declarations = schema::describe_all(&toolbox);
//! assert_eq!(declarations[0].function.name, "get_weather");
//!
//! // Trailing comma is repaired before validation.
//! let result = toolbox
//!     .execute("get_weather", r#"{"city": "Oslo",}"#, Some("call_abc".into()))
//!     .await?;
//! assert_eq!(result.output, "Sunny in Oslo");
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`toolbox`] | Tool definitions, registry and dispatcher |
//! | [`schema`] | Provider tool declarations and parameter-schema helpers |
//! | [`repair`] | Pluggable best-effort JSON repair |
//! | [`run`] | Run polling driver that submits tool outputs |
//! | [`stream`] | Response-stream event routing and tool call assembly |
//! | [`types`] | Provider wire shapes |
//! | [`ids`] | Provider-shaped random identifiers |
//! | [`telemetry`] | Tracing subscriber setup |

pub mod error;
pub mod ids;
pub mod repair;
pub mod run;
pub mod schema;
pub mod stream;
pub mod telemetry;
pub mod toolbox;
pub mod types;

pub use error::{Error, ErrorContext};
pub use repair::{BestEffortRepair, JsonRepair, NoRepair};
pub use run::{PollConfig, RunPoller, RunsApi};
pub use stream::{StreamEventHandler, ToolCallCollector};
pub use toolbox::{
    FailureKind, ToolBox, ToolBoxConfig, ToolDefinition, ToolExecution, ToolFailure, ToolFunction,
};
pub use types::{ProviderToolSpec, ToolArguments, ToolCallRequest, ToolCallResult};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

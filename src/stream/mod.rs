//! # Stream Module
//!
//! Routes provider response-stream events to overridable handler methods.
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`StreamEventHandler`] | One no-op method per event family |
//! | [`dispatch_event`] | Route a single event |
//! | [`drive_stream`] | Route every event of a stream, in order |
//! | [`ToolCallAssembler`] | Build tool call requests from streamed fragments |
//! | [`ToolCallCollector`] | Handler that feeds the assembler |
//!
//! Every event first reaches [`StreamEventHandler::on_event`], then exactly one
//! family method. Tags outside the known catalog go to
//! [`StreamEventHandler::on_unhandled`], which logs a warning unless overridden.

mod assembler;
mod collector;

pub use assembler::ToolCallAssembler;
pub use collector::ToolCallCollector;

use crate::types::events::{ResponseEventKind, ResponseStreamEvent};
use crate::Result;
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde_json::Value;
use tracing::warn;

#[async_trait]
pub trait StreamEventHandler: Send {
    /// Called for every event before its family method.
    async fn on_event(&mut self, _event: &ResponseStreamEvent) -> Result<()> {
        Ok(())
    }

    async fn on_text_delta(&mut self, _delta: &str, _event: &ResponseStreamEvent) -> Result<()> {
        Ok(())
    }

    async fn on_text_done(&mut self, _text: &str, _event: &ResponseStreamEvent) -> Result<()> {
        Ok(())
    }

    async fn on_function_call_arguments_delta(
        &mut self,
        _item_id: &str,
        _delta: &str,
        _event: &ResponseStreamEvent,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_function_call_arguments_done(
        &mut self,
        _item_id: &str,
        _arguments: &str,
        _event: &ResponseStreamEvent,
    ) -> Result<()> {
        Ok(())
    }

    async fn on_output_item_added(&mut self, _item: &Value, _event: &ResponseStreamEvent) -> Result<()> {
        Ok(())
    }

    async fn on_output_item_done(&mut self, _item: &Value, _event: &ResponseStreamEvent) -> Result<()> {
        Ok(())
    }

    /// Created, in progress, completed, failed and incomplete.
    async fn on_lifecycle(&mut self, _event: &ResponseStreamEvent) -> Result<()> {
        Ok(())
    }

    async fn on_error(&mut self, _event: &ResponseStreamEvent) -> Result<()> {
        Ok(())
    }

    /// Known catalog events without a dedicated method (audio, refusal, reasoning, search calls...).
    async fn on_other(&mut self, _event: &ResponseStreamEvent) -> Result<()> {
        Ok(())
    }

    async fn on_unhandled(&mut self, event: &ResponseStreamEvent) -> Result<()> {
        warn!(event_type = %event.kind, "unhandled response stream event");
        Ok(())
    }
}

/// Route one event to `handler`.
pub async fn dispatch_event<H>(handler: &mut H, event: &ResponseStreamEvent) -> Result<()>
where
    H: StreamEventHandler + ?Sized,
{
    handler.on_event(event).await?;

    let text = |key: &str| event.str_field(key).unwrap_or_default();
    let null = Value::Null;
    let item = event.payload.get("item").unwrap_or(&null);

    match &event.kind {
        ResponseEventKind::OutputTextDelta => handler.on_text_delta(text("delta"), event).await,
        ResponseEventKind::OutputTextDone => handler.on_text_done(text("text"), event).await,
        ResponseEventKind::FunctionCallArgumentsDelta => {
            handler
                .on_function_call_arguments_delta(text("item_id"), text("delta"), event)
                .await
        }
        ResponseEventKind::FunctionCallArgumentsDone => {
            handler
                .on_function_call_arguments_done(text("item_id"), text("arguments"), event)
                .await
        }
        ResponseEventKind::OutputItemAdded => handler.on_output_item_added(item, event).await,
        ResponseEventKind::OutputItemDone => handler.on_output_item_done(item, event).await,
        ResponseEventKind::Error => handler.on_error(event).await,
        ResponseEventKind::Unhandled(_) => handler.on_unhandled(event).await,
        kind if kind.is_lifecycle() => handler.on_lifecycle(event).await,
        _ => handler.on_other(event).await,
    }
}

/// Route every event of `stream` in order. Returns how many events were seen.
///
/// Stops at the first error, from the stream or from a handler.
pub async fn drive_stream<H, S>(handler: &mut H, stream: S) -> Result<usize>
where
    H: StreamEventHandler + ?Sized,
    S: Stream<Item = Result<ResponseStreamEvent>>,
{
    futures::pin_mut!(stream);
    let mut seen = 0;
    while let Some(event) = stream.next().await {
        dispatch_event(&mut *handler, &event?).await?;
        seen += 1;
    }
    Ok(seen)
}

use super::{StreamEventHandler, ToolCallAssembler};
use crate::types::events::ResponseStreamEvent;
use crate::types::tool::ToolCallRequest;
use crate::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Handler that gathers the function calls of a streamed response.
///
/// Feed it with [`drive_stream`](super::drive_stream), then hand
/// [`finish`](Self::finish) to [`ToolBox::execute_batch`](crate::ToolBox::execute_batch).
#[derive(Debug, Default)]
pub struct ToolCallCollector {
    assembler: ToolCallAssembler,
}

impl ToolCallCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.assembler.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assembler.is_empty()
    }

    pub fn finish(self) -> Vec<ToolCallRequest> {
        self.assembler.finalize()
    }

    fn track(&mut self, item: &Value) {
        if item.get("type").and_then(Value::as_str) != Some("function_call") {
            return;
        }
        let field = |key: &str| item.get(key).and_then(Value::as_str).map(str::to_string);
        let (Some(item_id), Some(name)) = (field("id").or_else(|| field("call_id")), field("name"))
        else {
            debug!(item = %item, "function call item without id or name");
            return;
        };
        self.assembler.on_started(item_id, field("call_id"), name);
    }
}

#[async_trait]
impl StreamEventHandler for ToolCallCollector {
    async fn on_function_call_arguments_delta(
        &mut self,
        item_id: &str,
        delta: &str,
        _event: &ResponseStreamEvent,
    ) -> Result<()> {
        self.assembler.on_partial(item_id, delta);
        Ok(())
    }

    async fn on_function_call_arguments_done(
        &mut self,
        item_id: &str,
        arguments: &str,
        _event: &ResponseStreamEvent,
    ) -> Result<()> {
        self.assembler.on_done(item_id, arguments);
        Ok(())
    }

    async fn on_output_item_added(&mut self, item: &Value, _event: &ResponseStreamEvent) -> Result<()> {
        self.track(item);
        Ok(())
    }

    async fn on_output_item_done(&mut self, item: &Value, _event: &ResponseStreamEvent) -> Result<()> {
        // Items can show up complete without an earlier `added` event.
        self.track(item);
        if let (Some(item_id), Some(arguments)) = (
            item.get("id").or_else(|| item.get("call_id")).and_then(Value::as_str),
            item.get("arguments").and_then(Value::as_str),
        ) {
            self.assembler.on_done(item_id, arguments);
        }
        Ok(())
    }
}

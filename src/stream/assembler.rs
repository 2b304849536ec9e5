use crate::types::tool::{ToolArguments, ToolCallRequest};

#[derive(Debug, Clone)]
struct PendingCall {
    item_id: String,
    call_id: Option<String>,
    name: String,
    arguments: String,
}

/// Collects streamed function calls (started + argument fragments) into
/// [`ToolCallRequest`]s.
///
/// Arguments stay raw strings so the dispatcher's repair step sees exactly what
/// the model produced, including a truncated tail.
#[derive(Debug, Default)]
pub struct ToolCallAssembler {
    calls: Vec<PendingCall>,
}

impl ToolCallAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking an output item. Repeated starts for the same item are ignored.
    pub fn on_started(&mut self, item_id: String, call_id: Option<String>, name: String) {
        if self.calls.iter().any(|c| c.item_id == item_id) {
            return;
        }
        self.calls.push(PendingCall {
            item_id,
            call_id,
            name,
            arguments: String::new(),
        });
    }

    pub fn on_partial(&mut self, item_id: &str, fragment: &str) {
        if let Some(call) = self.find_mut(item_id) {
            call.arguments.push_str(fragment);
        }
    }

    /// Final argument text supersedes accumulated fragments.
    pub fn on_done(&mut self, item_id: &str, arguments: &str) {
        if let Some(call) = self.find_mut(item_id) {
            call.arguments = arguments.to_string();
        }
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Requests in the order the calls started. Calls without a provider call
    /// id are keyed by their item id.
    pub fn finalize(self) -> Vec<ToolCallRequest> {
        self.calls
            .into_iter()
            .map(|c| ToolCallRequest {
                name: c.name,
                arguments: ToolArguments::Raw(c.arguments),
                call_id: Some(c.call_id.unwrap_or(c.item_id)),
            })
            .collect()
    }

    fn find_mut(&mut self, item_id: &str) -> Option<&mut PendingCall> {
        self.calls.iter_mut().find(|c| c.item_id == item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragments_accumulate() {
        let mut asm = ToolCallAssembler::new();
        asm.on_started("fc_1".into(), Some("call_1".into()), "get_weather".into());
        asm.on_started("fc_1".into(), None, "ignored".into());
        asm.on_partial("fc_1", "{\"city\":");
        asm.on_partial("fc_1", " \"Tokyo\"");
        asm.on_partial("unknown", "dropped");

        let calls = asm.finalize();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "get_weather");
        assert_eq!(calls[0].call_id.as_deref(), Some("call_1"));
        assert_eq!(
            calls[0].arguments,
            ToolArguments::Raw("{\"city\": \"Tokyo\"".into())
        );
    }

    #[test]
    fn test_done_overrides_and_item_id_fallback() {
        let mut asm = ToolCallAssembler::new();
        asm.on_started("fc_2".into(), None, "get_time_now".into());
        asm.on_partial("fc_2", "{");
        asm.on_done("fc_2", "{}");
        assert_eq!(asm.len(), 1);

        let calls = asm.finalize();
        assert_eq!(calls[0].call_id.as_deref(), Some("fc_2"));
        assert_eq!(calls[0].arguments, ToolArguments::Raw("{}".into()));
    }
}

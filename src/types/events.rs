//! Response-stream events as emitted by the provider's streaming endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Provider response-stream event catalog, keyed by the event `type` tag.
///
/// Tags this crate does not know land in [`ResponseEventKind::Unhandled`] so the
/// router can report them instead of dropping them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResponseEventKind {
    AudioDelta,
    AudioDone,
    AudioTranscriptDelta,
    AudioTranscriptDone,
    CodeInterpreterCallCodeDelta,
    CodeInterpreterCallCodeDone,
    CodeInterpreterCallCompleted,
    CodeInterpreterCallInProgress,
    CodeInterpreterCallInterpreting,
    Completed,
    ContentPartAdded,
    ContentPartDone,
    Created,
    Error,
    FileSearchCallCompleted,
    FileSearchCallInProgress,
    FileSearchCallSearching,
    FunctionCallArgumentsDelta,
    FunctionCallArgumentsDone,
    InProgress,
    Failed,
    Incomplete,
    OutputItemAdded,
    OutputItemDone,
    ReasoningSummaryPartAdded,
    ReasoningSummaryPartDone,
    ReasoningSummaryTextDelta,
    ReasoningSummaryTextDone,
    RefusalDelta,
    RefusalDone,
    OutputTextAnnotationAdded,
    OutputTextDelta,
    OutputTextDone,
    WebSearchCallCompleted,
    WebSearchCallInProgress,
    WebSearchCallSearching,
    Unhandled(String),
}

const CATALOG: &[(&str, ResponseEventKind)] = &[
    ("response.audio.delta", ResponseEventKind::AudioDelta),
    ("response.audio.done", ResponseEventKind::AudioDone),
    ("response.audio.transcript.delta", ResponseEventKind::AudioTranscriptDelta),
    ("response.audio.transcript.done", ResponseEventKind::AudioTranscriptDone),
    ("response.code_interpreter_call.code.delta", ResponseEventKind::CodeInterpreterCallCodeDelta),
    ("response.code_interpreter_call.code.done", ResponseEventKind::CodeInterpreterCallCodeDone),
    ("response.code_interpreter_call.completed", ResponseEventKind::CodeInterpreterCallCompleted),
    ("response.code_interpreter_call.in_progress", ResponseEventKind::CodeInterpreterCallInProgress),
    ("response.code_interpreter_call.interpreting", ResponseEventKind::CodeInterpreterCallInterpreting),
    ("response.completed", ResponseEventKind::Completed),
    ("response.content_part.added", ResponseEventKind::ContentPartAdded),
    ("response.content_part.done", ResponseEventKind::ContentPartDone),
    ("response.created", ResponseEventKind::Created),
    ("error", ResponseEventKind::Error),
    ("response.file_search_call.completed", ResponseEventKind::FileSearchCallCompleted),
    ("response.file_search_call.in_progress", ResponseEventKind::FileSearchCallInProgress),
    ("response.file_search_call.searching", ResponseEventKind::FileSearchCallSearching),
    ("response.function_call_arguments.delta", ResponseEventKind::FunctionCallArgumentsDelta),
    ("response.function_call_arguments.done", ResponseEventKind::FunctionCallArgumentsDone),
    ("response.in_progress", ResponseEventKind::InProgress),
    ("response.failed", ResponseEventKind::Failed),
    ("response.incomplete", ResponseEventKind::Incomplete),
    ("response.output_item.added", ResponseEventKind::OutputItemAdded),
    ("response.output_item.done", ResponseEventKind::OutputItemDone),
    ("response.reasoning_summary_part.added", ResponseEventKind::ReasoningSummaryPartAdded),
    ("response.reasoning_summary_part.done", ResponseEventKind::ReasoningSummaryPartDone),
    ("response.reasoning_summary_text.delta", ResponseEventKind::ReasoningSummaryTextDelta),
    ("response.reasoning_summary_text.done", ResponseEventKind::ReasoningSummaryTextDone),
    ("response.refusal.delta", ResponseEventKind::RefusalDelta),
    ("response.refusal.done", ResponseEventKind::RefusalDone),
    ("response.output_text.annotation.added", ResponseEventKind::OutputTextAnnotationAdded),
    ("response.output_text.delta", ResponseEventKind::OutputTextDelta),
    ("response.output_text.done", ResponseEventKind::OutputTextDone),
    ("response.web_search_call.completed", ResponseEventKind::WebSearchCallCompleted),
    ("response.web_search_call.in_progress", ResponseEventKind::WebSearchCallInProgress),
    ("response.web_search_call.searching", ResponseEventKind::WebSearchCallSearching),
];

impl ResponseEventKind {
    pub fn from_tag(tag: &str) -> Self {
        CATALOG
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, k)| k.clone())
            .unwrap_or_else(|| ResponseEventKind::Unhandled(tag.to_string()))
    }

    pub fn as_tag(&self) -> &str {
        match self {
            ResponseEventKind::Unhandled(tag) => tag,
            known => CATALOG
                .iter()
                .find(|(_, k)| k == known)
                .map(|(t, _)| *t)
                .unwrap_or(""),
        }
    }

    /// Response lifecycle transitions (created, in progress, completed, failed, incomplete).
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            ResponseEventKind::Created
                | ResponseEventKind::InProgress
                | ResponseEventKind::Completed
                | ResponseEventKind::Failed
                | ResponseEventKind::Incomplete
        )
    }
}

impl std::fmt::Display for ResponseEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// A single stream event: its routed kind plus the full provider payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseStreamEvent {
    pub kind: ResponseEventKind,
    pub payload: Value,
}

impl ResponseStreamEvent {
    pub fn from_value(payload: Value) -> Self {
        let tag = payload.get("type").and_then(|t| t.as_str()).unwrap_or("");
        Self {
            kind: ResponseEventKind::from_tag(tag),
            payload,
        }
    }

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(|v| v.as_str())
    }
}

impl Serialize for ResponseStreamEvent {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.payload.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ResponseStreamEvent {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(ResponseStreamEvent::from_value)
    }
}

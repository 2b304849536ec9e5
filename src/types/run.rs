//! Remote run state as reported by the provider's polling endpoint.

use crate::types::tool::RequiredToolCall;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Run status vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    /// Status string this crate does not recognize.
    Other(String),
}

impl RunStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Other(s) => s,
        }
    }

    /// Statuses after which the run makes no progress without new input.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::RequiresAction
                | RunStatus::Cancelled
                | RunStatus::Completed
                | RunStatus::Failed
                | RunStatus::Expired
                | RunStatus::Incomplete
        )
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RunStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(RunStatus::from_tag(s))
    }
}

impl RunStatus {
    pub fn from_tag(s: &str) -> Self {
        match s {
            "queued" => RunStatus::Queued,
            "in_progress" => RunStatus::InProgress,
            "requires_action" => RunStatus::RequiresAction,
            "cancelling" => RunStatus::Cancelling,
            "cancelled" => RunStatus::Cancelled,
            "failed" => RunStatus::Failed,
            "completed" => RunStatus::Completed,
            "incomplete" => RunStatus::Incomplete,
            "expired" => RunStatus::Expired,
            other => RunStatus::Other(other.to_string()),
        }
    }
}

impl Serialize for RunStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RunStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(|s| RunStatus::from_tag(&s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitToolOutputsAction {
    pub tool_calls: Vec<RequiredToolCall>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequiredAction {
    #[serde(rename = "type", default)]
    pub action_type: String,
    pub submit_tool_outputs: SubmitToolOutputsAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub thread_id: String,
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_action: Option<RequiredAction>,
}

impl Run {
    pub fn required_tool_calls(&self) -> &[RequiredToolCall] {
        self.required_action
            .as_ref()
            .map(|a| a.submit_tool_outputs.tool_calls.as_slice())
            .unwrap_or(&[])
    }
}

/// A retrieved run plus the server's suggested delay before the next poll.
#[derive(Debug, Clone)]
pub struct RunSnapshot {
    pub run: Run,
    pub poll_after: Option<Duration>,
}

impl From<Run> for RunSnapshot {
    fn from(run: Run) -> Self {
        Self {
            run,
            poll_after: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_terminal_states() {
        for s in ["requires_action", "cancelled", "completed", "failed", "expired", "incomplete"] {
            assert!(s.parse::<RunStatus>().unwrap().is_terminal(), "{s}");
        }
        for s in ["queued", "in_progress", "cancelling", "paused"] {
            assert!(!s.parse::<RunStatus>().unwrap().is_terminal(), "{s}");
        }
    }

    #[test]
    fn test_run_deserialize_with_required_action() {
        let run: Run = serde_json::from_value(json!({
            "id": "run_1",
            "thread_id": "thread_1",
            "status": "requires_action",
            "required_action": {
                "type": "submit_tool_outputs",
                "submit_tool_outputs": {"tool_calls": [
                    {"id": "call_1", "type": "function", "function": {"name": "a", "arguments": "{}"}}
                ]}
            }
        }))
        .unwrap();
        assert_eq!(run.status, RunStatus::RequiresAction);
        assert_eq!(run.required_tool_calls().len(), 1);
        assert_eq!(serde_json::to_value(&run.status).unwrap(), json!("requires_action"));
    }

    #[test]
    fn test_unknown_status_preserved() {
        let status: RunStatus = serde_json::from_value(json!("paused")).unwrap();
        assert_eq!(status, RunStatus::Other("paused".into()));
        assert_eq!(status.to_string(), "paused");
    }
}

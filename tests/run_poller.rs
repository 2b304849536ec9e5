//! Integration tests for the run polling driver

use ai_toolbox::types::{
    FunctionCall, RequiredAction, RequiredToolCall, Run, RunSnapshot, RunStatus,
    SubmitToolOutputsAction,
};
use ai_toolbox::{
    Error, PollConfig, Result, RunPoller, RunsApi, ToolBox, ToolCallResult, ToolDefinition,
};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Replays scripted run states and records submitted outputs.
#[derive(Default)]
struct ScriptedRuns {
    states: Mutex<VecDeque<Run>>,
    submitted: Mutex<Vec<Vec<ToolCallResult>>>,
    retrieved: Mutex<usize>,
}

impl ScriptedRuns {
    fn new(states: Vec<Run>) -> Self {
        Self {
            states: Mutex::new(states.into()),
            ..Default::default()
        }
    }

    fn submitted(&self) -> Vec<Vec<ToolCallResult>> {
        self.submitted.lock().unwrap().clone()
    }

    fn retrieved(&self) -> usize {
        *self.retrieved.lock().unwrap()
    }
}

#[async_trait]
impl RunsApi for ScriptedRuns {
    async fn retrieve_run(&self, _thread_id: &str, _run_id: &str) -> Result<RunSnapshot> {
        *self.retrieved.lock().unwrap() += 1;
        let next = self.states.lock().unwrap().pop_front();
        match next {
            Some(run) => Ok(RunSnapshot {
                run,
                poll_after: Some(Duration::from_millis(1)),
            }),
            None => Err(Error::Provider {
                status: 500,
                message: "script exhausted".into(),
            }),
        }
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: Vec<ToolCallResult>,
    ) -> Result<Run> {
        self.submitted.lock().unwrap().push(outputs);
        Ok(run(thread_id, run_id, RunStatus::Queued, vec![]))
    }
}

fn run(thread_id: &str, run_id: &str, status: RunStatus, calls: Vec<RequiredToolCall>) -> Run {
    Run {
        id: run_id.into(),
        thread_id: thread_id.into(),
        status,
        required_action: (!calls.is_empty()).then(|| RequiredAction {
            action_type: "submit_tool_outputs".into(),
            submit_tool_outputs: SubmitToolOutputsAction { tool_calls: calls },
        }),
    }
}

fn call(id: &str, name: &str, arguments: &str) -> RequiredToolCall {
    RequiredToolCall {
        id: id.into(),
        call_type: "function".into(),
        function: FunctionCall {
            name: name.into(),
            arguments: arguments.into(),
        },
    }
}

fn toolbox() -> Arc<ToolBox> {
    let time = ToolDefinition::builder("get_time_now")
        .invoke(|_args: Value| async { Ok(json!("12:00")) })
        .build()
        .unwrap();
    let broken = ToolDefinition::builder("broken")
        .invoke(|_args: Value| async { Err(anyhow::anyhow!("boom")) })
        .error_fallback("unavailable")
        .build()
        .unwrap();
    Arc::new(ToolBox::new([time, broken]))
}

fn fast() -> PollConfig {
    PollConfig::new().with_poll_interval(Duration::from_millis(1))
}

#[tokio::test]
async fn test_requires_action_is_answered_and_polling_continues() {
    let api = Arc::new(ScriptedRuns::new(vec![
        run("thread_1", "run_1", RunStatus::Queued, vec![]),
        run(
            "thread_1",
            "run_1",
            RunStatus::RequiresAction,
            vec![call("call_a", "get_time_now", "{}"), call("call_b", "broken", "{}")],
        ),
        run("thread_1", "run_1", RunStatus::InProgress, vec![]),
        run("thread_1", "run_1", RunStatus::Completed, vec![]),
    ]));
    let poller = RunPoller::new(Arc::clone(&api))
        .with_toolbox(toolbox())
        .with_config(fast());

    let finished = poller.poll("thread_1", "run_1").await.unwrap();
    assert_eq!(finished.status, RunStatus::Completed);
    assert_eq!(api.retrieved(), 4);

    let submitted = api.submitted();
    assert_eq!(submitted.len(), 1);
    let mut outputs = submitted[0].clone();
    outputs.sort_by(|a, b| a.call_id.cmp(&b.call_id));
    assert_eq!(
        outputs,
        vec![
            ToolCallResult {
                call_id: "call_a".into(),
                output: "12:00".into()
            },
            ToolCallResult {
                call_id: "call_b".into(),
                output: "unavailable".into()
            },
        ]
    );
}

#[tokio::test]
async fn test_without_toolbox_requires_action_is_returned() {
    let api = Arc::new(ScriptedRuns::new(vec![run(
        "t",
        "r",
        RunStatus::RequiresAction,
        vec![call("call_a", "get_time_now", "{}")],
    )]));
    let poller = RunPoller::new(Arc::clone(&api)).with_config(fast());

    let run = poller.poll("t", "r").await.unwrap();
    assert_eq!(run.status, RunStatus::RequiresAction);
    assert!(api.submitted().is_empty());
}

#[tokio::test]
async fn test_unknown_status_keeps_polling_until_terminal() {
    let api = Arc::new(ScriptedRuns::new(vec![
        run("t", "r", RunStatus::Other("paused".into()), vec![]),
        run("t", "r", RunStatus::Expired, vec![]),
    ]));
    // Server hint (1 ms) is used when no interval is configured.
    let poller = RunPoller::new(Arc::clone(&api));

    let run = poller.poll("t", "r").await.unwrap();
    assert_eq!(run.status, RunStatus::Expired);
    assert_eq!(api.retrieved(), 2);
}

#[tokio::test]
async fn test_unknown_tool_in_required_action_propagates() {
    let api = Arc::new(ScriptedRuns::new(vec![run(
        "t",
        "r",
        RunStatus::RequiresAction,
        vec![call("call_x", "not_registered", "{}")],
    )]));
    let poller = RunPoller::new(Arc::clone(&api))
        .with_toolbox(toolbox())
        .with_config(fast());

    let err = poller.poll("t", "r").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(api.submitted().is_empty());
}

#[tokio::test]
async fn test_provider_errors_propagate() {
    let api = Arc::new(ScriptedRuns::new(vec![]));
    let poller = RunPoller::new(Arc::clone(&api)).with_config(fast());
    let err = poller.poll("t", "r").await.unwrap_err();
    assert!(matches!(err, Error::Provider { status: 500, .. }));
}

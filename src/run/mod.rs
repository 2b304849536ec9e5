//! # Run Module
//!
//! Polling driver for remote assistant runs that answers tool calls itself.
//!
//! While a run sits in `requires_action`, [`RunPoller`] dispatches every
//! required tool call through its [`ToolBox`], submits the outputs and keeps
//! polling until the run reaches any other terminal status. Without a toolbox
//! `requires_action` is returned to the caller like any terminal status.
//!
//! The provider itself is reached through [`RunsApi`], so the poller works
//! with any HTTP client (or a scripted fake in tests).

use crate::toolbox::ToolBox;
use crate::types::run::{Run, RunSnapshot, RunStatus};
use crate::types::tool::ToolCallResult;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Delay between polls when neither the caller nor the server sets one.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Provider endpoints the poller needs.
#[async_trait]
pub trait RunsApi: Send + Sync {
    /// Fetch the current state of a run, with the server's poll-after hint if any.
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<RunSnapshot>;

    /// Hand tool outputs back to a run waiting in `requires_action`.
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: Vec<ToolCallResult>,
    ) -> Result<Run>;
}

#[async_trait]
impl<T: RunsApi + ?Sized> RunsApi for Arc<T> {
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<RunSnapshot> {
        (**self).retrieve_run(thread_id, run_id).await
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: Vec<ToolCallResult>,
    ) -> Result<Run> {
        (**self).submit_tool_outputs(thread_id, run_id, outputs).await
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollConfig {
    /// Fixed delay between polls. When unset the server hint is used, then
    /// [`DEFAULT_POLL_INTERVAL`].
    pub poll_interval: Option<Duration>,
}

impl PollConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    fn delay_for(&self, snapshot: &RunSnapshot) -> Duration {
        self.poll_interval
            .or(snapshot.poll_after)
            .unwrap_or(DEFAULT_POLL_INTERVAL)
    }
}

pub struct RunPoller<A> {
    api: A,
    toolbox: Option<Arc<ToolBox>>,
    config: PollConfig,
}

impl<A: RunsApi> RunPoller<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            toolbox: None,
            config: PollConfig::default(),
        }
    }

    pub fn with_toolbox(mut self, toolbox: Arc<ToolBox>) -> Self {
        self.toolbox = Some(toolbox);
        self
    }

    pub fn with_config(mut self, config: PollConfig) -> Self {
        self.config = config;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn toolbox(&self) -> Option<&Arc<ToolBox>> {
        self.toolbox.as_ref()
    }

    /// Poll until the run reaches a terminal status the poller cannot act on.
    ///
    /// Provider errors propagate unchanged, as does [`Error::NotFound`](crate::Error::NotFound)
    /// for a required tool call naming an unregistered tool.
    pub async fn poll(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        loop {
            let snapshot = self.api.retrieve_run(thread_id, run_id).await?;
            debug!(thread_id, run_id, status = %snapshot.run.status, "polled run");

            if let RunStatus::Other(tag) = &snapshot.run.status {
                warn!(thread_id, run_id, status = %tag, "unrecognized run status, continuing to poll");
            }

            let requires_action = snapshot.run.status == RunStatus::RequiresAction;
            match &self.toolbox {
                Some(toolbox) if requires_action => {
                    let calls = snapshot.run.required_tool_calls();
                    if calls.is_empty() {
                        warn!(thread_id, run_id, "run requires action but lists no tool calls");
                        return Ok(snapshot.run);
                    }
                    let outputs = toolbox.handle_tool_calls(calls).await?;
                    info!(thread_id, run_id, outputs = outputs.len(), "submitting tool outputs");
                    self.api
                        .submit_tool_outputs(thread_id, run_id, outputs)
                        .await?;
                }
                _ if snapshot.run.status.is_terminal() => return Ok(snapshot.run),
                _ => {}
            }

            tokio::time::sleep(self.config.delay_for(&snapshot)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(hint: Option<u64>) -> RunSnapshot {
        RunSnapshot {
            run: Run {
                id: "run_1".into(),
                thread_id: "thread_1".into(),
                status: RunStatus::Queued,
                required_action: None,
            },
            poll_after: hint.map(Duration::from_millis),
        }
    }

    #[test]
    fn test_delay_precedence() {
        let default = PollConfig::new();
        assert_eq!(default.delay_for(&snapshot(None)), DEFAULT_POLL_INTERVAL);
        assert_eq!(
            default.delay_for(&snapshot(Some(250))),
            Duration::from_millis(250)
        );

        let fixed = PollConfig::new().with_poll_interval(Duration::from_millis(10));
        assert_eq!(
            fixed.delay_for(&snapshot(Some(250))),
            Duration::from_millis(10)
        );
    }
}

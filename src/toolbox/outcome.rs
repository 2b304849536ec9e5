//! Contained failure reporting for tool calls.

use crate::types::tool::ToolCallResult;
use std::fmt;

/// Stage of a tool call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Arguments could not be decoded (even after repair) or did not satisfy the schema.
    Validation,
    /// The bound function returned an error or panicked.
    Invocation,
    /// The response formatter failed on an otherwise successful invocation.
    Formatting,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::Invocation => "invocation",
            FailureKind::Formatting => "formatting",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl ToolFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Validation, message)
    }

    pub fn invocation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Invocation, message)
    }

    pub fn formatting(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Formatting, message)
    }
}

impl fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failure: {}", self.kind, self.message)
    }
}

impl std::error::Error for ToolFailure {}

/// A dispatched call: the envelope for the provider plus, on failure, what went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolExecution {
    pub result: ToolCallResult,
    pub failure: Option<ToolFailure>,
}

impl ToolExecution {
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }
}

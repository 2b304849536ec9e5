//! Provider-shaped random identifiers.

use uuid::Uuid;

/// Kinds of identifiers the provider hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    ChatCompletion,
    Assistant,
    Thread,
    Message,
    Run,
    ToolCall,
}

impl IdKind {
    fn prefix(&self) -> &'static str {
        match self {
            IdKind::ChatCompletion => "chatcmpl-",
            IdKind::Assistant => "asst_",
            IdKind::Thread => "thread_",
            IdKind::Message => "msg_",
            IdKind::Run => "run_",
            IdKind::ToolCall => "call_",
        }
    }

    fn random_len(&self) -> usize {
        match self {
            IdKind::ChatCompletion => 29,
            _ => 24,
        }
    }
}

impl std::str::FromStr for IdKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat_completion" | "chatcmpl" => Ok(IdKind::ChatCompletion),
            "assistant" | "asst" => Ok(IdKind::Assistant),
            "thread" => Ok(IdKind::Thread),
            "message" | "msg" => Ok(IdKind::Message),
            "run" => Ok(IdKind::Run),
            "call" | "tool_call" | "toolcall" | "tool" => Ok(IdKind::ToolCall),
            _ => Err(format!("Invalid id type: {}", s)),
        }
    }
}

/// Random string of `len` characters.
///
/// Drawn from UUID hex, so only `[0-9a-f]`: a subset of the provider's
/// mixed-case alphanumeric ids that still passes [`is_tool_call_id`].
fn random_alnum(len: usize) -> String {
    let mut out = String::with_capacity(len + 32);
    while out.len() < len {
        out.push_str(&Uuid::new_v4().simple().to_string());
    }
    out.truncate(len);
    out
}

pub fn random_id(kind: IdKind) -> String {
    format!("{}{}", kind.prefix(), random_alnum(kind.random_len()))
}

pub fn random_tool_call_id() -> String {
    random_id(IdKind::ToolCall)
}

/// Whether `id` has the shape of a generated tool call id (`call_` + 24 alphanumerics).
pub fn is_tool_call_id(id: &str) -> bool {
    id.strip_prefix("call_")
        .map(|rest| rest.len() == 24 && rest.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or(false)
}

//! Event-type resolution.
//!
//! The API accepts exactly five dotted-lowercase event tags. Callers may also
//! pass the legacy uppercase aliases (`MESSAGE_IN`, `TOOL_CALL`, ...), in any
//! letter casing. The dotted form itself is matched exactly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AnimaError, Result};

/// Canonical event type accepted by the remote API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// A message received by the agent.
    #[serde(rename = "message.in")]
    MessageIn,
    /// A message emitted by the agent.
    #[serde(rename = "message.out")]
    MessageOut,
    /// The agent invoked a tool.
    #[serde(rename = "tool.call")]
    ToolCall,
    /// A tool returned a result.
    #[serde(rename = "tool.result")]
    ToolResult,
    /// A system-level notice.
    #[serde(rename = "system.event")]
    SystemEvent,
}

impl EventType {
    /// Every canonical event type, in declaration order.
    #[must_use]
    pub fn all() -> &'static [EventType] {
        &[
            Self::MessageIn,
            Self::MessageOut,
            Self::ToolCall,
            Self::ToolResult,
            Self::SystemEvent,
        ]
    }

    /// The canonical wire tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MessageIn => "message.in",
            Self::MessageOut => "message.out",
            Self::ToolCall => "tool.call",
            Self::ToolResult => "tool.result",
            Self::SystemEvent => "system.event",
        }
    }

    /// The legacy uppercase alias.
    #[must_use]
    pub fn alias(self) -> &'static str {
        match self {
            Self::MessageIn => "MESSAGE_IN",
            Self::MessageOut => "MESSAGE_OUT",
            Self::ToolCall => "TOOL_CALL",
            Self::ToolResult => "TOOL_RESULT",
            Self::SystemEvent => "SYSTEM_EVENT",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = AnimaError;

    fn from_str(s: &str) -> Result<Self> {
        resolve_event_type(s)
    }
}

/// Resolve a caller-supplied token to its canonical [`EventType`].
///
/// # Errors
/// Returns [`AnimaError::Validation`] when the token is neither a canonical
/// tag nor a known alias. The message lists every canonical tag.
pub fn resolve_event_type(token: &str) -> Result<EventType> {
    let all = EventType::all();

    if let Some(found) = all.iter().find(|t| t.as_str() == token) {
        return Ok(*found);
    }

    let upper = token.to_uppercase();
    if let Some(found) = all.iter().find(|t| t.alias() == upper) {
        return Ok(*found);
    }

    let mut valid: Vec<&str> = all.iter().map(|t| t.as_str()).collect();
    valid.sort_unstable();
    Err(AnimaError::validation(Some(format!(
        "Invalid event_type '{token}'. Valid values: {}. \
         Hint: both dotted form (e.g. 'message.in') and uppercase aliases \
         (e.g. 'MESSAGE_IN') are accepted.",
        valid.join(", ")
    ))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_tags_resolve_unchanged() {
        for ty in EventType::all() {
            assert_eq!(resolve_event_type(ty.as_str()).unwrap(), *ty);
        }
    }

    #[test]
    fn aliases_resolve_in_any_casing() {
        assert_eq!(resolve_event_type("MESSAGE_IN").unwrap(), EventType::MessageIn);
        assert_eq!(resolve_event_type("message_out").unwrap(), EventType::MessageOut);
        assert_eq!(resolve_event_type("Tool_Call").unwrap(), EventType::ToolCall);
        assert_eq!(resolve_event_type("tOOL_rESULT").unwrap(), EventType::ToolResult);
        assert_eq!(resolve_event_type("System_Event").unwrap(), EventType::SystemEvent);
    }

    #[test]
    fn dotted_form_is_case_sensitive() {
        assert!(resolve_event_type("Message.In").is_err());
        assert!(resolve_event_type("TOOL.CALL").is_err());
    }

    #[test]
    fn unknown_token_lists_all_valid_values() {
        let err = resolve_event_type("chat").unwrap_err();
        assert!(matches!(err, AnimaError::Validation { .. }));
        let msg = err.to_string();
        for ty in EventType::all() {
            assert!(msg.contains(ty.as_str()), "missing {ty} in: {msg}");
        }
        assert!(msg.contains("Hint"));
        assert!(msg.contains("'chat'"));
    }

    #[test]
    fn valid_values_are_sorted_in_message() {
        let msg = resolve_event_type("").unwrap_err().to_string();
        assert!(msg.contains("message.in, message.out, system.event, tool.call, tool.result"));
    }

    #[test]
    fn from_str_and_display_agree() {
        for ty in EventType::all() {
            let parsed: EventType = ty.to_string().parse().expect("should parse");
            assert_eq!(parsed, *ty);
        }
    }

    #[test]
    fn serializes_as_canonical_tag() {
        let json = serde_json::to_string(&EventType::ToolResult).unwrap();
        assert_eq!(json, "\"tool.result\"");
        let back: EventType = serde_json::from_str("\"system.event\"").unwrap();
        assert_eq!(back, EventType::SystemEvent);
    }
}

//! Wire types for the Anima API.
//!
//! Records returned by the server are decoded leniently: optional fields
//! default when missing, and unknown fields are kept in `extra` so nothing
//! the server sends is dropped. Request payloads skip every unset optional
//! field rather than sending `null`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::event_type::EventType;

/// Free-form metadata mapping attached to animas and events.
pub type Metadata = Map<String, Value>;

/// Read an explicit `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Animas
// ---------------------------------------------------------------------------

/// An agent entity that owns events and memory packs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anima {
    /// Server-assigned identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional free-form metadata.
    #[serde(default)]
    pub meta: Option<Metadata>,
    /// Owning account reference.
    #[serde(default)]
    pub owner_id: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for `POST /animas`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewAnima {
    /// Display name (required by the server).
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Optional free-form metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Metadata>,
}

impl NewAnima {
    /// Start a creation payload with just a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            meta: None,
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the metadata mapping.
    #[must_use]
    pub fn with_meta(mut self, meta: Metadata) -> Self {
        self.meta = Some(meta);
        self
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// A captured occurrence, as stored by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Server-assigned identifier.
    pub id: String,
    /// Owning anima.
    pub anima_id: String,
    /// Canonical event tag, kept as sent by the server.
    pub event_type: String,
    /// Free-text content.
    pub content: String,
    /// Speaker role (`user`, `assistant`, `tool`, ...).
    #[serde(default)]
    pub role: Option<String>,
    /// Free-text author name.
    #[serde(default)]
    pub author: Option<String>,
    /// Conversation/session grouping key.
    #[serde(default)]
    pub session_id: Option<String>,
    /// When the event happened, as reported by the caller.
    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
    /// Free-form metadata.
    #[serde(default)]
    pub meta: Option<Metadata>,
    /// Caller-assigned importance.
    #[serde(default)]
    pub importance_score: Option<f64>,
    /// Server-side deduplication key.
    #[serde(default)]
    pub dedupe_key: Option<String>,
    /// When the server stored the event.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for `POST /events`.
///
/// Built by the client from a resolved [`EventType`] plus caller options.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEvent {
    /// Owning anima.
    pub anima_id: String,
    /// Resolved canonical event type.
    pub event_type: EventType,
    /// Free-text content.
    pub content: String,
    /// Conversation/session grouping key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Speaker role.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Free-text author name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// When the event happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<Utc>>,
    /// Free-form metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Metadata>,
    /// Caller-assigned importance. Must be finite.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importance_score: Option<f64>,
    /// Server-side deduplication key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedupe_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Memory packs
// ---------------------------------------------------------------------------

/// A memory or knowledge item annotated with a relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    /// Item identifier.
    #[serde(default)]
    pub id: Option<String>,
    /// Item text.
    #[serde(default)]
    pub content: Option<String>,
    /// Relevance score assigned during compilation.
    #[serde(default, deserialize_with = "null_as_default")]
    pub score: f64,
    /// Per-factor breakdown of `score`.
    #[serde(default)]
    pub score_breakdown: Option<Map<String, Value>>,
    /// Fields not modelled above (memory type, timestamps, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Nested content of a compiled memory pack. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryPackContent {
    /// Ready-to-inject prompt text.
    #[serde(default)]
    pub formatted: Option<String>,
    /// Identity context, opaque to the client.
    #[serde(default)]
    pub identity: Option<Value>,
    /// Scored memories from the current session.
    #[serde(default)]
    pub session_memories: Option<Vec<ScoredItem>>,
    /// Scored knowledge items.
    #[serde(default)]
    pub knowledge: Option<Vec<ScoredItem>>,
    /// Scored long-term memories.
    #[serde(default)]
    pub long_term_memories: Option<Vec<ScoredItem>>,
    /// Temporal bridging context, opaque to the client.
    #[serde(default)]
    pub temporal: Option<Value>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A compiled memory pack exactly as returned by the server.
///
/// Wrap it in [`crate::pack::MemoryPack`] for the read accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPackRecord {
    /// Server-assigned identifier.
    pub id: String,
    /// Anima the pack was compiled for.
    pub anima_id: String,
    /// Query the pack was compiled for, if any.
    #[serde(default)]
    pub query: Option<String>,
    /// Named preset the pack was compiled with, if any.
    #[serde(default)]
    pub preset: Option<String>,
    /// Number of session memories in the pack.
    #[serde(default, deserialize_with = "null_as_default")]
    pub session_memory_count: u32,
    /// Number of knowledge items in the pack.
    #[serde(default, deserialize_with = "null_as_default")]
    pub knowledge_count: u32,
    /// Number of long-term memories in the pack.
    #[serde(default, deserialize_with = "null_as_default")]
    pub long_term_memory_count: u32,
    /// Whether identity context was included.
    #[serde(default, deserialize_with = "null_as_default")]
    pub has_identity: bool,
    /// Tokens used by the formatted prompt.
    #[serde(default, deserialize_with = "null_as_default")]
    pub token_count: u32,
    /// Token budget the pack was compiled against.
    #[serde(default, deserialize_with = "null_as_default")]
    pub max_tokens: u32,
    /// May be missing or `null`.
    #[serde(default)]
    pub content: Option<MemoryPackContent>,
    /// When the server compiled the pack.
    #[serde(default)]
    pub compiled_at: Option<DateTime<Utc>>,
    /// When the pack record was stored.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Fields not modelled above.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

//! Read-only view over a compiled memory pack.
//!
//! [`MemoryPack`] wraps the raw [`MemoryPackRecord`] and projects fields out
//! of its nested content. Missing content, or a missing field inside it, reads
//! as empty: `""` for the prompt, an empty slice for the item lists and
//! `None` for the opaque identity/temporal contexts.

use std::ops::Deref;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{MemoryPackContent, MemoryPackRecord, ScoredItem};

/// A memory pack with prompt-injection accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryPack {
    record: MemoryPackRecord,
}

impl MemoryPack {
    /// Wrap a raw record.
    #[must_use]
    pub fn new(record: MemoryPackRecord) -> Self {
        Self { record }
    }

    /// The raw record.
    #[must_use]
    pub fn record(&self) -> &MemoryPackRecord {
        &self.record
    }

    /// Unwrap into the raw record.
    #[must_use]
    pub fn into_record(self) -> MemoryPackRecord {
        self.record
    }

    fn content(&self) -> Option<&MemoryPackContent> {
        self.record.content.as_ref()
    }

    /// The formatted prompt text, or `""` when the pack carries none.
    #[must_use]
    pub fn to_prompt(&self) -> &str {
        self.content()
            .and_then(|c| c.formatted.as_deref())
            .unwrap_or("")
    }

    /// Identity context, if the server included one.
    #[must_use]
    pub fn identity(&self) -> Option<&Value> {
        self.content()
            .and_then(|c| c.identity.as_ref())
            .filter(|v| !v.is_null())
    }

    /// Scored session memories, in server order.
    #[must_use]
    pub fn session_memories(&self) -> &[ScoredItem] {
        items(self.content().and_then(|c| c.session_memories.as_ref()))
    }

    /// Scored knowledge items, in server order.
    #[must_use]
    pub fn knowledge(&self) -> &[ScoredItem] {
        items(self.content().and_then(|c| c.knowledge.as_ref()))
    }

    /// Scored long-term memories, in server order.
    #[must_use]
    pub fn long_term_memories(&self) -> &[ScoredItem] {
        items(self.content().and_then(|c| c.long_term_memories.as_ref()))
    }

    /// Temporal bridging context, if the server included one.
    #[must_use]
    pub fn temporal_context(&self) -> Option<&Value> {
        self.content()
            .and_then(|c| c.temporal.as_ref())
            .filter(|v| !v.is_null())
    }
}

fn items(list: Option<&Vec<ScoredItem>>) -> &[ScoredItem] {
    list.map(Vec::as_slice).unwrap_or_default()
}

impl Deref for MemoryPack {
    type Target = MemoryPackRecord;

    fn deref(&self) -> &Self::Target {
        &self.record
    }
}

impl From<MemoryPackRecord> for MemoryPack {
    fn from(record: MemoryPackRecord) -> Self {
        Self::new(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pack(value: Value) -> MemoryPack {
        serde_json::from_value(value).expect("valid pack")
    }

    #[test]
    fn absent_content_reads_as_empty() {
        let p = pack(json!({ "id": "p1", "anima_id": "a1" }));
        assert_eq!(p.to_prompt(), "");
        assert!(p.identity().is_none());
        assert!(p.session_memories().is_empty());
        assert!(p.knowledge().is_empty());
        assert!(p.long_term_memories().is_empty());
        assert!(p.temporal_context().is_none());
    }

    #[test]
    fn null_content_reads_as_empty() {
        let p = pack(json!({ "id": "p1", "anima_id": "a1", "content": null }));
        assert_eq!(p.to_prompt(), "");
        assert!(p.session_memories().is_empty());
        assert!(p.temporal_context().is_none());
    }

    #[test]
    fn null_counts_and_scores_do_not_fail_decoding() {
        let p = pack(json!({
            "id": "p1",
            "anima_id": "a1",
            "token_count": null,
            "session_memory_count": null,
            "has_identity": null,
            "content": { "session_memories": [ { "id": "s1", "score": null } ] }
        }));
        assert_eq!(p.token_count, 0);
        assert_eq!(p.session_memory_count, 0);
        assert!(!p.has_identity);
        assert_eq!(p.session_memories().len(), 1);
        assert!(p.session_memories()[0].score.abs() < f64::EPSILON);
    }

    #[test]
    fn missing_fields_inside_content_read_as_empty() {
        let p = pack(json!({
            "id": "p1",
            "anima_id": "a1",
            "content": { "formatted": "hi", "knowledge": null, "identity": null }
        }));
        assert_eq!(p.to_prompt(), "hi");
        assert!(p.knowledge().is_empty());
        assert!(p.long_term_memories().is_empty());
        assert!(p.identity().is_none());
    }

    #[test]
    fn accessors_project_fields_verbatim() {
        let p = pack(json!({
            "id": "p1",
            "anima_id": "a1",
            "session_memory_count": 2,
            "has_identity": true,
            "content": {
                "formatted": "You are a helpful assistant.",
                "identity": { "persona": "calm" },
                "session_memories": [
                    { "id": "s1", "content": "asked about tea", "score": 0.9 },
                    { "id": "s2", "content": "prefers green", "score": 0.7 }
                ],
                "long_term_memories": [ { "id": "l1", "score": 0.4 } ],
                "temporal": { "gap_hours": 12 }
            }
        }));
        assert_eq!(p.to_prompt(), "You are a helpful assistant.");
        assert_eq!(p.session_memories().len() as u32, p.session_memory_count);
        assert_eq!(p.session_memories()[1].id.as_deref(), Some("s2"));
        assert_eq!(p.long_term_memories().len(), 1);
        assert!(p.knowledge().is_empty());
        assert_eq!(p.identity(), Some(&json!({ "persona": "calm" })));
        assert_eq!(p.temporal_context(), Some(&json!({ "gap_hours": 12 })));
        assert!(p.has_identity);
    }

    #[test]
    fn into_record_round_trips_the_wrapper() {
        let p = pack(json!({ "id": "p1", "anima_id": "a1", "query": "tea" }));
        let record = p.clone().into_record();
        assert_eq!(record.query.as_deref(), Some("tea"));
        assert_eq!(MemoryPack::from(record), p);
    }
}

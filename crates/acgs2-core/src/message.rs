// crates/acgs2-core/src/message.rs
// ============================================================================
// Module: ACGS-2 Message Model
// Description: The agent message entity routed through the governance core.
// Purpose: Replace the source's free-form JSON + string-enum fields with typed
//          sum types and a typed content wrapper.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`Message`] is the unit of work the router, scorer, guard, and saga
//! orchestrator all operate on. `content` remains arbitrary JSON (callers may
//! attach any payload shape) but is wrapped in [`ContentMap`] rather than left as
//! a bare `serde_json::Value`, and every enumerated field is a proper sum type.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::identifiers::AgentId;
use crate::identifiers::MessageId;
use crate::identifiers::TenantId;
use crate::time::UtcInstant;

// ============================================================================
// SECTION: Content Map
// ============================================================================

/// Fields inspected, in order, when extracting free text from a message's
/// content for semantic scoring. Grounded on the original source's
/// `_extract_text_content` field list.
const TEXT_BEARING_FIELDS: &[&str] = &[
    "content",
    "payload",
    "description",
    "reason",
    "details",
    "action",
    "type",
    "title",
    "subject",
];

/// A typed wrapper over arbitrary JSON content attached to a [`Message`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ContentMap(serde_json::Map<String, Value>);

impl ContentMap {
    /// Creates an empty content map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing JSON object. Non-object values collapse to empty.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    /// Returns the raw JSON object.
    #[must_use]
    pub fn as_map(&self) -> &serde_json::Map<String, Value> {
        &self.0
    }

    /// Inserts a field, returning any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Looks up a top-level field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Walks a dotted path (e.g. `"payload.amount"`) through nested objects.
    #[must_use]
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut value = self.0.get(first)?;
        for segment in segments {
            value = value.get(segment)?;
        }
        Some(value)
    }

    /// Extracts and concatenates free text across the fixed text-bearing
    /// fields, recursing into nested objects. Malformed or missing content
    /// yields an empty string rather than an error, per spec §4.1's failure
    /// mode ("malformed content treated as empty text").
    #[must_use]
    pub fn extract_text(&self) -> String {
        let mut parts = Vec::new();
        for field in TEXT_BEARING_FIELDS {
            if let Some(value) = self.0.get(*field) {
                collect_text(value, &mut parts);
            }
        }
        parts.join(" ")
    }
}

/// Recursively appends every string found in `value` to `out`.
fn collect_text(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(text) => out.push(text.clone()),
        Value::Object(map) => {
            for nested in map.values() {
                collect_text(nested, out);
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_text(item, out);
            }
        }
        _ => {}
    }
}

// ============================================================================
// SECTION: Enumerated Fields
// ============================================================================

/// Kind of agent message, replacing the source's free-form `message_type` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// A directive for an agent to perform an action.
    Command,
    /// A read-only request for information.
    Query,
    /// A request that a governance decision be made.
    GovernanceRequest,
    /// A request to validate an action against the constitution.
    ConstitutionalValidation,
    /// A request that an agent perform a bounded task.
    TaskRequest,
    /// A reply to a prior message.
    Response,
    /// A fire-and-forget notification.
    Notification,
}

impl MessageType {
    /// Returns the C1 type-signal weight for this variant, per spec §4.1.
    #[must_use]
    pub const fn type_signal(self) -> f64 {
        match self {
            Self::GovernanceRequest | Self::ConstitutionalValidation | Self::TaskRequest => 0.8,
            Self::Command | Self::Query | Self::Response | Self::Notification => 0.2,
        }
    }
}

/// Message priority. `normal` is accepted on the wire as a legacy alias for `medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Lowest priority.
    Low,
    /// Default priority; also accepts the legacy wire value `"normal"`.
    Medium,
    /// Elevated priority.
    High,
    /// Highest priority; triggers the impact scorer's critical boost.
    Critical,
}

impl Priority {
    /// Parses a priority string, accepting the legacy `"normal"` alias for `Medium`.
    ///
    /// Unknown values map to `Medium`, per spec §4.1's failure mode ("unknown
    /// priority/type strings mapped to medium/other").
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "high" => Self::High,
            "critical" => Self::Critical,
            "medium" | "normal" => Self::Medium,
            _ => Self::Medium,
        }
    }

    /// Returns the C1 priority-signal weight for this variant, per spec §4.1.
    #[must_use]
    pub const fn priority_signal(self) -> f64 {
        match self {
            Self::Low => 0.1,
            Self::Medium => 0.3,
            Self::High => 0.7,
            Self::Critical => 1.0,
        }
    }
}

/// Lifecycle status of a [`Message`]. Transitions are monotonic within
/// `pending -> routing -> {delivered|failed|expired}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    /// Newly created, not yet routed.
    Pending,
    /// Currently being routed or deliberated.
    Routing,
    /// Terminal: delivered to its recipient.
    Delivered,
    /// Terminal: delivery failed (denied, rejected, or errored).
    Failed,
    /// Terminal: deliberation window elapsed with no resolution and no fallback.
    Expired,
}

// ============================================================================
// SECTION: Message
// ============================================================================

/// An agent message flowing through the governance core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier, owned by the message's creator.
    pub id: MessageId,
    /// Sending agent.
    pub from_agent: AgentId,
    /// Receiving agent.
    pub to_agent: AgentId,
    /// Owning tenant.
    pub tenant: TenantId,
    /// Arbitrary structured payload.
    pub content: ContentMap,
    /// Kind of message.
    pub message_type: MessageType,
    /// Priority band.
    pub priority: Priority,
    /// Constitutional hash; must equal [`crate::constitutional::CONSTITUTIONAL_HASH`].
    pub constitutional_hash: String,
    /// Impact score in `[0, 1]`, set at most once by the scorer.
    pub impact_score: Option<f64>,
    /// Current lifecycle status.
    pub status: MessageStatus,
    /// Creation instant.
    pub created_at: UtcInstant,
    /// Last-modified instant.
    pub updated_at: UtcInstant,
}

impl Message {
    /// Creates a new, unscored, pending message stamped with the current time.
    #[must_use]
    pub fn new(
        id: MessageId,
        from_agent: AgentId,
        to_agent: AgentId,
        tenant: TenantId,
        content: ContentMap,
        message_type: MessageType,
        priority: Priority,
    ) -> Self {
        let now = UtcInstant::now();
        Self {
            id,
            from_agent,
            to_agent,
            tenant,
            content,
            message_type,
            priority,
            constitutional_hash: crate::constitutional::CONSTITUTIONAL_HASH.to_owned(),
            impact_score: None,
            status: MessageStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Extracts the free-text content used by the semantic signal.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.content.extract_text()
    }

    /// Transitions this message to `status`, stamping `updated_at`.
    pub fn mark_status(&mut self, status: MessageStatus, now: UtcInstant) {
        self.status = status;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        reason = "test-only assertions"
    )]
    use super::*;

    #[test]
    fn legacy_normal_priority_maps_to_medium() {
        assert_eq!(Priority::parse_lenient("normal"), Priority::Medium);
        assert_eq!(Priority::parse_lenient("NORMAL"), Priority::Medium);
    }

    #[test]
    fn unknown_priority_falls_back_to_medium() {
        assert_eq!(Priority::parse_lenient("urgent-ish"), Priority::Medium);
    }

    #[test]
    fn extract_text_recurses_into_nested_objects() {
        let mut content = ContentMap::new();
        content.insert(
            "payload",
            serde_json::json!({"nested": "CRITICAL security breach"}),
        );
        assert!(content.extract_text().contains("CRITICAL security breach"));
    }

    #[test]
    fn extract_text_on_missing_fields_is_empty() {
        let content = ContentMap::new();
        assert_eq!(content.extract_text(), "");
    }

    #[test]
    fn governance_request_has_high_type_signal() {
        assert!((MessageType::GovernanceRequest.type_signal() - 0.8).abs() < f64::EPSILON);
        assert!((MessageType::Command.type_signal() - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn mark_status_updates_status_and_timestamp() {
        let mut message = Message::new(
            MessageId::from("msg-1"),
            AgentId::from("agent-a"),
            AgentId::from("agent-b"),
            TenantId::from("tenant-1"),
            ContentMap::new(),
            MessageType::GovernanceRequest,
            Priority::Medium,
        );
        assert_eq!(message.status, MessageStatus::Pending);
        let later = message.created_at + time::Duration::seconds(1);
        message.mark_status(MessageStatus::Delivered, later);
        assert_eq!(message.status, MessageStatus::Delivered);
        assert_eq!(message.updated_at, later);
    }
}

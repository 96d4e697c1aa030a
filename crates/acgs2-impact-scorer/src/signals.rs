// crates/acgs2-impact-scorer/src/signals.rs
// ============================================================================
// Module: Stateless Impact Signals
// Description: Permission and context signals, computed from a single
//              message with no scorer state.
// ============================================================================

use acgs2_core::ContentMap;
use acgs2_core::UtcInstant;
use serde_json::Value;

/// Tool-name substrings treated as high risk by the permission signal.
const HIGH_RISK_TOOL_PATTERNS: &[&str] =
    &["admin", "delete", "transfer", "execute", "blockchain", "payment"];

/// Scores the `tools` field of a message's content: the highest risk among any
/// requested tool names, or `0.1` if no tools were requested.
#[must_use]
pub fn permission_signal(content: &ContentMap) -> f64 {
    let Some(Value::Array(tools)) = content.get("tools") else {
        return 0.1;
    };
    if tools.is_empty() {
        return 0.1;
    }

    let mut max_risk: f64 = 0.1;
    for tool in tools {
        let name = tool_name(tool);
        if HIGH_RISK_TOOL_PATTERNS.iter().any(|pattern| name.contains(pattern)) {
            max_risk = max_risk.max(0.9);
        } else if name.contains("read") || name.contains("get") {
            max_risk = max_risk.max(0.2);
        } else {
            max_risk = max_risk.max(0.5);
        }
    }
    max_risk
}

/// Extracts a lowercased tool name from either an object's `name` field or a
/// bare string entry in the `tools` array.
fn tool_name(tool: &Value) -> String {
    match tool {
        Value::Object(fields) => fields
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase(),
        Value::String(name) => name.to_lowercase(),
        other => other.to_string().to_lowercase(),
    }
}

/// Scores context: a base rate, boosted for night-hour traffic and for
/// payloads carrying a large (`> 10000`) transaction amount.
#[must_use]
pub fn context_signal(content: &ContentMap, now: UtcInstant) -> f64 {
    let mut score = 0.2;
    if now.is_night_hour() {
        score += 0.3;
    }
    if let Some(amount) = content.get_path("payload.amount").and_then(Value::as_f64) {
        if amount > 10000.0 {
            score += 0.4;
        }
    }
    score.min(1.0)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, reason = "test-only assertions")]
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn no_tools_requested_scores_baseline() {
        let content = ContentMap::new();
        assert!((permission_signal(&content) - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn high_risk_tool_name_scores_point_nine() {
        let mut content = ContentMap::new();
        content.insert("tools", serde_json::json!(["admin_delete_user"]));
        assert!((permission_signal(&content) - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn read_only_tool_scores_point_two() {
        let mut content = ContentMap::new();
        content.insert("tools", serde_json::json!([{"name": "GetAccountBalance"}]));
        assert!((permission_signal(&content) - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn large_transaction_boosts_context_score() {
        let mut content = ContentMap::new();
        content.insert("payload", serde_json::json!({"amount": 50_000}));
        let noon = UtcInstant::from_offset_date_time(
            OffsetDateTime::from_unix_timestamp(1_700_000_000)
                .expect("valid timestamp")
                .replace_hour(12)
                .expect("valid hour"),
        );
        assert!((context_signal(&content, noon) - 0.6).abs() < f64::EPSILON);
    }
}

//! Soft-failure detection on response envelopes.
//!
//! The backend wraps payloads in an object carrying a status discriminator and
//! a human-readable message. A response whose discriminator equals the
//! configured sentinel is a soft failure: HTTP succeeded, the operation did
//! not. The sentinel and both field names are configuration, not constants.

use serde_json::Value;

pub const DEFAULT_STATUS_FIELD: &str = "code";
pub const DEFAULT_MESSAGE_FIELD: &str = "message";
pub const DEFAULT_SENTINEL: i64 = -1;

/// Which envelope field marks a soft failure, and with what value.
#[derive(Debug, Clone, PartialEq)]
pub struct SoftFailurePolicy {
    pub status_field: String,
    pub sentinel: Value,
    pub message_field: String,
}

impl Default for SoftFailurePolicy {
    fn default() -> Self {
        Self {
            status_field: DEFAULT_STATUS_FIELD.to_string(),
            sentinel: Value::from(DEFAULT_SENTINEL),
            message_field: DEFAULT_MESSAGE_FIELD.to_string(),
        }
    }
}

impl SoftFailurePolicy {
    pub fn new(
        status_field: impl Into<String>,
        sentinel: impl Into<Value>,
        message_field: impl Into<String>,
    ) -> Self {
        Self {
            status_field: status_field.into(),
            sentinel: sentinel.into(),
            message_field: message_field.into(),
        }
    }

    /// Returns the soft-failure message if `body` is a JSON object whose
    /// status field matches the sentinel. Non-JSON bodies never match.
    pub fn inspect(&self, body: &[u8]) -> Option<String> {
        let value: Value = serde_json::from_slice(body).ok()?;
        self.inspect_value(&value)
    }

    pub fn inspect_value(&self, body: &Value) -> Option<String> {
        let object = body.as_object()?;
        let status = object.get(&self.status_field)?;
        if !sentinel_matches(status, &self.sentinel) {
            return None;
        }
        Some(message_text(object.get(&self.message_field)))
    }
}

/// Strict JSON equality, except that numbers compare by value (`-1 == -1.0`).
fn sentinel_matches(actual: &Value, sentinel: &Value) -> bool {
    match (actual, sentinel) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => a.as_f64() == b.as_f64(),
        },
        _ => actual == sentinel,
    }
}

fn message_text(message: Option<&Value>) -> String {
    match message {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn default_policy_matches_minus_one() {
        let body = r#"{"code":-1,"message":"查询失败"}"#.as_bytes();
        let policy = SoftFailurePolicy::default();
        assert_eq!(policy.inspect(body).as_deref(), Some("查询失败"));
    }

    #[test]
    fn success_codes_are_not_soft_failures() {
        let policy = SoftFailurePolicy::default();
        assert!(policy.inspect(br#"{"code":0,"msg":"ok"}"#).is_none());
        assert!(policy.inspect(br#"{"success":true}"#).is_none());
    }

    #[test]
    fn float_sentinel_equals_integer() {
        let policy = SoftFailurePolicy::default();
        assert!(policy.inspect_value(&json!({"code": -1.0})).is_some());
    }

    #[test]
    fn string_does_not_equal_number() {
        let policy = SoftFailurePolicy::default();
        assert!(policy.inspect_value(&json!({"code": "-1"})).is_none());
    }

    #[test]
    fn non_object_bodies_are_ignored() {
        let policy = SoftFailurePolicy::default();
        assert!(policy.inspect(b"plain text").is_none());
        assert!(policy.inspect(b"[-1]").is_none());
        assert!(policy.inspect(b"").is_none());
    }

    #[test]
    fn message_fallbacks() {
        let policy = SoftFailurePolicy::default();
        assert_eq!(policy.inspect_value(&json!({"code": -1})).as_deref(), Some(""));
        assert_eq!(
            policy.inspect_value(&json!({"code": -1, "message": null})).as_deref(),
            Some("")
        );
        assert_eq!(
            policy.inspect_value(&json!({"code": -1, "message": {"k": 1}})).as_deref(),
            Some(r#"{"k":1}"#)
        );
    }

    #[test]
    fn custom_policy_fields() {
        let policy = SoftFailurePolicy::new("success", false, "msg");
        let body = json!({"success": false, "msg": "省份名称无效"});
        assert_eq!(policy.inspect_value(&body).as_deref(), Some("省份名称无效"));
        assert!(policy.inspect_value(&json!({"success": true})).is_none());
    }
}

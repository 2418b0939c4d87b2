use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::debug;

use crate::types::{ApiErrorResponse, LimitHitEvent, LimitKind};
use crate::utils::constants::{
    ANALYSIS_LIMIT_CODE, OPINION_LIMIT_CODE, PROJECT_LIMIT_CODE, QUOTA_EXCEEDED_STATUS,
};

/// Turns a rejected write into a typed limit hit. Anything that is not a
/// 403 carrying a quota code or quota language yields `None`; this never fails.
///
/// Fields are picked one by one so an odd sibling (a localized `message`
/// object, a string `details`) never hides a known code.
pub fn classify_error(resp: &ApiErrorResponse, now: DateTime<Utc>) -> Option<LimitHitEvent> {
    if resp.status != QUOTA_EXCEEDED_STATUS {
        return None;
    }

    let mut body: Value = match serde_json::from_str(&resp.body) {
        Ok(body) => body,
        Err(e) => {
            debug!(error = %e, "403 body is not JSON");
            return None;
        }
    };
    // Some gateways wrap the payload one level down.
    if body.get("code").is_none() && body.get("message").is_none() {
        let inner = body
            .get_mut("error")
            .filter(|v| v.is_object())
            .map(Value::take);
        if let Some(inner) = inner {
            body = inner;
        }
    }

    let code = body.get("code").and_then(Value::as_str);
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.trim().is_empty());

    let kind = match code {
        Some(PROJECT_LIMIT_CODE) => LimitKind::ProjectLimit,
        Some(ANALYSIS_LIMIT_CODE) => LimitKind::AnalysisLimit,
        Some(OPINION_LIMIT_CODE) => LimitKind::OpinionLimit,
        _ => kind_from_message(message?)?,
    };

    let details = body.get("details");
    Some(LimitHitEvent {
        kind,
        occurred_at: now,
        current_usage: details
            .and_then(|d| d.get("currentUsage"))
            .and_then(Value::as_u64),
        limit: details.and_then(|d| d.get("limit")).and_then(Value::as_i64),
        message: message
            .map(str::to_string)
            .unwrap_or_else(|| default_message(kind).to_string()),
    })
}

fn kind_from_message(message: &str) -> Option<LimitKind> {
    let lower = message.to_lowercase();
    if !(lower.contains("limit") || lower.contains("quota")) {
        return None;
    }
    if lower.contains("opinion") {
        Some(LimitKind::OpinionLimit)
    } else if lower.contains("analys") {
        Some(LimitKind::AnalysisLimit)
    } else {
        Some(LimitKind::ProjectLimit)
    }
}

fn default_message(kind: LimitKind) -> &'static str {
    match kind {
        LimitKind::ProjectLimit => "You have reached your project limit.",
        LimitKind::AnalysisLimit => "You have reached your analysis limit.",
        LimitKind::OpinionLimit => "This project has reached its opinion limit.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-20T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn known_code_with_details() {
        let resp = ApiErrorResponse::new(
            403,
            r#"{"code":"ANALYSIS_LIMIT_EXCEEDED","message":"Analysis quota used","details":{"currentUsage":3,"limit":3}}"#,
        );
        let event = classify_error(&resp, now()).unwrap();
        assert_eq!(event.kind, LimitKind::AnalysisLimit);
        assert_eq!(event.current_usage, Some(3));
        assert_eq!(event.limit, Some(3));
        assert_eq!(event.message, "Analysis quota used");
        assert_eq!(event.occurred_at, now());
    }

    #[test]
    fn empty_object_is_not_a_limit_hit() {
        assert!(classify_error(&ApiErrorResponse::new(403, "{}"), now()).is_none());
    }

    #[test]
    fn non_403_is_ignored_even_with_code() {
        let resp = ApiErrorResponse::new(429, r#"{"code":"PROJECT_LIMIT_EXCEEDED"}"#);
        assert!(classify_error(&resp, now()).is_none());
    }

    #[test]
    fn garbage_body_is_ignored() {
        assert!(classify_error(&ApiErrorResponse::new(403, "<html>nope"), now()).is_none());
        assert!(classify_error(&ApiErrorResponse::new(403, ""), now()).is_none());
        assert!(classify_error(&ApiErrorResponse::new(403, "[1,2]"), now()).is_none());
    }

    #[test]
    fn message_fallback_picks_the_noun() {
        let resp = ApiErrorResponse::new(403, r#"{"message":"Opinion limit reached for this project"}"#);
        assert_eq!(classify_error(&resp, now()).unwrap().kind, LimitKind::OpinionLimit);

        let resp = ApiErrorResponse::new(403, r#"{"message":"Monthly quota exhausted"}"#);
        assert_eq!(classify_error(&resp, now()).unwrap().kind, LimitKind::ProjectLimit);
    }

    #[test]
    fn unrelated_forbidden_message_is_ignored() {
        let resp = ApiErrorResponse::new(403, r#"{"code":"FORBIDDEN","message":"Not your project"}"#);
        assert!(classify_error(&resp, now()).is_none());
    }

    #[test]
    fn malformed_details_do_not_block_classification() {
        let resp = ApiErrorResponse::new(
            403,
            r#"{"code":"PROJECT_LIMIT_EXCEEDED","error":"Forbidden","details":"n/a"}"#,
        );
        let event = classify_error(&resp, now()).unwrap();
        assert_eq!(event.kind, LimitKind::ProjectLimit);
        assert_eq!(event.current_usage, None);
    }

    #[test]
    fn wrapped_error_payload() {
        let resp = ApiErrorResponse::new(403, r#"{"error":{"code":"OPINION_LIMIT_EXCEEDED"}}"#);
        let event = classify_error(&resp, now()).unwrap();
        assert_eq!(event.kind, LimitKind::OpinionLimit);
        assert_eq!(event.message, "This project has reached its opinion limit.");
    }

    #[test]
    fn known_code_survives_structured_message() {
        let resp = ApiErrorResponse::new(
            403,
            r#"{"code":"PROJECT_LIMIT_EXCEEDED","message":{"en":"Project limit"},"details":{"currentUsage":2,"limit":2}}"#,
        );
        let event = classify_error(&resp, now()).unwrap();
        assert_eq!(event.kind, LimitKind::ProjectLimit);
        assert_eq!(event.limit, Some(2));
        assert_eq!(event.message, "You have reached your project limit.");
    }

    #[test]
    fn structured_message_without_code_is_ignored() {
        let resp = ApiErrorResponse::new(403, r#"{"message":{"en":"Project limit"}}"#);
        assert!(classify_error(&resp, now()).is_none());
    }
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Per-request execution context
//!
//! Passed explicitly through service calls. Carries the request id used for
//! log correlation and the identity of the user performing the action.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Explicit request context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Correlation id propagated into logs, notification payloads and envelopes
    pub request_id: String,
    /// User id of the caller
    pub acting_user_id: String,
    /// Email of the caller
    pub acting_user_email: String,
    /// Clock reading taken once per request
    pub now: DateTime<Utc>,
}

impl RequestContext {
    pub fn new(
        request_id: impl Into<String>,
        acting_user_id: impl Into<String>,
        acting_user_email: impl Into<String>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            acting_user_id: acting_user_id.into(),
            acting_user_email: acting_user_email.into(),
            now: Utc::now(),
        }
    }

    /// Context with a generated request id
    pub fn generated(acting_user_id: impl Into<String>, acting_user_email: impl Into<String>) -> Self {
        Self::new(Uuid::now_v7().to_string(), acting_user_id, acting_user_email)
    }

    /// Pin the clock reading (deterministic tests, replays)
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    /// Whether the caller is the association's subject, by id or by email
    pub fn is_subject(&self, user_id: Option<&str>, user_email: Option<&str>) -> bool {
        match (user_id, user_email) {
            (Some(id), _) => id == self.acting_user_id,
            (None, Some(email)) => email.eq_ignore_ascii_case(&self.acting_user_email),
            (None, None) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_match_by_id_then_email() {
        let ctx = RequestContext::generated("u-1", "Bob@Example.com");
        assert!(ctx.is_subject(Some("u-1"), None));
        assert!(!ctx.is_subject(Some("u-2"), Some("bob@example.com")));
        assert!(ctx.is_subject(None, Some("bob@example.com")));
        assert!(!ctx.is_subject(None, None));
    }
}

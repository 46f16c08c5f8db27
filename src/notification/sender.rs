// Copyright (c) 2025 - Cowboy AI, Inc.
//! Notification Senders
//!
//! Single-recipient sends validate every display value before the producer
//! is contacted. The company-wide fan-out resolves recipients lazily, one at
//! a time, and keeps going past individual failures.

use futures::future::BoxFuture;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::domain::UserProfile;
use crate::errors::{AssociationError, AssociationResult};
use crate::notification::classifier::{NotificationKind, ACTOR, COMPANY_NAME, SUBJECT};
use crate::notification::{NotificationPayload, NotificationProducer};

/// Rendered display values for a notification, never raw ids
///
/// `request_id` is not rendered; it is copied onto every payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayValues {
    pub company_name: Option<String>,
    pub actor: Option<String>,
    pub subject: Option<String>,
    pub request_id: Option<String>,
}

impl DisplayValues {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: Some(company_name.into()),
            ..Self::default()
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    fn get(&self, field: &str) -> Option<&str> {
        let value = match field {
            COMPANY_NAME => &self.company_name,
            ACTOR => &self.actor,
            SUBJECT => &self.subject,
            _ => return None,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }
}

/// Validate inputs and build the payload of `kind` for `recipient`
///
/// # Errors
/// - InvalidInput when the recipient or a required display value is missing or blank
pub fn render(kind: NotificationKind, recipient: &str, values: &DisplayValues) -> AssociationResult<NotificationPayload> {
    if recipient.trim().is_empty() {
        return Err(AssociationError::InvalidInput(format!(
            "{} requires a recipient email",
            kind
        )));
    }

    let mut fields = BTreeMap::new();
    let mut subject = kind.subject_template().to_string();
    for field in kind.required_fields() {
        let value = values.get(field).ok_or_else(|| {
            AssociationError::InvalidInput(format!("{} requires a non-blank {}", kind, field))
        })?;
        subject = subject.replace(&format!("{{{}}}", field), value);
        fields.insert(field.to_string(), value.to_string());
    }

    Ok(NotificationPayload {
        recipient: recipient.to_string(),
        subject,
        fields,
        request_id: values.request_id.clone(),
    })
}

/// Send one notification
pub async fn send_notification(
    producer: &dyn NotificationProducer,
    kind: NotificationKind,
    recipient: &str,
    values: &DisplayValues,
) -> AssociationResult<()> {
    let payload = render(kind, recipient, values)?;
    producer.send(&payload, kind.message_type()).await?;

    debug!(message_type = kind.message_type(), "Notification sent");
    Ok(())
}

/// One failed recipient of a fan-out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FanOutFailure {
    /// Recipient email, absent when the user could not be fetched
    pub recipient: Option<String>,
    pub error: AssociationError,
}

/// Outcome of a fan-out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanOutReport {
    /// Emails a notification was handed over for
    pub sent: Vec<String>,
    pub failures: Vec<FanOutFailure>,
}

impl FanOutReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.sent.len() + self.failures.len()
    }

    /// Fold `other` into this report
    pub fn absorb(&mut self, other: FanOutReport) {
        self.sent.extend(other.sent);
        self.failures.extend(other.failures);
    }
}

/// Send `kind` to every user the lazy fetches resolve to
///
/// Each fetch is awaited only when reached. A failed fetch or send is
/// recorded and the remaining recipients are still attempted.
pub async fn send_to_all(
    producer: &dyn NotificationProducer,
    kind: NotificationKind,
    recipients: Vec<BoxFuture<'_, AssociationResult<UserProfile>>>,
    values: &DisplayValues,
) -> FanOutReport {
    let mut report = FanOutReport::default();

    for fetch in recipients {
        let user = match fetch.await {
            Ok(user) => user,
            Err(error) => {
                warn!(message_type = kind.message_type(), error = %error, "Recipient lookup failed");
                report.failures.push(FanOutFailure {
                    recipient: None,
                    error,
                });
                continue;
            }
        };

        match send_notification(producer, kind, &user.email, values).await {
            Ok(()) => report.sent.push(user.email),
            Err(error) => {
                warn!(
                    message_type = kind.message_type(),
                    recipient = %user.email,
                    error = %error,
                    "Notification send failed"
                );
                report.failures.push(FanOutFailure {
                    recipient: Some(user.email),
                    error,
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::RecordingProducer;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn values() -> DisplayValues {
        DisplayValues::new("Example Ltd").with_actor("Alice").with_subject("Bob")
    }

    #[test]
    fn test_render_fills_subject_template() {
        let payload = render(NotificationKind::InvitationSent, "carol@example.com", &values()).unwrap();
        assert_eq!(
            payload.subject,
            "Alice has invited Bob to be authorised to file online for Example Ltd"
        );
        assert_eq!(payload.fields.len(), 3);
        assert_eq!(payload.request_id, None);
    }

    #[tokio::test]
    async fn test_request_id_reaches_every_fan_out_payload() {
        let producer = RecordingProducer::new();
        let recipients: Vec<BoxFuture<'_, AssociationResult<UserProfile>>> = vec![
            async { Ok(UserProfile::new("u-1", "one@example.com")) }.boxed(),
            async { Ok(UserProfile::new("u-2", "two@example.com")) }.boxed(),
        ];
        let traced = values().with_request_id("req-42");

        send_to_all(&producer, NotificationKind::InvitationAccepted, recipients, &traced).await;

        let sent = producer.sent().await;
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|s| s.payload.request_id.as_deref() == Some("req-42")));
        assert!(!sent[0].payload.fields.contains_key("request_id"));
    }

    #[tokio::test]
    async fn test_blank_values_rejected_before_producer() {
        let producer = RecordingProducer::new();
        let blank = DisplayValues::new("Example Ltd").with_actor("  ").with_subject("Bob");

        let err = send_notification(&producer, NotificationKind::InvitationSent, "c@example.com", &blank)
            .await
            .unwrap_err();
        assert!(matches!(err, AssociationError::InvalidInput(_)));

        let err = send_notification(&producer, NotificationKind::InviteUser, "", &values())
            .await
            .unwrap_err();
        assert!(matches!(err, AssociationError::InvalidInput(_)));
        assert!(producer.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_fan_out_continues_past_failures() {
        let producer = RecordingProducer::new().failing_for(["two@example.com"]);
        let recipients: Vec<BoxFuture<'_, AssociationResult<UserProfile>>> = vec![
            async { Ok(UserProfile::new("u-1", "one@example.com")) }.boxed(),
            async { Err(AssociationError::user_not_found("u-x")) }.boxed(),
            async { Ok(UserProfile::new("u-2", "two@example.com")) }.boxed(),
            async { Ok(UserProfile::new("u-3", "three@example.com")) }.boxed(),
        ];

        let report = send_to_all(&producer, NotificationKind::AuthorisationRemoved, recipients, &values()).await;

        assert_eq!(report.sent, vec!["one@example.com", "three@example.com"]);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[1].recipient.as_deref(), Some("two@example.com"));
        assert_eq!(report.attempted(), 4);
        assert!(!report.is_complete());
    }

    #[tokio::test]
    async fn test_fetches_are_lazy() {
        let producer = RecordingProducer::new();
        let fetched = AtomicUsize::new(0);
        let recipients: Vec<BoxFuture<'_, AssociationResult<UserProfile>>> = (0..3)
            .map(|i| {
                let fetched = &fetched;
                async move {
                    fetched.fetch_add(1, Ordering::SeqCst);
                    Ok(UserProfile::new(format!("u-{}", i), format!("{}@example.com", i)))
                }
                .boxed()
            })
            .collect();

        assert_eq!(fetched.load(Ordering::SeqCst), 0);
        send_to_all(&producer, NotificationKind::InvitationAccepted, recipients, &values()).await;
        assert_eq!(fetched.load(Ordering::SeqCst), 3);
    }
}

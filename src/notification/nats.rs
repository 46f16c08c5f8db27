// Copyright (c) 2025 - Cowboy AI, Inc.

//! NATS Notification Producer
//!
//! Publishes each payload wrapped in a [`NotificationEnvelope`] on
//!
//! ```text
//! {root}.notifications.{message_type}
//! ```
//!
//! The envelope id is a UUID v7, so envelopes sort by creation time. The
//! payload's request id doubles as the envelope `correlation_id`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::config::AssociationsConfig;
use crate::errors::AssociationResult;
use crate::nats::NatsClient;
use crate::notification::{NotificationPayload, NotificationProducer};
use crate::subjects::SubjectBuilder;

/// Wire envelope of one notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEnvelope {
    pub id: Uuid,
    pub message_type: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,
    pub payload: NotificationPayload,
}

impl NotificationEnvelope {
    pub fn new(message_type: impl Into<String>, payload: NotificationPayload) -> Self {
        Self {
            id: Uuid::now_v7(),
            message_type: message_type.into(),
            created_at: Utc::now(),
            correlation_id: payload.request_id.clone(),
            payload,
        }
    }
}

/// Producer publishing to NATS
#[derive(Clone)]
pub struct NatsNotificationProducer {
    client: NatsClient,
    subject_root: String,
}

impl NatsNotificationProducer {
    pub fn new(client: NatsClient, subject_root: impl Into<String>) -> Self {
        Self {
            client,
            subject_root: subject_root.into(),
        }
    }

    /// Producer publishing under `config.notification_subject_root`
    pub fn from_config(client: NatsClient, config: &AssociationsConfig) -> Self {
        Self::new(client, config.notification_subject_root.as_str())
    }

    /// Subject a message type is published on
    pub fn subject_for(&self, message_type: &str) -> AssociationResult<String> {
        SubjectBuilder::new(self.subject_root.as_str())
            .message_type(message_type)
            .build()
    }
}

#[async_trait]
impl NotificationProducer for NatsNotificationProducer {
    async fn send(&self, payload: &NotificationPayload, message_type: &str) -> AssociationResult<()> {
        let subject = self.subject_for(message_type)?;
        let envelope = NotificationEnvelope::new(message_type, payload.clone());

        self.client.publish(&subject, &envelope).await?;

        debug!(
            subject = %subject,
            envelope_id = %envelope.id,
            correlation_id = envelope.correlation_id.as_deref().unwrap_or_default(),
            "Published notification"
        );
        Ok(())
    }
}

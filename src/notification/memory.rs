// Copyright (c) 2025 - Cowboy AI, Inc.
//! Producer that records sends in memory

use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::Mutex;

use crate::errors::{AssociationError, AssociationResult};
use crate::notification::{NotificationPayload, NotificationProducer};

/// One recorded send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentNotification {
    pub message_type: String,
    pub payload: NotificationPayload,
}

/// Captures payloads instead of publishing; chosen recipients fail
#[derive(Debug, Default)]
pub struct RecordingProducer {
    sent: Mutex<Vec<SentNotification>>,
    failing: HashSet<String>,
}

impl RecordingProducer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every send addressed to one of `recipients`
    pub fn failing_for<I, S>(mut self, recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failing = recipients.into_iter().map(Into::into).collect();
        self
    }

    pub async fn sent(&self) -> Vec<SentNotification> {
        self.sent.lock().await.clone()
    }

    /// Recipients of every recorded send of `message_type`, in send order
    pub async fn recipients_of(&self, message_type: &str) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|sent| sent.message_type == message_type)
            .map(|sent| sent.payload.recipient.clone())
            .collect()
    }
}

#[async_trait]
impl NotificationProducer for RecordingProducer {
    async fn send(&self, payload: &NotificationPayload, message_type: &str) -> AssociationResult<()> {
        if self.failing.contains(&payload.recipient) {
            return Err(AssociationError::UpstreamUnavailable(format!(
                "producer rejected {} for {}",
                message_type, payload.recipient
            )));
        }

        self.sent.lock().await.push(SentNotification {
            message_type: message_type.to_string(),
            payload: payload.clone(),
        });
        Ok(())
    }
}

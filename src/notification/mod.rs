// Copyright (c) 2025 - Cowboy AI, Inc.
//! Notification Classification and Dispatch
//!
//! ```text
//! mutation ──classify──> EmailBatch ──notifications()──> [(kind, recipient rule)]
//!                                                              │
//!                          display values + recipient email ───┤
//!                                                              ▼
//!                                           NotificationProducer::send(payload, tag)
//! ```
//!
//! The transport is external; [`NotificationProducer`] is the only seam.

pub mod classifier;
pub mod memory;
pub mod nats;
pub mod sender;

pub use classifier::{classify, EmailBatch, LifecycleAction, NotificationKind, RecipientRule};
pub use memory::RecordingProducer;
pub use nats::{NatsNotificationProducer, NotificationEnvelope};
pub use sender::{render, send_notification, send_to_all, DisplayValues, FanOutFailure, FanOutReport};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::errors::AssociationResult;

/// Rendered notification handed to the producer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    /// Recipient email
    pub recipient: String,
    /// Rendered subject line
    pub subject: String,
    /// Body fields keyed by template placeholder
    pub fields: BTreeMap<String, String>,
    /// Id of the request that triggered the notification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Message-queue producer
#[async_trait]
pub trait NotificationProducer: Send + Sync {
    /// # Errors
    /// - UpstreamUnavailable when the payload could not be handed over
    async fn send(&self, payload: &NotificationPayload, message_type: &str) -> AssociationResult<()>;
}

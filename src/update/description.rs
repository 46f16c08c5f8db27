// Copyright (c) 2025 - Cowboy AI, Inc.
//! Partial Update Description
//!
//! An [`AssociationUpdate`] is the complete set of field changes one
//! transition makes. It is data, not an action: stores render it with
//! [`AssociationUpdate::to_document`] or apply it in memory with
//! [`AssociationUpdate::apply_to`].

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

use crate::domain::{Association, AssociationStatus, Invitation, PreviousState};
use crate::errors::AssociationResult;

/// Field changes computed for one lifecycle transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationUpdate {
    /// Replacement version token
    pub etag: String,
    /// New status
    pub status: AssociationStatus,
    /// Audit entry for the status held before the transition
    pub previous_state: PreviousState,
    /// Registered user id replacing an email-only subject
    pub link_user_id: Option<String>,
    /// Invitation appended by issue/renew
    pub invitation: Option<Invitation>,
    pub approval_expiry_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub removed_at: Option<DateTime<Utc>>,
}

impl AssociationUpdate {
    pub fn with_invitation(mut self, invitation: Invitation, approval_expiry_at: DateTime<Utc>) -> Self {
        self.invitation = Some(invitation);
        self.approval_expiry_at = Some(approval_expiry_at);
        self
    }

    pub fn with_approved_at(mut self, approved_at: DateTime<Utc>) -> Self {
        self.approved_at = Some(approved_at);
        self
    }

    pub fn with_removed_at(mut self, removed_at: DateTime<Utc>) -> Self {
        self.removed_at = Some(removed_at);
        self
    }

    /// Apply to a copy of `association`
    pub fn apply_to(&self, association: &Association) -> Association {
        let mut next = association.clone();

        next.previous_states.push(self.previous_state.clone());
        next.status = self.status.as_str().to_string();
        next.etag = self.etag.clone();

        if let Some(user_id) = &self.link_user_id {
            next.user_id = Some(user_id.clone());
            next.user_email = None;
        }
        if let Some(invitation) = &self.invitation {
            next.invitations.push(invitation.clone());
        }
        if let Some(expiry) = self.approval_expiry_at {
            next.approval_expiry_at = Some(expiry);
        }
        if let Some(approved_at) = self.approved_at {
            next.approved_at = Some(approved_at);
        }
        if let Some(removed_at) = self.removed_at {
            next.removed_at = Some(removed_at);
        }

        next
    }

    /// Render as a document-store update with `$set`, `$push` and `$unset` sections
    pub fn to_document(&self) -> AssociationResult<Value> {
        let mut set = Map::new();
        set.insert("etag".to_string(), json!(self.etag));
        set.insert("status".to_string(), json!(self.status.as_str()));
        if let Some(user_id) = &self.link_user_id {
            set.insert("user_id".to_string(), json!(user_id));
        }
        if let Some(expiry) = self.approval_expiry_at {
            set.insert("approval_expiry_at".to_string(), serde_json::to_value(expiry)?);
        }
        if let Some(approved_at) = self.approved_at {
            set.insert("approved_at".to_string(), serde_json::to_value(approved_at)?);
        }
        if let Some(removed_at) = self.removed_at {
            set.insert("removed_at".to_string(), serde_json::to_value(removed_at)?);
        }

        let mut push = Map::new();
        push.insert(
            "previous_states".to_string(),
            serde_json::to_value(&self.previous_state)?,
        );
        if let Some(invitation) = &self.invitation {
            push.insert("invitations".to_string(), serde_json::to_value(invitation)?);
        }

        let mut document = Map::new();
        document.insert("$set".to_string(), Value::Object(set));
        document.insert("$push".to_string(), Value::Object(push));
        if self.link_user_id.is_some() {
            document.insert("$unset".to_string(), json!({ "user_email": "" }));
        }

        Ok(Value::Object(document))
    }
}

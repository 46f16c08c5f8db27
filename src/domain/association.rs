// Copyright (c) 2025 - Cowboy AI, Inc.
//! Association Document
//!
//! The stored representation of one subject's authorisation state for one
//! company. Status and approval route stay in their stored string form here;
//! typed access goes through [`Association::status`] and
//! [`Association::approval_route`], which fail on unrecognized values.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::status::{ApprovalRoute, AssociationStatus};
use crate::errors::{AssociationError, AssociationResult};

/// One invitation issued against an association
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    /// User id of the inviter
    pub invited_by: String,
    /// When the invitation was issued
    pub invited_at: DateTime<Utc>,
}

impl Invitation {
    /// Expiry instant given the validity window, `None` past the calendar range
    pub fn expires_at(&self, validity: Duration) -> Option<DateTime<Utc>> {
        self.invited_at.checked_add_signed(validity)
    }

    /// An invitation is active strictly before its expiry instant
    pub fn is_active(&self, now: DateTime<Utc>, validity: Duration) -> bool {
        self.expires_at(validity).map_or(true, |expiry| now < expiry)
    }
}

/// Expiry of an invitation issued at `invited_at`
///
/// # Errors
/// - InvalidInput when the window runs past the representable calendar
pub fn expiry_after(invited_at: DateTime<Utc>, validity: Duration) -> AssociationResult<DateTime<Utc>> {
    invited_at.checked_add_signed(validity).ok_or_else(|| {
        AssociationError::InvalidInput(format!(
            "invitation validity of {} days overflows the expiry of {}",
            validity.num_days(),
            invited_at
        ))
    })
}

/// Audit entry capturing a status the association held before a transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousState {
    /// Stored status value prior to the transition
    pub status: String,
    /// User id of whoever performed the transition
    pub changed_by: String,
    /// When the transition happened
    pub changed_at: DateTime<Utc>,
}

/// Who an association is attributed to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    /// A registered user
    UserId(String),
    /// Known only by email (pre-registration or migrated but unlinked)
    Email(String),
}

/// Stored association record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    pub id: String,
    pub company_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    pub status: String,
    pub approval_route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub migrated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_expiry_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub invitations: Vec<Invitation>,
    #[serde(default)]
    pub previous_states: Vec<PreviousState>,
    pub etag: String,
}

/// Fresh opaque version token
pub fn generate_etag() -> String {
    Uuid::now_v7().simple().to_string()
}

impl Association {
    fn blank(
        company_number: String,
        subject: Subject,
        status: AssociationStatus,
        route: ApprovalRoute,
        now: DateTime<Utc>,
    ) -> Self {
        let (user_id, user_email) = match subject {
            Subject::UserId(id) => (Some(id), None),
            Subject::Email(email) => (None, Some(email)),
        };

        Self {
            id: Uuid::now_v7().to_string(),
            company_number,
            user_id,
            user_email,
            status: status.as_str().to_string(),
            approval_route: route.as_str().to_string(),
            created_at: Some(now),
            approved_at: None,
            removed_at: None,
            migrated_at: None,
            approval_expiry_at: None,
            invitations: Vec::new(),
            previous_states: Vec::new(),
            etag: generate_etag(),
        }
    }

    /// New association created by inviting `subject`
    ///
    /// # Errors
    /// - InvalidInput when `now + validity` overflows
    pub fn invited(
        company_number: impl Into<String>,
        subject: Subject,
        invited_by: impl Into<String>,
        now: DateTime<Utc>,
        validity: Duration,
    ) -> AssociationResult<Self> {
        let expiry = expiry_after(now, validity)?;
        let mut association = Self::blank(
            company_number.into(),
            subject,
            AssociationStatus::AwaitingApproval,
            ApprovalRoute::Invitation,
            now,
        );
        association.invitations.push(Invitation {
            invited_by: invited_by.into(),
            invited_at: now,
        });
        association.approval_expiry_at = Some(expiry);
        Ok(association)
    }

    /// New association confirmed directly with the company auth code
    pub fn auth_code_confirmed(
        company_number: impl Into<String>,
        user_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut association = Self::blank(
            company_number.into(),
            Subject::UserId(user_id.into()),
            AssociationStatus::Confirmed,
            ApprovalRoute::AuthCode,
            now,
        );
        association.approved_at = Some(now);
        association
    }

    /// Association produced by the bulk migration job
    pub fn migrated(
        company_number: impl Into<String>,
        user_email: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut association = Self::blank(
            company_number.into(),
            Subject::Email(user_email.into()),
            AssociationStatus::Migrated,
            ApprovalRoute::Migration,
            now,
        );
        association.migrated_at = Some(now);
        association
    }

    /// Typed status
    pub fn status(&self) -> AssociationResult<AssociationStatus> {
        self.status.parse()
    }

    /// Typed approval route
    pub fn approval_route(&self) -> AssociationResult<ApprovalRoute> {
        self.approval_route.parse()
    }

    /// Subject, failing if both or neither of user id and email are set
    pub fn subject(&self) -> AssociationResult<Subject> {
        match (non_blank(&self.user_id), non_blank(&self.user_email)) {
            (Some(id), None) => Ok(Subject::UserId(id.to_string())),
            (None, Some(email)) => Ok(Subject::Email(email.to_string())),
            (Some(_), Some(_)) => Err(AssociationError::DataIntegrity(format!(
                "association {} has both user_id and user_email",
                self.id
            ))),
            (None, None) => Err(AssociationError::DataIntegrity(format!(
                "association {} has neither user_id nor user_email",
                self.id
            ))),
        }
    }

    /// Whether the subject is a registered user
    pub fn has_linked_user(&self) -> bool {
        non_blank(&self.user_id).is_some()
    }

    /// Latest invitation by `invited_at`; a sole invitation wins without comparison
    pub fn most_recent_invitation(&self) -> Option<&Invitation> {
        match self.invitations.as_slice() {
            [] => None,
            [only] => Some(only),
            many => many.iter().max_by_key(|invitation| invitation.invited_at),
        }
    }
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

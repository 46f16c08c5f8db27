// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Association Invariants
//!
//! Business rule checks over association documents. All functions are pure
//! and return detailed validation failures.
//!
//! # Invariant Categories
//!
//! 1. **Structural**: recognized status/route, exactly one subject field
//! 2. **History**: audit trail and invitations are append-only
//! 3. **Versioning**: every mutation regenerates the etag
//! 4. **Derivation**: approval expiry follows the latest invitation

use chrono::Duration;

use crate::domain::association::{non_blank, Association};
use crate::domain::status::{ApprovalRoute, AssociationStatus};
use crate::errors::AssociationError;

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ValidationError>;

/// Validation error with context
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Association {0} must have exactly one of user_id or user_email")]
    SubjectNotExclusive(String),

    #[error("Association {id} has unrecognized {field} '{value}'")]
    UnrecognizedValue {
        id: String,
        field: &'static str,
        value: String,
    },

    #[error("Association {0} rewrote or dropped {1} history")]
    HistoryRewritten(String, &'static str),

    #[error("Association {0} must gain exactly one previous state per transition")]
    AuditStepMismatch(String),

    #[error("Association {0} was mutated without a new etag")]
    EtagNotRegenerated(String),

    #[error("Association {0} approval expiry does not follow its latest invitation")]
    ExpiryNotDerived(String),
}

impl From<ValidationError> for AssociationError {
    fn from(err: ValidationError) -> Self {
        AssociationError::DataIntegrity(err.to_string())
    }
}

/// Exactly one of user id and email is populated
pub fn validate_subject(association: &Association) -> ValidationResult {
    let has_id = non_blank(&association.user_id).is_some();
    let has_email = non_blank(&association.user_email).is_some();
    if has_id == has_email {
        return Err(ValidationError::SubjectNotExclusive(association.id.clone()));
    }
    Ok(())
}

/// Status and approval route are drawn from the fixed vocabularies
pub fn validate_vocabulary(association: &Association) -> ValidationResult {
    if association.status.parse::<AssociationStatus>().is_err() {
        return Err(ValidationError::UnrecognizedValue {
            id: association.id.clone(),
            field: "status",
            value: association.status.clone(),
        });
    }
    if association.approval_route.parse::<ApprovalRoute>().is_err() {
        return Err(ValidationError::UnrecognizedValue {
            id: association.id.clone(),
            field: "approval_route",
            value: association.approval_route.clone(),
        });
    }
    Ok(())
}

/// Approval expiry, when present, equals the latest invitation plus validity
pub fn validate_expiry_derivation(association: &Association, validity: Duration) -> ValidationResult {
    let (Some(expiry), Some(last)) = (association.approval_expiry_at, association.invitations.last())
    else {
        return Ok(());
    };
    if last.invited_at.checked_add_signed(validity) != Some(expiry) {
        return Err(ValidationError::ExpiryNotDerived(association.id.clone()));
    }
    Ok(())
}

/// Structural checks for a single document
pub fn validate_association(association: &Association) -> ValidationResult {
    validate_subject(association)?;
    validate_vocabulary(association)
}

/// Checks that must hold between a document and its successor after one transition
///
/// # Rules
/// - Successor is structurally valid
/// - Invitations and previous states of `before` are a prefix of `after`
/// - Exactly one previous state was appended, recording `before.status`
/// - The etag changed
pub fn validate_transition(before: &Association, after: &Association) -> ValidationResult {
    validate_association(after)?;

    if !after.invitations.starts_with(&before.invitations) {
        return Err(ValidationError::HistoryRewritten(after.id.clone(), "invitation"));
    }
    if !after.previous_states.starts_with(&before.previous_states) {
        return Err(ValidationError::HistoryRewritten(after.id.clone(), "previous state"));
    }

    match after.previous_states.get(before.previous_states.len()..) {
        Some([appended]) if appended.status == before.status => {}
        _ => return Err(ValidationError::AuditStepMismatch(after.id.clone())),
    }

    if after.etag == before.etag {
        return Err(ValidationError::EtagNotRegenerated(after.id.clone()));
    }

    Ok(())
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Association Lifecycle State Machine
//!
//! # States
//!
//! - AwaitingApproval: invitation outstanding
//! - Confirmed: subject is authorised
//! - Removed: authorisation withdrawn
//! - Migrated: entry-only, produced by the migration job
//!
//! # Inputs (Lifecycle Commands)
//!
//! - IssueInvitation: Any → AwaitingApproval (repeatable re-invite)
//! - Confirm: Any → Confirmed
//! - Remove: Any → Removed
//!
//! The update builder accepts every command from every state. No command
//! targets Migrated. Business guards the service applies before building an
//! update live in the `check_*` functions below.

use chrono::{DateTime, Duration, Utc};

use super::{StateMachine, TransitionError, TransitionResult};
use crate::domain::{Association, AssociationStatus};

/// Lifecycle command (FSM input)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleCommand {
    /// Issue or renew an invitation
    IssueInvitation,

    /// Confirm the association
    Confirm,

    /// Remove the association
    Remove,
}

impl LifecycleCommand {
    /// Status the command moves an association into
    pub fn target(&self) -> AssociationStatus {
        match self {
            LifecycleCommand::IssueInvitation => AssociationStatus::AwaitingApproval,
            LifecycleCommand::Confirm => AssociationStatus::Confirmed,
            LifecycleCommand::Remove => AssociationStatus::Removed,
        }
    }
}

/// Transition output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOutput {
    /// Status recorded into the audit trail
    pub previous: AssociationStatus,
}

impl StateMachine for AssociationStatus {
    type Input = LifecycleCommand;
    type Output = TransitionOutput;

    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)> {
        Ok((input.target(), TransitionOutput { previous: *self }))
    }

    fn valid_inputs(&self) -> Vec<Self::Input> {
        vec![
            LifecycleCommand::IssueInvitation,
            LifecycleCommand::Confirm,
            LifecycleCommand::Remove,
        ]
    }
}

/// An already confirmed subject cannot be invited again
pub fn check_invitation_allowed(current: AssociationStatus) -> TransitionResult<()> {
    if current == AssociationStatus::Confirmed {
        return Err(TransitionError::InvalidTransition {
            from: current.to_string(),
            to: AssociationStatus::AwaitingApproval.to_string(),
        });
    }
    Ok(())
}

/// A removed association stays removed
pub fn check_removal_allowed(current: AssociationStatus) -> TransitionResult<()> {
    if current == AssociationStatus::Removed {
        return Err(TransitionError::InvalidTransition {
            from: current.to_string(),
            to: AssociationStatus::Removed.to_string(),
        });
    }
    Ok(())
}

/// Direct confirmation is for subjects not yet authorised
pub fn check_auth_code_confirmation_allowed(current: AssociationStatus) -> TransitionResult<()> {
    if current == AssociationStatus::Confirmed {
        return Err(TransitionError::PreconditionFailed(
            "association is already confirmed".to_string(),
        ));
    }
    Ok(())
}

/// Accepting an invitation needs an outstanding, unexpired invitation
pub fn check_acceptance_allowed(
    association: &Association,
    current: AssociationStatus,
    now: DateTime<Utc>,
    validity: Duration,
) -> TransitionResult<()> {
    if current != AssociationStatus::AwaitingApproval {
        return Err(TransitionError::InvalidTransition {
            from: current.to_string(),
            to: AssociationStatus::Confirmed.to_string(),
        });
    }

    match association.most_recent_invitation() {
        Some(invitation) if invitation.is_active(now, validity) => Ok(()),
        Some(_) => Err(TransitionError::PreconditionFailed(format!(
            "invitation for association {} has expired",
            association.id
        ))),
        None => Err(TransitionError::PreconditionFailed(format!(
            "association {} has no invitation to accept",
            association.id
        ))),
    }
}

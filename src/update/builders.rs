// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Update Builders for Association Transitions
//!
//! ```text
//! build(Association, Option<UserProfile>, acting user, now) → Result<AssociationUpdate, Error>
//! ```
//!
//! Every builder starts from [`base_update`] (new etag, audit entry for the
//! pre-transition status, optional user link) and layers its own fields on
//! top. Time and the validity window are parameters; nothing here reads the
//! clock or global configuration.

use chrono::{DateTime, Duration, Utc};

use crate::domain::association::expiry_after;
use crate::domain::{generate_etag, Association, Invitation, PreviousState, UserProfile};
use crate::errors::AssociationResult;
use crate::state_machine::{LifecycleCommand, StateMachine};
use crate::update::description::AssociationUpdate;

/// Shared first step of every transition
///
/// # Errors
/// - DataIntegrity if the stored status is unrecognized
pub fn base_update(
    association: &Association,
    user: Option<&UserProfile>,
    changed_by: &str,
    command: LifecycleCommand,
    now: DateTime<Utc>,
) -> AssociationResult<AssociationUpdate> {
    let current = association.status()?;
    let (status, output) = current.transition(&command)?;

    Ok(AssociationUpdate {
        etag: generate_etag(),
        status,
        previous_state: PreviousState {
            status: output.previous.as_str().to_string(),
            changed_by: changed_by.to_string(),
            changed_at: now,
        },
        link_user_id: user.map(|profile| profile.user_id.clone()),
        invitation: None,
        approval_expiry_at: None,
        approved_at: None,
        removed_at: None,
    })
}

/// Issue or renew an invitation
///
/// # Effects
/// - Appends `Invitation { invited_by, invited_at: now }`
/// - Sets `approval_expiry_at = now + validity`
/// - Status becomes awaiting-approval
pub fn invitation_update(
    association: &Association,
    user: Option<&UserProfile>,
    invited_by: &str,
    now: DateTime<Utc>,
    validity: Duration,
) -> AssociationResult<AssociationUpdate> {
    let invitation = Invitation {
        invited_by: invited_by.to_string(),
        invited_at: now,
    };
    let expiry = expiry_after(now, validity)?;

    Ok(
        base_update(association, user, invited_by, LifecycleCommand::IssueInvitation, now)?
            .with_invitation(invitation, expiry),
    )
}

/// Confirm the association
pub fn confirm_update(
    association: &Association,
    user: Option<&UserProfile>,
    confirmed_by: &str,
    now: DateTime<Utc>,
) -> AssociationResult<AssociationUpdate> {
    Ok(base_update(association, user, confirmed_by, LifecycleCommand::Confirm, now)?.with_approved_at(now))
}

/// Remove the association
pub fn remove_update(
    association: &Association,
    user: Option<&UserProfile>,
    removed_by: &str,
    now: DateTime<Utc>,
) -> AssociationResult<AssociationUpdate> {
    Ok(base_update(association, user, removed_by, LifecycleCommand::Remove, now)?.with_removed_at(now))
}

/// Dispatch to the builder for `command`
pub fn build_update(
    command: LifecycleCommand,
    association: &Association,
    user: Option<&UserProfile>,
    acting_user_id: &str,
    now: DateTime<Utc>,
    validity: Duration,
) -> AssociationResult<AssociationUpdate> {
    match command {
        LifecycleCommand::IssueInvitation => {
            invitation_update(association, user, acting_user_id, now, validity)
        }
        LifecycleCommand::Confirm => confirm_update(association, user, acting_user_id, now),
        LifecycleCommand::Remove => remove_update(association, user, acting_user_id, now),
    }
}

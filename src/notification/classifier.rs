// Copyright (c) 2025 - Cowboy AI, Inc.
//! Email Batch Classifier
//!
//! ```text
//! classify(action, acting_is_subject, subject_linked, status) → EmailBatch
//! EmailBatch::notifications()                                 → [(NotificationKind, RecipientRule)]
//! ```
//!
//! Total over every input combination. Combinations that send nothing map
//! to [`EmailBatch::None`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::AssociationStatus;

/// Mutation a notification decision is made for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    /// Issue or renew an invitation
    Invite,
    /// Accept an invitation
    Accept,
    /// Confirm directly with the company auth code
    ConfirmWithAuthCode,
    /// Remove, reject or cancel
    Remove,
}

/// Closed set of notification batches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailBatch {
    InviteNewUser,
    InviteExistingUser,
    AcceptOwnInvitation,
    RejectOwnInvitation,
    CancelOtherInvitation,
    RemoveOwnAuthorisation,
    RemoveOtherAuthorisation,
    RemoveOtherMigrated,
    ConfirmViaAuthCode,
    None,
}

/// Who receives one notification of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientRule {
    /// The user performing the action
    ActingUser,
    /// The association's subject
    Subject,
    /// Confirmed users of the company other than the actor and the subject
    OtherConfirmedUsers,
}

/// Notification template with its fixed message-type tag and subject line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    AuthCodeConfirmation,
    InvitationSent,
    InviteUser,
    InviteNewUser,
    InvitationAccepted,
    InvitationRejected,
    InvitationCancelled,
    YourInvitationCancelled,
    AuthorisationRemoved,
    YourAuthorisationRemoved,
    MigratedAuthorisationRemoved,
}

/// Placeholder for the company name in subject and body templates
pub const COMPANY_NAME: &str = "company_name";
/// Placeholder for the acting user's display name
pub const ACTOR: &str = "actor";
/// Placeholder for the subject's display name
pub const SUBJECT: &str = "subject";

impl NotificationKind {
    pub const ALL: [NotificationKind; 11] = [
        NotificationKind::AuthCodeConfirmation,
        NotificationKind::InvitationSent,
        NotificationKind::InviteUser,
        NotificationKind::InviteNewUser,
        NotificationKind::InvitationAccepted,
        NotificationKind::InvitationRejected,
        NotificationKind::InvitationCancelled,
        NotificationKind::YourInvitationCancelled,
        NotificationKind::AuthorisationRemoved,
        NotificationKind::YourAuthorisationRemoved,
        NotificationKind::MigratedAuthorisationRemoved,
    ];

    /// Tag the producer routes on
    pub fn message_type(&self) -> &'static str {
        match self {
            NotificationKind::AuthCodeConfirmation => "auth_code_confirmation_email",
            NotificationKind::InvitationSent => "invitation_sent_email",
            NotificationKind::InviteUser => "invite_email",
            NotificationKind::InviteNewUser => "invite_new_user_email",
            NotificationKind::InvitationAccepted => "invitation_accepted_email",
            NotificationKind::InvitationRejected => "invitation_rejected_email",
            NotificationKind::InvitationCancelled => "invitation_cancelled_email",
            NotificationKind::YourInvitationCancelled => "your_invitation_cancelled_email",
            NotificationKind::AuthorisationRemoved => "authorisation_removed_email",
            NotificationKind::YourAuthorisationRemoved => "your_authorisation_removed_email",
            NotificationKind::MigratedAuthorisationRemoved => "migrated_authorisation_removed_email",
        }
    }

    /// Subject line template over `{company_name}`, `{actor}` and `{subject}`
    pub fn subject_template(&self) -> &'static str {
        match self {
            NotificationKind::AuthCodeConfirmation => {
                "{subject} is now authorised to file online for {company_name}"
            }
            NotificationKind::InvitationSent => {
                "{actor} has invited {subject} to be authorised to file online for {company_name}"
            }
            NotificationKind::InviteUser | NotificationKind::InviteNewUser => {
                "Invitation to be authorised to file online for {company_name}"
            }
            NotificationKind::InvitationAccepted => {
                "{subject} is now authorised to file online for {company_name}"
            }
            NotificationKind::InvitationRejected => {
                "{subject} has declined to be authorised to file online for {company_name}"
            }
            NotificationKind::InvitationCancelled => {
                "{actor} has cancelled the invitation for {subject} to file online for {company_name}"
            }
            NotificationKind::YourInvitationCancelled => {
                "Your invitation to file online for {company_name} has been cancelled"
            }
            NotificationKind::AuthorisationRemoved
            | NotificationKind::MigratedAuthorisationRemoved => {
                "{actor} has removed {subject}'s authorisation to file online for {company_name}"
            }
            NotificationKind::YourAuthorisationRemoved => {
                "Your authorisation to file online for {company_name} has been removed"
            }
        }
    }

    /// Body fields this kind renders; each must be present and non-blank
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            NotificationKind::InviteUser
            | NotificationKind::InviteNewUser
            | NotificationKind::InvitationSent
            | NotificationKind::InvitationCancelled
            | NotificationKind::AuthorisationRemoved
            | NotificationKind::MigratedAuthorisationRemoved => &[COMPANY_NAME, ACTOR, SUBJECT],
            NotificationKind::YourInvitationCancelled | NotificationKind::YourAuthorisationRemoved => {
                &[COMPANY_NAME, ACTOR]
            }
            NotificationKind::AuthCodeConfirmation
            | NotificationKind::InvitationAccepted
            | NotificationKind::InvitationRejected => &[COMPANY_NAME, SUBJECT],
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message_type())
    }
}

/// Decide which batch an action triggers
pub fn classify(
    action: LifecycleAction,
    acting_user_is_subject: bool,
    subject_has_linked_user: bool,
    status: AssociationStatus,
) -> EmailBatch {
    use AssociationStatus::*;

    match (action, acting_user_is_subject, status) {
        (LifecycleAction::Invite, true, _) | (LifecycleAction::Invite, _, Confirmed) => EmailBatch::None,
        (LifecycleAction::Invite, false, _) if subject_has_linked_user => EmailBatch::InviteExistingUser,
        (LifecycleAction::Invite, false, _) => EmailBatch::InviteNewUser,

        (LifecycleAction::Accept, true, AwaitingApproval) => EmailBatch::AcceptOwnInvitation,
        (LifecycleAction::Accept, _, _) => EmailBatch::None,

        (LifecycleAction::ConfirmWithAuthCode, true, AwaitingApproval | Removed | Migrated) => {
            EmailBatch::ConfirmViaAuthCode
        }
        (LifecycleAction::ConfirmWithAuthCode, _, _) => EmailBatch::None,

        (LifecycleAction::Remove, true, AwaitingApproval) => EmailBatch::RejectOwnInvitation,
        (LifecycleAction::Remove, false, AwaitingApproval) => EmailBatch::CancelOtherInvitation,
        (LifecycleAction::Remove, true, Confirmed) => EmailBatch::RemoveOwnAuthorisation,
        (LifecycleAction::Remove, false, Confirmed) => EmailBatch::RemoveOtherAuthorisation,
        (LifecycleAction::Remove, false, Migrated) => EmailBatch::RemoveOtherMigrated,
        (LifecycleAction::Remove, true, Migrated) | (LifecycleAction::Remove, _, Removed) => {
            EmailBatch::None
        }
    }
}

impl EmailBatch {
    /// Notifications of this batch with their recipient rules
    pub fn notifications(&self) -> &'static [(NotificationKind, RecipientRule)] {
        use NotificationKind as K;
        use RecipientRule as R;

        match self {
            EmailBatch::InviteNewUser => &[(K::InviteNewUser, R::Subject), (K::InvitationSent, R::OtherConfirmedUsers)],
            EmailBatch::InviteExistingUser => &[(K::InviteUser, R::Subject), (K::InvitationSent, R::OtherConfirmedUsers)],
            EmailBatch::AcceptOwnInvitation => &[(K::InvitationAccepted, R::OtherConfirmedUsers)],
            EmailBatch::RejectOwnInvitation => &[(K::InvitationRejected, R::OtherConfirmedUsers)],
            EmailBatch::CancelOtherInvitation => &[
                (K::YourInvitationCancelled, R::Subject),
                (K::InvitationCancelled, R::OtherConfirmedUsers),
            ],
            EmailBatch::RemoveOwnAuthorisation => &[
                (K::YourAuthorisationRemoved, R::ActingUser),
                (K::AuthorisationRemoved, R::OtherConfirmedUsers),
            ],
            EmailBatch::RemoveOtherAuthorisation => &[
                (K::YourAuthorisationRemoved, R::Subject),
                (K::AuthorisationRemoved, R::OtherConfirmedUsers),
            ],
            EmailBatch::RemoveOtherMigrated => &[(K::MigratedAuthorisationRemoved, R::OtherConfirmedUsers)],
            EmailBatch::ConfirmViaAuthCode => &[(K::AuthCodeConfirmation, R::OtherConfirmedUsers)],
            EmailBatch::None => &[],
        }
    }

    /// Whether any notification of this batch goes to the company's other users
    pub fn needs_company_users(&self) -> bool {
        self.notifications()
            .iter()
            .any(|(_, rule)| *rule == RecipientRule::OtherConfirmedUsers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_message_types_are_distinct() {
        let tags: HashSet<&str> = NotificationKind::ALL.iter().map(|k| k.message_type()).collect();
        assert_eq!(tags.len(), NotificationKind::ALL.len());
    }

    #[test]
    fn test_templates_only_use_required_fields() {
        for kind in NotificationKind::ALL {
            for placeholder in [COMPANY_NAME, ACTOR, SUBJECT] {
                if kind.subject_template().contains(&format!("{{{}}}", placeholder)) {
                    assert!(kind.required_fields().contains(&placeholder), "{} uses {}", kind, placeholder);
                }
            }
        }
    }

    #[test]
    fn test_none_sends_nothing() {
        assert!(EmailBatch::None.notifications().is_empty());
        assert!(!EmailBatch::None.needs_company_users());
        assert!(EmailBatch::RemoveOtherMigrated.needs_company_users());
    }
}

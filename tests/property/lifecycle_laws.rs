// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Lifecycle Transitions
//!
//! Any sequence of lifecycle commands, applied through the pure builders,
//! keeps the subject exclusive, grows the audit trail by exactly one entry
//! recording the pre-transition status, and never rewrites history.

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;

use company_associations::domain::invariants::{validate_association, validate_transition};
use company_associations::domain::{Association, Subject, UserProfile};
use company_associations::state_machine::LifecycleCommand;
use company_associations::update::build_update;
use company_associations::AssociationStatus;

// ============================================================================
// Strategies
// ============================================================================

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 19, 12, 0, 0).unwrap()
}

fn command() -> impl Strategy<Value = LifecycleCommand> {
    prop_oneof![
        Just(LifecycleCommand::IssueInvitation),
        Just(LifecycleCommand::Confirm),
        Just(LifecycleCommand::Remove),
    ]
}

/// Command paired with an optional user link and a minute offset
fn step() -> impl Strategy<Value = (LifecycleCommand, bool, i64)> {
    (command(), any::<bool>(), 1i64..10_000)
}

fn initial_association() -> impl Strategy<Value = Association> {
    prop_oneof![
        "[a-z]{1,8}@example\\.com".prop_map(|email| Association::migrated("00006400", email, start_time())),
        "u-[a-z0-9]{1,8}".prop_map(|id| Association::auth_code_confirmed("00006400", id, start_time())),
        "[a-z]{1,8}@example\\.com".prop_map(|email| Association::invited(
            "00006400",
            Subject::Email(email),
            "u-alice",
            start_time(),
            Duration::days(7),
        )
        .unwrap()),
    ]
}

fn run(
    initial: &Association,
    steps: &[(LifecycleCommand, bool, i64)],
) -> Vec<Association> {
    let linked = UserProfile::new("u-linked", "linked@example.com");
    let mut history = vec![initial.clone()];
    let mut now = start_time();

    for (command, link, minutes) in steps {
        now += Duration::minutes(*minutes);
        let current = history.last().cloned().unwrap();
        let user = if *link { Some(&linked) } else { None };
        let update = build_update(*command, &current, user, "u-actor", now, Duration::days(7)).unwrap();
        history.push(update.apply_to(&current));
    }

    history
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    /// Property: Every transition keeps exactly one of user id and email
    #[test]
    fn prop_subject_stays_exclusive(
        initial in initial_association(),
        steps in prop::collection::vec(step(), 0..20),
    ) {
        for association in run(&initial, &steps) {
            prop_assert!(validate_association(&association).is_ok());
            prop_assert!(association.subject().is_ok());
        }
    }

    /// Property: Each transition appends one previous state holding the pre-status
    #[test]
    fn prop_previous_state_records_pre_status(
        initial in initial_association(),
        steps in prop::collection::vec(step(), 1..20),
    ) {
        let history = run(&initial, &steps);

        for (before, after) in history.iter().zip(history.iter().skip(1)) {
            prop_assert_eq!(after.previous_states.len(), before.previous_states.len() + 1);
            prop_assert_eq!(&after.previous_states.last().unwrap().status, &before.status);
            prop_assert!(validate_transition(before, after).is_ok());
        }
    }

    /// Property: The resulting status is the command's target, never migrated
    #[test]
    fn prop_status_follows_command(
        initial in initial_association(),
        steps in prop::collection::vec(step(), 1..20),
    ) {
        let history = run(&initial, &steps);

        for ((command, _, _), after) in steps.iter().zip(history.iter().skip(1)) {
            let status = after.status().unwrap();
            prop_assert_eq!(status, command.target());
            prop_assert_ne!(status, AssociationStatus::Migrated);
        }
    }

    /// Property: Invitations are only ever appended, and expiry tracks the latest
    #[test]
    fn prop_invitations_append_only(
        initial in initial_association(),
        steps in prop::collection::vec(step(), 1..20),
    ) {
        let history = run(&initial, &steps);

        for (before, after) in history.iter().zip(history.iter().skip(1)) {
            prop_assert!(after.invitations.starts_with(&before.invitations));
            prop_assert!(after.invitations.len() <= before.invitations.len() + 1);
            if after.invitations.len() > before.invitations.len() {
                let latest = after.invitations.last().unwrap();
                prop_assert_eq!(after.approval_expiry_at, Some(latest.invited_at + Duration::days(7)));
            }
        }
    }

    /// Property: Every transition regenerates the etag
    #[test]
    fn prop_etag_regenerated(
        initial in initial_association(),
        steps in prop::collection::vec(step(), 1..10),
    ) {
        let history = run(&initial, &steps);

        for (before, after) in history.iter().zip(history.iter().skip(1)) {
            prop_assert_ne!(&before.etag, &after.etag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_clears_email() {
        let initial = Association::migrated("00006400", "bob@example.com", start_time());
        let history = run(&initial, &[(LifecycleCommand::IssueInvitation, true, 5)]);
        let linked = history.last().unwrap();

        assert_eq!(linked.subject().unwrap(), Subject::UserId("u-linked".to_string()));
        assert_eq!(linked.previous_states[0].status, "migrated");
    }
}

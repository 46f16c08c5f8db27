// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Batch Key Splitter
//!
//! Splitting in parallel partitions of any size collects the same keys as
//! one sequential pass, and every association contributes exactly its own
//! subject key.

use chrono::Utc;
use proptest::prelude::*;

use company_associations::batch::split_concurrently;
use company_associations::domain::{Association, Subject};
use company_associations::BatchKeys;

fn association() -> impl Strategy<Value = Association> {
    prop_oneof![
        (0u8..20).prop_map(|n| Association::auth_code_confirmed("00006400", format!("u-{}", n), Utc::now())),
        (0u8..20).prop_map(|n| Association::migrated("00006400", format!("user{}@example.com", n), Utc::now())),
    ]
}

proptest! {
    /// Property: Partition size does not change the collected keys
    #[test]
    fn prop_split_matches_sequential(
        associations in prop::collection::vec(association(), 0..60),
        partition_size in 1usize..16,
    ) {
        let sequential = BatchKeys::from_associations(&associations);
        let split = tokio_test::block_on(split_concurrently(associations, partition_size)).unwrap();

        prop_assert_eq!(split, sequential);
    }

    /// Property: Merging is order independent
    #[test]
    fn prop_merge_commutes(
        left in prop::collection::vec(association(), 0..20),
        right in prop::collection::vec(association(), 0..20),
    ) {
        let a = BatchKeys::from_associations(&left).merge(BatchKeys::from_associations(&right));
        let b = BatchKeys::from_associations(&right).merge(BatchKeys::from_associations(&left));

        prop_assert_eq!(a, b);
    }

    /// Property: Id-linked records feed user_ids, email-only records feed user_emails
    #[test]
    fn prop_keys_follow_subject(associations in prop::collection::vec(association(), 0..40)) {
        let keys = BatchKeys::from_associations(&associations);

        for association in &associations {
            match association.subject().unwrap() {
                Subject::UserId(id) => prop_assert!(keys.user_ids.contains(&id)),
                Subject::Email(email) => prop_assert!(keys.user_emails.contains(&email)),
            }
        }
        prop_assert!(keys.len() <= associations.len());
    }
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Enrichment
//!
//! Enrichment stages are idempotent, and the combined mapper equals the
//! composition of its stages whenever the profiles were resolved.

use chrono::Utc;
use proptest::prelude::*;
use std::collections::HashMap;

use company_associations::domain::{Association, CompanyProfile, UserProfile};
use company_associations::projection::{apply_company, apply_user, enrich, to_view, ResolvedProfiles, NOT_PROVIDED};

fn user() -> impl Strategy<Value = UserProfile> {
    (
        "u-[a-z0-9]{1,6}",
        "[a-z]{1,8}@example\\.com",
        prop::option::of("[A-Za-z ]{0,12}"),
    )
        .prop_map(|(id, email, name)| {
            let profile = UserProfile::new(id, email);
            match name {
                Some(name) => profile.with_display_name(name),
                None => profile,
            }
        })
}

fn company() -> CompanyProfile {
    CompanyProfile::new("00006400", "Example Widgets Ltd", "active")
}

proptest! {
    /// Property: Applying the same user twice equals applying it once
    #[test]
    fn prop_apply_user_idempotent(profile in user()) {
        let association = Association::auth_code_confirmed("00006400", profile.user_id.clone(), Utc::now());
        let once = apply_user(to_view(&association).unwrap(), &profile);
        let twice = apply_user(once.clone(), &profile);

        prop_assert_eq!(twice, once);
    }

    /// Property: Display name is the profile's, or the placeholder when blank
    #[test]
    fn prop_display_name_never_blank(profile in user()) {
        let association = Association::auth_code_confirmed("00006400", profile.user_id.clone(), Utc::now());
        let view = apply_user(to_view(&association).unwrap(), &profile);

        match profile.display_name.as_deref().filter(|name| !name.trim().is_empty()) {
            Some(name) => prop_assert_eq!(view.display_name.as_str(), name),
            None => prop_assert_eq!(view.display_name.as_str(), NOT_PROVIDED),
        }
    }

    /// Property: enrich equals the composed stages for a resolved user and company
    #[test]
    fn prop_enrich_is_composition(profile in user(), by_email in any::<bool>()) {
        let association = if by_email {
            Association::migrated("00006400", profile.email.clone(), Utc::now())
        } else {
            Association::auth_code_confirmed("00006400", profile.user_id.clone(), Utc::now())
        };
        let profiles = ResolvedProfiles {
            users_by_id: HashMap::from([(profile.user_id.clone(), profile.clone())]),
            users_by_email: HashMap::from([(profile.email.clone(), profile.clone())]),
            companies: HashMap::from([("00006400".to_string(), company())]),
        };

        let combined = enrich(&association, &profiles).unwrap();
        let staged = apply_user(apply_company(to_view(&association).unwrap(), &company()), &profile);

        prop_assert_eq!(combined, staged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_company_is_integrity_failure() {
        let association = Association::auth_code_confirmed("00006400", "u-bob", Utc::now());
        let profiles = ResolvedProfiles {
            users_by_id: HashMap::new(),
            users_by_email: HashMap::new(),
            companies: HashMap::new(),
        };

        assert!(enrich(&association, &profiles).is_err());
    }
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Enrichment Mappers
//!
//! ```text
//! to_view(raw)                          = base view, links.self, kind
//! apply_company(view, company)          = + company_name, company_status
//! apply_user(view, user)                = + user_email, display_name
//! enrich(raw, &ResolvedProfiles)        = base ∘ company ∘ user, no I/O
//! ```
//!
//! Lookup misses in [`enrich`] are asymmetric: a user missing from the
//! resolved map yields an empty user context, a company missing from it is
//! a data integrity failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::batch::{company_numbers, BatchKeys};
use crate::directory::{CompanyDirectory, UserDirectory};
use crate::domain::{ApprovalRoute, Association, AssociationStatus, CompanyProfile, Subject, UserProfile};
use crate::errors::{AssociationError, AssociationResult};
use crate::projection::{ItemLinks, ASSOCIATION_KIND, NOT_PROVIDED};

/// Outward representation of one association
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationView {
    pub id: String,
    pub etag: String,
    pub company_number: String,
    pub company_name: Option<String>,
    pub company_status: Option<String>,
    pub user_id: Option<String>,
    pub user_email: Option<String>,
    pub display_name: String,
    pub status: AssociationStatus,
    pub approval_route: ApprovalRoute,
    pub created_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub removed_at: Option<DateTime<Utc>>,
    pub approval_expiry_at: Option<DateTime<Utc>>,
    pub kind: String,
    pub links: ItemLinks,
}

/// Base conversion shared by every outward association shape
///
/// # Errors
/// - DataIntegrity for an unrecognized status or approval route
/// - DataIntegrity when both or neither of user id and email are set
pub fn to_view(association: &Association) -> AssociationResult<AssociationView> {
    let subject = association.subject()?;
    let (user_id, user_email) = match subject {
        Subject::UserId(id) => (Some(id), None),
        Subject::Email(email) => (None, Some(email)),
    };

    Ok(AssociationView {
        id: association.id.clone(),
        etag: association.etag.clone(),
        company_number: association.company_number.clone(),
        company_name: None,
        company_status: None,
        user_id,
        user_email,
        display_name: NOT_PROVIDED.to_string(),
        status: association.status()?,
        approval_route: association.approval_route()?,
        created_at: association.created_at,
        approved_at: association.approved_at,
        removed_at: association.removed_at,
        approval_expiry_at: association.approval_expiry_at,
        kind: ASSOCIATION_KIND.to_string(),
        links: ItemLinks {
            self_link: format!("/associations/{}", association.id),
        },
    })
}

/// Set user display values
pub fn apply_user(mut view: AssociationView, user: &UserProfile) -> AssociationView {
    view.user_email = Some(user.email.clone());
    view.display_name = user
        .display_name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(NOT_PROVIDED)
        .to_string();
    view
}

/// Set company display values
pub fn apply_company(mut view: AssociationView, company: &CompanyProfile) -> AssociationView {
    view.company_name = Some(company.company_name.clone());
    view.company_status = Some(company.company_status.clone());
    view
}

/// User enrichment, fetching the profile when none is supplied
///
/// # Errors
/// - NotFound when the linked user id is unknown to the directory
/// - UpstreamUnavailable when the directory call fails
pub async fn enrich_with_user(
    view: AssociationView,
    user: Option<&UserProfile>,
    users: &dyn UserDirectory,
) -> AssociationResult<AssociationView> {
    if let Some(user) = user {
        return Ok(apply_user(view, user));
    }

    let fetched = match (&view.user_id, &view.user_email) {
        (Some(user_id), _) => Some(users.get(user_id).await?),
        (None, Some(email)) => users.search_by_email(email).await?,
        (None, None) => None,
    };

    Ok(match fetched {
        Some(profile) => apply_user(view, &profile),
        None => view,
    })
}

/// Company enrichment, fetching the profile when none is supplied
///
/// # Errors
/// - NotFound when the company is unknown to the directory
/// - UpstreamUnavailable when the directory call fails
pub async fn enrich_with_company(
    view: AssociationView,
    company: Option<&CompanyProfile>,
    companies: &dyn CompanyDirectory,
) -> AssociationResult<AssociationView> {
    match company {
        Some(company) => Ok(apply_company(view, company)),
        None => {
            let fetched = companies.get(&view.company_number).await?;
            Ok(apply_company(view, &fetched))
        }
    }
}

/// Directory data resolved once for a page of associations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedProfiles {
    /// Users keyed by user id
    pub users_by_id: HashMap<String, UserProfile>,
    /// Users keyed by the email searched for
    pub users_by_email: HashMap<String, UserProfile>,
    /// Companies keyed by company number
    pub companies: HashMap<String, CompanyProfile>,
}

impl ResolvedProfiles {
    /// User profile for a stored subject, if resolved
    pub fn user_for(&self, association: &Association) -> Option<&UserProfile> {
        match association.subject().ok()? {
            Subject::UserId(id) => self.users_by_id.get(&id),
            Subject::Email(email) => self.users_by_email.get(&email),
        }
    }
}

/// Combined enrichment against pre-resolved maps
///
/// # Errors
/// - DataIntegrity from [`to_view`]
/// - DataIntegrity when the company is absent from `profiles`
pub fn enrich(association: &Association, profiles: &ResolvedProfiles) -> AssociationResult<AssociationView> {
    let view = to_view(association)?;

    let company = profiles.companies.get(&association.company_number).ok_or_else(|| {
        AssociationError::DataIntegrity(format!(
            "company {} of association {} was not resolved",
            association.company_number, association.id
        ))
    })?;
    let view = apply_company(view, company);

    Ok(match profiles.user_for(association) {
        Some(user) => apply_user(view, user),
        None if view.user_id.is_some() => AssociationView {
            user_email: None,
            ..view
        },
        None => view,
    })
}

/// Batched lookup of `user_ids`, skipping the call when there is nothing to resolve
pub async fn resolve_users(
    user_ids: &HashSet<String>,
    users: &dyn UserDirectory,
) -> AssociationResult<HashMap<String, UserProfile>> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }
    users.get_many(user_ids).await
}

/// Resolve every profile `associations` reference, one batched call per key kind
///
/// # Errors
/// - UpstreamUnavailable when any batched call fails; no partial result is kept
pub async fn resolve_profiles(
    associations: &[Association],
    users: &dyn UserDirectory,
    companies: &dyn CompanyDirectory,
) -> AssociationResult<ResolvedProfiles> {
    let keys = BatchKeys::from_associations(associations);
    let numbers = company_numbers(associations);

    let users_by_id = resolve_users(&keys.user_ids, users).await?;
    let users_by_email = if keys.user_emails.is_empty() {
        HashMap::new()
    } else {
        users.search_many_by_email(&keys.user_emails).await?
    };
    let companies = if numbers.is_empty() {
        HashMap::new()
    } else {
        companies.get_many(&numbers).await?
    };

    debug!(
        records = associations.len(),
        users_by_id = users_by_id.len(),
        users_by_email = users_by_email.len(),
        companies = companies.len(),
        "Resolved profiles for page"
    );

    Ok(ResolvedProfiles {
        users_by_id,
        users_by_email,
        companies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{InMemoryCompanyDirectory, InMemoryUserDirectory};
    use pretty_assertions::assert_eq;

    fn company() -> CompanyProfile {
        CompanyProfile::new("00006400", "Example Ltd", "active")
    }

    fn linked() -> Association {
        Association::auth_code_confirmed("00006400", "u-bob", Utc::now())
    }

    #[test]
    fn test_base_view_links_and_kind() {
        let association = linked();
        let view = to_view(&association).unwrap();

        assert_eq!(view.links.self_link, format!("/associations/{}", association.id));
        assert_eq!(view.kind, "association");
        assert_eq!(view.status, AssociationStatus::Confirmed);
        assert_eq!(view.display_name, NOT_PROVIDED);
        assert_eq!(view.company_name, None);
    }

    #[test]
    fn test_base_view_rejects_unknown_status() {
        let mut association = linked();
        association.status = "pending".to_string();
        assert!(matches!(
            to_view(&association),
            Err(AssociationError::DataIntegrity(_))
        ));
    }

    #[test]
    fn test_apply_user_falls_back_to_sentinel() {
        let view = to_view(&linked()).unwrap();
        let view = apply_user(view, &UserProfile::new("u-bob", "bob@example.com").with_display_name(" "));

        assert_eq!(view.user_email.as_deref(), Some("bob@example.com"));
        assert_eq!(view.display_name, NOT_PROVIDED);
    }

    #[test]
    fn test_enrich_user_miss_is_empty_context() {
        let profiles = ResolvedProfiles {
            companies: HashMap::from([("00006400".to_string(), company())]),
            ..ResolvedProfiles::default()
        };
        let view = enrich(&linked(), &profiles).unwrap();

        assert_eq!(view.user_id.as_deref(), Some("u-bob"));
        assert_eq!(view.user_email, None);
        assert_eq!(view.display_name, NOT_PROVIDED);
        assert_eq!(view.company_name.as_deref(), Some("Example Ltd"));
    }

    #[test]
    fn test_enrich_company_miss_is_integrity_error() {
        let err = enrich(&linked(), &ResolvedProfiles::default()).unwrap_err();
        assert!(matches!(err, AssociationError::DataIntegrity(_)));
    }

    #[test]
    fn test_enrich_email_only_keeps_unlinked_subject() {
        let association = Association::migrated("00006400", "carol@example.com", Utc::now());
        let profiles = ResolvedProfiles {
            users_by_email: HashMap::from([(
                "carol@example.com".to_string(),
                UserProfile::new("u-carol", "carol@example.com").with_display_name("Carol"),
            )]),
            companies: HashMap::from([("00006400".to_string(), company())]),
            ..ResolvedProfiles::default()
        };
        let view = enrich(&association, &profiles).unwrap();

        assert_eq!(view.user_id, None);
        assert_eq!(view.display_name, "Carol");
    }

    #[tokio::test]
    async fn test_single_fetch_variants() {
        let users = InMemoryUserDirectory::new([UserProfile::new("u-bob", "bob@example.com")]);
        let companies = InMemoryCompanyDirectory::new([company()]);

        let view = to_view(&linked()).unwrap();
        let view = enrich_with_company(view, None, &companies).await.unwrap();
        let view = enrich_with_user(view, None, &users).await.unwrap();

        assert_eq!(view.user_email.as_deref(), Some("bob@example.com"));
        assert_eq!(view.company_status.as_deref(), Some("active"));
        assert_eq!(users.calls.single(), 1);
        assert_eq!(companies.calls.single(), 1);
    }

    #[tokio::test]
    async fn test_resolve_profiles_batches_per_key_kind() {
        let now = Utc::now();
        let page = vec![
            Association::auth_code_confirmed("00006400", "u-bob", now),
            Association::auth_code_confirmed("00006400", "u-alice", now),
            Association::migrated("12345678", "carol@example.com", now),
        ];
        let users = InMemoryUserDirectory::new([UserProfile::new("u-bob", "bob@example.com")]);
        let companies = InMemoryCompanyDirectory::new([company()]);

        let profiles = resolve_profiles(&page, &users, &companies).await.unwrap();

        assert_eq!(profiles.users_by_id.len(), 1);
        assert_eq!(users.calls.batched(), 2);
        assert_eq!(users.calls.single(), 0);
        assert_eq!(companies.calls.batched(), 1);
    }
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Invitation Projections
//!
//! Two independently paginated shapes:
//!
//! - invitations of one association, in storage order
//! - the most recent invitation of each association, ordered by
//!   `approval_expiry_at` descending with missing expiries last
//!
//! Inviter ids are resolved to emails with one batched directory call per
//! page. An invitation is active strictly before `invited_at + validity`.

use chrono::{DateTime, Duration, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use crate::directory::UserDirectory;
use crate::domain::{Association, Invitation, UserProfile};
use crate::errors::{AssociationError, AssociationResult};
use crate::page::{Page, PageRequest};
use crate::projection::enrichment::resolve_users;
use crate::projection::pagination::{paged_list, ListScope};
use crate::projection::PagedList;

/// Outward invitation record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationView {
    pub association_id: String,
    /// Inviter email
    pub invited_by: String,
    pub invited_at: DateTime<Utc>,
    pub is_active: bool,
}

fn to_invitation_view(
    association_id: &str,
    invitation: &Invitation,
    inviters: &HashMap<String, UserProfile>,
    now: DateTime<Utc>,
    validity: Duration,
) -> AssociationResult<InvitationView> {
    let inviter = inviters
        .get(&invitation.invited_by)
        .ok_or_else(|| AssociationError::user_not_found(invitation.invited_by.as_str()))?;

    Ok(InvitationView {
        association_id: association_id.to_string(),
        invited_by: inviter.email.clone(),
        invited_at: invitation.invited_at,
        is_active: invitation.is_active(now, validity),
    })
}

/// Distinct inviter ids
pub fn inviter_ids<'a>(invitations: impl IntoIterator<Item = &'a Invitation>) -> HashSet<String> {
    invitations
        .into_iter()
        .map(|invitation| invitation.invited_by.clone())
        .collect()
}

/// Every invitation of `association`, in storage order
///
/// # Errors
/// - NotFound when an inviter is absent from `inviters`
pub fn invitation_views(
    association: &Association,
    inviters: &HashMap<String, UserProfile>,
    now: DateTime<Utc>,
    validity: Duration,
) -> AssociationResult<Vec<InvitationView>> {
    association
        .invitations
        .iter()
        .map(|invitation| to_invitation_view(&association.id, invitation, inviters, now, validity))
        .collect()
}

/// One page of the invitations of `association`, in storage order
pub fn invitations_page(
    association: &Association,
    inviters: &HashMap<String, UserProfile>,
    request: PageRequest,
    now: DateTime<Utc>,
    validity: Duration,
) -> AssociationResult<PagedList<InvitationView>> {
    let page = Page::from_ordered(association.invitations.iter().collect(), request);
    let items = page
        .content
        .iter()
        .map(|invitation| to_invitation_view(&association.id, invitation, inviters, now, validity))
        .collect::<AssociationResult<Vec<_>>>()?;

    Ok(paged_list(
        Page {
            content: items,
            total_results: page.total_results,
            request,
        },
        &ListScope::AssociationInvitations(association.id.clone()),
    ))
}

/// [`invitations_page`] resolving the page's inviters in one batched call
pub async fn resolve_invitations_page(
    association: &Association,
    users: &dyn UserDirectory,
    request: PageRequest,
    now: DateTime<Utc>,
    validity: Duration,
) -> AssociationResult<PagedList<InvitationView>> {
    let on_page = association
        .invitations
        .iter()
        .skip(request.offset())
        .take(request.items_per_page as usize);
    let inviters = resolve_users(&inviter_ids(on_page), users).await?;

    invitations_page(association, &inviters, request, now, validity)
}

/// Most recent invitation of each association that has one
///
/// Output is ordered by `approval_expiry_at` descending, missing expiries
/// last. Each association's selection is a future joined with `join_all`,
/// which yields results in input order.
pub async fn most_recent_invitations(associations: &[Association]) -> Vec<(&Association, &Invitation)> {
    let mut ordered: Vec<&Association> = associations.iter().collect();
    ordered.sort_by_key(|association| Reverse(association.approval_expiry_at));

    join_all(ordered.into_iter().map(|association| async move {
        association
            .most_recent_invitation()
            .map(|invitation| (association, invitation))
    }))
    .await
    .into_iter()
    .flatten()
    .collect()
}

/// One page of the most-recent-invitation view
///
/// # Errors
/// - NotFound when an inviter on the page is unknown to the directory
/// - UpstreamUnavailable when the batched inviter lookup fails
pub async fn most_recent_invitations_page(
    associations: &[Association],
    users: &dyn UserDirectory,
    request: PageRequest,
    now: DateTime<Utc>,
    validity: Duration,
) -> AssociationResult<PagedList<InvitationView>> {
    let selected = most_recent_invitations(associations).await;
    let page = Page::from_ordered(selected, request);

    let inviters = resolve_users(
        &inviter_ids(page.content.iter().map(|(_, invitation)| *invitation)),
        users,
    )
    .await?;

    let items = page
        .content
        .iter()
        .map(|(association, invitation)| {
            to_invitation_view(&association.id, invitation, &inviters, now, validity)
        })
        .collect::<AssociationResult<Vec<_>>>()?;

    Ok(paged_list(
        Page {
            content: items,
            total_results: page.total_results,
            request,
        },
        &ListScope::UserInvitations,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryUserDirectory;
    use pretty_assertions::assert_eq;

    fn t() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-19T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn inviters() -> HashMap<String, UserProfile> {
        ["x", "y", "z"]
            .iter()
            .map(|id| (id.to_string(), UserProfile::new(*id, format!("{}@example.com", id))))
            .collect()
    }

    fn with_invitations(invitations: &[(&str, i64)]) -> Association {
        let mut association = Association::migrated("00006400", "d@example.com", t() - Duration::days(30));
        for (by, days_ago) in invitations {
            association.invitations.push(Invitation {
                invited_by: by.to_string(),
                invited_at: t() - Duration::days(*days_ago),
            });
        }
        association.approval_expiry_at = association
            .most_recent_invitation()
            .map(|invitation| invitation.invited_at + Duration::days(7));
        association
    }

    #[test]
    fn test_storage_order_and_activity() {
        let association = with_invitations(&[("x", 9), ("z", 4), ("y", 6)]);
        let views = invitation_views(&association, &inviters(), t(), Duration::days(7)).unwrap();

        let by: Vec<&str> = views.iter().map(|view| view.invited_by.as_str()).collect();
        assert_eq!(by, vec!["x@example.com", "z@example.com", "y@example.com"]);
        assert_eq!(
            views.iter().map(|view| view.is_active).collect::<Vec<_>>(),
            vec![false, true, true]
        );
    }

    #[test]
    fn test_unknown_inviter_is_not_found() {
        let association = with_invitations(&[("w", 1)]);
        let err = invitation_views(&association, &inviters(), t(), Duration::days(7)).unwrap_err();
        assert!(matches!(err, AssociationError::NotFound { entity: "user", .. }));
    }

    #[test]
    fn test_invitations_page_slices_by_offset() {
        let association = with_invitations(&[("x", 9), ("y", 6), ("z", 4)]);
        let list = invitations_page(
            &association,
            &inviters(),
            PageRequest::new(1, 2).unwrap(),
            t(),
            Duration::days(7),
        )
        .unwrap();

        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].invited_by, "z@example.com");
        assert_eq!(list.total_results, 3);
        assert_eq!(list.links.next, "");
        assert!(list.links.self_link.starts_with(&format!("/associations/{}/invitations", association.id)));
    }

    #[tokio::test]
    async fn test_most_recent_sorted_by_expiry_desc_missing_last() {
        let early = with_invitations(&[("x", 6)]);
        let late = with_invitations(&[("y", 2)]);
        let mut no_expiry = with_invitations(&[("z", 1)]);
        no_expiry.approval_expiry_at = None;
        let empty = with_invitations(&[]);

        let associations = vec![no_expiry.clone(), early.clone(), empty, late.clone()];
        let selected = most_recent_invitations(&associations).await;

        let ids: Vec<&str> = selected.iter().map(|(a, _)| a.id.as_str()).collect();
        assert_eq!(ids, vec![late.id.as_str(), early.id.as_str(), no_expiry.id.as_str()]);
    }

    #[tokio::test]
    async fn test_most_recent_page_resolves_inviters_once() {
        let associations = vec![
            with_invitations(&[("x", 9), ("z", 4), ("y", 6)]),
            with_invitations(&[("y", 1)]),
        ];
        let users = InMemoryUserDirectory::new(inviters().into_values());

        let list = most_recent_invitations_page(
            &associations,
            &users,
            PageRequest::new(0, 15).unwrap(),
            t(),
            Duration::days(7),
        )
        .await
        .unwrap();

        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items[0].invited_by, "y@example.com");
        assert_eq!(list.items[1].invited_by, "z@example.com");
        assert!(list.items[1].is_active);
        assert_eq!(users.calls.batched(), 1);
        assert!(list.links.self_link.starts_with("/associations/invitations?"));
    }
}

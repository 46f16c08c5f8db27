// Copyright (c) 2025 - Cowboy AI, Inc.
//! Previous-state projection, most recent change first

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use crate::directory::UserDirectory;
use crate::domain::{Association, AssociationStatus, PreviousState, UserProfile};
use crate::errors::{AssociationError, AssociationResult};
use crate::page::{Page, PageRequest};
use crate::projection::enrichment::resolve_users;
use crate::projection::pagination::{paged_list, ListScope};
use crate::projection::PagedList;

/// Outward audit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviousStateView {
    pub status: AssociationStatus,
    /// Email of whoever made the change
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
}

fn sorted(association: &Association) -> Vec<&PreviousState> {
    let mut states: Vec<&PreviousState> = association.previous_states.iter().collect();
    states.sort_by_key(|state| Reverse(state.changed_at));
    states
}

fn to_view(
    state: &PreviousState,
    changers: &HashMap<String, UserProfile>,
) -> AssociationResult<PreviousStateView> {
    let changer = changers
        .get(&state.changed_by)
        .ok_or_else(|| AssociationError::user_not_found(state.changed_by.as_str()))?;

    Ok(PreviousStateView {
        status: state.status.parse()?,
        changed_by: changer.email.clone(),
        changed_at: state.changed_at,
    })
}

/// Every audit entry of `association`, most recent first
///
/// # Errors
/// - DataIntegrity for an unrecognized stored status
/// - NotFound when a changer is absent from `changers`
pub fn previous_state_views(
    association: &Association,
    changers: &HashMap<String, UserProfile>,
) -> AssociationResult<Vec<PreviousStateView>> {
    sorted(association)
        .into_iter()
        .map(|state| to_view(state, changers))
        .collect()
}

/// One page of the audit trail of `association`
pub fn previous_states_page(
    association: &Association,
    changers: &HashMap<String, UserProfile>,
    request: PageRequest,
) -> AssociationResult<PagedList<PreviousStateView>> {
    let page = Page::from_ordered(sorted(association), request);
    let items = page
        .content
        .iter()
        .map(|state| to_view(state, changers))
        .collect::<AssociationResult<Vec<_>>>()?;

    Ok(paged_list(
        Page {
            content: items,
            total_results: page.total_results,
            request,
        },
        &ListScope::PreviousStates(association.id.clone()),
    ))
}

/// [`previous_states_page`] resolving the page's changers in one batched call
pub async fn resolve_previous_states_page(
    association: &Association,
    users: &dyn UserDirectory,
    request: PageRequest,
) -> AssociationResult<PagedList<PreviousStateView>> {
    let changer_ids: HashSet<String> = sorted(association)
        .into_iter()
        .skip(request.offset())
        .take(request.items_per_page as usize)
        .map(|state| state.changed_by.clone())
        .collect();
    let changers = resolve_users(&changer_ids, users).await?;

    previous_states_page(association, &changers, request)
}

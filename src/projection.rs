// Copyright (c) 2025 - Cowboy AI, Inc.

//! Read Projections - Raw Records → Outward Shapes
//!
//! Every read path runs the same pipeline over one page of stored records:
//!
//! ```text
//! Page<Association> ──split──> BatchKeys ──get_many──> ResolvedProfiles
//!        │                                                   │
//!        └──────────────── enrich(record, &profiles) ◄───────┘
//!                                   │
//!                                   ▼
//!                         PagedList<AssociationView>
//! ```
//!
//! Mapping functions are pure and compose: base conversion, then company
//! enrichment, then user enrichment. Only the `async` helpers touch the
//! directories, and they do so once per page.
//!
//! # Modules
//!
//! - [`enrichment`] - base conversion and user/company enrichment
//! - [`pagination`] - list scopes, links and page envelopes
//! - [`invitations`] - invitation views and the most-recent-per-association view
//! - [`previous_states`] - audit trail views

pub mod enrichment;
pub mod invitations;
pub mod pagination;
pub mod previous_states;

pub use enrichment::{
    apply_company, apply_user, enrich, enrich_with_company, enrich_with_user, resolve_profiles,
    resolve_users, to_view, AssociationView, ResolvedProfiles,
};
pub use invitations::{
    invitation_views, invitations_page, inviter_ids, most_recent_invitations,
    most_recent_invitations_page, resolve_invitations_page, InvitationView,
};
pub use pagination::{
    map_association_page, page_links, paged_list, resolve_association_page, ListScope,
};
pub use previous_states::{
    previous_state_views, previous_states_page, resolve_previous_states_page, PreviousStateView,
};

use serde::{Deserialize, Serialize};

/// Discriminator carried by every association view
pub const ASSOCIATION_KIND: &str = "association";

/// Display name rendered when a user has none
pub const NOT_PROVIDED: &str = "Not provided";

/// Link block of a single item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLinks {
    #[serde(rename = "self")]
    pub self_link: String,
}

/// Link block of a page; `next` is empty on the last page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub self_link: String,
    pub next: String,
}

impl PageLinks {
    pub fn has_next(&self) -> bool {
        !self.next.is_empty()
    }
}

/// Outward paginated envelope shared by associations, invitations and
/// previous states
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedList<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub items_per_page: u32,
    pub total_results: u64,
    pub total_pages: u64,
    pub links: PageLinks,
}

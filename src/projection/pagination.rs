// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pagination and List Mappers
//!
//! ```text
//! self = {base}?page_index={i}&items_per_page={n}
//! next = {base}?page_index={i+1}&items_per_page={n}   or "" on the last page
//! total_pages = ceil(total_results / items_per_page)
//! ```

use crate::directory::{CompanyDirectory, UserDirectory};
use crate::domain::Association;
use crate::errors::AssociationResult;
use crate::page::{Page, PageRequest};
use crate::projection::enrichment::{enrich, resolve_profiles, AssociationView, ResolvedProfiles};
use crate::projection::{PageLinks, PagedList};

/// Query shape a list belongs to, which fixes its base path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    /// Every association
    All,
    /// Associations of one company
    Company(String),
    /// Associations of the calling user
    User,
    /// Invitations of one association
    AssociationInvitations(String),
    /// Most recent invitations across the calling user's associations
    UserInvitations,
    /// Audit trail of one association
    PreviousStates(String),
}

impl ListScope {
    pub fn base_path(&self) -> String {
        match self {
            ListScope::All | ListScope::User => "/associations".to_string(),
            ListScope::Company(number) => format!("/associations/companies/{}", number),
            ListScope::AssociationInvitations(id) => format!("/associations/{}/invitations", id),
            ListScope::UserInvitations => "/associations/invitations".to_string(),
            ListScope::PreviousStates(id) => format!("/associations/{}/previous-states", id),
        }
    }
}

fn link(base: &str, page_index: u64, items_per_page: u32) -> String {
    format!(
        "{}?page_index={}&items_per_page={}",
        base, page_index, items_per_page
    )
}

/// Self and next links; `next` is empty when no page follows
pub fn page_links(base: &str, request: PageRequest, total_results: u64) -> PageLinks {
    let index = u64::from(request.page_index);
    let total_pages = crate::page::total_pages(total_results, request.items_per_page);

    let next = if index + 1 < total_pages {
        link(base, index + 1, request.items_per_page)
    } else {
        String::new()
    };

    PageLinks {
        self_link: link(base, index, request.items_per_page),
        next,
    }
}

/// Wrap an already mapped page in the outward envelope
pub fn paged_list<T>(page: Page<T>, scope: &ListScope) -> PagedList<T> {
    let links = page_links(&scope.base_path(), page.request, page.total_results);
    let total_pages = page.total_pages();

    PagedList {
        items: page.content,
        page_number: page.request.page_index,
        items_per_page: page.request.items_per_page,
        total_results: page.total_results,
        total_pages,
        links,
    }
}

/// Map a page of stored associations with profiles resolved for that page
///
/// # Errors
/// - DataIntegrity from the combined enrichment of any item
pub fn map_association_page(
    page: Page<Association>,
    scope: &ListScope,
    profiles: &ResolvedProfiles,
) -> AssociationResult<PagedList<AssociationView>> {
    let items = page
        .content
        .iter()
        .map(|association| enrich(association, profiles))
        .collect::<AssociationResult<Vec<_>>>()?;

    Ok(paged_list(
        Page {
            content: items,
            total_results: page.total_results,
            request: page.request,
        },
        scope,
    ))
}

/// Resolve the page's profiles in batched calls, then map it
pub async fn resolve_association_page(
    page: Page<Association>,
    scope: &ListScope,
    users: &dyn UserDirectory,
    companies: &dyn CompanyDirectory,
) -> AssociationResult<PagedList<AssociationView>> {
    let profiles = resolve_profiles(&page.content, users, companies).await?;
    map_association_page(page, scope, &profiles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{InMemoryCompanyDirectory, InMemoryUserDirectory};
    use crate::domain::{CompanyProfile, UserProfile};
    use chrono::Utc;
    use test_case::test_case;

    #[test_case(ListScope::All => "/associations")]
    #[test_case(ListScope::User => "/associations")]
    #[test_case(ListScope::Company("00006400".into()) => "/associations/companies/00006400")]
    #[test_case(ListScope::AssociationInvitations("a1".into()) => "/associations/a1/invitations")]
    #[test_case(ListScope::UserInvitations => "/associations/invitations")]
    #[test_case(ListScope::PreviousStates("a1".into()) => "/associations/a1/previous-states")]
    fn test_base_paths(scope: ListScope) -> String {
        scope.base_path()
    }

    #[test]
    fn test_links_for_three_results_two_per_page() {
        use pretty_assertions::assert_eq;

        let first = page_links("/associations", PageRequest::new(0, 2).unwrap(), 3);
        assert!(first.self_link.ends_with("page_index=0&items_per_page=2"));
        assert!(first.next.ends_with("page_index=1&items_per_page=2"));

        let second = page_links("/associations", PageRequest::new(1, 2).unwrap(), 3);
        assert_eq!(second.next, "");
    }

    #[test]
    fn test_empty_result_has_no_next() {
        use pretty_assertions::assert_eq;

        let links = page_links("/associations", PageRequest::first(), 0);
        assert_eq!(links.next, "");
        assert_eq!(links.self_link, "/associations?page_index=0&items_per_page=15");
    }

    #[tokio::test]
    async fn test_company_page_envelope() {
        use pretty_assertions::assert_eq;

        let now = Utc::now();
        let stored: Vec<Association> = ["u-1", "u-2", "u-3"]
            .iter()
            .map(|id| Association::auth_code_confirmed("00006400", *id, now))
            .collect();
        let page = Page::from_ordered(stored, PageRequest::new(0, 2).unwrap());

        let users = InMemoryUserDirectory::new([UserProfile::new("u-1", "one@example.com")]);
        let companies = InMemoryCompanyDirectory::new([CompanyProfile::new("00006400", "Example Ltd", "active")]);
        let scope = ListScope::Company("00006400".to_string());

        let list = resolve_association_page(page, &scope, &users, &companies)
            .await
            .unwrap();

        assert_eq!(list.items.len(), 2);
        assert_eq!(list.total_results, 3);
        assert_eq!(list.total_pages, 2);
        assert_eq!(list.page_number, 0);
        assert_eq!(
            list.links.next,
            "/associations/companies/00006400?page_index=1&items_per_page=2"
        );
        assert_eq!(list.items[0].user_email.as_deref(), Some("one@example.com"));
        assert_eq!(list.items[1].user_email, None);
        assert_eq!(users.calls.batched(), 1);
    }
}

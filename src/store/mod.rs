// Copyright (c) 2025 - Cowboy AI, Inc.
//! Association Store Gateway
//!
//! Interface to the document store holding association records. The store
//! engine itself is external; the core only depends on this trait.
//!
//! # Store Requirements
//!
//! 1. **Partial updates**: an [`AssociationUpdate`] is applied as one unit
//! 2. **Optimistic concurrency**: updates carry the expected etag and fail
//!    with `Conflict` on mismatch
//! 3. **Paging**: queries report the total size of the full result

pub mod memory;

pub use memory::InMemoryAssociationStore;

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::domain::{Association, AssociationStatus};
use crate::errors::AssociationResult;
use crate::page::{Page, PageRequest};
use crate::update::AssociationUpdate;

/// Which associations a query addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssociationScope {
    /// Every association
    All,
    /// Associations of one company
    Company(String),
    /// Associations of one subject, matched by user id or by email
    User { user_id: String, user_email: String },
}

/// Query filter for paged reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationFilter {
    pub scope: AssociationScope,
    /// Accepted statuses; empty accepts any
    pub statuses: BTreeSet<AssociationStatus>,
    /// Further restricts a user scoped query to one company
    pub company_number: Option<String>,
}

impl AssociationFilter {
    pub fn all() -> Self {
        Self {
            scope: AssociationScope::All,
            statuses: BTreeSet::new(),
            company_number: None,
        }
    }

    pub fn for_company(company_number: impl Into<String>) -> Self {
        Self {
            scope: AssociationScope::Company(company_number.into()),
            ..Self::all()
        }
    }

    pub fn for_user(user_id: impl Into<String>, user_email: impl Into<String>) -> Self {
        Self {
            scope: AssociationScope::User {
                user_id: user_id.into(),
                user_email: user_email.into(),
            },
            ..Self::all()
        }
    }

    pub fn with_statuses(mut self, statuses: impl IntoIterator<Item = AssociationStatus>) -> Self {
        self.statuses = statuses.into_iter().collect();
        self
    }

    pub fn with_company(mut self, company_number: impl Into<String>) -> Self {
        self.company_number = Some(company_number.into());
        self
    }

    /// Whether `association` satisfies this filter
    ///
    /// Records with an unrecognized status never match a status-restricted filter.
    pub fn matches(&self, association: &Association) -> bool {
        let in_scope = match &self.scope {
            AssociationScope::All => true,
            AssociationScope::Company(number) => association.company_number == *number,
            AssociationScope::User {
                user_id,
                user_email,
            } => {
                association.user_id.as_deref() == Some(user_id.as_str())
                    || association
                        .user_email
                        .as_deref()
                        .is_some_and(|email| email.eq_ignore_ascii_case(user_email))
            }
        };

        let in_company = self
            .company_number
            .as_ref()
            .map_or(true, |number| association.company_number == *number);

        let in_status = self.statuses.is_empty()
            || association
                .status()
                .is_ok_and(|status| self.statuses.contains(&status));

        in_scope && in_company && in_status
    }
}

/// Store gateway for association records
#[async_trait]
pub trait AssociationStore: Send + Sync {
    /// Fetch one association
    ///
    /// # Errors
    /// - NotFound when no association has `id`
    async fn get(&self, id: &str) -> AssociationResult<Association>;

    /// Fetch one page of associations matching `filter`
    async fn find_page(
        &self,
        filter: &AssociationFilter,
        page: PageRequest,
    ) -> AssociationResult<Page<Association>>;

    /// Every association matching `filter`, in store order
    ///
    /// Unpaged; callers scope `filter` to one subject so the result stays small.
    async fn find_all(&self, filter: &AssociationFilter) -> AssociationResult<Vec<Association>>;

    /// Find the association of a subject within a company, by user id or email
    async fn find_by_company_and_subject(
        &self,
        company_number: &str,
        user_id: Option<&str>,
        user_email: Option<&str>,
    ) -> AssociationResult<Option<Association>>;

    /// Persist a newly created association
    async fn insert(&self, association: Association) -> AssociationResult<Association>;

    /// Apply `update` if the stored etag still equals `expected_etag`
    ///
    /// # Errors
    /// - NotFound when no association has `id`
    /// - Conflict when another writer changed the record first
    async fn apply_update(
        &self,
        id: &str,
        update: &AssociationUpdate,
        expected_etag: &str,
    ) -> AssociationResult<Association>;
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory Association Store
//!
//! Keeps documents in insertion order behind a tokio `RwLock`. Updates are
//! etag checked and validated against the transition invariants before they
//! replace the stored document.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::invariants::{validate_association, validate_transition};
use crate::domain::Association;
use crate::errors::{AssociationError, AssociationResult};
use crate::page::{Page, PageRequest};
use crate::store::{AssociationFilter, AssociationStore};
use crate::update::AssociationUpdate;

/// Association store held in process memory
#[derive(Debug, Default)]
pub struct InMemoryAssociationStore {
    documents: RwLock<Vec<Association>>,
}

impl InMemoryAssociationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with `associations`, bypassing validation
    pub fn with_associations(associations: impl IntoIterator<Item = Association>) -> Self {
        Self {
            documents: RwLock::new(associations.into_iter().collect()),
        }
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    /// Replace the etag of a stored document, simulating a concurrent writer
    pub async fn touch(&self, id: &str, etag: impl Into<String>) -> AssociationResult<()> {
        let mut documents = self.documents.write().await;
        let document = documents
            .iter_mut()
            .find(|document| document.id == id)
            .ok_or_else(|| AssociationError::association_not_found(id))?;
        document.etag = etag.into();
        Ok(())
    }
}

#[async_trait]
impl AssociationStore for InMemoryAssociationStore {
    async fn get(&self, id: &str) -> AssociationResult<Association> {
        self.documents
            .read()
            .await
            .iter()
            .find(|document| document.id == id)
            .cloned()
            .ok_or_else(|| AssociationError::association_not_found(id))
    }

    async fn find_page(
        &self,
        filter: &AssociationFilter,
        page: PageRequest,
    ) -> AssociationResult<Page<Association>> {
        let matching: Vec<Association> = self
            .documents
            .read()
            .await
            .iter()
            .filter(|document| filter.matches(document))
            .cloned()
            .collect();

        debug!(
            total_results = matching.len(),
            page_index = page.page_index,
            items_per_page = page.items_per_page,
            "Paged association query"
        );

        Ok(Page::from_ordered(matching, page))
    }

    async fn find_all(&self, filter: &AssociationFilter) -> AssociationResult<Vec<Association>> {
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .filter(|document| filter.matches(document))
            .cloned()
            .collect())
    }

    async fn find_by_company_and_subject(
        &self,
        company_number: &str,
        user_id: Option<&str>,
        user_email: Option<&str>,
    ) -> AssociationResult<Option<Association>> {
        let documents = self.documents.read().await;
        let found = documents.iter().find(|document| {
            document.company_number == company_number
                && (user_id.is_some_and(|id| document.user_id.as_deref() == Some(id))
                    || user_email.is_some_and(|email| {
                        document
                            .user_email
                            .as_deref()
                            .is_some_and(|stored| stored.eq_ignore_ascii_case(email))
                    }))
        });
        Ok(found.cloned())
    }

    async fn insert(&self, association: Association) -> AssociationResult<Association> {
        validate_association(&association)?;

        let mut documents = self.documents.write().await;
        if documents.iter().any(|document| document.id == association.id) {
            return Err(AssociationError::InvalidInput(format!(
                "association {} already exists",
                association.id
            )));
        }
        documents.push(association.clone());

        debug!(association_id = %association.id, "Inserted association");
        Ok(association)
    }

    async fn apply_update(
        &self,
        id: &str,
        update: &AssociationUpdate,
        expected_etag: &str,
    ) -> AssociationResult<Association> {
        let mut documents = self.documents.write().await;
        let document = documents
            .iter_mut()
            .find(|document| document.id == id)
            .ok_or_else(|| AssociationError::association_not_found(id))?;

        if document.etag != expected_etag {
            return Err(AssociationError::Conflict {
                id: id.to_string(),
                expected: expected_etag.to_string(),
            });
        }

        let next = update.apply_to(document);
        validate_transition(document, &next)?;
        *document = next.clone();

        debug!(
            association_id = %id,
            status = %next.status,
            "Applied association update"
        );
        Ok(next)
    }
}

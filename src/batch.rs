// Copyright (c) 2025 - Cowboy AI, Inc.
//! Batch Key Splitter
//!
//! Collects the directory keys a page of associations needs, so each
//! directory is asked once per page instead of once per record.
//!
//! ```text
//! split(a ++ b) == split(a).merge(split(b))
//! ```
//!
//! Merging is set union, so partitions can be split on separate tasks and
//! combined in any order.

use std::collections::HashSet;
use tokio::task::JoinSet;
use tracing::debug;

use crate::domain::association::non_blank;
use crate::domain::Association;
use crate::errors::{AssociationError, AssociationResult};

/// User keys to resolve for a set of associations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchKeys {
    /// Non-blank user ids
    pub user_ids: HashSet<String>,
    /// Non-blank emails of records without a user id
    pub user_emails: HashSet<String>,
}

impl BatchKeys {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single pass split
    pub fn from_associations<'a>(associations: impl IntoIterator<Item = &'a Association>) -> Self {
        associations.into_iter().collect()
    }

    /// Add the key of one record; records with neither field add nothing
    pub fn add(&mut self, association: &Association) {
        if let Some(user_id) = non_blank(&association.user_id) {
            self.user_ids.insert(user_id.to_string());
        } else if let Some(email) = non_blank(&association.user_email) {
            self.user_emails.insert(email.to_string());
        }
    }

    /// Set union with `other`
    pub fn merge(mut self, other: BatchKeys) -> Self {
        self.user_ids.extend(other.user_ids);
        self.user_emails.extend(other.user_emails);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.user_ids.is_empty() && self.user_emails.is_empty()
    }

    pub fn len(&self) -> usize {
        self.user_ids.len() + self.user_emails.len()
    }
}

impl<'a> Extend<&'a Association> for BatchKeys {
    fn extend<I: IntoIterator<Item = &'a Association>>(&mut self, iter: I) {
        for association in iter {
            self.add(association);
        }
    }
}

impl<'a> FromIterator<&'a Association> for BatchKeys {
    fn from_iter<I: IntoIterator<Item = &'a Association>>(iter: I) -> Self {
        let mut keys = BatchKeys::new();
        keys.extend(iter);
        keys
    }
}

/// Distinct company numbers of `associations`
pub fn company_numbers<'a>(associations: impl IntoIterator<Item = &'a Association>) -> HashSet<String> {
    associations
        .into_iter()
        .map(|association| association.company_number.clone())
        .collect()
}

/// Split `associations` in partitions of `partition_size`, one task each
///
/// # Errors
/// - InvalidInput when `partition_size` is zero
/// - DataIntegrity when a split task fails to complete
pub async fn split_concurrently(
    associations: Vec<Association>,
    partition_size: usize,
) -> AssociationResult<BatchKeys> {
    if partition_size == 0 {
        return Err(AssociationError::InvalidInput(
            "partition_size must be positive".to_string(),
        ));
    }

    let mut tasks = JoinSet::new();
    let mut remaining = associations;
    while !remaining.is_empty() {
        let rest = remaining.split_off(partition_size.min(remaining.len()));
        let partition = std::mem::replace(&mut remaining, rest);
        tasks.spawn(async move { BatchKeys::from_associations(&partition) });
    }

    let partitions = tasks.len();
    let mut keys = BatchKeys::new();
    while let Some(joined) = tasks.join_next().await {
        let partial = joined
            .map_err(|e| AssociationError::DataIntegrity(format!("key split task failed: {}", e)))?;
        keys = keys.merge(partial);
    }

    debug!(
        partitions,
        user_ids = keys.user_ids.len(),
        user_emails = keys.user_emails.len(),
        "Split association keys"
    );
    Ok(keys)
}

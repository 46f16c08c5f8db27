// Copyright (c) 2025 - Cowboy AI, Inc.
//! User and Company Directory Clients
//!
//! Both directories are owned by other services. Batched lookups return a
//! key → profile map in one round trip; keys without a profile are simply
//! absent from the map. A failed batch call fails as a whole.

pub mod memory;

#[cfg(feature = "http-directory")]
pub mod http;

pub use memory::{CallCounts, InMemoryCompanyDirectory, InMemoryUserDirectory};

#[cfg(feature = "http-directory")]
pub use http::{HttpCompanyDirectory, HttpDirectoryConfig, HttpUserDirectory};

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};

use crate::domain::{CompanyProfile, UserProfile};
use crate::errors::AssociationResult;

/// Resolves user ids and emails to profiles
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// # Errors
    /// - NotFound when no user has `user_id`
    async fn get(&self, user_id: &str) -> AssociationResult<UserProfile>;

    /// Profiles keyed by user id
    async fn get_many(&self, user_ids: &HashSet<String>) -> AssociationResult<HashMap<String, UserProfile>>;

    /// Registered user owning `email`, if any
    async fn search_by_email(&self, email: &str) -> AssociationResult<Option<UserProfile>>;

    /// Profiles keyed by the email that was searched for
    async fn search_many_by_email(
        &self,
        emails: &HashSet<String>,
    ) -> AssociationResult<HashMap<String, UserProfile>>;
}

/// Resolves company numbers to profiles
#[async_trait]
pub trait CompanyDirectory: Send + Sync {
    /// # Errors
    /// - NotFound when no company has `company_number`
    async fn get(&self, company_number: &str) -> AssociationResult<CompanyProfile>;

    /// Profiles keyed by company number
    async fn get_many(
        &self,
        company_numbers: &HashSet<String>,
    ) -> AssociationResult<HashMap<String, CompanyProfile>>;
}

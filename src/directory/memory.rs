// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory user and company directories
//!
//! Each directory counts its single and batched calls so read paths can be
//! checked for per-record lookups, and can be switched into an unavailable
//! state to exercise upstream failure handling.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::directory::{CompanyDirectory, UserDirectory};
use crate::domain::{CompanyProfile, UserProfile};
use crate::errors::{AssociationError, AssociationResult};

/// Call counters of a directory
#[derive(Debug, Default)]
pub struct CallCounts {
    single: AtomicUsize,
    batched: AtomicUsize,
}

impl CallCounts {
    pub fn single(&self) -> usize {
        self.single.load(Ordering::SeqCst)
    }

    pub fn batched(&self) -> usize {
        self.batched.load(Ordering::SeqCst)
    }

    fn record_single(&self) {
        self.single.fetch_add(1, Ordering::SeqCst);
    }

    fn record_batched(&self) {
        self.batched.fetch_add(1, Ordering::SeqCst);
    }
}

/// User directory backed by a map keyed by user id
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: HashMap<String, UserProfile>,
    unavailable: AtomicBool,
    pub calls: CallCounts,
}

impl InMemoryUserDirectory {
    pub fn new(users: impl IntoIterator<Item = UserProfile>) -> Self {
        Self {
            users: users
                .into_iter()
                .map(|user| (user.user_id.clone(), user))
                .collect(),
            ..Self::default()
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> AssociationResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AssociationError::UpstreamUnavailable(
                "user directory unavailable".to_string(),
            ));
        }
        Ok(())
    }

    fn find_email(&self, email: &str) -> Option<&UserProfile> {
        self.users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn get(&self, user_id: &str) -> AssociationResult<UserProfile> {
        self.calls.record_single();
        self.check_available()?;
        self.users
            .get(user_id)
            .cloned()
            .ok_or_else(|| AssociationError::user_not_found(user_id))
    }

    async fn get_many(&self, user_ids: &HashSet<String>) -> AssociationResult<HashMap<String, UserProfile>> {
        self.calls.record_batched();
        self.check_available()?;
        Ok(user_ids
            .iter()
            .filter_map(|id| self.users.get(id).map(|user| (id.clone(), user.clone())))
            .collect())
    }

    async fn search_by_email(&self, email: &str) -> AssociationResult<Option<UserProfile>> {
        self.calls.record_single();
        self.check_available()?;
        Ok(self.find_email(email).cloned())
    }

    async fn search_many_by_email(
        &self,
        emails: &HashSet<String>,
    ) -> AssociationResult<HashMap<String, UserProfile>> {
        self.calls.record_batched();
        self.check_available()?;
        Ok(emails
            .iter()
            .filter_map(|email| self.find_email(email).map(|user| (email.clone(), user.clone())))
            .collect())
    }
}

/// Company directory backed by a map keyed by company number
#[derive(Debug, Default)]
pub struct InMemoryCompanyDirectory {
    companies: HashMap<String, CompanyProfile>,
    unavailable: AtomicBool,
    pub calls: CallCounts,
}

impl InMemoryCompanyDirectory {
    pub fn new(companies: impl IntoIterator<Item = CompanyProfile>) -> Self {
        Self {
            companies: companies
                .into_iter()
                .map(|company| (company.company_number.clone(), company))
                .collect(),
            ..Self::default()
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> AssociationResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AssociationError::UpstreamUnavailable(
                "company directory unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl CompanyDirectory for InMemoryCompanyDirectory {
    async fn get(&self, company_number: &str) -> AssociationResult<CompanyProfile> {
        self.calls.record_single();
        self.check_available()?;
        self.companies
            .get(company_number)
            .cloned()
            .ok_or_else(|| AssociationError::company_not_found(company_number))
    }

    async fn get_many(
        &self,
        company_numbers: &HashSet<String>,
    ) -> AssociationResult<HashMap<String, CompanyProfile>> {
        self.calls.record_batched();
        self.check_available()?;
        Ok(company_numbers
            .iter()
            .filter_map(|number| {
                self.companies
                    .get(number)
                    .map(|company| (number.clone(), company.clone()))
            })
            .collect())
    }
}

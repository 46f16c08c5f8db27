// Copyright (c) 2025 - Cowboy AI, Inc.
//! Association core configuration

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::errors::{AssociationError, AssociationResult};
use crate::subjects::ASSOCIATIONS_ROOT;

/// Longest accepted invitation window
pub const MAX_INVITATION_VALIDITY_DAYS: i64 = 3650;

/// Tunables for the update builder, projections and dispatch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationsConfig {
    /// Days an invitation stays active after it is issued
    #[serde(default = "default_validity_days")]
    pub invitation_validity_days: i64,

    /// Attempts at applying an update before an etag conflict is surfaced
    #[serde(default = "default_max_update_retries")]
    pub max_update_retries: u32,

    /// Root token of notification subjects
    #[serde(default = "default_subject_root")]
    pub notification_subject_root: String,

    /// Page size used when collecting confirmed company users to notify
    #[serde(default = "default_company_fanout_limit")]
    pub company_fanout_limit: u32,
}

fn default_validity_days() -> i64 {
    7
}

fn default_max_update_retries() -> u32 {
    3
}

fn default_subject_root() -> String {
    ASSOCIATIONS_ROOT.to_string()
}

fn default_company_fanout_limit() -> u32 {
    500
}

impl Default for AssociationsConfig {
    fn default() -> Self {
        Self {
            invitation_validity_days: default_validity_days(),
            max_update_retries: default_max_update_retries(),
            notification_subject_root: default_subject_root(),
            company_fanout_limit: default_company_fanout_limit(),
        }
    }
}

impl AssociationsConfig {
    /// Load configuration from environment variables, falling back to defaults
    ///
    /// - `ASSOCIATIONS_INVITATION_VALIDITY_DAYS`
    /// - `ASSOCIATIONS_MAX_UPDATE_RETRIES`
    /// - `ASSOCIATIONS_NOTIFICATION_SUBJECT_ROOT`
    /// - `ASSOCIATIONS_COMPANY_FANOUT_LIMIT`
    pub fn from_env() -> AssociationResult<Self> {
        let defaults = Self::default();

        let config = Self {
            invitation_validity_days: parse_env(
                "ASSOCIATIONS_INVITATION_VALIDITY_DAYS",
                defaults.invitation_validity_days,
            )?,
            max_update_retries: parse_env(
                "ASSOCIATIONS_MAX_UPDATE_RETRIES",
                defaults.max_update_retries,
            )?,
            notification_subject_root: std::env::var("ASSOCIATIONS_NOTIFICATION_SUBJECT_ROOT")
                .unwrap_or(defaults.notification_subject_root),
            company_fanout_limit: parse_env(
                "ASSOCIATIONS_COMPANY_FANOUT_LIMIT",
                defaults.company_fanout_limit,
            )?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn with_invitation_validity_days(mut self, days: i64) -> Self {
        self.invitation_validity_days = days;
        self
    }

    pub fn with_max_update_retries(mut self, retries: u32) -> Self {
        self.max_update_retries = retries;
        self
    }

    pub fn with_notification_subject_root(mut self, root: impl Into<String>) -> Self {
        self.notification_subject_root = root.into();
        self
    }

    pub fn with_company_fanout_limit(mut self, limit: u32) -> Self {
        self.company_fanout_limit = limit;
        self
    }

    /// Validity window as a duration
    ///
    /// Windows beyond what a duration can hold saturate to [`Duration::MAX`];
    /// expiry computation then rejects them.
    pub fn invitation_validity(&self) -> Duration {
        Duration::try_days(self.invitation_validity_days).unwrap_or(Duration::MAX)
    }

    /// Reject values the core cannot operate with
    pub fn validate(&self) -> AssociationResult<()> {
        if self.invitation_validity_days <= 0 {
            return Err(AssociationError::InvalidInput(
                "invitation_validity_days must be positive".to_string(),
            ));
        }
        if self.invitation_validity_days > MAX_INVITATION_VALIDITY_DAYS {
            return Err(AssociationError::InvalidInput(format!(
                "invitation_validity_days must be at most {}",
                MAX_INVITATION_VALIDITY_DAYS
            )));
        }
        if self.max_update_retries == 0 {
            return Err(AssociationError::InvalidInput(
                "max_update_retries must be at least 1".to_string(),
            ));
        }
        if self.company_fanout_limit == 0 {
            return Err(AssociationError::InvalidInput(
                "company_fanout_limit must be at least 1".to_string(),
            ));
        }
        if self.notification_subject_root.trim().is_empty() {
            return Err(AssociationError::InvalidInput(
                "notification_subject_root must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> AssociationResult<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AssociationError::InvalidInput(format!("{} is not a valid value: {}", key, raw))),
        Err(_) => Ok(default),
    }
}

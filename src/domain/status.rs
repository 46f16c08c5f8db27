// Copyright (c) 2025 - Cowboy AI, Inc.
//! Association Status and Approval Route
//!
//! Stored documents keep both values as plain strings. These enums are the
//! fixed translation between the stored form and the typed form; parsing an
//! unrecognized stored value is a data integrity failure, never a default.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AssociationError;

/// Lifecycle status of an association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AssociationStatus {
    /// Invitation issued, waiting for the subject to accept
    #[serde(rename = "awaiting-approval")]
    AwaitingApproval,

    /// Subject is authorised to file for the company
    #[serde(rename = "confirmed")]
    Confirmed,

    /// Authorisation withdrawn, invitation rejected or cancelled
    #[serde(rename = "removed")]
    Removed,

    /// Produced by the bulk migration job; never a transition target
    #[serde(rename = "migrated")]
    Migrated,
}

impl AssociationStatus {
    /// All statuses in declaration order
    pub const ALL: [AssociationStatus; 4] = [
        AssociationStatus::AwaitingApproval,
        AssociationStatus::Confirmed,
        AssociationStatus::Removed,
        AssociationStatus::Migrated,
    ];

    /// Stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            AssociationStatus::AwaitingApproval => "awaiting-approval",
            AssociationStatus::Confirmed => "confirmed",
            AssociationStatus::Removed => "removed",
            AssociationStatus::Migrated => "migrated",
        }
    }
}

impl fmt::Display for AssociationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssociationStatus {
    type Err = AssociationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awaiting-approval" => Ok(AssociationStatus::AwaitingApproval),
            "confirmed" => Ok(AssociationStatus::Confirmed),
            "removed" => Ok(AssociationStatus::Removed),
            "migrated" => Ok(AssociationStatus::Migrated),
            other => Err(AssociationError::DataIntegrity(format!(
                "unrecognized association status '{}'",
                other
            ))),
        }
    }
}

/// How an association came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalRoute {
    /// Subject proved control of the company with its authentication code
    AuthCode,
    /// Subject was invited by an already authorised user
    Invitation,
    /// Record was created by the bulk migration job
    Migration,
}

impl ApprovalRoute {
    /// Stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalRoute::AuthCode => "auth_code",
            ApprovalRoute::Invitation => "invitation",
            ApprovalRoute::Migration => "migration",
        }
    }
}

impl fmt::Display for ApprovalRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApprovalRoute {
    type Err = AssociationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auth_code" => Ok(ApprovalRoute::AuthCode),
            "invitation" => Ok(ApprovalRoute::Invitation),
            "migration" => Ok(ApprovalRoute::Migration),
            other => Err(AssociationError::DataIntegrity(format!(
                "unrecognized approval route '{}'",
                other
            ))),
        }
    }
}

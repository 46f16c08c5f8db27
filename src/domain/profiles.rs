// Copyright (c) 2025 - Cowboy AI, Inc.
//! Externally owned profiles consumed by enrichment

use serde::{Deserialize, Serialize};

/// Registered user as known by the user directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl UserProfile {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Display name when set, otherwise the email address
    pub fn display_name_or_email(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// Company as known by the company directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub company_number: String,
    pub company_name: String,
    pub company_status: String,
}

impl CompanyProfile {
    pub fn new(
        company_number: impl Into<String>,
        company_name: impl Into<String>,
        company_status: impl Into<String>,
    ) -> Self {
        Self {
            company_number: company_number.into(),
            company_name: company_name.into(),
            company_status: company_status.into(),
        }
    }
}

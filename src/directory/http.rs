// Copyright (c) 2025 - Cowboy AI, Inc.

//! HTTP Directory Clients
//!
//! REST clients for the externally owned user and company directories.
//!
//! ```text
//! UserDirectory::get(id)                 = GET /users/{id}
//! UserDirectory::get_many(ids)           = GET /users?user_id=..&user_id=..
//! UserDirectory::search_many_by_email(e) = GET /users/search?user_email=..
//! CompanyDirectory::get(number)          = GET /companies/{number}
//! CompanyDirectory::get_many(numbers)    = GET /companies?company_number=..
//! ```
//!
//! Every request is bounded by the configured timeout. Transport failures
//! and non-success statuses other than 404 surface as `UpstreamUnavailable`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, warn};

use crate::directory::{CompanyDirectory, UserDirectory};
use crate::domain::{CompanyProfile, UserProfile};
use crate::errors::{AssociationError, AssociationResult};

/// Configuration for a directory service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpDirectoryConfig {
    /// Base URL (e.g., "http://accounts.internal:8080")
    pub base_url: String,

    /// Key sent in the Authorization header
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    10
}

impl HttpDirectoryConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout_secs: default_timeout(),
        }
    }
}

fn build_client(config: &HttpDirectoryConfig) -> AssociationResult<Client> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        "Authorization",
        config
            .api_key
            .parse()
            .map_err(|e| AssociationError::InvalidInput(format!("Invalid API key: {}", e)))?,
    );

    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .default_headers(headers)
        .build()
        .map_err(|e| AssociationError::UpstreamUnavailable(format!("Failed to create HTTP client: {}", e)))
}

fn query(name: &str, values: impl IntoIterator<Item = impl AsRef<str>>) -> String {
    values
        .into_iter()
        .map(|value| format!("{}={}", name, urlencoding::encode(value.as_ref())))
        .collect::<Vec<_>>()
        .join("&")
}

/// GET returning `None` on 404
async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> AssociationResult<Option<T>> {
    let response = client.get(url).send().await?;

    match response.status() {
        StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => Ok(None),
        status if status.is_success() => Ok(Some(response.json::<T>().await?)),
        status => {
            let body = response.text().await.unwrap_or_default();
            warn!(url = %url, status = %status, "Directory call failed");
            Err(AssociationError::UpstreamUnavailable(format!(
                "directory returned {}: {}",
                status, body
            )))
        }
    }
}

/// User directory over HTTP
pub struct HttpUserDirectory {
    config: HttpDirectoryConfig,
    client: Client,
}

impl HttpUserDirectory {
    pub fn new(config: HttpDirectoryConfig) -> AssociationResult<Self> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn get(&self, user_id: &str) -> AssociationResult<UserProfile> {
        let url = format!("{}/users/{}", self.config.base_url, urlencoding::encode(user_id));
        get_json(&self.client, &url)
            .await?
            .ok_or_else(|| AssociationError::user_not_found(user_id))
    }

    async fn get_many(&self, user_ids: &HashSet<String>) -> AssociationResult<HashMap<String, UserProfile>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let url = format!("{}/users?{}", self.config.base_url, query("user_id", user_ids));
        let users: Vec<UserProfile> = get_json(&self.client, &url).await?.unwrap_or_default();

        debug!(requested = user_ids.len(), resolved = users.len(), "Resolved users by id");
        Ok(users.into_iter().map(|user| (user.user_id.clone(), user)).collect())
    }

    async fn search_by_email(&self, email: &str) -> AssociationResult<Option<UserProfile>> {
        let emails: HashSet<String> = [email.to_string()].into_iter().collect();
        Ok(self.search_many_by_email(&emails).await?.remove(email))
    }

    async fn search_many_by_email(
        &self,
        emails: &HashSet<String>,
    ) -> AssociationResult<HashMap<String, UserProfile>> {
        if emails.is_empty() {
            return Ok(HashMap::new());
        }
        let url = format!("{}/users/search?{}", self.config.base_url, query("user_email", emails));
        let users: Vec<UserProfile> = get_json(&self.client, &url).await?.unwrap_or_default();

        Ok(emails
            .iter()
            .filter_map(|email| {
                users
                    .iter()
                    .find(|user| user.email.eq_ignore_ascii_case(email))
                    .map(|user| (email.clone(), user.clone()))
            })
            .collect())
    }
}

/// Company directory over HTTP
pub struct HttpCompanyDirectory {
    config: HttpDirectoryConfig,
    client: Client,
}

impl HttpCompanyDirectory {
    pub fn new(config: HttpDirectoryConfig) -> AssociationResult<Self> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl CompanyDirectory for HttpCompanyDirectory {
    async fn get(&self, company_number: &str) -> AssociationResult<CompanyProfile> {
        let url = format!(
            "{}/companies/{}",
            self.config.base_url,
            urlencoding::encode(company_number)
        );
        get_json(&self.client, &url)
            .await?
            .ok_or_else(|| AssociationError::company_not_found(company_number))
    }

    async fn get_many(
        &self,
        company_numbers: &HashSet<String>,
    ) -> AssociationResult<HashMap<String, CompanyProfile>> {
        if company_numbers.is_empty() {
            return Ok(HashMap::new());
        }
        let url = format!(
            "{}/companies?{}",
            self.config.base_url,
            query("company_number", company_numbers)
        );
        let companies: Vec<CompanyProfile> = get_json(&self.client, &url).await?.unwrap_or_default();

        Ok(companies
            .into_iter()
            .map(|company| (company.company_number.clone(), company))
            .collect())
    }
}

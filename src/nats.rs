// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS client abstraction for notification publishing

use async_nats::{Client, ConnectOptions};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::{AssociationError, AssociationResult};

/// Configuration for NATS connection
#[derive(Debug, Clone)]
pub struct NatsConfig {
    /// NATS server URLs
    pub servers: Vec<String>,
    /// Client name
    pub name: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            name: "company-associations".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl NatsConfig {
    /// Defaults with servers taken from `NATS_URL` (comma separated) when set
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("NATS_URL") {
            config.servers = url
                .split(',')
                .map(str::trim)
                .filter(|server| !server.is_empty())
                .map(String::from)
                .collect();
        }
        config
    }
}

/// NATS client wrapper publishing JSON messages
#[derive(Clone)]
pub struct NatsClient {
    client: Client,
}

impl NatsClient {
    /// Create a new NATS client with the given configuration
    pub async fn new(config: NatsConfig) -> AssociationResult<Self> {
        let connect_options = ConnectOptions::new()
            .name(&config.name)
            .connection_timeout(config.connect_timeout)
            .request_timeout(Some(config.request_timeout));

        let client = async_nats::connect_with_options(config.servers.join(","), connect_options)
            .await
            .map_err(|e| AssociationError::UpstreamUnavailable(format!("NATS connection failed: {}", e)))?;

        info!("Connected to NATS at {:?}", config.servers);

        Ok(Self { client })
    }

    /// Wrap an already connected client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    /// Publish a message to a subject
    pub async fn publish<T>(&self, subject: &str, message: &T) -> AssociationResult<()>
    where
        T: Serialize,
    {
        let payload = serde_json::to_vec(message)?;

        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| AssociationError::UpstreamUnavailable(format!("NATS publish failed: {}", e)))?;

        debug!("Published message to subject: {}", subject);
        Ok(())
    }

    /// Wait until published messages reach the server
    pub async fn flush(&self) -> AssociationResult<()> {
        self.client
            .flush()
            .await
            .map_err(|e| AssociationError::UpstreamUnavailable(format!("NATS flush failed: {}", e)))
    }

    /// Get the underlying NATS client for advanced operations
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer for Company Associations
//!
//! This module provides the application service that orchestrates the
//! lifecycle rules, the association store, the directories and notification
//! dispatch.
//!
//! # Architecture
//!
//! ```text
//! Client Request (RequestContext)
//!     ↓
//! AssociationService (this module)
//!     ↓
//! Lifecycle guard → Update Builder → AssociationUpdate
//!     ↓
//! AssociationStore (etag checked)
//!     ↓
//! Email Batch Classifier → Notification Senders → NotificationProducer
//! ```
//!
//! Read paths run the store page through the batch key splitter, one batched
//! lookup per directory, and the enrichment and pagination mappers.
//!
//! # Example
//!
//! ```rust,ignore
//! use company_associations::service::AssociationService;
//!
//! let service = AssociationService::new(store, users, companies, producer, config);
//! let ctx = RequestContext::generated("u-alice", "alice@example.com");
//!
//! let outcome = service.invite_user(&ctx, "00006400", "bob@example.com").await?;
//! let page = service
//!     .list_associations(&ctx, ListScope::Company("00006400".into()), &[], PageRequest::first())
//!     .await?;
//! ```

pub mod association;

pub use association::{AssociationService, MutationOutcome};

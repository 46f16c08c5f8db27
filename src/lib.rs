//! User-to-company authorisation associations
//!
//! This crate provides the association lifecycle state machine, the pure
//! update builders, and the batched enrichment and pagination pipeline that
//! joins association records with externally owned user and company data.
//! Notifications are classified per action and handed to a message-queue
//! producer, NATS by default.

pub mod batch;
pub mod config;
pub mod context;
pub mod directory;
pub mod domain;
pub mod errors;
pub mod nats;
pub mod notification;
pub mod page;
pub mod projection;
pub mod service;
pub mod state_machine;
pub mod store;
pub mod subjects;
pub mod update;

// Re-export commonly used types
pub use batch::BatchKeys;
pub use config::AssociationsConfig;
pub use context::RequestContext;
pub use directory::{CompanyDirectory, UserDirectory};
pub use domain::{Association, AssociationStatus, ApprovalRoute, CompanyProfile, UserProfile};
pub use errors::{AssociationError, AssociationResult};
pub use nats::{NatsClient, NatsConfig};
pub use notification::{EmailBatch, NotificationProducer};
pub use page::{Page, PageRequest};
pub use projection::{AssociationView, PagedList};
pub use service::{AssociationService, MutationOutcome};
pub use store::AssociationStore;

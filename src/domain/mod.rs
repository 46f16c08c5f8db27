// Copyright (c) 2025 - Cowboy AI, Inc.
//! Association Domain Models
//!
//! Core concepts for user-to-company authorisation:
//!
//! - [`Association`] - stored authorisation record with its invitation and audit history
//! - [`AssociationStatus`] / [`ApprovalRoute`] - fixed vocabularies with strict parsing
//! - [`UserProfile`] / [`CompanyProfile`] - externally owned read-only profiles
//! - [`invariants`] - pure checks over documents and transitions

pub mod association;
pub mod invariants;
pub mod profiles;
pub mod status;

pub use association::{generate_etag, Association, Invitation, PreviousState, Subject};
pub use invariants::{ValidationError, ValidationResult};
pub use profiles::{CompanyProfile, UserProfile};
pub use status::{ApprovalRoute, AssociationStatus};

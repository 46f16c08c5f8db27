// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for company-associations
//!
//! Provides deterministic users, companies, associations and a service
//! wired to in-memory adapters.
//!
//! # Design Principles
//! - Timestamps derive from one fixed instant (no `Utc::now()`)
//! - Request contexts carry fixed request ids and pinned clocks
//! - Tests reach adapters through the harness to inspect side effects

#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use company_associations::directory::{InMemoryCompanyDirectory, InMemoryUserDirectory};
use company_associations::domain::{Association, Invitation, PreviousState, Subject};
use company_associations::notification::RecordingProducer;
use company_associations::store::InMemoryAssociationStore;
use company_associations::{
    AssociationService, AssociationsConfig, CompanyProfile, RequestContext, UserProfile,
};

pub const COMPANY_NUMBER: &str = "00006400";
pub const OTHER_COMPANY_NUMBER: &str = "12345678";

pub const ALICE_ID: &str = "u-alice";
pub const ALICE_EMAIL: &str = "alice@example.com";
pub const BOB_ID: &str = "u-bob";
pub const BOB_EMAIL: &str = "bob@example.com";
pub const CAROL_ID: &str = "u-carol";
pub const CAROL_EMAIL: &str = "carol@example.com";
pub const DAVE_EMAIL: &str = "dave@example.com";

// Fixed test timestamp (2026-01-19T12:00:00Z)
pub const FIXED_TIMESTAMP: &str = "2026-01-19T12:00:00Z";

/// Parse the fixed timestamp
pub fn fixed_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(FIXED_TIMESTAMP)
        .expect("Invalid timestamp in test fixture")
        .with_timezone(&Utc)
}

/// Route service logs to the test writer; `RUST_LOG` selects the level
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn days_ago(days: i64) -> DateTime<Utc> {
    fixed_timestamp() - Duration::days(days)
}

pub fn validity() -> Duration {
    Duration::days(7)
}

pub fn alice() -> UserProfile {
    UserProfile::new(ALICE_ID, ALICE_EMAIL).with_display_name("Alice")
}

pub fn bob() -> UserProfile {
    UserProfile::new(BOB_ID, BOB_EMAIL).with_display_name("Bob")
}

/// Registered without a display name
pub fn carol() -> UserProfile {
    UserProfile::new(CAROL_ID, CAROL_EMAIL)
}

pub fn company() -> CompanyProfile {
    CompanyProfile::new(COMPANY_NUMBER, "Example Widgets Ltd", "active")
}

pub fn other_company() -> CompanyProfile {
    CompanyProfile::new(OTHER_COMPANY_NUMBER, "Other Gadgets Ltd", "dissolved")
}

/// Context of `user` at the fixed instant
pub fn ctx_for(user: &UserProfile) -> RequestContext {
    RequestContext::new(format!("req-{}", user.user_id), user.user_id.as_str(), user.email.as_str())
        .at(fixed_timestamp())
}

pub fn confirmed(company_number: &str, user_id: &str) -> Association {
    Association::auth_code_confirmed(company_number, user_id, days_ago(60))
}

pub fn migrated(company_number: &str, email: &str) -> Association {
    Association::migrated(company_number, email, days_ago(90))
}

/// Awaiting approval after the invitations `(inviter, days_ago)`, in order
pub fn awaiting(company_number: &str, subject: Subject, invitations: &[(&str, i64)]) -> Association {
    let (first_by, first_days) = invitations.first().copied().unwrap_or((ALICE_ID, 1));
    let mut association = Association::invited(
        company_number,
        subject,
        first_by,
        days_ago(first_days),
        validity(),
    )
    .expect("fixture validity fits the calendar");
    for (by, days) in invitations.iter().skip(1) {
        association.previous_states.push(PreviousState {
            status: "awaiting-approval".to_string(),
            changed_by: by.to_string(),
            changed_at: days_ago(*days),
        });
        association.invitations.push(Invitation {
            invited_by: by.to_string(),
            invited_at: days_ago(*days),
        });
        association.approval_expiry_at = Some(days_ago(*days) + validity());
    }
    association
}

/// Service over in-memory adapters with handles for inspection
pub struct Harness {
    pub service: AssociationService,
    pub store: Arc<InMemoryAssociationStore>,
    pub users: Arc<InMemoryUserDirectory>,
    pub companies: Arc<InMemoryCompanyDirectory>,
    pub producer: Arc<RecordingProducer>,
}

impl Harness {
    pub fn new(associations: Vec<Association>) -> Self {
        Self::with_producer(associations, RecordingProducer::new())
    }

    pub fn with_producer(associations: Vec<Association>, producer: RecordingProducer) -> Self {
        init_tracing();
        let store = Arc::new(InMemoryAssociationStore::with_associations(associations));
        let users = Arc::new(InMemoryUserDirectory::new([alice(), bob(), carol()]));
        let companies = Arc::new(InMemoryCompanyDirectory::new([company(), other_company()]));
        let producer = Arc::new(producer);

        let service = AssociationService::new(
            store.clone(),
            users.clone(),
            companies.clone(),
            producer.clone(),
            AssociationsConfig::default(),
        );

        Self {
            service,
            store,
            users,
            companies,
            producer,
        }
    }
}

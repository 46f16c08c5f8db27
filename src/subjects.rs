// Copyright (c) 2025 - Cowboy AI, Inc.

//! NATS subject hierarchy for association notifications
//!
//! # Subject Pattern
//!
//! ```text
//! {root}.notifications.{message_type}
//! ```
//!
//! This allows for:
//! - Precise subscriptions (`associations.notifications.invite_email`)
//! - Notification wildcards (`associations.notifications.>`)
//!
//! # Examples
//!
//! ```rust
//! use company_associations::subjects::SubjectBuilder;
//!
//! let subject = SubjectBuilder::new("associations")
//!     .message_type("invite_email")
//!     .build()
//!     .unwrap();
//! assert_eq!(subject, "associations.notifications.invite_email");
//!
//! let wildcard = SubjectBuilder::new("associations").build_wildcard();
//! assert_eq!(wildcard, "associations.notifications.>");
//! ```

use crate::errors::{AssociationError, AssociationResult};

/// Default root namespace of notification subjects
pub const ASSOCIATIONS_ROOT: &str = "associations";

/// Token between the root and the message type
pub const NOTIFICATIONS_TOKEN: &str = "notifications";

/// Builder for notification subjects
#[derive(Debug, Clone)]
pub struct SubjectBuilder {
    root: String,
    message_type: Option<String>,
}

impl SubjectBuilder {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            message_type: None,
        }
    }

    /// Set the message type token
    pub fn message_type(mut self, message_type: impl Into<String>) -> Self {
        self.message_type = Some(message_type.into());
        self
    }

    /// Build the complete subject string
    ///
    /// # Errors
    /// - InvalidInput when the message type is missing or a token contains
    ///   whitespace, `.` or a wildcard character
    pub fn build(self) -> AssociationResult<String> {
        validate_token(&self.root, "root")?;
        let message_type = self
            .message_type
            .ok_or_else(|| AssociationError::InvalidInput("message type must be set".to_string()))?;
        validate_token(&message_type, "message type")?;

        Ok(format!("{}.{}.{}", self.root, NOTIFICATIONS_TOKEN, message_type))
    }

    /// Subscription for every notification under this root
    ///
    /// Returns: `{root}.notifications.>`
    pub fn build_wildcard(self) -> String {
        format!("{}.{}.>", self.root, NOTIFICATIONS_TOKEN)
    }
}

impl Default for SubjectBuilder {
    fn default() -> Self {
        Self::new(ASSOCIATIONS_ROOT)
    }
}

fn validate_token(token: &str, name: &str) -> AssociationResult<()> {
    let invalid = token.is_empty()
        || token
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '.' | '*' | '>'));
    if invalid {
        return Err(AssociationError::InvalidInput(format!(
            "invalid subject {}: {:?}",
            name, token
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_builder() {
        let subject = SubjectBuilder::default()
            .message_type("invitation_accepted_email")
            .build()
            .unwrap();

        assert_eq!(subject, "associations.notifications.invitation_accepted_email");
    }

    #[test]
    fn test_wildcard_subject() {
        assert_eq!(
            SubjectBuilder::new("test").build_wildcard(),
            "test.notifications.>"
        );
    }

    #[test]
    fn test_missing_or_invalid_message_type() {
        assert!(SubjectBuilder::default().build().is_err());
        assert!(SubjectBuilder::default().message_type("a.b").build().is_err());
        assert!(SubjectBuilder::default().message_type("").build().is_err());
        assert!(SubjectBuilder::new("bad root").message_type("x").build().is_err());
    }
}

// Copyright (c) 2025 - Cowboy AI, Inc.
//! Finite State Machine Abstractions
//!
//! Generic state machine types for modeling lifecycles. Transitions are
//! deterministic functions with no side effects:
//!
//! ```text
//! (State, Input) → (State, Output)
//! ```
//!
//! The association lifecycle in [`association_lifecycle`] implements this
//! trait for [`AssociationStatus`](crate::domain::AssociationStatus).

pub mod association_lifecycle;

pub use association_lifecycle::{
    check_acceptance_allowed, check_auth_code_confirmation_allowed, check_invitation_allowed,
    check_removal_allowed, LifecycleCommand, TransitionOutput,
};

use crate::errors::AssociationError;

/// Result of a state transition
pub type TransitionResult<S> = Result<S, TransitionError>;

/// Errors that can occur during state transitions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Transition from current state to target state is not allowed
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// Precondition not met for transition
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),
}

impl From<TransitionError> for AssociationError {
    fn from(err: TransitionError) -> Self {
        AssociationError::InvalidInput(err.to_string())
    }
}

/// Trait for finite state machines
pub trait StateMachine: Sized + Clone {
    /// Input type that triggers transitions
    type Input;

    /// Output type produced by transitions (use () if none)
    type Output;

    /// Attempt to transition to a new state given an input
    fn transition(&self, input: &Self::Input) -> TransitionResult<(Self, Self::Output)>;

    /// Check if a transition is valid without performing it
    fn can_transition(&self, input: &Self::Input) -> bool {
        self.transition(input).is_ok()
    }

    /// Get all valid inputs from current state (if enumerable)
    fn valid_inputs(&self) -> Vec<Self::Input>
    where
        Self::Input: Clone,
    {
        Vec::new()
    }
}

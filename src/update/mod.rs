// Copyright (c) 2025 - Cowboy AI, Inc.
//! Update Builder
//!
//! Pure transition functions: current association (+ optional resolved
//! user, acting user id, time) → [`AssociationUpdate`]. The service layer
//! applies the result through the store with an etag check.
//!
//! ```text
//! Command → build_update(Association, ..) → AssociationUpdate → Store::apply_update
//!                                              ↓
//!                                  $set / $push / $unset document
//! ```

pub mod builders;
pub mod description;

pub use builders::{base_update, build_update, confirm_update, invitation_update, remove_update};
pub use description::AssociationUpdate;

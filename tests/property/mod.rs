// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! Lifecycle laws of the update builders, pagination arithmetic, the batch
//! key splitter and the enrichment mappers.

mod enrichment_laws;
mod lifecycle_laws;
mod pagination_laws;
mod splitter_laws;

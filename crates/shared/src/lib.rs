//! Shared utilities and common types for the event inventory backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Cursor-based pagination for ledger queries
//! - Common validation logic for inventory inputs

pub mod pagination;
pub mod validation;

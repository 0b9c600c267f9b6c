//! Shared utilities and common types for the edge-config workspace.
//!
//! This crate provides common functionality used across all other crates:
//! - Content hashing and Subresource-Integrity verification
//! - Common validation logic for plan and continent codes

pub mod crypto;
pub mod validation;

//! Trustline Core - Shared types library.
//!
//! This crate provides the domain types shared by the Trustline components:
//! - `site` - Public website API and the administrative console backend
//! - `cli` - Command-line tools for migrations and admin seeding
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O, no database
//! access, no HTTP. Parsing happens here so that every boundary (HTTP body,
//! database row, CLI argument) rejects malformed values the same way.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, emails, amounts, and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

//! Bazaar Core - Shared types library.
//!
//! This crate provides common types used across all Bazaar components:
//! - `web` - Storefront frontend with the customer, seller and admin consoles
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Everything
//! that talks to the backend lives in the consuming crates.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, tokens, emails, and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

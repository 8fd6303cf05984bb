//! Domain models for the storefront frontend.
//!
//! These types mirror what the backend sends over the wire; the frontend
//! holds no state of its own beyond the session.

pub mod profile;

pub use profile::{Profile, session_keys};

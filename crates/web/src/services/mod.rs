//! External service clients.

pub mod api;

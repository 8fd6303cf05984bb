//! HTTP middleware stack for the web frontend.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions, signed cookie)
//! 5. Route guard (per-route-tree access control, see [`crate::guard`])
//! 6. Rate limiting (governor, auth endpoints only)

pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use session::create_session_layer;

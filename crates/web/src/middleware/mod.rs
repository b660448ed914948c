//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded in the span, echoed in the response)
//! 4. Security headers
//! 5. Session lock (one in-flight request per session)
//! 6. Session layer (tower-sessions)
//! 7. Rate limiting on auth submissions (per route)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod session_lock;

pub use auth::{OptionalCustomer, RequireAdmin, RequireCustomer, RequireManager, RequireOwner};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, SessionContext, create_session_layer};
pub use session_lock::{SessionLocks, session_lock_middleware};

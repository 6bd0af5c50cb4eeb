//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, attach request data)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (record in span, echo in response)
//! 4. CORS
//! 5. Security headers
//! 6. Rate limiting on `/login` and `/register`

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use auth::{RequireUser, bearer_token};
pub use rate_limit::auth_rate_limiter;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;

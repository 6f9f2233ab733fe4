mod auth;
mod body_limit;
mod logging;
mod session;

pub use auth::AuthUser;
pub use body_limit::reject_oversized_body;
pub use logging::log_request;
pub use session::require_session;

mod auth;
mod sessions;

pub use auth::AuthManager;
pub use sessions::{Session, SessionManager};

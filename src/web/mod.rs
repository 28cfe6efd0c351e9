use crate::db::Database;
use crate::error::Error;
use crate::security::AuthManager;
use actix_web::{HttpRequest, HttpResponse};
use log::error;
use std::sync::Arc;

mod api;
mod auth;
mod server;

pub use api::ApiHandler;
pub use auth::AuthHandler;
pub use server::WebServer;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub auth: Arc<AuthManager>,
}

pub(crate) fn bearer_token(req: &HttpRequest) -> Option<&str> {
    let header = req.headers().get("Authorization")?.to_str().ok()?;
    Some(header.strip_prefix("Bearer ").unwrap_or(header))
}

/// Resolve the authenticated principal, or the 401 response to send back.
pub(crate) async fn principal(state: &AppState, req: &HttpRequest) -> Result<i64, HttpResponse> {
    let token = bearer_token(req).ok_or_else(|| {
        HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Missing token"
        }))
    })?;
    state.auth.authenticate(token).await.map_err(|_| {
        HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid or expired session"
        }))
    })
}

/// Map the error taxonomy onto HTTP responses. Provider failures and
/// store inconsistencies surface as 500s and are logged here.
pub(crate) fn error_response(err: &Error) -> HttpResponse {
    match err {
        Error::NotFound(msg) => HttpResponse::NotFound().json(serde_json::json!({
            "error": msg
        })),
        Error::Conflict(msg) => HttpResponse::Conflict().json(serde_json::json!({
            "error": msg
        })),
        Error::ValidationError(msg) => HttpResponse::BadRequest().json(serde_json::json!({
            "error": msg
        })),
        Error::InvalidCredentials => HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid credentials"
        })),
        Error::SessionError(_) => HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid or expired session"
        })),
        other => {
            error!("Request failed: {}", other);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

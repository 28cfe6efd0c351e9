use crate::web::{bearer_token, error_response, AppState};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email address.
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub account: crate::models::Account,
}

pub struct AuthHandler;

impl AuthHandler {
    pub fn configure_routes(cfg: &mut web::ServiceConfig) {
        cfg.service(
            web::scope("/auth")
                .route("/register", web::post().to(Self::register))
                .route("/login", web::post().to(Self::login))
                .route("/logout", web::post().to(Self::logout)),
        );
    }

    async fn register(
        state: web::Data<AppState>,
        body: web::Json<RegisterRequest>,
    ) -> impl Responder {
        let body = body.into_inner();
        match state
            .auth
            .register(body.username, body.email, body.password)
            .await
        {
            Ok(account) => HttpResponse::Created().json(account),
            Err(e) => error_response(&e),
        }
    }

    async fn login(state: web::Data<AppState>, body: web::Json<LoginRequest>) -> impl Responder {
        match state.auth.login(&body.username, &body.password).await {
            Ok((account, session)) => HttpResponse::Ok().json(LoginResponse {
                token: session.token,
                expires_at: session.expires_at,
                account,
            }),
            Err(e) => error_response(&e),
        }
    }

    async fn logout(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
        let Some(token) = bearer_token(&req) else {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Missing token"
            }));
        };
        if state.auth.logout(token).await {
            HttpResponse::Ok().json(serde_json::json!({
                "status": "ok",
                "message": "Logged out successfully"
            }))
        } else {
            HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Unknown session"
            }))
        }
    }
}

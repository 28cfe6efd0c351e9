use crate::db::Database;
use crate::security::AuthManager;
use crate::web::{ApiHandler, AppState, AuthHandler};
use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use log::info;
use std::sync::Arc;

pub struct WebServer {
    db: Arc<Database>,
    auth: Arc<AuthManager>,
}

impl WebServer {
    pub fn new(db: Arc<Database>, auth: Arc<AuthManager>) -> Self {
        Self { db, auth }
    }

    pub async fn start(&self, host: &str, port: u16) -> std::io::Result<()> {
        info!("Starting web server on {}:{}", host, port);

        let state = AppState {
            db: self.db.clone(),
            auth: self.auth.clone(),
        };

        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(state.clone()))
                .configure(AuthHandler::configure_routes)
                .configure(ApiHandler::configure_routes)
        })
        .bind((host, port))?
        .run()
        .await
    }
}

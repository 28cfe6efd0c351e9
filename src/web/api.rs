use crate::models::{
    AccountUpdate, CollectionUpdate, NewCollection, NewTrade, PlanTier, TradeUpdate,
};
use crate::validation::{validate_collection_name, validate_symbol};
use crate::web::{error_response, principal, AppState};
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct TradeListQuery {
    pub collection: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub plan: PlanTier,
}

/// Payment-provider references, stored verbatim. Omitted fields clear
/// to null, which is how a cancellation drops the subscription.
#[derive(Debug, Deserialize)]
pub struct BillingRequest {
    pub customer_id: Option<String>,
    pub subscription_id: Option<String>,
}

pub struct ApiHandler;

impl ApiHandler {
    pub fn configure_routes(cfg: &mut web::ServiceConfig) {
        cfg.service(
            web::scope("/api")
                .route("/health", web::get().to(Self::health_check))
                .route("/me", web::get().to(Self::get_me))
                .route("/me", web::put().to(Self::update_me))
                .route("/me/plan", web::put().to(Self::update_plan))
                .route("/me/billing", web::put().to(Self::update_billing))
                .route("/trades", web::get().to(Self::list_trades))
                .route("/trades", web::post().to(Self::create_trade))
                .route("/trades/{id}", web::get().to(Self::get_trade))
                .route("/trades/{id}", web::put().to(Self::update_trade))
                .route("/trades/{id}", web::delete().to(Self::delete_trade))
                .route(
                    "/trades/{id}/collection",
                    web::delete().to(Self::detach_trade),
                )
                .route("/collections", web::get().to(Self::list_collections))
                .route("/collections", web::post().to(Self::create_collection))
                .route("/collections/{id}", web::get().to(Self::get_collection))
                .route("/collections/{id}", web::put().to(Self::update_collection))
                .route(
                    "/collections/{id}",
                    web::delete().to(Self::delete_collection),
                ),
        );
    }

    async fn health_check() -> impl Responder {
        HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "timestamp": chrono::Utc::now().to_rfc3339()
        }))
    }

    async fn get_me(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
        let account_id = match principal(&state, &req).await {
            Ok(id) => id,
            Err(resp) => return resp,
        };

        match state.db.accounts.get(account_id).await {
            Ok(Some(account)) => HttpResponse::Ok().json(account),
            Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
                "error": "Account not found"
            })),
            Err(e) => error_response(&e),
        }
    }

    async fn update_me(
        state: web::Data<AppState>,
        req: HttpRequest,
        body: web::Json<AccountUpdate>,
    ) -> impl Responder {
        let account_id = match principal(&state, &req).await {
            Ok(id) => id,
            Err(resp) => return resp,
        };

        match state.db.accounts.update(account_id, body.into_inner()).await {
            Ok(account) => HttpResponse::Ok().json(account),
            Err(e) => error_response(&e),
        }
    }

    async fn update_plan(
        state: web::Data<AppState>,
        req: HttpRequest,
        body: web::Json<PlanRequest>,
    ) -> impl Responder {
        let account_id = match principal(&state, &req).await {
            Ok(id) => id,
            Err(resp) => return resp,
        };

        match state.db.accounts.update_plan(account_id, body.plan).await {
            Ok(account) => HttpResponse::Ok().json(account),
            Err(e) => error_response(&e),
        }
    }

    async fn update_billing(
        state: web::Data<AppState>,
        req: HttpRequest,
        body: web::Json<BillingRequest>,
    ) -> impl Responder {
        let account_id = match principal(&state, &req).await {
            Ok(id) => id,
            Err(resp) => return resp,
        };

        let body = body.into_inner();
        match state
            .db
            .accounts
            .update_billing(account_id, body.customer_id, body.subscription_id)
            .await
        {
            Ok(account) => HttpResponse::Ok().json(account),
            Err(e) => error_response(&e),
        }
    }

    async fn list_trades(
        state: web::Data<AppState>,
        req: HttpRequest,
        query: web::Query<TradeListQuery>,
    ) -> impl Responder {
        let account_id = match principal(&state, &req).await {
            Ok(id) => id,
            Err(resp) => return resp,
        };

        let result = match query.collection {
            Some(collection_id) => {
                // Listing a collection requires owning it
                match state.db.collections.get(collection_id).await {
                    Ok(Some(collection)) if collection.user_id == account_id => {
                        state.db.trades.list_by_collection(collection_id).await
                    }
                    Ok(Some(_)) => {
                        return HttpResponse::Forbidden().json(serde_json::json!({
                            "error": "Collection belongs to another account"
                        }))
                    }
                    Ok(None) => {
                        return HttpResponse::NotFound().json(serde_json::json!({
                            "error": "Collection not found"
                        }))
                    }
                    Err(e) => return error_response(&e),
                }
            }
            None => state.db.trades.list_by_owner(account_id).await,
        };

        match result {
            Ok(trades) => HttpResponse::Ok().json(trades),
            Err(e) => error_response(&e),
        }
    }

    async fn create_trade(
        state: web::Data<AppState>,
        req: HttpRequest,
        body: web::Json<NewTrade>,
    ) -> impl Responder {
        let account_id = match principal(&state, &req).await {
            Ok(id) => id,
            Err(resp) => return resp,
        };

        let new = body.into_inner();
        if let Err(e) = validate_symbol(&new.symbol) {
            return error_response(&e);
        }

        // The target collection must exist and belong to the caller
        if let Some(collection_id) = new.collection_id {
            match state.db.collections.get(collection_id).await {
                Ok(Some(collection)) if collection.user_id == account_id => {}
                Ok(Some(_)) => {
                    return HttpResponse::Forbidden().json(serde_json::json!({
                        "error": "Collection belongs to another account"
                    }))
                }
                Ok(None) => {
                    return HttpResponse::NotFound().json(serde_json::json!({
                        "error": "Collection not found"
                    }))
                }
                Err(e) => return error_response(&e),
            }
        }

        match state.db.trades.create(account_id, new).await {
            Ok(trade) => HttpResponse::Created().json(trade),
            Err(e) => error_response(&e),
        }
    }

    async fn get_trade(
        state: web::Data<AppState>,
        req: HttpRequest,
        id: web::Path<i64>,
    ) -> impl Responder {
        let account_id = match principal(&state, &req).await {
            Ok(id) => id,
            Err(resp) => return resp,
        };

        match state.db.trades.get(*id).await {
            Ok(Some(trade)) if trade.user_id == account_id => HttpResponse::Ok().json(trade),
            Ok(Some(_)) => HttpResponse::Forbidden().json(serde_json::json!({
                "error": "Trade belongs to another account"
            })),
            Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
                "error": "Trade not found"
            })),
            Err(e) => error_response(&e),
        }
    }

    async fn update_trade(
        state: web::Data<AppState>,
        req: HttpRequest,
        id: web::Path<i64>,
        body: web::Json<TradeUpdate>,
    ) -> impl Responder {
        let account_id = match principal(&state, &req).await {
            Ok(id) => id,
            Err(resp) => return resp,
        };

        let update = body.into_inner();
        if let Some(symbol) = &update.symbol {
            if let Err(e) = validate_symbol(symbol) {
                return error_response(&e);
            }
        }

        match state.db.trades.get(*id).await {
            Ok(Some(trade)) if trade.user_id == account_id => {}
            Ok(Some(_)) => {
                return HttpResponse::Forbidden().json(serde_json::json!({
                    "error": "Trade belongs to another account"
                }))
            }
            Ok(None) => {
                return HttpResponse::NotFound().json(serde_json::json!({
                    "error": "Trade not found"
                }))
            }
            Err(e) => return error_response(&e),
        }

        match state.db.trades.update(*id, update).await {
            Ok(trade) => HttpResponse::Ok().json(trade),
            Err(e) => error_response(&e),
        }
    }

    async fn delete_trade(
        state: web::Data<AppState>,
        req: HttpRequest,
        id: web::Path<i64>,
    ) -> impl Responder {
        let account_id = match principal(&state, &req).await {
            Ok(id) => id,
            Err(resp) => return resp,
        };

        match state.db.trades.get(*id).await {
            Ok(Some(trade)) if trade.user_id == account_id => {}
            Ok(Some(_)) => {
                return HttpResponse::Forbidden().json(serde_json::json!({
                    "error": "Trade belongs to another account"
                }))
            }
            Ok(None) => {
                return HttpResponse::NotFound().json(serde_json::json!({
                    "error": "Trade not found"
                }))
            }
            Err(e) => return error_response(&e),
        }

        match state.db.trades.delete(*id).await {
            Ok(true) => HttpResponse::Ok().json(serde_json::json!({
                "status": "ok",
                "message": "Trade deleted"
            })),
            Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
                "error": "Trade not found"
            })),
            Err(e) => error_response(&e),
        }
    }

    async fn detach_trade(
        state: web::Data<AppState>,
        req: HttpRequest,
        id: web::Path<i64>,
    ) -> impl Responder {
        let account_id = match principal(&state, &req).await {
            Ok(id) => id,
            Err(resp) => return resp,
        };

        match state.db.trades.get(*id).await {
            Ok(Some(trade)) if trade.user_id == account_id => {}
            Ok(Some(_)) => {
                return HttpResponse::Forbidden().json(serde_json::json!({
                    "error": "Trade belongs to another account"
                }))
            }
            Ok(None) => {
                return HttpResponse::NotFound().json(serde_json::json!({
                    "error": "Trade not found"
                }))
            }
            Err(e) => return error_response(&e),
        }

        match state.db.trades.set_collection(*id, None).await {
            Ok(trade) => HttpResponse::Ok().json(trade),
            Err(e) => error_response(&e),
        }
    }

    async fn list_collections(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
        let account_id = match principal(&state, &req).await {
            Ok(id) => id,
            Err(resp) => return resp,
        };

        match state.db.collections.list_by_owner(account_id).await {
            Ok(collections) => HttpResponse::Ok().json(collections),
            Err(e) => error_response(&e),
        }
    }

    async fn create_collection(
        state: web::Data<AppState>,
        req: HttpRequest,
        body: web::Json<NewCollection>,
    ) -> impl Responder {
        let account_id = match principal(&state, &req).await {
            Ok(id) => id,
            Err(resp) => return resp,
        };

        let new = body.into_inner();
        if let Err(e) = validate_collection_name(&new.name) {
            return error_response(&e);
        }

        match state.db.collections.create(account_id, new).await {
            Ok(collection) => HttpResponse::Created().json(collection),
            Err(e) => error_response(&e),
        }
    }

    async fn get_collection(
        state: web::Data<AppState>,
        req: HttpRequest,
        id: web::Path<i64>,
    ) -> impl Responder {
        let account_id = match principal(&state, &req).await {
            Ok(id) => id,
            Err(resp) => return resp,
        };

        match state.db.collections.get(*id).await {
            Ok(Some(collection)) if collection.user_id == account_id => {
                HttpResponse::Ok().json(collection)
            }
            Ok(Some(_)) => HttpResponse::Forbidden().json(serde_json::json!({
                "error": "Collection belongs to another account"
            })),
            Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
                "error": "Collection not found"
            })),
            Err(e) => error_response(&e),
        }
    }

    async fn update_collection(
        state: web::Data<AppState>,
        req: HttpRequest,
        id: web::Path<i64>,
        body: web::Json<CollectionUpdate>,
    ) -> impl Responder {
        let account_id = match principal(&state, &req).await {
            Ok(id) => id,
            Err(resp) => return resp,
        };

        let update = body.into_inner();
        if let Some(name) = &update.name {
            if let Err(e) = validate_collection_name(name) {
                return error_response(&e);
            }
        }

        match state.db.collections.get(*id).await {
            Ok(Some(collection)) if collection.user_id == account_id => {}
            Ok(Some(_)) => {
                return HttpResponse::Forbidden().json(serde_json::json!({
                    "error": "Collection belongs to another account"
                }))
            }
            Ok(None) => {
                return HttpResponse::NotFound().json(serde_json::json!({
                    "error": "Collection not found"
                }))
            }
            Err(e) => return error_response(&e),
        }

        match state.db.collections.update(*id, update).await {
            Ok(collection) => HttpResponse::Ok().json(collection),
            Err(e) => error_response(&e),
        }
    }

    async fn delete_collection(
        state: web::Data<AppState>,
        req: HttpRequest,
        id: web::Path<i64>,
    ) -> impl Responder {
        let account_id = match principal(&state, &req).await {
            Ok(id) => id,
            Err(resp) => return resp,
        };

        match state.db.collections.get(*id).await {
            Ok(Some(collection)) if collection.user_id == account_id => {}
            Ok(Some(_)) => {
                return HttpResponse::Forbidden().json(serde_json::json!({
                    "error": "Collection belongs to another account"
                }))
            }
            Ok(None) => {
                return HttpResponse::NotFound().json(serde_json::json!({
                    "error": "Collection not found"
                }))
            }
            Err(e) => return error_response(&e),
        }

        match state.db.collections.delete(*id).await {
            Ok(true) => HttpResponse::Ok().json(serde_json::json!({
                "status": "ok",
                "message": "Collection deleted"
            })),
            Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
                "error": "Collection not found"
            })),
            Err(e) => error_response(&e),
        }
    }
}

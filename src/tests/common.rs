use crate::db::Database;
use crate::models::{Direction, NewAccount, NewTrade};
use crate::security::AuthManager;
use crate::store::MemoryStore;
use crate::web::AppState;
use chrono::Duration;
use std::sync::Arc;

// Helper to create a record store over a fresh in-memory document store
pub fn test_database() -> Database {
    Database::new(Arc::new(MemoryStore::new()))
}

// Helper to create the full web state (store + auth gateway)
pub fn test_state() -> AppState {
    let db = Arc::new(test_database());
    let auth = Arc::new(AuthManager::new(db.accounts.clone(), Duration::hours(1)));
    AppState { db, auth }
}

// Helper to create account input with a pre-hashed password
pub fn new_account(username: &str, email: &str) -> NewAccount {
    NewAccount {
        username: username.to_string(),
        email: email.to_string(),
        password_hash: "$2b$12$C6UzMDM.H6dfI/f/IKcEeO".to_string(),
        avatar: None,
    }
}

// Helper to create a default long trade for testing
pub fn new_trade(symbol: &str) -> NewTrade {
    NewTrade {
        symbol: symbol.to_string(),
        direction: Direction::Long,
        entry_price: 100.0,
        exit_price: None,
        entry_date: None,
        exit_date: None,
        notes: None,
        collection_id: None,
    }
}

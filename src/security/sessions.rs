use crate::error::{Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub account_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Server-side session table. Tokens are 32 random bytes from the system
/// RNG, base64-encoded; lookups take the shared lock.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    ttl: Duration,
    rng: SystemRandom,
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            rng: SystemRandom::new(),
        }
    }

    pub async fn create(&self, account_id: i64) -> Result<Session> {
        let mut token_bytes = [0u8; 32];
        self.rng.fill(&mut token_bytes)?;
        let token = URL_SAFE_NO_PAD.encode(token_bytes);

        let now = Utc::now();
        let session = Session {
            token: token.clone(),
            account_id,
            created_at: now,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().await;
        sessions.insert(token, session.clone());
        Ok(session)
    }

    /// Resolve a token to its account identifier. Expired sessions are
    /// evicted on the spot.
    pub async fn resolve(&self, token: &str) -> Result<i64> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(session) if session.expires_at > Utc::now() => {
                    return Ok(session.account_id);
                }
                Some(_) => {}
                None => return Err(Error::SessionError("unknown session".to_string())),
            }
        }
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
        Err(Error::SessionError("session expired".to_string()))
    }

    /// Returns whether a session was actually revoked.
    pub async fn revoke(&self, token: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token).is_some()
    }

    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        before - sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_resolve() -> Result<()> {
        let sessions = SessionManager::new(Duration::hours(1));
        let session = sessions.create(7).await?;
        assert_eq!(sessions.resolve(&session.token).await?, 7);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_token_is_rejected() {
        let sessions = SessionManager::new(Duration::hours(1));
        assert!(sessions.resolve("nope").await.is_err());
    }

    #[tokio::test]
    async fn test_expired_session_is_evicted() -> Result<()> {
        let sessions = SessionManager::new(Duration::seconds(-1));
        let session = sessions.create(7).await?;

        let result = sessions.resolve(&session.token).await;
        assert!(matches!(result, Err(Error::SessionError(_))));
        // Second resolve sees the token already gone
        let result = sessions.resolve(&session.token).await;
        assert!(matches!(result, Err(Error::SessionError(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_revoke_reports_whether_a_session_existed() -> Result<()> {
        let sessions = SessionManager::new(Duration::hours(1));
        let session = sessions.create(7).await?;
        assert!(sessions.revoke(&session.token).await);
        assert!(!sessions.revoke(&session.token).await);
        Ok(())
    }

    #[tokio::test]
    async fn test_purge_expired() -> Result<()> {
        let expired = SessionManager::new(Duration::seconds(-1));
        expired.create(1).await?;
        expired.create(2).await?;
        assert_eq!(expired.purge_expired().await, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_tokens_are_unique() -> Result<()> {
        let sessions = SessionManager::new(Duration::hours(1));
        let a = sessions.create(1).await?;
        let b = sessions.create(1).await?;
        assert_ne!(a.token, b.token);
        Ok(())
    }
}

use crate::db::AccountStore;
use crate::error::{Error, Result};
use crate::models::{Account, NewAccount};
use crate::security::sessions::{Session, SessionManager};
use crate::validation::{validate_email, validate_password, validate_username};
use chrono::Duration;
use log::info;

/// Authenticates credentials against stored bcrypt hashes and maintains
/// the server-side session table. Handlers get an account identifier
/// (the principal) out of this and the record store trusts it as-is.
#[derive(Clone)]
pub struct AuthManager {
    accounts: AccountStore,
    sessions: SessionManager,
}

impl AuthManager {
    pub fn new(accounts: AccountStore, session_ttl: Duration) -> Self {
        Self {
            accounts,
            sessions: SessionManager::new(session_ttl),
        }
    }

    pub async fn register(
        &self,
        username: String,
        email: String,
        password: String,
    ) -> Result<Account> {
        validate_username(&username)?;
        validate_email(&email)?;
        validate_password(&password)?;

        // The store's unique indexes back this check at write time; the
        // lookups here just produce a friendlier error.
        if self.accounts.get_by_username(&username).await?.is_some() {
            return Err(Error::Conflict(format!(
                "username '{}' is already taken",
                username
            )));
        }
        if self.accounts.get_by_email(&email).await?.is_some() {
            return Err(Error::Conflict(format!(
                "email '{}' is already registered",
                email
            )));
        }

        let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
        let account = self
            .accounts
            .create(NewAccount {
                username,
                email,
                password_hash,
                avatar: None,
            })
            .await?;

        info!("Registered account {} ({})", account.id, account.username);
        Ok(account)
    }

    /// Log in with a username or an email address. Unknown identifier
    /// and wrong password are indistinguishable to the caller.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<(Account, Session)> {
        let account = if identifier.contains('@') {
            self.accounts.get_by_email(identifier).await?
        } else {
            self.accounts.get_by_username(identifier).await?
        };
        let account = account.ok_or(Error::InvalidCredentials)?;

        if !bcrypt::verify(password, &account.password_hash)? {
            return Err(Error::InvalidCredentials);
        }

        let session = self.sessions.create(account.id).await?;
        info!("Account {} logged in", account.id);
        Ok((account, session))
    }

    /// Resolve the principal for a request token.
    pub async fn authenticate(&self, token: &str) -> Result<i64> {
        self.sessions.resolve(token).await
    }

    pub async fn logout(&self, token: &str) -> bool {
        self.sessions.revoke(token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::common::test_database;

    fn test_auth() -> AuthManager {
        AuthManager::new(test_database().accounts, Duration::hours(1))
    }

    #[tokio::test]
    async fn test_register_login_logout_flow() -> Result<()> {
        let auth = test_auth();

        let account = auth
            .register(
                "alice".to_string(),
                "a@x.com".to_string(),
                "hunter2hunter2".to_string(),
            )
            .await?;
        assert_eq!(account.id, 1);

        let (logged_in, session) = auth.login("alice", "hunter2hunter2").await?;
        assert_eq!(logged_in.id, account.id);
        assert_eq!(auth.authenticate(&session.token).await?, account.id);

        assert!(auth.logout(&session.token).await);
        assert!(auth.authenticate(&session.token).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_login_by_email() -> Result<()> {
        let auth = test_auth();
        auth.register(
            "alice".to_string(),
            "a@x.com".to_string(),
            "hunter2hunter2".to_string(),
        )
        .await?;

        let (account, _) = auth.login("a@x.com", "hunter2hunter2").await?;
        assert_eq!(account.username, "alice");
        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_alike() -> Result<()> {
        let auth = test_auth();
        auth.register(
            "alice".to_string(),
            "a@x.com".to_string(),
            "hunter2hunter2".to_string(),
        )
        .await?;

        let wrong_password = auth.login("alice", "nope-nope-nope").await;
        assert!(matches!(wrong_password, Err(Error::InvalidCredentials)));
        let unknown_user = auth.login("mallory", "hunter2hunter2").await;
        assert!(matches!(unknown_user, Err(Error::InvalidCredentials)));
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() -> Result<()> {
        let auth = test_auth();
        auth.register(
            "alice".to_string(),
            "a@x.com".to_string(),
            "hunter2hunter2".to_string(),
        )
        .await?;

        let same_username = auth
            .register(
                "alice".to_string(),
                "other@x.com".to_string(),
                "hunter2hunter2".to_string(),
            )
            .await;
        assert!(matches!(same_username, Err(Error::Conflict(_))));

        let same_email = auth
            .register(
                "alice2".to_string(),
                "a@x.com".to_string(),
                "hunter2hunter2".to_string(),
            )
            .await;
        assert!(matches!(same_email, Err(Error::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    async fn test_password_is_stored_hashed() -> Result<()> {
        let auth = test_auth();
        let account = auth
            .register(
                "alice".to_string(),
                "a@x.com".to_string(),
                "hunter2hunter2".to_string(),
            )
            .await?;
        assert_ne!(account.password_hash, "hunter2hunter2");
        assert!(account.password_hash.starts_with("$2"));
        Ok(())
    }
}

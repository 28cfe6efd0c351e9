use crate::db::{apply_update, fetch, list_eq, remove, IdAllocator};
use crate::error::Result;
use crate::models::{Account, AccountUpdate, Model, NewAccount, PlanTier};
use crate::store::{DocumentStore, EntityKind};
use chrono::Utc;
use mongodb::bson::{doc, Bson};
use std::sync::Arc;

#[derive(Clone)]
pub struct AccountStore {
    store: Arc<dyn DocumentStore>,
    ids: IdAllocator,
}

impl AccountStore {
    pub fn new(store: Arc<dyn DocumentStore>, ids: IdAllocator) -> Self {
        Self { store, ids }
    }

    /// New accounts start on the free tier with no payment references.
    /// The returned record is the one constructed here, not a re-read.
    pub async fn create(&self, new: NewAccount) -> Result<Account> {
        let id = self.ids.next_id(EntityKind::Account).await?;
        let account = Account {
            id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            avatar: new.avatar,
            created_at: Utc::now(),
            customer_id: None,
            subscription_id: None,
            plan: PlanTier::Free,
        };
        self.store
            .put(
                EntityKind::Account.collection_name(),
                &id.to_string(),
                account.to_document(),
            )
            .await?;
        Ok(account)
    }

    pub async fn get(&self, id: i64) -> Result<Option<Account>> {
        fetch(self.store.as_ref(), id).await
    }

    /// Equality lookup; usernames are unique, so at most one record is
    /// expected. The first match wins if that ever fails to hold.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<Account>> {
        let accounts: Vec<Account> =
            list_eq(self.store.as_ref(), "username", Bson::String(username.to_string())).await?;
        Ok(accounts.into_iter().next())
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<Account>> {
        let accounts: Vec<Account> =
            list_eq(self.store.as_ref(), "email", Bson::String(email.to_string())).await?;
        Ok(accounts.into_iter().next())
    }

    pub async fn update(&self, id: i64, update: AccountUpdate) -> Result<Account> {
        apply_update(self.store.as_ref(), id, update.into_document()).await
    }

    pub async fn update_plan(&self, id: i64, plan: PlanTier) -> Result<Account> {
        apply_update(self.store.as_ref(), id, doc! { "plan": plan.as_str() }).await
    }

    /// Payment references are written verbatim, nulls included, so a
    /// cancellation can clear them.
    pub async fn update_billing(
        &self,
        id: i64,
        customer_id: Option<String>,
        subscription_id: Option<String>,
    ) -> Result<Account> {
        let fields = doc! {
            "customer_id": customer_id,
            "subscription_id": subscription_id,
        };
        apply_update(self.store.as_ref(), id, fields).await
    }

    pub async fn delete(&self, id: i64) -> Result<bool> {
        remove(self.store.as_ref(), EntityKind::Account, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::tests::common::{new_account, test_database};

    #[tokio::test]
    async fn test_accounts_get_sequential_ids_and_free_plan() -> Result<()> {
        let db = test_database();

        let alice = db.accounts.create(new_account("alice", "a@x.com")).await?;
        assert_eq!(alice.id, 1);
        assert_eq!(alice.plan, PlanTier::Free);
        assert_eq!(alice.customer_id, None);
        assert_eq!(alice.subscription_id, None);
        assert_eq!(alice.avatar, None);

        let bob = db.accounts.create(new_account("bob", "b@x.com")).await?;
        assert_eq!(bob.id, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_lookup_by_username_and_email() -> Result<()> {
        let db = test_database();
        db.accounts.create(new_account("alice", "a@x.com")).await?;
        db.accounts.create(new_account("bob", "b@x.com")).await?;

        let found = db.accounts.get_by_username("alice").await?.unwrap();
        assert_eq!(found.id, 1);
        let found = db.accounts.get_by_email("b@x.com").await?.unwrap();
        assert_eq!(found.id, 2);
        assert!(db.accounts.get_by_username("carol").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_plan_update_sticks() -> Result<()> {
        let db = test_database();
        let account = db.accounts.create(new_account("alice", "a@x.com")).await?;

        let updated = db.accounts.update_plan(account.id, PlanTier::Pro).await?;
        assert_eq!(updated.plan, PlanTier::Pro);
        // Other fields untouched
        assert_eq!(updated.username, "alice");

        let reread = db.accounts.get(account.id).await?.unwrap();
        assert_eq!(reread.plan, PlanTier::Pro);
        Ok(())
    }

    #[tokio::test]
    async fn test_billing_update_writes_and_clears_references() -> Result<()> {
        let db = test_database();
        let account = db.accounts.create(new_account("alice", "a@x.com")).await?;

        let updated = db
            .accounts
            .update_billing(
                account.id,
                Some("cus_42".to_string()),
                Some("sub_42".to_string()),
            )
            .await?;
        assert_eq!(updated.customer_id.as_deref(), Some("cus_42"));
        assert_eq!(updated.subscription_id.as_deref(), Some("sub_42"));

        // Cancellation clears the subscription reference
        let cleared = db
            .accounts
            .update_billing(account.id, Some("cus_42".to_string()), None)
            .await?;
        assert_eq!(cleared.subscription_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_nonexistent_account_is_not_found() {
        let db = test_database();
        let result = db.accounts.update_plan(999, PlanTier::Pro).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}

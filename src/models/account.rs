use crate::error::{Error, Result};
use crate::models::{opt_str, req_datetime, req_i64, req_str, Model};
use crate::store::EntityKind;
use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};

/// Subscription tier. New accounts start on the free tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Pro,
    Elite,
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
            PlanTier::Elite => "elite",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "free" => Ok(PlanTier::Free),
            "pro" => Ok(PlanTier::Pro),
            "elite" => Ok(PlanTier::Elite),
            other => Err(Error::ValidationError(format!("unknown plan '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Opaque payment-provider customer reference, stored verbatim.
    pub customer_id: Option<String>,
    /// Opaque payment-provider subscription reference, stored verbatim.
    pub subscription_id: Option<String>,
    pub plan: PlanTier,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
}

/// Partial profile update: only supplied fields change.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountUpdate {
    pub avatar: Option<String>,
}

impl AccountUpdate {
    pub fn into_document(self) -> Document {
        let mut fields = Document::new();
        if let Some(avatar) = self.avatar {
            fields.insert("avatar", avatar);
        }
        fields
    }
}

impl Model for Account {
    const KIND: EntityKind = EntityKind::Account;

    fn from_document(doc: &Document) -> Result<Self> {
        Ok(Account {
            id: req_i64(doc, "id")?,
            username: req_str(doc, "username")?,
            email: req_str(doc, "email")?,
            password_hash: req_str(doc, "password_hash")?,
            avatar: opt_str(doc, "avatar"),
            created_at: req_datetime(doc, "created_at")?,
            customer_id: opt_str(doc, "customer_id"),
            subscription_id: opt_str(doc, "subscription_id"),
            plan: PlanTier::parse(&req_str(doc, "plan")?)?,
        })
    }

    fn to_document(&self) -> Document {
        doc! {
            "username": &self.username,
            "email": &self.email,
            "password_hash": &self.password_hash,
            "avatar": self.avatar.clone(),
            "created_at": self.created_at.timestamp_millis(),
            "customer_id": self.customer_id.clone(),
            "subscription_id": self.subscription_id.clone(),
            "plan": self.plan.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::normalize::normalize;
    use mongodb::bson::Bson;

    #[test]
    fn test_plan_tier_parse() {
        assert_eq!(PlanTier::parse("free").unwrap(), PlanTier::Free);
        assert_eq!(PlanTier::parse("pro").unwrap(), PlanTier::Pro);
        assert!(PlanTier::parse("gold").is_err());
        assert_eq!(PlanTier::default(), PlanTier::Free);
    }

    #[test]
    fn test_document_mapping() {
        let account = Account {
            id: 3,
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: "$2b$12$hash".to_string(),
            avatar: None,
            created_at: Utc::now(),
            customer_id: Some("cus_123".to_string()),
            subscription_id: None,
            plan: PlanTier::Pro,
        };

        let doc = account.to_document();
        assert_eq!(doc.get("avatar"), Some(&Bson::Null));
        assert_eq!(doc.get_str("plan").unwrap(), "pro");
        assert!(doc.get("id").is_none());

        let decoded = Account::from_document(&normalize(doc, "3")).unwrap();
        assert_eq!(decoded.id, 3);
        assert_eq!(decoded.username, "alice");
        assert_eq!(decoded.customer_id.as_deref(), Some("cus_123"));
        assert_eq!(decoded.subscription_id, None);
        assert_eq!(decoded.plan, PlanTier::Pro);
        assert_eq!(
            decoded.created_at.timestamp_millis(),
            account.created_at.timestamp_millis()
        );
    }
}

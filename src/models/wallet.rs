use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Entitlement ledger for one partner. Entitlement is either a ride-credit
/// count or a validity window; see `wallet::can_activate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerWallet {
    pub partner_id: Uuid,
    pub balance: Decimal,
    pub rides_remaining: u32,
    pub valid_until: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl PartnerWallet {
    pub fn new(partner_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            partner_id,
            balance: Decimal::ZERO,
            rides_remaining: 0,
            valid_until: None,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Credit,
    Debit,
}

/// Append-only audit record; never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub id: Uuid,
    pub partner_id: Uuid,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub plan_id: Option<u32>,
    pub booking_id: Option<Uuid>,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RechargePlan {
    pub id: u32,
    pub name: String,
    pub amount: Decimal,
    pub ride_credits: Option<u32>,
    pub duration_days: Option<u32>,
    pub description: String,
}

impl RechargePlan {
    /// Seeded plan catalog.
    pub fn catalog() -> Vec<Self> {
        vec![
            Self {
                id: 1,
                name: "Basic Plan".to_string(),
                amount: Decimal::new(9900, 2),
                ride_credits: Some(10),
                duration_days: Some(30),
                description: "10 rides valid for 30 days".to_string(),
            },
            Self {
                id: 2,
                name: "Standard Plan".to_string(),
                amount: Decimal::new(29900, 2),
                ride_credits: Some(35),
                duration_days: Some(30),
                description: "35 rides valid for 30 days".to_string(),
            },
            Self {
                id: 3,
                name: "Premium Plan".to_string(),
                amount: Decimal::new(49900, 2),
                ride_credits: Some(60),
                duration_days: Some(30),
                description: "60 rides valid for 30 days".to_string(),
            },
            Self {
                id: 4,
                name: "Unlimited Monthly".to_string(),
                amount: Decimal::new(99900, 2),
                ride_credits: None,
                duration_days: Some(30),
                description: "Unlimited rides for 30 days".to_string(),
            },
        ]
    }
}

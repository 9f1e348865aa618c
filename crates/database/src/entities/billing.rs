//! Billing log entity definitions

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingLog {
    pub id: i64,
    pub public_id: String,
    pub user_id: i64,
    pub kind: String,
    pub origin: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: BillingStatus,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct CreateBillingLogRequest {
    pub kind: String,
    pub origin: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: BillingStatus,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BillingStatus {
    #[default]
    Pending,
    Paid,
    Failed,
}

impl BillingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingStatus::Pending => "pending",
            BillingStatus::Paid => "paid",
            BillingStatus::Failed => "failed",
        }
    }
}

impl From<&str> for BillingStatus {
    fn from(s: &str) -> Self {
        match s {
            "paid" => BillingStatus::Paid,
            "failed" => BillingStatus::Failed,
            _ => BillingStatus::Pending,
        }
    }
}

impl fmt::Display for BillingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

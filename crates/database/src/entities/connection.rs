//! OAuth connection entity definitions

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored Google credential pair for one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: i64,
    pub public_id: String,
    pub user_id: i64,
    pub provider: IntegrationProvider,
    pub email: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
    pub status: ConnectionStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Tokens returned by a code exchange or refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationProvider {
    GoogleCalendar,
    GoogleBusiness,
}

impl IntegrationProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationProvider::GoogleCalendar => "google_calendar",
            IntegrationProvider::GoogleBusiness => "google_business",
        }
    }

    /// Column on `users` mirroring whether an active connection exists.
    pub fn user_flag_column(&self) -> &'static str {
        match self {
            IntegrationProvider::GoogleCalendar => "google_calendar_connected",
            IntegrationProvider::GoogleBusiness => "google_business_connected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "google_calendar" | "google-calendar" => Some(IntegrationProvider::GoogleCalendar),
            "google_business" | "google-business" => Some(IntegrationProvider::GoogleBusiness),
            _ => None,
        }
    }
}

impl fmt::Display for IntegrationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Active,
    Revoked,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Active => "active",
            ConnectionStatus::Revoked => "revoked",
        }
    }
}

impl From<&str> for ConnectionStatus {
    fn from(s: &str) -> Self {
        match s {
            "active" => ConnectionStatus::Active,
            _ => ConnectionStatus::Revoked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_accepts_snake_and_kebab_case() {
        assert_eq!(
            IntegrationProvider::parse("google-calendar"),
            Some(IntegrationProvider::GoogleCalendar)
        );
        assert_eq!(
            IntegrationProvider::parse("google_business"),
            Some(IntegrationProvider::GoogleBusiness)
        );
        assert_eq!(IntegrationProvider::parse("github"), None);
    }

    #[test]
    fn provider_flag_columns_are_distinct() {
        assert_ne!(
            IntegrationProvider::GoogleCalendar.user_flag_column(),
            IntegrationProvider::GoogleBusiness.user_flag_column()
        );
    }
}

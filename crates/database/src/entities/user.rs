//! User entity definitions

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Clinic account owning contacts, campaigns and integrations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub public_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub clinic_name: Option<String>,
    pub plan: Plan,
    pub plan_expires_at: Option<DateTime<Utc>>,
    pub onboarding_completed: bool,
    pub google_calendar_connected: bool,
    pub google_business_connected: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// Plan in force at `now`; a lapsed paid plan falls back to [`Plan::Free`].
    pub fn effective_plan(&self, now: DateTime<Utc>) -> Plan {
        match self.plan_expires_at {
            Some(expires_at) if expires_at <= now => Plan::Free,
            _ => self.plan,
        }
    }

    pub fn can_use(&self, feature: Feature, now: DateTime<Utc>) -> bool {
        self.effective_plan(now).allows(feature)
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub display_name: Option<String>,
    pub clinic_name: Option<String>,
}

/// Subscription tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    Free,
    Starter,
    Pro,
}

/// Dashboard capability gated by subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Contacts,
    Reviews,
    Billing,
    Campaigns,
    GoogleBusiness,
    GoogleCalendar,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Starter => "starter",
            Plan::Pro => "pro",
        }
    }

    pub fn allows(&self, feature: Feature) -> bool {
        match feature {
            Feature::Contacts | Feature::Reviews | Feature::Billing => true,
            Feature::Campaigns | Feature::GoogleBusiness => {
                matches!(self, Plan::Starter | Plan::Pro)
            }
            Feature::GoogleCalendar => matches!(self, Plan::Pro),
        }
    }
}

impl From<&str> for Plan {
    fn from(s: &str) -> Self {
        match s {
            "starter" => Plan::Starter,
            "pro" => Plan::Pro,
            _ => Plan::Free,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Feature::Contacts => "contacts",
            Feature::Reviews => "reviews",
            Feature::Billing => "billing",
            Feature::Campaigns => "campaigns",
            Feature::GoogleBusiness => "google business",
            Feature::GoogleCalendar => "google calendar",
        };
        f.write_str(name)
    }
}

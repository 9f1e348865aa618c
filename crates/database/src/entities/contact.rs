//! Contact entity definitions

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub public_id: String,
    pub user_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub origin: ContactOrigin,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Contact {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate.eq_ignore_ascii_case(tag))
    }
}

#[derive(Debug, Clone)]
pub struct CreateContactRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub origin: ContactOrigin,
    pub tags: Vec<String>,
    pub notes: Option<String>,
}

/// Partial update. `None` keeps a column; `Some(None)` clears a nullable one.
#[derive(Debug, Clone, Default)]
pub struct UpdateContactRequest {
    pub name: Option<String>,
    pub email: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct ContactFilter {
    pub tag: Option<String>,
    pub search: Option<String>,
}

/// Where a contact entered the CRM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContactOrigin {
    #[default]
    Manual,
    Csv,
    Whatsapp,
    Review,
}

impl ContactOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactOrigin::Manual => "manual",
            ContactOrigin::Csv => "csv",
            ContactOrigin::Whatsapp => "whatsapp",
            ContactOrigin::Review => "review",
        }
    }
}

impl From<&str> for ContactOrigin {
    fn from(s: &str) -> Self {
        match s {
            "csv" => ContactOrigin::Csv,
            "whatsapp" => ContactOrigin::Whatsapp,
            "review" => ContactOrigin::Review,
            _ => ContactOrigin::Manual,
        }
    }
}

impl fmt::Display for ContactOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trim tags, drop empty ones and remove case-insensitive duplicates,
/// keeping the first spelling seen.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let trimmed = tag.as_ref().trim();
        if trimmed.is_empty() {
            continue;
        }
        if normalized
            .iter()
            .any(|existing| existing.eq_ignore_ascii_case(trimmed))
        {
            continue;
        }
        normalized.push(trimmed.to_string());
    }
    normalized
}

use smileboard_database::{
    BillingLog, BillingRepository, BillingStatus, CreateBillingLogRequest,
};
use sqlx::SqlitePool;

use super::error::ServiceError;

pub const DEFAULT_CURRENCY: &str = "EUR";

pub async fn list_billing_logs(
    pool: &SqlitePool,
    user_id: i64,
    status: Option<BillingStatus>,
) -> Result<Vec<BillingLog>, ServiceError> {
    let logs = BillingRepository::new(pool.clone())
        .list(user_id, status)
        .await?;
    Ok(logs)
}

pub async fn create_billing_log(
    pool: &SqlitePool,
    user_id: i64,
    request: CreateBillingLogRequest,
) -> Result<BillingLog, ServiceError> {
    if request.kind.trim().is_empty() || request.origin.trim().is_empty() {
        return Err(ServiceError::bad_request("kind and origin are required"));
    }
    if request.amount_cents < 0 {
        return Err(ServiceError::bad_request("amount_cents must not be negative"));
    }
    let currency = normalize_currency(&request.currency)?;

    let request = CreateBillingLogRequest {
        kind: request.kind.trim().to_string(),
        origin: request.origin.trim().to_string(),
        currency,
        ..request
    };

    let log = BillingRepository::new(pool.clone())
        .create(user_id, &request)
        .await?;
    Ok(log)
}

pub async fn update_billing_status(
    pool: &SqlitePool,
    user_id: i64,
    log_id: &str,
    status: BillingStatus,
) -> Result<BillingLog, ServiceError> {
    BillingRepository::new(pool.clone())
        .update_status(user_id, log_id, status)
        .await?
        .ok_or_else(|| ServiceError::not_found("billing log not found"))
}

/// ISO 4217 style code: three ASCII letters, upper-cased.
fn normalize_currency(currency: &str) -> Result<String, ServiceError> {
    let trimmed = currency.trim();
    if trimmed.is_empty() {
        return Ok(DEFAULT_CURRENCY.to_string());
    }
    if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(trimmed.to_ascii_uppercase())
    } else {
        Err(ServiceError::bad_request("currency must be a three letter code"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_defaults_and_normalises() {
        assert_eq!(normalize_currency("").unwrap(), "EUR");
        assert_eq!(normalize_currency(" usd ").unwrap(), "USD");
        assert!(normalize_currency("euro").is_err());
    }
}

use smileboard_auth::AuthError;
use smileboard_database::{DatabaseError, Feature};

#[derive(Debug)]
pub enum ServiceError {
    NotFound(String),
    Forbidden(String),
    BadRequest(String),
    Database(DatabaseError),
    Auth(AuthError),
    Config(String),
    Upstream(String),
    Internal(String),
}

impl ServiceError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream(msg.into())
    }

    pub fn plan_required(feature: Feature) -> Self {
        Self::Forbidden(format!("your current plan does not include {feature}"))
    }
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(msg)
            | Self::Forbidden(msg)
            | Self::BadRequest(msg)
            | Self::Config(msg)
            | Self::Upstream(msg)
            | Self::Internal(msg) => f.write_str(msg),
            Self::Database(err) => write!(f, "{err}"),
            Self::Auth(err) => write!(f, "{err}"),
        }
    }
}

impl From<ServiceError> for crate::ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => crate::ApiError::not_found(msg),
            ServiceError::Forbidden(msg) => crate::ApiError::forbidden(msg),
            ServiceError::BadRequest(msg) => crate::ApiError::bad_request(msg),
            ServiceError::Database(db_err) => crate::ApiError::from(db_err),
            ServiceError::Auth(auth_err) => crate::ApiError::from(auth_err),
            ServiceError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                crate::ApiError::new(axum::http::StatusCode::SERVICE_UNAVAILABLE, msg)
            }
            ServiceError::Upstream(msg) => {
                tracing::error!("Upstream error: {}", msg);
                crate::ApiError::bad_gateway(msg)
            }
            ServiceError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                crate::ApiError::internal_server_error(msg)
            }
        }
    }
}

impl From<DatabaseError> for ServiceError {
    fn from(err: DatabaseError) -> Self {
        Self::Database(err)
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(DatabaseError::from(err))
    }
}

impl From<AuthError> for ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::GoogleOauth(inner) => Self::Upstream(format!("{inner:#}")),
            other => Self::Auth(other),
        }
    }
}

//! Database repository implementations

pub mod billing_repository;
pub mod campaign_repository;
pub mod connection_repository;
pub mod contact_repository;
pub mod review_repository;
pub mod user_repository;

pub use billing_repository::*;
pub use campaign_repository::*;
pub use connection_repository::*;
pub use contact_repository::*;
pub use review_repository::*;
pub use user_repository::*;

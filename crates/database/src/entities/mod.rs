//! Domain entities for the database layer

pub mod billing;
pub mod campaign;
pub mod connection;
pub mod contact;
pub mod review;
pub mod user;

pub use billing::{BillingLog, BillingStatus, CreateBillingLogRequest};
pub use campaign::{Campaign, CampaignChannel, CreateCampaignRequest, UpdateCampaignRequest};
pub use connection::{Connection, ConnectionStatus, IntegrationProvider, TokenSet, UpsertOutcome};
pub use contact::{Contact, ContactFilter, ContactOrigin, CreateContactRequest, UpdateContactRequest};
pub use review::{CampaignReviewSummary, CreateReviewRequest, Review};
pub use user::{Feature, Plan, UpdateUserRequest, User};

pub mod auth;
pub mod billing;
pub mod campaigns;
pub mod contacts;
pub mod health;
pub mod integrations;
pub mod models;
pub mod public;
pub mod reviews;
pub mod users;

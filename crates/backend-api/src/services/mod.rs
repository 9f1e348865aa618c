pub mod auth;
pub mod billing;
pub mod campaigns;
pub mod contacts;
pub mod error;
pub mod integration;
pub mod plan;
pub mod reviews;
pub mod users;

pub use error::*;

#[cfg(test)]
pub mod test_utils;

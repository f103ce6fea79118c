pub mod config;
pub mod db;
pub mod error;
pub mod platform;
pub mod service;
pub mod types;

pub use db::{ClientSecretStore, CredentialStore, NewLinkedAccount, Storage};
pub use error::MarathonError;
pub use types::{ConnectionString, OAuthTokens};

pub mod account_linker;
pub mod client_auth;

pub use account_linker::{AccountLinker, LinkOutcome};
pub use client_auth::ClientAuthenticator;

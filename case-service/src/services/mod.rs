//! Services layer for case-service.
//!
//! Token issuance/verification, credential checks and user lookups.

pub mod auth;
pub mod error;
mod token;
mod users;

pub use auth::AuthService;
pub use error::ServiceError;
pub use token::{Identity, InvalidToken, SessionClaims, TokenService};
pub use users::{InMemoryUserDirectory, UserDirectory};

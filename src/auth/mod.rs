pub mod error;
pub mod oauth;
pub mod token;

pub use error::AuthError;
pub use oauth::{CredentialSource, IssuedToken, OAuthClient};
pub use token::{CachedCredential, Clock, SystemClock, TokenCache, EXPIRY_MARGIN_SECS};

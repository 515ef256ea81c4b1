pub mod auth;
pub mod cache;
pub mod config;
pub mod content;
pub mod error;
pub mod http;
pub mod locale;
pub mod logging;
pub mod proxy;

pub use error::RestError;

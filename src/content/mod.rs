pub mod client;
pub mod error;
pub mod graphql;
pub mod mock;
pub mod queries;
pub mod types;

pub use client::{ArticleListing, ArticleLookup, ContentClient, GraphqlSource};
pub use error::ContentError;
pub use mock::MockSource;
pub use types::*;

// HTTP server module

pub mod cors;
pub mod pages;
pub mod proxy;
pub mod revalidate;
pub mod server;

pub use server::{router, AppState};

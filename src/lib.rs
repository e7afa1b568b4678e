pub mod aggregator;
pub mod auth;
pub mod commands;
pub mod config;
pub mod database;
pub mod error;
pub mod health;
pub mod routes;
pub mod server;
pub mod shutdown;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::Config;
pub use server::Server;

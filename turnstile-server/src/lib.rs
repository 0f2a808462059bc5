pub mod app;
pub mod config;
pub mod cors;
pub mod ice;
pub mod metrics;
pub mod routes;
pub mod state;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

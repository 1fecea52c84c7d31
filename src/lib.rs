pub mod apis;
pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod handles;
pub mod infra;
pub mod logging;
pub mod observability;
pub mod output;
pub mod pipeline;
pub mod types;

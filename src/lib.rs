pub mod constants;
pub mod config;
pub mod error;
pub mod logging;
pub mod types;

// Pipeline stages, leaf first
pub mod fx;
pub mod discovery;
pub mod fetch;
pub mod extract;
pub mod normalize;
pub mod aggregate;
pub mod snapshot;
pub mod harvester;

// Ports and their adapters
pub mod app;
pub mod infra;

pub mod collector;
pub mod config;
pub mod constants;
pub mod error;
pub mod exporter;
pub mod harvester;
pub mod logging;
pub mod logs;
pub mod metrics;
pub mod server;
pub mod stats;

pub mod campaign_monitor;
pub mod cascade;
pub mod config;
pub mod domain;
pub mod error;
pub mod membership;
pub mod routes;
pub mod startup;
pub mod store;
pub mod sync;
pub mod telemetry;

#[cfg(test)]
mod fixtures;

//! Command line client for the Drove container orchestrator.
//!
//! The [`client`] module owns every call to the cluster API. Command groups
//! live in [`plugins`] and attach themselves to the shared grammar through
//! the [`plugin::Plugin`] contract.

pub mod cli;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod output;
pub mod plugin;
pub mod plugins;
pub mod resilience;

//! Vault host library
//!
//! Service registry, configuration and backend wiring for the development host.

pub mod bootstrap;
pub mod config;
pub mod registry;

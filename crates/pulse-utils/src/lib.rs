//! Shared utilities for pulse
//!
//! This crate provides the pieces every pulse binary needs before the market
//! pipeline starts: tracing setup and process settings read from the
//! environment.

pub mod config;
pub mod logging;

pub use config::{Settings, SettingsError};
pub use logging::init_tracing;

//! hr-reports - parametrized report queries over the employees sample schema.
//!
//! This library exposes the core modules for the binary and integration tests.

pub mod api;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod output;
pub mod report;
pub mod session;

//! task-portfolio library
//!
//! This module exports the core components for testing and integration.

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod form;
pub mod logging;
pub mod media;
pub mod reconcile;
pub mod stats;
pub mod store;
pub mod types;

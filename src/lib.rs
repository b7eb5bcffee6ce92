//! Drupal-Steps: behaviour-driven step definitions for Drupal sites
//!
//! This library drives a Drupal site through a browser session abstraction and
//! provides cucumber steps for navigation, authentication, fixtures and page
//! assertions, including table row matching.

pub mod error;
pub mod config;
pub mod logging;

pub mod session;
pub mod driver;

pub mod rows;
pub mod assertions;
pub mod context;
pub mod steps;

// Re-exports
pub use error::{Error, Result};
pub use context::{SessionAccess, StepContext};
pub use rows::{Row, RowMatcher};
pub use steps::DrupalWorld;

/// Drupal-Steps library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

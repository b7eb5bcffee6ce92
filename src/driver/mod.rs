//! # Authoring driver layer
//!
//! Fixture provisioning (users, content, taxonomy, roles, languages) and site
//! maintenance (cache clears, cron) are delegated to a [`Driver`]. The steps
//! never talk to Drupal's backend directly.
//!
//! ## Module structure
//! - `traits`: the `Driver` trait and fixture types
//! - `mock`: in-memory implementation, optionally rendering pages into a
//!   `MockSession`

pub mod traits;
pub mod mock;

pub use traits::{
    random_name, Driver, Language, Node, NodeSpec, Role, Term, TermSpec, User, UserSpec,
};

pub use mock::MockDriver;

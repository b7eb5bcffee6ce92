//! # Cucumber step definitions
//!
//! Steps register themselves on [`DrupalWorld`] when this crate is linked into
//! a cucumber runner. The runner attaches a [`StepContext`](crate::context::StepContext)
//! before each scenario and cleans it up afterwards:
//!
//! ```ignore
//! DrupalWorld::cucumber()
//!     .before(|_, _, _, world| Box::pin(async move { world.attach(new_context()) }))
//!     .after(|_, _, _, _, world| Box::pin(async move {
//!         if let Some(mut ctx) = world.and_then(|w| w.detach()) {
//!             let _ = ctx.cleanup().await;
//!         }
//!     }))
//!     .run("tests/features")
//!     .await;
//! ```
//!
//! ## Module structure
//! - `world`: the world type and its context plumbing
//! - `navigation`: visiting pages, links, buttons, fields, screenshots
//! - `auth`: anonymous and logged-in users
//! - `fixtures`: users, content, terms and languages from tables
//! - `system`: cache clears and cron
//! - `page`: page and region assertions
//! - `rows`: table row assertions

pub mod world;

mod auth;
mod fixtures;
mod navigation;
mod page;
mod rows;
mod system;

pub use world::DrupalWorld;

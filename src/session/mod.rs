//! # Browser session layer
//!
//! The interfaces step definitions use to drive the site under test. The
//! browser itself is an external collaborator: this crate only consumes it.
//!
//! ## Core concepts
//! - **Session**: one active browser connection, with a current page
//! - **Element**: a rendered node of that page, searchable by selector
//! - **SelectorKind**: CSS, XPath, or the named link/button/field selectors
//!
//! ## Module structure
//! - `traits`: the `Session` and `Element` traits
//! - `selector`: CSS selector parsing and matching for the mock
//! - `mock`: in-memory implementation for tests and offline runs
//!
//! ## Usage
//! ```rust,no_run
//! use drupal_steps::session::{MockNode, MockSession, SelectorKind, Session};
//!
//! # async fn example() -> drupal_steps::Result<()> {
//! let session = MockSession::new("http://drupal.test");
//! session
//!     .add_page("/admin/people", MockNode::document([MockNode::table(&[&["Alice", "Admin"]])]))
//!     .await;
//!
//! session.visit("http://drupal.test/admin/people").await?;
//! let rows = session.page().await?.find_all(SelectorKind::Css, "tr").await?;
//! assert_eq!(rows.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod traits;
pub mod selector;
pub mod mock;

pub use traits::{Element, SelectorKind, Session};
pub use selector::{Selector, SelectorTarget};

// Re-export mock implementations for testing
pub use mock::{MockElement, MockNode, MockSession};

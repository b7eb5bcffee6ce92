//! Session traits
//!
//! This module defines the abstract interfaces of the browser layer the steps
//! drive: one active session and the elements of its current page.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::Result;

/// How a locator passed to [`Element::find_all`] is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    /// CSS selector
    Css,
    /// XPath expression
    XPath,
    /// Link by id, title or text
    Link,
    /// Button by id, name, title, value or text
    Button,
    /// Form field by id, name, placeholder or label
    Field,
}

impl fmt::Display for SelectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectorKind::Css => "css",
            SelectorKind::XPath => "xpath",
            SelectorKind::Link => "link",
            SelectorKind::Button => "button",
            SelectorKind::Field => "field",
        };
        f.write_str(name)
    }
}

/// Element handle trait
///
/// Represents a rendered node of the current page. Handles are owned by the
/// browser layer and only read or acted upon through this trait.
#[async_trait]
pub trait Element: Send + Sync + fmt::Debug {
    /// Get element ID
    fn id(&self) -> &str;

    /// Get lower-case tag name
    async fn tag_name(&self) -> Result<String>;

    /// Get rendered text, whitespace-normalised
    async fn text(&self) -> Result<String>;

    /// Get element attribute
    async fn attribute(&self, name: &str) -> Result<Option<String>>;

    /// Get the current value of a form control
    async fn value(&self) -> Result<Option<String>>;

    /// Set the value of a form control
    async fn set_value(&self, value: &str) -> Result<()>;

    /// Click element
    async fn click(&self) -> Result<()>;

    /// Check if element is visible
    async fn is_visible(&self) -> Result<bool>;

    /// Find all descendants matching the locator, in document order
    async fn find_all(&self, kind: SelectorKind, locator: &str) -> Result<Vec<Arc<dyn Element>>>;

    /// Find the first descendant matching the locator
    async fn find(&self, kind: SelectorKind, locator: &str) -> Result<Option<Arc<dyn Element>>> {
        Ok(self.find_all(kind, locator).await?.into_iter().next())
    }
}

/// Session trait
///
/// Represents one active browser connection to the site under test.
#[async_trait]
pub trait Session: Send + Sync + fmt::Debug {
    /// Navigate to an absolute URL
    async fn visit(&self, url: &str) -> Result<()>;

    /// Get the URL of the current page
    async fn current_url(&self) -> Result<String>;

    /// Get the root element of the current page
    async fn page(&self) -> Result<Arc<dyn Element>>;

    /// Capture a PNG screenshot
    async fn screenshot(&self) -> Result<Vec<u8>>;

    /// Drop cookies and return to a blank page
    async fn reset(&self) -> Result<()>;
}

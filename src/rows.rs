//! Table row matcher
//!
//! Scans the `tr` descendants of a container element for rows whose rendered
//! text contains a search string. Matching is case-sensitive substring
//! containment and rows are always visited in document order.

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::session::{Element, SelectorKind};
use crate::{Error, Result};

/// A single `<tr>` element
pub type Row = Arc<dyn Element>;

/// Read-only row queries over one container element
#[derive(Debug, Clone)]
pub struct RowMatcher {
    container: Arc<dyn Element>,
    location: String,
}

impl RowMatcher {
    /// Create a matcher over `container`; `location` is the page URL quoted
    /// in failure messages
    pub fn new<S: Into<String>>(container: Arc<dyn Element>, location: S) -> Self {
        Self {
            container,
            location: location.into(),
        }
    }

    /// URL quoted in failure messages
    pub fn location(&self) -> &str {
        &self.location
    }

    async fn all_rows(&self) -> Result<Vec<Row>> {
        self.container.find_all(SelectorKind::Css, "tr").await
    }

    /// Whether the container has at least one row, whatever its text
    #[instrument(skip(self), fields(location = %self.location))]
    pub async fn has_table(&self) -> Result<bool> {
        let found = self.container.find(SelectorKind::Css, "tr").await?.is_some();
        debug!("has_table: {}", found);
        Ok(found)
    }

    /// Whether any row's text contains `search`
    ///
    /// Returns `false` when there are no rows at all.
    #[instrument(skip(self), fields(location = %self.location))]
    pub async fn has_rows(&self, search: &str) -> Result<bool> {
        for row in self.all_rows().await? {
            if row.text().await?.contains(search) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Every row whose text contains `search`, in document order
    ///
    /// Fails with [`Error::NotFound`] when there are no rows, or none match.
    #[instrument(skip(self), fields(location = %self.location))]
    pub async fn get_rows(&self, search: &str) -> Result<Vec<Row>> {
        let rows = self.all_rows().await?;
        if rows.is_empty() {
            return Err(Error::no_table(search, &self.location));
        }

        let total = rows.len();
        let mut matching = Vec::new();
        for row in rows {
            if row.text().await?.contains(search) {
                matching.push(row);
            }
        }
        debug!("get_rows: {} of {} rows match", matching.len(), total);

        if matching.is_empty() {
            return Err(Error::not_found(search, &self.location));
        }
        Ok(matching)
    }

    /// The first row whose text contains `search`
    ///
    /// Fails with [`Error::NotFound`] when there are no rows, or none match.
    #[instrument(skip(self), fields(location = %self.location))]
    pub async fn get_row(&self, search: &str) -> Result<Row> {
        let rows = self.all_rows().await?;
        if rows.is_empty() {
            return Err(Error::no_table(search, &self.location));
        }

        for row in rows {
            if row.text().await?.contains(search) {
                return Ok(row);
            }
        }

        Err(Error::not_found(search, &self.location))
    }
}

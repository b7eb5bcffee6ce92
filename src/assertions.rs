//! Pass/fail checks built on the row matcher and the current page
//!
//! Every check returns `Ok(())` when it holds and a descriptive error naming
//! the texts involved and the page URL when it does not.

use tracing::{debug, instrument};

use crate::rows::RowMatcher;
use crate::session::{Element, SelectorKind};
use crate::{Error, Result};

// ============================================================================
// Row assertions
// ============================================================================

/// At least one row containing `row_text` also contains `text`
#[instrument(skip(rows), fields(location = %rows.location()))]
pub async fn text_in_row(rows: &RowMatcher, row_text: &str, text: &str) -> Result<()> {
    for row in rows.get_rows(row_text).await? {
        if row.text().await?.contains(text) {
            return Ok(());
        }
    }

    Err(Error::assertion_failed(format!(
        "Found a row containing \"{}\", but no such row contained the text \"{}\" on the page {}",
        row_text,
        text,
        rows.location()
    )))
}

/// Every row containing `row_text` also contains `text`; at least one such
/// row must exist
#[instrument(skip(rows), fields(location = %rows.location()))]
pub async fn text_in_every_row(rows: &RowMatcher, row_text: &str, text: &str) -> Result<()> {
    for row in rows.get_rows(row_text).await? {
        if !row.text().await?.contains(text) {
            return Err(Error::assertion_failed(format!(
                "Found a row containing \"{}\" that did not contain the text \"{}\" on the page {}",
                row_text,
                text,
                rows.location()
            )));
        }
    }
    Ok(())
}

/// The first row containing `row_text` does not contain `text`
#[instrument(skip(rows), fields(location = %rows.location()))]
pub async fn text_not_in_row(rows: &RowMatcher, row_text: &str, text: &str) -> Result<()> {
    let row = rows.get_row(row_text).await?;
    if row.text().await?.contains(text) {
        return Err(Error::assertion_failed(format!(
            "Found a row containing \"{}\", but it contained the text \"{}\" on the page {}",
            row_text,
            text,
            rows.location()
        )));
    }
    Ok(())
}

/// No row containing `row_text` contains `text`
///
/// Holds vacuously when no row matches, but the page must have a table.
#[instrument(skip(rows), fields(location = %rows.location()))]
pub async fn text_not_in_any_row(rows: &RowMatcher, row_text: &str, text: &str) -> Result<()> {
    if !rows.has_table().await? {
        return Err(Error::no_table(row_text, rows.location()));
    }
    rows_lack_text(rows, row_text, text).await
}

/// Like [`text_not_in_any_row`], but also holds when the page has no table
#[instrument(skip(rows), fields(location = %rows.location()))]
pub async fn text_not_in_any_row_if_table(rows: &RowMatcher, row_text: &str, text: &str) -> Result<()> {
    if !rows.has_table().await? {
        debug!("No table on {}, nothing to check", rows.location());
        return Ok(());
    }
    rows_lack_text(rows, row_text, text).await
}

/// The row for `row_text` has not reached the state shown by `text` yet
///
/// Holds when the table has not rendered, the row has not appeared, or no
/// matching row shows `text`.
#[instrument(skip(rows), fields(location = %rows.location()))]
pub async fn transient_state(rows: &RowMatcher, row_text: &str, text: &str) -> Result<()> {
    if !rows.has_table().await? || !rows.has_rows(row_text).await? {
        debug!("Row \"{}\" not rendered yet on {}", row_text, rows.location());
        return Ok(());
    }
    rows_lack_text(rows, row_text, text).await
}

async fn rows_lack_text(rows: &RowMatcher, row_text: &str, text: &str) -> Result<()> {
    let matching = match rows.get_rows(row_text).await {
        Ok(matching) => matching,
        Err(e) if e.is_not_found() => return Ok(()),
        Err(e) => return Err(e),
    };

    for row in matching {
        if row.text().await?.contains(text) {
            return Err(Error::assertion_failed(format!(
                "Found a row containing \"{}\" that contained the text \"{}\" on the page {}",
                row_text,
                text,
                rows.location()
            )));
        }
    }
    Ok(())
}

/// Click the `link` inside the first row containing `row_text`
#[instrument(skip(rows), fields(location = %rows.location()))]
pub async fn click_link_in_row(rows: &RowMatcher, row_text: &str, link: &str) -> Result<()> {
    let row = rows.get_row(row_text).await?;
    let target = row.find(SelectorKind::Link, link).await?.ok_or_else(|| {
        Error::element_not_found(format!(
            "Found a row containing \"{}\", but no \"{}\" link on the page {}",
            row_text,
            link,
            rows.location()
        ))
    })?;
    target.click().await
}

// ============================================================================
// Page assertions
// ============================================================================

/// The page text contains `text`
#[instrument(skip(page))]
pub async fn page_contains_text(page: &dyn Element, text: &str, location: &str) -> Result<()> {
    if page.text().await?.contains(text) {
        return Ok(());
    }
    Err(Error::assertion_failed(format!(
        "The text \"{}\" was not found anywhere in the text of the current page {}",
        text, location
    )))
}

/// The page text does not contain `text`
#[instrument(skip(page))]
pub async fn page_not_contains_text(page: &dyn Element, text: &str, location: &str) -> Result<()> {
    if !page.text().await?.contains(text) {
        return Ok(());
    }
    Err(Error::assertion_failed(format!(
        "The text \"{}\" appears in the text of the current page {}, but it should not",
        text, location
    )))
}

async fn has_visible(container: &dyn Element, kind: SelectorKind, locator: &str) -> Result<bool> {
    for element in container.find_all(kind, locator).await? {
        if element.is_visible().await? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// A visible link matching `link` exists
#[instrument(skip(page))]
pub async fn link_visible(page: &dyn Element, link: &str, location: &str) -> Result<()> {
    if has_visible(page, SelectorKind::Link, link).await? {
        return Ok(());
    }
    Err(Error::assertion_failed(format!(
        "No link to \"{}\" on the page {}",
        link, location
    )))
}

/// No visible link matches `link`
#[instrument(skip(page))]
pub async fn link_not_visible(page: &dyn Element, link: &str, location: &str) -> Result<()> {
    if !has_visible(page, SelectorKind::Link, link).await? {
        return Ok(());
    }
    Err(Error::assertion_failed(format!(
        "The link \"{}\" was present on the page {} and was not supposed to be",
        link, location
    )))
}

/// Some `h1`..`h6` reads exactly `heading`
#[instrument(skip(page))]
pub async fn heading(page: &dyn Element, heading: &str, location: &str) -> Result<()> {
    for element in page.find_all(SelectorKind::Css, "h1, h2, h3, h4, h5, h6").await? {
        if element.text().await?.trim() == heading {
            return Ok(());
        }
    }
    Err(Error::assertion_failed(format!(
        "The text \"{}\" was not found in any heading on the page {}",
        heading, location
    )))
}

/// The region's text contains `text`
#[instrument(skip(region))]
pub async fn region_contains_text(region: &dyn Element, name: &str, text: &str, location: &str) -> Result<()> {
    if region.text().await?.contains(text) {
        return Ok(());
    }
    Err(Error::assertion_failed(format!(
        "The text \"{}\" was not found in the \"{}\" region on the page {}",
        text, name, location
    )))
}

/// The region's text does not contain `text`
#[instrument(skip(region))]
pub async fn region_not_contains_text(region: &dyn Element, name: &str, text: &str, location: &str) -> Result<()> {
    if !region.text().await?.contains(text) {
        return Ok(());
    }
    Err(Error::assertion_failed(format!(
        "The text \"{}\" was found in the \"{}\" region on the page {}",
        text, name, location
    )))
}

/// A visible link matching `link` exists inside the region
#[instrument(skip(region))]
pub async fn link_in_region(region: &dyn Element, name: &str, link: &str, location: &str) -> Result<()> {
    if has_visible(region, SelectorKind::Link, link).await? {
        return Ok(());
    }
    Err(Error::assertion_failed(format!(
        "The link \"{}\" was not found in the \"{}\" region on the page {}",
        link, name, location
    )))
}

/// A visible button matching `button` exists inside the region
#[instrument(skip(region))]
pub async fn button_in_region(region: &dyn Element, name: &str, button: &str, location: &str) -> Result<()> {
    if has_visible(region, SelectorKind::Button, button).await? {
        return Ok(());
    }
    Err(Error::assertion_failed(format!(
        "The button \"{}\" was not found in the \"{}\" region on the page {}",
        button, name, location
    )))
}

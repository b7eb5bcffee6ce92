//! Table row steps

use cucumber::{then, when};

use super::world::DrupalWorld;
use crate::assertions;
use crate::context::SessionAccess;
use crate::{Error, Result};

#[when(regex = r#"^I click "([^"]*)" in the "([^"]*)" row$"#)]
async fn click_in_row(world: &mut DrupalWorld, link: String, row: String) -> Result<()> {
    let rows = world.rows().await?;
    assertions::click_link_in_row(&rows, &row, &link).await
}

#[then(regex = r#"^I should see (?:the text )?"([^"]*)" in (?:the|any) "([^"]*)" row$"#)]
async fn should_see_in_row(world: &mut DrupalWorld, text: String, row: String) -> Result<()> {
    let rows = world.rows().await?;
    assertions::text_in_row(&rows, &row, &text).await
}

#[then(regex = r#"^I should see (?:the text )?"([^"]*)" in every "([^"]*)" row$"#)]
async fn should_see_in_every_row(world: &mut DrupalWorld, text: String, row: String) -> Result<()> {
    let rows = world.rows().await?;
    assertions::text_in_every_row(&rows, &row, &text).await
}

#[then(regex = r#"^I should not see (?:the text )?"([^"]*)" in the "([^"]*)" row$"#)]
async fn should_not_see_in_row(world: &mut DrupalWorld, text: String, row: String) -> Result<()> {
    let rows = world.rows().await?;
    assertions::text_not_in_row(&rows, &row, &text).await
}

#[then(regex = r#"^I should not see (?:the text )?"([^"]*)" in any "([^"]*)" row$"#)]
async fn should_not_see_in_any_row(world: &mut DrupalWorld, text: String, row: String) -> Result<()> {
    let rows = world.rows().await?;
    assertions::text_not_in_any_row(&rows, &row, &text).await
}

#[then(regex = r#"^I should not see (?:the text )?"([^"]*)" in any "([^"]*)" row, if there is a table$"#)]
async fn should_not_see_in_any_row_if_table(world: &mut DrupalWorld, text: String, row: String) -> Result<()> {
    let rows = world.rows().await?;
    assertions::text_not_in_any_row_if_table(&rows, &row, &text).await
}

#[then(regex = r#"^the "([^"]*)" row should not show "([^"]*)" yet$"#)]
async fn row_not_yet(world: &mut DrupalWorld, row: String, text: String) -> Result<()> {
    let rows = world.rows().await?;
    assertions::transient_state(&rows, &row, &text).await
}

#[then(regex = r"^I should see a table$")]
async fn should_see_table(world: &mut DrupalWorld) -> Result<()> {
    let rows = world.rows().await?;
    if rows.has_table().await? {
        return Ok(());
    }
    Err(Error::assertion_failed(format!(
        "Cannot find a table on the page {}",
        rows.location()
    )))
}

#[then(regex = r"^I should not see a table$")]
async fn should_not_see_table(world: &mut DrupalWorld) -> Result<()> {
    let rows = world.rows().await?;
    if !rows.has_table().await? {
        return Ok(());
    }
    Err(Error::assertion_failed(format!("Found a table on the page {}", rows.location())))
}

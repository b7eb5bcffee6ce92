//! Navigation and form steps

use cucumber::{given, then, when};
use tracing::info;

use super::world::DrupalWorld;
use crate::context::SessionAccess;
use crate::Result;

#[given(regex = r#"^(?:that )?I am (?:at|on) "([^"]*)"$"#)]
#[when(regex = r#"^I visit "([^"]*)"$"#)]
async fn visit(world: &mut DrupalWorld, path: String) -> Result<()> {
    world.visit_path(&path).await
}

#[given(regex = r"^(?:that )?I am on the homepage$")]
#[when(regex = r"^I go to the homepage$")]
async fn homepage(world: &mut DrupalWorld) -> Result<()> {
    world.visit_path("/").await
}

#[when(regex = r#"^I click "([^"]*)"$"#)]
async fn click(world: &mut DrupalWorld, link: String) -> Result<()> {
    world.click_link(&link).await
}

#[when(regex = r#"^I press the "([^"]*)" button$"#)]
async fn press(world: &mut DrupalWorld, button: String) -> Result<()> {
    world.press_button(&button).await
}

#[when(regex = r#"^I fill in "([^"]*)" with "([^"]*)"$"#)]
async fn fill_in(world: &mut DrupalWorld, field: String, value: String) -> Result<()> {
    world.fill_field(&field, &value).await
}

#[then(regex = r#"^I should be on "([^"]*)"$"#)]
async fn should_be_on(world: &mut DrupalWorld, path: String) -> Result<()> {
    world.assert_path(&path).await
}

#[then(regex = r"^I should be on the homepage$")]
async fn should_be_on_homepage(world: &mut DrupalWorld) -> Result<()> {
    world.assert_path("/").await
}

#[when(regex = r"^I take a screenshot$")]
async fn screenshot(world: &mut DrupalWorld) -> Result<()> {
    let path = world.save_screenshot(None).await?;
    info!("Screenshot: {}", path.display());
    Ok(())
}

#[when(regex = r#"^I take a screenshot named "([^"]*)"$"#)]
async fn named_screenshot(world: &mut DrupalWorld, name: String) -> Result<()> {
    world.save_screenshot(Some(&name)).await?;
    Ok(())
}

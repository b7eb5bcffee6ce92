//! Page and region assertion steps

use cucumber::then;

use super::world::DrupalWorld;
use crate::assertions;
use crate::context::SessionAccess;
use crate::Result;

#[then(regex = r#"^I should see (?:the text )?"([^"]*)"$"#)]
async fn should_see(world: &mut DrupalWorld, text: String) -> Result<()> {
    let page = world.page().await?;
    assertions::page_contains_text(page.as_ref(), &text, &world.current_url().await?).await
}

#[then(regex = r#"^I should not see (?:the text )?"([^"]*)"$"#)]
async fn should_not_see(world: &mut DrupalWorld, text: String) -> Result<()> {
    let page = world.page().await?;
    assertions::page_not_contains_text(page.as_ref(), &text, &world.current_url().await?).await
}

#[then(regex = r#"^I should see the link "([^"]*)"$"#)]
async fn should_see_link(world: &mut DrupalWorld, link: String) -> Result<()> {
    let page = world.page().await?;
    assertions::link_visible(page.as_ref(), &link, &world.current_url().await?).await
}

#[then(regex = r#"^I should not see the link "([^"]*)"$"#)]
async fn should_not_see_link(world: &mut DrupalWorld, link: String) -> Result<()> {
    let page = world.page().await?;
    assertions::link_not_visible(page.as_ref(), &link, &world.current_url().await?).await
}

#[then(regex = r#"^I should see the heading "([^"]*)"$"#)]
async fn should_see_heading(world: &mut DrupalWorld, heading: String) -> Result<()> {
    let page = world.page().await?;
    assertions::heading(page.as_ref(), &heading, &world.current_url().await?).await
}

#[then(regex = r#"^I should see (?:the text )?"([^"]*)" in the "([^"]*)"(?: region)?$"#)]
async fn should_see_in_region(world: &mut DrupalWorld, text: String, region: String) -> Result<()> {
    let element = world.region(&region).await?;
    assertions::region_contains_text(element.as_ref(), &region, &text, &world.current_url().await?).await
}

#[then(regex = r#"^I should not see (?:the text )?"([^"]*)" in the "([^"]*)"(?: region)?$"#)]
async fn should_not_see_in_region(world: &mut DrupalWorld, text: String, region: String) -> Result<()> {
    let element = world.region(&region).await?;
    assertions::region_not_contains_text(element.as_ref(), &region, &text, &world.current_url().await?)
        .await
}

#[then(regex = r#"^I should see the link "([^"]*)" in the "([^"]*)"(?: region)?$"#)]
async fn should_see_link_in_region(world: &mut DrupalWorld, link: String, region: String) -> Result<()> {
    let element = world.region(&region).await?;
    assertions::link_in_region(element.as_ref(), &region, &link, &world.current_url().await?).await
}

#[then(regex = r#"^I should see the button "([^"]*)" in the "([^"]*)"(?: region)?$"#)]
async fn should_see_button_in_region(world: &mut DrupalWorld, button: String, region: String) -> Result<()> {
    let element = world.region(&region).await?;
    assertions::button_in_region(element.as_ref(), &region, &button, &world.current_url().await?).await
}

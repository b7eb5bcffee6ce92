//! Fixture steps
//!
//! Tables use their first row as the header; each later row is one fixture.
//!
//! ```gherkin
//! Given users:
//!   | name  | mail              | roles  |
//!   | alice | alice@example.com | editor |
//! And "article" content:
//!   | title | author | status |
//!   | Hello | alice  | 1      |
//! ```

use cucumber::gherkin::Step;
use cucumber::given;
use std::collections::BTreeMap;

use super::world::{split_list, DrupalWorld};
use crate::context::SessionAccess;
use crate::driver::{NodeSpec, TermSpec, UserSpec};
use crate::{Error, Result};

/// One table row keyed by header
type Hash = BTreeMap<String, String>;

fn table_hashes(step: &Step) -> Result<Vec<Hash>> {
    let table = step
        .table
        .as_ref()
        .ok_or_else(|| Error::configuration(format!("Step \"{}\" needs a table", step.value)))?;

    let mut rows = table.rows.iter();
    let header = match rows.next() {
        Some(header) => header,
        None => return Ok(Vec::new()),
    };

    Ok(rows
        .map(|row| header.iter().cloned().zip(row.iter().cloned()).collect())
        .collect())
}

fn parse_status(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "published" | "active" => Ok(true),
        "0" | "false" | "no" | "unpublished" | "blocked" => Ok(false),
        other => Err(Error::configuration(format!("Invalid status \"{}\"", other))),
    }
}

fn user_spec(mut hash: Hash) -> Result<UserSpec> {
    let name = hash
        .remove("name")
        .ok_or_else(|| Error::configuration("Users table needs a \"name\" column"))?;
    let mut spec = UserSpec::new(name);
    if let Some(mail) = hash.remove("mail") {
        spec.mail = mail;
    }
    if let Some(pass) = hash.remove("pass") {
        spec.pass = pass;
    }
    if let Some(roles) = hash.remove("roles") {
        spec.roles = split_list(&roles);
    }
    if let Some(status) = hash.remove("status") {
        spec.status = parse_status(&status)?;
    }
    Ok(spec)
}

#[given(regex = r"^users:$")]
async fn users(world: &mut DrupalWorld, step: &Step) -> Result<()> {
    let ctx = world.context_mut()?;
    for hash in table_hashes(step)? {
        ctx.create_user(&user_spec(hash)?).await?;
    }
    Ok(())
}

#[given(regex = r#"^"([^"]*)" content:$"#)]
async fn content(world: &mut DrupalWorld, content_type: String, step: &Step) -> Result<()> {
    let ctx = world.context_mut()?;
    for mut hash in table_hashes(step)? {
        let title = hash
            .remove("title")
            .ok_or_else(|| Error::configuration("Content table needs a \"title\" column"))?;
        let mut spec = NodeSpec::new(content_type.as_str(), title);

        if let Some(author) = hash.remove("author").filter(|a| !a.is_empty()) {
            spec.author = Some(ctx.user_by_name(&author).await?.uid);
        }
        if let Some(status) = hash.remove("status") {
            spec.status = parse_status(&status)?;
        }
        spec.fields = hash.into_iter().filter(|(_, value)| !value.is_empty()).collect();

        ctx.create_node(&spec).await?;
    }
    Ok(())
}

#[given(regex = r#"^I am viewing an? "([^"]*)"(?: content)? with the title "([^"]*)"$"#)]
async fn viewing_content(world: &mut DrupalWorld, content_type: String, title: String) -> Result<()> {
    let mut spec = NodeSpec::new(content_type, title);

    let ctx = world.context_mut()?;
    spec.author = ctx.current_user().map(|user| user.uid);
    let node = ctx.create_node(&spec).await?;
    world.visit_path(&node.path()).await
}

#[given(regex = r#"^"([^"]*)" terms:$"#)]
async fn terms(world: &mut DrupalWorld, vocabulary: String, step: &Step) -> Result<()> {
    let ctx = world.context_mut()?;
    for mut hash in table_hashes(step)? {
        let name = hash
            .remove("name")
            .ok_or_else(|| Error::configuration("Terms table needs a \"name\" column"))?;
        let mut spec = TermSpec::new(vocabulary.as_str(), name);
        spec.parent = hash.remove("parent").filter(|p| !p.is_empty());
        spec.description = hash.remove("description");

        ctx.create_term(&spec).await?;
    }
    Ok(())
}

#[given(regex = r"^the (?:following )?languages are available:$")]
async fn languages_table(world: &mut DrupalWorld, step: &Step) -> Result<()> {
    let table = step
        .table
        .as_ref()
        .ok_or_else(|| Error::configuration(format!("Step \"{}\" needs a table", step.value)))?;

    let ctx = world.context_mut()?;
    // Header is "languages"
    for row in table.rows.iter().skip(1) {
        if let Some(langcode) = row.first() {
            ctx.create_language(langcode.trim()).await?;
        }
    }
    Ok(())
}

#[given(regex = r#"^the "([^"]*)" languages? (?:is|are) available$"#)]
async fn languages(world: &mut DrupalWorld, langcodes: String) -> Result<()> {
    let ctx = world.context_mut()?;
    for langcode in split_list(&langcodes) {
        ctx.create_language(&langcode).await?;
    }
    Ok(())
}

//! Authentication steps

use cucumber::given;
use tracing::debug;

use super::world::{split_list, DrupalWorld};
use crate::driver::UserSpec;
use crate::Result;

/// Role every logged-in user holds implicitly
const AUTHENTICATED: &str = "authenticated";

#[given(regex = r"^I am an anonymous user$")]
#[given(regex = r"^I am not logged in$")]
async fn anonymous(world: &mut DrupalWorld) -> Result<()> {
    let ctx = world.context_mut()?;
    if ctx.logged_in().await? {
        ctx.logout().await?;
    }
    Ok(())
}

#[given(regex = r#"^I am logged in as a user with the "([^"]*)" roles?$"#)]
async fn logged_in_with_roles(world: &mut DrupalWorld, roles: String) -> Result<()> {
    let mut spec = UserSpec::random();
    for role in split_list(&roles) {
        if role != AUTHENTICATED && role != "authenticated user" {
            spec = spec.with_role(role);
        }
    }
    debug!("Logging in a new user with roles {:?}", spec.roles);

    let ctx = world.context_mut()?;
    let user = ctx.create_user(&spec).await?;
    ctx.login(&user).await
}

#[given(regex = r#"^I am logged in as a user with the "([^"]*)" permissions?$"#)]
async fn logged_in_with_permissions(world: &mut DrupalWorld, permissions: String) -> Result<()> {
    let ctx = world.context_mut()?;
    let role = ctx.create_role(&split_list(&permissions)).await?;
    let user = ctx.create_user(&UserSpec::random().with_role(role.rid)).await?;
    ctx.login(&user).await
}

#[given(regex = r#"^I am logged in as "([^"]*)"$"#)]
async fn logged_in_as(world: &mut DrupalWorld, name: String) -> Result<()> {
    let ctx = world.context_mut()?;
    let user = ctx.user_by_name(&name).await?;
    ctx.login(&user).await
}

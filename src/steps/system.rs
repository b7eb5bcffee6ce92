//! Site maintenance steps

use cucumber::given;

use super::world::DrupalWorld;
use crate::context::SessionAccess;
use crate::Result;

#[given(regex = r"^the cache has been cleared$")]
async fn cache_cleared(world: &mut DrupalWorld) -> Result<()> {
    world.context()?.driver().clear_cache(None).await
}

#[given(regex = r#"^the "([^"]*)" cache has been cleared$"#)]
async fn cache_bin_cleared(world: &mut DrupalWorld, cache_type: String) -> Result<()> {
    world.context()?.driver().clear_cache(Some(&cache_type)).await
}

#[given(regex = r"^I run cron$")]
async fn run_cron(world: &mut DrupalWorld) -> Result<()> {
    world.context()?.driver().run_cron().await
}

//! Cucumber runner over the mock site

mod common;

use cucumber::World as _;
use drupal_steps::DrupalWorld;
use futures::FutureExt as _;

#[tokio::main]
async fn main() {
    let _ = drupal_steps::logging::init(&common::test_config());

    DrupalWorld::cucumber()
        .max_concurrent_scenarios(1)
        .fail_on_skipped()
        .before(|_feature, _rule, _scenario, world| {
            async move {
                let (_site, ctx) = common::setup_test_context().await;
                world.attach(ctx);
            }
            .boxed_local()
        })
        .after(|_feature, _rule, _scenario, _finished, world| {
            async move {
                if let Some(mut ctx) = world.and_then(|w| w.detach()) {
                    if let Err(e) = ctx.cleanup().await {
                        tracing::warn!("Scenario cleanup failed: {}", e);
                    }
                }
            }
            .boxed_local()
        })
        .run_and_exit("tests/features")
        .await;
}

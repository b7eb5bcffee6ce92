//! Common test utilities
//!
//! Builds a small mock Drupal site shared by the integration tests and the
//! cucumber runner.

#![allow(dead_code)]

use drupal_steps::config::Config;
use drupal_steps::driver::MockDriver;
use drupal_steps::session::{MockNode, MockSession};
use drupal_steps::StepContext;
use std::sync::Arc;

/// Base URL of the mock site
pub const BASE_URL: &str = "http://drupal.test";

/// Mock site handles kept by tests for inspection
pub struct TestSite {
    pub session: MockSession,
    pub driver: Arc<MockDriver>,
}

fn header(links: &[(&str, &str)]) -> MockNode {
    MockNode::new("header")
        .id("header")
        .children(links.iter().map(|(text, href)| MockNode::link(text, href)))
}

fn front_page(links: &[(&str, &str)]) -> MockNode {
    MockNode::document([
        header(links),
        MockNode::new("main").child(MockNode::heading(1, "Welcome to Drupal")),
        MockNode::new("footer")
            .id("footer")
            .text("Powered by Drupal")
            .child(MockNode::button("Subscribe")),
    ])
}

/// Configuration matching the mock site's regions
pub fn test_config() -> Config {
    Config::default()
        .with_base_url(BASE_URL)
        .with_region("header", "#header")
        .with_region("content", "main")
        .with_region("footer", "#footer")
}

/// Setup the mock site: front page, login form and signed-in variants
pub async fn setup_test_site() -> TestSite {
    let session = MockSession::new(BASE_URL);
    session.set_sign_in_path("/user").await;

    session.add_page("/", front_page(&[("Log in", "/user/login")])).await;
    session
        .add_signed_in_page(
            "/",
            front_page(&[("My account", "/user"), ("Log out", "/user/logout")]),
        )
        .await;

    session
        .add_page(
            "/user/login",
            MockNode::document([
                MockNode::heading(1, "Log in"),
                MockNode::field("Username", "name"),
                MockNode::field("Password", "pass"),
                MockNode::button("Log in").attr("formaction", "/user"),
            ]),
        )
        .await;
    session
        .add_signed_in_page(
            "/user",
            MockNode::document([
                header(&[("Log out", "/user/logout")]),
                MockNode::heading(1, "My account"),
            ]),
        )
        .await;

    let driver = Arc::new(MockDriver::new().rendering_into(session.clone()));
    TestSite { session, driver }
}

/// Setup the mock site and a step context over it
pub async fn setup_test_context() -> (TestSite, StepContext) {
    let site = setup_test_site().await;
    let ctx = StepContext::new(
        Arc::new(site.session.clone()),
        site.driver.clone(),
        Arc::new(test_config()),
    );
    (site, ctx)
}

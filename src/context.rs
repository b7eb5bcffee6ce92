//! Scenario-scoped step context
//!
//! [`StepContext`] carries the active session, the authoring driver and the
//! configuration, and remembers every fixture the scenario created so they
//! can be deleted afterwards. Hosts get page access by implementing
//! [`SessionAccess`], and row queries through the [`RowMatcher`] it builds.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::Config;
use crate::driver::{Driver, Language, Node, NodeSpec, Role, Term, TermSpec, User, UserSpec};
use crate::rows::RowMatcher;
use crate::session::{Element, SelectorKind, Session};
use crate::{Error, Result};

/// Page access for step hosts
///
/// Implementors only provide [`SessionAccess::context`]; everything else is
/// derived from it.
#[async_trait]
pub trait SessionAccess {
    /// The context of the running scenario
    fn context(&self) -> Result<&StepContext>;

    /// The active browser session
    fn session(&self) -> Result<&Arc<dyn Session>> {
        Ok(&self.context()?.session)
    }

    /// Resolve a path against the configured base URL
    fn locate_path(&self, path: &str) -> Result<String> {
        Ok(self.context()?.config.locate_path(path))
    }

    /// Root element of the current page
    #[instrument(skip(self))]
    async fn page(&self) -> Result<Arc<dyn Element>> {
        self.session()?.page().await
    }

    /// URL of the current page
    #[instrument(skip(self))]
    async fn current_url(&self) -> Result<String> {
        self.session()?.current_url().await
    }

    /// Navigate to a path relative to the base URL
    #[instrument(skip(self))]
    async fn visit_path(&self, path: &str) -> Result<()> {
        let url = self.locate_path(path)?;
        debug!("Visiting {}", url);
        self.session()?.visit(&url).await
    }

    /// Row matcher over the whole current page
    #[instrument(skip(self))]
    async fn rows(&self) -> Result<RowMatcher> {
        let page = self.page().await?;
        Ok(RowMatcher::new(page, self.current_url().await?))
    }

    /// Element of a configured region
    #[instrument(skip(self))]
    async fn region(&self, name: &str) -> Result<Arc<dyn Element>> {
        let selector = self.context()?.config.region_selector(name)?.to_string();
        let page = self.page().await?;
        match page.find(SelectorKind::Css, &selector).await? {
            Some(region) => Ok(region),
            None => Err(Error::element_not_found(format!(
                "No region \"{}\" ({}) on the page {}",
                name,
                selector,
                self.current_url().await?
            ))),
        }
    }

    /// Click the first link matching `link`
    #[instrument(skip(self))]
    async fn click_link(&self, link: &str) -> Result<()> {
        let page = self.page().await?;
        match page.find(SelectorKind::Link, link).await? {
            Some(element) => element.click().await,
            None => Err(Error::element_not_found(format!(
                "No link to \"{}\" on the page {}",
                link,
                self.current_url().await?
            ))),
        }
    }

    /// Press the first button matching `button`
    #[instrument(skip(self))]
    async fn press_button(&self, button: &str) -> Result<()> {
        let page = self.page().await?;
        match page.find(SelectorKind::Button, button).await? {
            Some(element) => element.click().await,
            None => Err(Error::element_not_found(format!(
                "No button \"{}\" on the page {}",
                button,
                self.current_url().await?
            ))),
        }
    }

    /// Fill the first field matching `field` with `value`
    #[instrument(skip(self, value))]
    async fn fill_field(&self, field: &str, value: &str) -> Result<()> {
        let page = self.page().await?;
        match page.find(SelectorKind::Field, field).await? {
            Some(element) => element.set_value(value).await,
            None => Err(Error::element_not_found(format!(
                "No field \"{}\" on the page {}",
                field,
                self.current_url().await?
            ))),
        }
    }

    /// The current page is the given path
    #[instrument(skip(self))]
    async fn assert_path(&self, path: &str) -> Result<()> {
        let expected = self.locate_path(path)?;
        let actual = self.current_url().await?;
        if actual.trim_end_matches('/') == expected.trim_end_matches('/') {
            return Ok(());
        }
        Err(Error::assertion_failed(format!(
            "Current page is {}, but {} was expected",
            actual, expected
        )))
    }

    /// Write a screenshot of the current page and return its path
    #[instrument(skip(self))]
    async fn save_screenshot(&self, name: Option<&str>) -> Result<PathBuf> {
        let dir = self
            .context()?
            .config
            .screenshot_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir);
        let file_name = format!(
            "{}-{}.png",
            name.unwrap_or("screenshot"),
            chrono::Utc::now().format("%Y%m%d_%H%M%S%3f")
        );
        let path = dir.join(file_name);

        let png = self.session()?.screenshot().await?;
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(&path, png).await?;

        info!("Screenshot saved to {}", path.display());
        Ok(path)
    }
}

/// Fixtures created during one scenario
#[derive(Debug, Default)]
struct Fixtures {
    users: Vec<User>,
    nodes: Vec<Node>,
    terms: Vec<Term>,
    roles: Vec<Role>,
    languages: Vec<Language>,
}

/// Request-scoped context passed to every step
#[derive(Debug)]
pub struct StepContext {
    session: Arc<dyn Session>,
    driver: Arc<dyn Driver>,
    config: Arc<Config>,
    fixtures: Fixtures,
    current_user: Option<User>,
}

impl SessionAccess for StepContext {
    fn context(&self) -> Result<&StepContext> {
        Ok(self)
    }
}

impl StepContext {
    /// Create a new step context
    pub fn new(session: Arc<dyn Session>, driver: Arc<dyn Driver>, config: Arc<Config>) -> Self {
        Self {
            session,
            driver,
            config,
            fixtures: Fixtures::default(),
            current_user: None,
        }
    }

    /// Configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Authoring driver
    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    /// User the session is logged in as, if any
    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    /// Users created during this scenario
    pub fn users(&self) -> &[User] {
        &self.fixtures.users
    }

    /// Nodes created during this scenario
    pub fn nodes(&self) -> &[Node] {
        &self.fixtures.nodes
    }

    /// Whether the session shows signs of an authenticated user on the front page
    #[instrument(skip(self))]
    pub async fn logged_in(&self) -> Result<bool> {
        self.visit_path("/").await?;
        let page = self.page().await?;

        if page.find(SelectorKind::Css, "body.user-logged-in").await?.is_some() {
            return Ok(true);
        }
        Ok(page
            .find(SelectorKind::Link, &self.config.text.log_out)
            .await?
            .is_some())
    }

    /// Log in through the login form
    #[instrument(skip(self, user), fields(user = %user.name))]
    pub async fn login(&mut self, user: &User) -> Result<()> {
        if self.logged_in().await? {
            self.logout().await?;
        }

        self.visit_path("/user/login").await?;
        self.fill_field(&self.config.text.username_field, &user.name).await?;
        self.fill_field(&self.config.text.password_field, &user.pass).await?;
        self.press_button(&self.config.text.log_in).await?;

        let page = self.page().await?;
        if page
            .find(SelectorKind::Link, &self.config.text.log_out)
            .await?
            .is_none()
        {
            return Err(Error::assertion_failed(format!(
                "Failed to log in as user \"{}\" with role(s): \"{}\"",
                user.name,
                user.roles.join(", ")
            )));
        }

        info!("Logged in as {}", user.name);
        self.current_user = Some(user.clone());
        Ok(())
    }

    /// Log out
    #[instrument(skip(self))]
    pub async fn logout(&mut self) -> Result<()> {
        self.visit_path("/user/logout").await?;
        self.current_user = None;
        Ok(())
    }

    /// Create a user and remember it for cleanup
    #[instrument(skip(self, spec), fields(name = %spec.name))]
    pub async fn create_user(&mut self, spec: &UserSpec) -> Result<User> {
        let user = self.driver.create_user(spec).await?;
        info!("Created user {} ({})", user.name, user.uid);
        self.fixtures.users.push(user.clone());
        Ok(user)
    }

    /// Create a node and remember it for cleanup
    #[instrument(skip(self, spec), fields(title = %spec.title))]
    pub async fn create_node(&mut self, spec: &NodeSpec) -> Result<Node> {
        let node = self.driver.create_node(spec).await?;
        info!("Created {} node {} ({})", node.content_type, node.title, node.nid);
        self.fixtures.nodes.push(node.clone());
        Ok(node)
    }

    /// Create a taxonomy term and remember it for cleanup
    #[instrument(skip(self, spec), fields(name = %spec.name))]
    pub async fn create_term(&mut self, spec: &TermSpec) -> Result<Term> {
        let term = self.driver.create_term(spec).await?;
        info!("Created {} term {} ({})", term.vocabulary, term.name, term.tid);
        self.fixtures.terms.push(term.clone());
        Ok(term)
    }

    /// Create a role with the given permissions and remember it for cleanup
    #[instrument(skip(self))]
    pub async fn create_role(&mut self, permissions: &[String]) -> Result<Role> {
        let role = self.driver.create_role(permissions).await?;
        info!("Created role {}", role.rid);
        self.fixtures.roles.push(role.clone());
        Ok(role)
    }

    /// Enable a language and remember it for cleanup
    #[instrument(skip(self))]
    pub async fn create_language(&mut self, langcode: &str) -> Result<Language> {
        let language = self.driver.create_language(langcode).await?;
        info!("Enabled language {}", language.langcode);
        self.fixtures.languages.push(language.clone());
        Ok(language)
    }

    /// Find a user by name, among this scenario's fixtures first
    #[instrument(skip(self))]
    pub async fn user_by_name(&self, name: &str) -> Result<User> {
        if let Some(user) = self.fixtures.users.iter().find(|u| u.name == name) {
            return Ok(user.clone());
        }
        self.driver
            .find_user_by_name(name)
            .await?
            .ok_or_else(|| Error::driver(format!("No user named \"{}\" exists", name)))
    }

    /// Delete every fixture of the scenario and reset the session
    ///
    /// Every deletion is attempted; the first failure is returned.
    #[instrument(skip(self))]
    pub async fn cleanup(&mut self) -> Result<()> {
        let fixtures = std::mem::take(&mut self.fixtures);
        let mut first_error: Option<Error> = None;
        let mut record = |result: Result<()>, what: String| {
            if let Err(e) = result {
                warn!("Failed to delete {}: {}", what, e);
                first_error.get_or_insert(e);
            }
        };

        for node in fixtures.nodes.iter().rev() {
            record(self.driver.delete_node(node).await, format!("node {}", node.nid));
        }
        for term in fixtures.terms.iter().rev() {
            record(self.driver.delete_term(term).await, format!("term {}", term.tid));
        }
        for user in fixtures.users.iter().rev() {
            record(self.driver.delete_user(user).await, format!("user {}", user.name));
        }
        for role in fixtures.roles.iter().rev() {
            record(self.driver.delete_role(role).await, format!("role {}", role.rid));
        }
        for language in fixtures.languages.iter().rev() {
            record(
                self.driver.delete_language(language).await,
                format!("language {}", language.langcode),
            );
        }

        self.current_user = None;
        record(self.session.reset().await, "session state".to_string());

        debug!("Scenario cleanup finished");
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::MockDriver;
    use crate::session::{MockNode, MockSession};

    async fn site() -> (MockSession, Arc<MockDriver>, StepContext) {
        let session = MockSession::new("http://drupal.test");
        session.set_sign_in_path("/user").await;
        session
            .add_page(
                "/user/login",
                MockNode::document([
                    MockNode::field("Username", "name"),
                    MockNode::field("Password", "pass"),
                    MockNode::button("Log in").attr("formaction", "/user"),
                ]),
            )
            .await;
        session
            .add_signed_in_page("/user", MockNode::document([MockNode::link("Log out", "/user/logout")]))
            .await;
        session
            .add_page("/", MockNode::document([MockNode::new("footer").id("footer").text("Powered by Drupal")]))
            .await;

        let driver = Arc::new(MockDriver::new().rendering_into(session.clone()));
        let config = Config::default()
            .with_base_url("http://drupal.test")
            .with_region("footer", "#footer");
        let ctx = StepContext::new(Arc::new(session.clone()), driver.clone(), Arc::new(config));
        (session, driver, ctx)
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let (session, _driver, mut ctx) = site().await;
        let user = ctx.create_user(&UserSpec::new("alice")).await.unwrap();

        ctx.login(&user).await.unwrap();
        assert!(session.is_signed_in());
        assert_eq!(ctx.current_user().map(|u| u.name.as_str()), Some("alice"));

        ctx.logout().await.unwrap();
        assert!(!session.is_signed_in());
        assert!(ctx.current_user().is_none());
    }

    #[tokio::test]
    async fn test_login_failure_reported() {
        let (session, _driver, mut ctx) = site().await;
        session
            .add_page(
                "/user/login",
                MockNode::document([
                    MockNode::field("Username", "name"),
                    MockNode::field("Password", "pass"),
                    MockNode::button("Log in").attr("formaction", "/user/login"),
                ]),
            )
            .await;
        let user = ctx
            .create_user(&UserSpec::new("bob").with_role("administrator"))
            .await
            .unwrap();

        let err = ctx.login(&user).await.unwrap_err();
        assert!(matches!(err, Error::AssertionFailed(_)));
        assert!(err.to_string().contains("administrator"));
        assert!(ctx.current_user().is_none());
    }

    #[tokio::test]
    async fn test_cleanup_deletes_fixtures_in_dependency_order() {
        let (_session, driver, mut ctx) = site().await;
        let role = ctx.create_role(&["access content".to_string()]).await.unwrap();
        let author = ctx
            .create_user(&UserSpec::new("carol").with_role(role.rid.clone()))
            .await
            .unwrap();
        let mut spec = NodeSpec::new("page", "About");
        spec.author = Some(author.uid);
        ctx.create_node(&spec).await.unwrap();
        ctx.create_term(&TermSpec::new("tags", "Languages")).await.unwrap();
        let mut child = TermSpec::new("tags", "Rust");
        child.parent = Some("Languages".to_string());
        ctx.create_term(&child).await.unwrap();
        ctx.create_language("de").await.unwrap();

        // Authors and parent terms are only deletable once their dependants are gone
        assert!(driver.delete_user(&author).await.is_err());

        ctx.cleanup().await.unwrap();
        assert_eq!(driver.user_count().await, 0);
        assert_eq!(driver.node_count().await, 0);
        assert_eq!(driver.term_count().await, 0);
        assert!(!driver.has_role(&role.rid).await);
        assert!(!driver.has_language("de").await);
        assert!(ctx.users().is_empty());
        assert!(ctx.nodes().is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_reports_first_failure() {
        let (_session, driver, mut ctx) = site().await;
        let user = ctx.create_user(&UserSpec::new("dave")).await.unwrap();
        driver.delete_user(&user).await.unwrap();
        ctx.create_term(&TermSpec::new("tags", "Go")).await.unwrap();

        assert!(matches!(ctx.cleanup().await, Err(Error::Driver(_))));
        assert_eq!(driver.term_count().await, 0);
    }

    #[tokio::test]
    async fn test_user_by_name() {
        let (_session, driver, mut ctx) = site().await;
        ctx.create_user(&UserSpec::new("erin")).await.unwrap();
        driver.create_user(&UserSpec::new("frank")).await.unwrap();

        assert_eq!(ctx.user_by_name("erin").await.unwrap().name, "erin");
        assert_eq!(ctx.user_by_name("frank").await.unwrap().name, "frank");
        assert!(ctx.user_by_name("nobody").await.is_err());
    }

    #[tokio::test]
    async fn test_region_and_paths() {
        let (_session, _driver, ctx) = site().await;
        ctx.visit_path("/").await.unwrap();
        ctx.assert_path("/").await.unwrap();
        assert!(ctx.assert_path("/user").await.is_err());

        let footer = ctx.region("footer").await.unwrap();
        assert_eq!(footer.text().await.unwrap(), "Powered by Drupal");
        assert!(matches!(ctx.region("sidebar").await, Err(Error::Configuration(_))));
    }

    #[tokio::test]
    async fn test_missing_controls() {
        let (_session, _driver, ctx) = site().await;
        ctx.visit_path("/").await.unwrap();
        assert!(matches!(ctx.click_link("Nope").await, Err(Error::ElementNotFound(_))));
        assert!(matches!(ctx.press_button("Nope").await, Err(Error::ElementNotFound(_))));
        assert!(matches!(ctx.fill_field("Nope", "x").await, Err(Error::ElementNotFound(_))));
    }

    #[tokio::test]
    async fn test_save_screenshot() {
        let dir = tempfile::tempdir().unwrap();
        let session = MockSession::default();
        let mut config = Config::default();
        config.screenshot_dir = Some(dir.path().join("shots"));
        let ctx = StepContext::new(Arc::new(session), Arc::new(MockDriver::new()), Arc::new(config));

        let path = ctx.save_screenshot(Some("failure")).await.unwrap();
        assert!(path.starts_with(dir.path()));
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("failure-"));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[tokio::test]
    async fn test_rows_from_context() {
        let (_session, driver, mut ctx) = site().await;
        ctx.create_node(&NodeSpec::new("article", "Hello")).await.unwrap();
        assert_eq!(driver.node_count().await, 1);

        ctx.visit_path("/admin/content").await.unwrap();
        let rows = ctx.rows().await.unwrap();
        assert_eq!(rows.location(), "http://drupal.test/admin/content");
        let row = rows.get_row("Hello").await.unwrap();
        assert!(row.text().await.unwrap().contains("Anonymous"));
    }
}

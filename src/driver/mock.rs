//! Mock driver implementation for testing
//!
//! Keeps every fixture in memory. When attached to a [`MockSession`] it also
//! renders the pages a Drupal site would show for them: node and term pages,
//! plus the `/admin/content` and `/admin/people` listings.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use super::traits::{Driver, Language, Node, NodeSpec, Role, Term, TermSpec, User, UserSpec};
use crate::session::{MockNode, MockSession};
use crate::{Error, Result};

/// Roles every Drupal site ships with
const BUILT_IN_ROLES: [&str; 3] = ["anonymous", "authenticated", "administrator"];

/// Mock authoring driver
#[derive(Debug)]
pub struct MockDriver {
    users: RwLock<BTreeMap<u64, User>>,
    nodes: RwLock<BTreeMap<u64, Node>>,
    terms: RwLock<BTreeMap<u64, Term>>,
    roles: RwLock<BTreeMap<String, Role>>,
    languages: RwLock<BTreeSet<String>>,
    next_id: AtomicU64,
    cache_clears: AtomicU64,
    cron_runs: AtomicU64,
    session: Option<MockSession>,
}

impl MockDriver {
    /// Create a new mock driver
    pub fn new() -> Self {
        let roles = BUILT_IN_ROLES
            .iter()
            .map(|rid| {
                (
                    rid.to_string(),
                    Role {
                        rid: rid.to_string(),
                        permissions: Vec::new(),
                    },
                )
            })
            .collect();

        Self {
            users: RwLock::new(BTreeMap::new()),
            nodes: RwLock::new(BTreeMap::new()),
            terms: RwLock::new(BTreeMap::new()),
            roles: RwLock::new(roles),
            languages: RwLock::new(BTreeSet::from(["en".to_string()])),
            next_id: AtomicU64::new(1),
            cache_clears: AtomicU64::new(0),
            cron_runs: AtomicU64::new(0),
            session: None,
        }
    }

    /// Render fixture pages into the given session
    pub fn rendering_into(mut self, session: MockSession) -> Self {
        self.session = Some(session);
        self
    }

    /// Register an existing role
    pub async fn add_role(&self, rid: &str) {
        self.roles.write().await.insert(
            rid.to_string(),
            Role {
                rid: rid.to_string(),
                permissions: Vec::new(),
            },
        );
    }

    /// Number of users
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Number of nodes
    pub async fn node_count(&self) -> usize {
        self.nodes.read().await.len()
    }

    /// Number of terms
    pub async fn term_count(&self) -> usize {
        self.terms.read().await.len()
    }

    /// Whether a role exists
    pub async fn has_role(&self, rid: &str) -> bool {
        self.roles.read().await.contains_key(rid)
    }

    /// Whether a language is enabled
    pub async fn has_language(&self, langcode: &str) -> bool {
        self.languages.read().await.contains(langcode)
    }

    /// Number of cache clears
    pub fn cache_clears(&self) -> u64 {
        self.cache_clears.load(Ordering::Relaxed)
    }

    /// Number of cron runs
    pub fn cron_runs(&self) -> u64 {
        self.cron_runs.load(Ordering::Relaxed)
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    async fn render_listings(&self) {
        let Some(session) = &self.session else {
            return;
        };

        let users = self.users.read().await;
        let nodes = self.nodes.read().await;

        let content_rows = nodes.values().map(|node| {
            let author = node
                .author
                .and_then(|uid| users.get(&uid))
                .map(|user| user.name.as_str())
                .unwrap_or("Anonymous");
            MockNode::new("tr")
                .child(MockNode::new("td").child(MockNode::link(&node.title, &node.path())))
                .child(MockNode::new("td").text(&node.content_type))
                .child(MockNode::new("td").text(author))
                .child(MockNode::new("td").text(if node.status { "Published" } else { "Unpublished" }))
                .child(MockNode::new("td").child(MockNode::link("Edit", &format!("{}/edit", node.path()))))
        });
        session
            .add_page(
                "/admin/content",
                MockNode::document([
                    MockNode::heading(1, "Content"),
                    MockNode::new("table").child(MockNode::new("tbody").children(content_rows)),
                ]),
            )
            .await;

        let people_rows = users.values().map(|user| {
            MockNode::new("tr")
                .child(MockNode::new("td").text(&user.name))
                .child(MockNode::new("td").text(if user.status { "Active" } else { "Blocked" }))
                .child(MockNode::new("td").text(&user.roles.join(", ")))
                .child(MockNode::new("td").child(MockNode::link("Edit", &format!("/user/{}/edit", user.uid))))
        });
        session
            .add_page(
                "/admin/people",
                MockNode::document([
                    MockNode::heading(1, "People"),
                    MockNode::new("table").child(MockNode::new("tbody").children(people_rows)),
                ]),
            )
            .await;
    }

    async fn render_node(&self, node: &Node) {
        if let Some(session) = &self.session {
            let fields = node.fields.iter().map(|(name, value)| {
                MockNode::new("div")
                    .class(&format!("field--name-{}", name.replace('_', "-")))
                    .text(value)
            });
            session
                .add_page(
                    &node.path(),
                    MockNode::document([
                        MockNode::heading(1, &node.title),
                        MockNode::new("article")
                            .class(&format!("node--type-{}", node.content_type))
                            .children(fields),
                    ]),
                )
                .await;
        }
    }

    async fn render_term(&self, term: &Term) {
        if let Some(session) = &self.session {
            session
                .add_page(&term.path(), MockNode::document([MockNode::heading(1, &term.name)]))
                .await;
        }
    }

    async fn unrender(&self, path: &str) {
        if let Some(session) = &self.session {
            session
                .add_page(path, MockNode::document([MockNode::heading(1, "Page not found")]))
                .await;
        }
    }
}

impl Default for MockDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Driver for MockDriver {
    async fn create_user(&self, spec: &UserSpec) -> Result<User> {
        {
            let roles = self.roles.read().await;
            if let Some(missing) = spec.roles.iter().find(|rid| !roles.contains_key(rid.as_str())) {
                return Err(Error::driver(format!("No role named \"{}\" exists", missing)));
            }
        }

        let user = {
            let mut users = self.users.write().await;
            if users.values().any(|u| u.name == spec.name) {
                return Err(Error::driver(format!("A user named \"{}\" already exists", spec.name)));
            }

            let user = User {
                uid: self.next_id(),
                name: spec.name.clone(),
                mail: spec.mail.clone(),
                pass: spec.pass.clone(),
                roles: spec.roles.clone(),
                status: spec.status,
            };
            users.insert(user.uid, user.clone());
            user
        };

        debug!("MockDriver: created user {} ({})", user.name, user.uid);
        self.render_listings().await;
        Ok(user)
    }

    async fn delete_user(&self, user: &User) -> Result<()> {
        if let Some(node) = self
            .nodes
            .read()
            .await
            .values()
            .find(|node| node.author == Some(user.uid))
        {
            return Err(Error::driver(format!(
                "User \"{}\" still authors node {}",
                user.name, node.nid
            )));
        }

        self.users
            .write()
            .await
            .remove(&user.uid)
            .ok_or_else(|| Error::driver(format!("No user with uid {}", user.uid)))?;
        self.render_listings().await;
        Ok(())
    }

    async fn add_role_to_user(&self, user: &User, role: &str) -> Result<()> {
        if !self.has_role(role).await {
            return Err(Error::driver(format!("No role named \"{}\" exists", role)));
        }

        {
            let mut users = self.users.write().await;
            let stored = users
                .get_mut(&user.uid)
                .ok_or_else(|| Error::driver(format!("No user with uid {}", user.uid)))?;
            if !stored.roles.iter().any(|r| r == role) {
                stored.roles.push(role.to_string());
            }
        }

        self.render_listings().await;
        Ok(())
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>> {
        Ok(self.users.read().await.values().find(|u| u.name == name).cloned())
    }

    async fn create_node(&self, spec: &NodeSpec) -> Result<Node> {
        if let Some(uid) = spec.author {
            if !self.users.read().await.contains_key(&uid) {
                return Err(Error::driver(format!("Author uid {} does not exist", uid)));
            }
        }

        let node = Node {
            nid: self.next_id(),
            content_type: spec.content_type.clone(),
            title: spec.title.clone(),
            author: spec.author,
            status: spec.status,
            fields: spec.fields.clone(),
        };
        self.nodes.write().await.insert(node.nid, node.clone());

        debug!("MockDriver: created {} node {} ({})", node.content_type, node.title, node.nid);
        self.render_node(&node).await;
        self.render_listings().await;
        Ok(node)
    }

    async fn delete_node(&self, node: &Node) -> Result<()> {
        self.nodes
            .write()
            .await
            .remove(&node.nid)
            .ok_or_else(|| Error::driver(format!("No node with nid {}", node.nid)))?;
        self.unrender(&node.path()).await;
        self.render_listings().await;
        Ok(())
    }

    async fn create_term(&self, spec: &TermSpec) -> Result<Term> {
        let term = {
            let mut terms = self.terms.write().await;
            let parent = match &spec.parent {
                Some(parent_name) => Some(
                    terms
                        .values()
                        .find(|t| t.vocabulary == spec.vocabulary && &t.name == parent_name)
                        .map(|t| t.tid)
                        .ok_or_else(|| {
                            Error::driver(format!(
                                "No parent term \"{}\" in vocabulary \"{}\"",
                                parent_name, spec.vocabulary
                            ))
                        })?,
                ),
                None => None,
            };

            let term = Term {
                tid: self.next_id(),
                vocabulary: spec.vocabulary.clone(),
                name: spec.name.clone(),
                parent,
            };
            terms.insert(term.tid, term.clone());
            term
        };

        self.render_term(&term).await;
        Ok(term)
    }

    async fn delete_term(&self, term: &Term) -> Result<()> {
        {
            let mut terms = self.terms.write().await;
            if let Some(child) = terms.values().find(|t| t.parent == Some(term.tid)) {
                return Err(Error::driver(format!(
                    "Term \"{}\" still has child term \"{}\"",
                    term.name, child.name
                )));
            }
            terms
                .remove(&term.tid)
                .ok_or_else(|| Error::driver(format!("No term with tid {}", term.tid)))?;
        }
        self.unrender(&term.path()).await;
        Ok(())
    }

    async fn create_role(&self, permissions: &[String]) -> Result<Role> {
        let role = Role {
            rid: format!("role_{}", self.next_id()),
            permissions: permissions.to_vec(),
        };
        self.roles.write().await.insert(role.rid.clone(), role.clone());
        Ok(role)
    }

    async fn delete_role(&self, role: &Role) -> Result<()> {
        if BUILT_IN_ROLES.contains(&role.rid.as_str()) {
            return Err(Error::driver(format!("Role \"{}\" cannot be deleted", role.rid)));
        }

        self.roles
            .write()
            .await
            .remove(&role.rid)
            .ok_or_else(|| Error::driver(format!("No role named \"{}\" exists", role.rid)))?;

        for user in self.users.write().await.values_mut() {
            user.roles.retain(|r| r != &role.rid);
        }
        self.render_listings().await;
        Ok(())
    }

    async fn create_language(&self, langcode: &str) -> Result<Language> {
        if !self.languages.write().await.insert(langcode.to_string()) {
            return Err(Error::driver(format!("Language \"{}\" is already enabled", langcode)));
        }
        Ok(Language {
            langcode: langcode.to_string(),
        })
    }

    async fn delete_language(&self, language: &Language) -> Result<()> {
        if !self.languages.write().await.remove(&language.langcode) {
            return Err(Error::driver(format!("Language \"{}\" is not enabled", language.langcode)));
        }
        Ok(())
    }

    async fn clear_cache(&self, cache_type: Option<&str>) -> Result<()> {
        debug!("MockDriver: clearing cache {:?}", cache_type);
        self.cache_clears.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn run_cron(&self) -> Result<()> {
        self.cron_runs.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{SelectorKind, Session};

    #[tokio::test]
    async fn test_create_and_delete_user() {
        let driver = MockDriver::new();
        let user = driver
            .create_user(&UserSpec::new("alice").with_role("administrator"))
            .await
            .unwrap();
        assert_eq!(user.name, "alice");
        assert_eq!(driver.user_count().await, 1);

        let found = driver.find_user_by_name("alice").await.unwrap();
        assert_eq!(found, Some(user.clone()));

        driver.delete_user(&user).await.unwrap();
        assert_eq!(driver.user_count().await, 0);
        assert!(driver.delete_user(&user).await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_user_rejected() {
        let driver = MockDriver::new();
        driver.create_user(&UserSpec::new("bob")).await.unwrap();
        let result = driver.create_user(&UserSpec::new("bob")).await;
        assert!(matches!(result, Err(Error::Driver(_))));
    }

    #[tokio::test]
    async fn test_unknown_role_rejected() {
        let driver = MockDriver::new();
        let result = driver.create_user(&UserSpec::new("carol").with_role("editor")).await;
        assert!(matches!(result, Err(Error::Driver(_))));

        driver.add_role("editor").await;
        let user = driver.create_user(&UserSpec::new("carol")).await.unwrap();
        driver.add_role_to_user(&user, "editor").await.unwrap();
        let stored = driver.find_user_by_name("carol").await.unwrap().unwrap();
        assert_eq!(stored.roles, vec!["editor".to_string()]);
    }

    #[tokio::test]
    async fn test_node_author_must_exist() {
        let driver = MockDriver::new();
        let mut spec = NodeSpec::new("article", "Hello");
        spec.author = Some(42);
        assert!(driver.create_node(&spec).await.is_err());
    }

    #[tokio::test]
    async fn test_term_parent_lookup() {
        let driver = MockDriver::new();
        let parent = driver.create_term(&TermSpec::new("tags", "Languages")).await.unwrap();

        let mut child = TermSpec::new("tags", "Rust");
        child.parent = Some("Languages".to_string());
        let term = driver.create_term(&child).await.unwrap();
        assert_eq!(term.parent, Some(parent.tid));

        let mut orphan = TermSpec::new("topics", "Go");
        orphan.parent = Some("Languages".to_string());
        assert!(driver.create_term(&orphan).await.is_err());
    }

    #[tokio::test]
    async fn test_author_deleted_after_nodes() {
        let driver = MockDriver::new();
        let author = driver.create_user(&UserSpec::new("dana")).await.unwrap();
        let mut spec = NodeSpec::new("article", "Owned");
        spec.author = Some(author.uid);
        let node = driver.create_node(&spec).await.unwrap();

        assert!(matches!(driver.delete_user(&author).await, Err(Error::Driver(_))));
        assert_eq!(driver.user_count().await, 1);

        driver.delete_node(&node).await.unwrap();
        driver.delete_user(&author).await.unwrap();
        assert_eq!(driver.user_count().await, 0);
    }

    #[tokio::test]
    async fn test_parent_term_deleted_after_children() {
        let driver = MockDriver::new();
        let parent = driver.create_term(&TermSpec::new("tags", "Languages")).await.unwrap();
        let mut spec = TermSpec::new("tags", "Rust");
        spec.parent = Some("Languages".to_string());
        let child = driver.create_term(&spec).await.unwrap();

        assert!(matches!(driver.delete_term(&parent).await, Err(Error::Driver(_))));
        driver.delete_term(&child).await.unwrap();
        driver.delete_term(&parent).await.unwrap();
        assert_eq!(driver.term_count().await, 0);
    }

    #[tokio::test]
    async fn test_roles_and_languages() {
        let driver = MockDriver::new();
        let role = driver
            .create_role(&["access content".to_string()])
            .await
            .unwrap();
        assert!(driver.has_role(&role.rid).await);
        driver.delete_role(&role).await.unwrap();
        assert!(!driver.has_role(&role.rid).await);

        let administrator = Role {
            rid: "administrator".to_string(),
            permissions: Vec::new(),
        };
        assert!(driver.delete_role(&administrator).await.is_err());

        let fr = driver.create_language("fr").await.unwrap();
        assert!(driver.has_language("fr").await);
        assert!(driver.create_language("fr").await.is_err());
        driver.delete_language(&fr).await.unwrap();
        assert!(!driver.has_language("fr").await);
    }

    #[tokio::test]
    async fn test_cache_and_cron_counters() {
        let driver = MockDriver::new();
        driver.clear_cache(None).await.unwrap();
        driver.clear_cache(Some("render")).await.unwrap();
        driver.run_cron().await.unwrap();
        assert_eq!(driver.cache_clears(), 2);
        assert_eq!(driver.cron_runs(), 1);
    }

    #[tokio::test]
    async fn test_renders_listings_into_session() {
        let session = MockSession::default();
        let driver = MockDriver::new().rendering_into(session.clone());

        let author = driver.create_user(&UserSpec::new("alice")).await.unwrap();
        let mut spec = NodeSpec::new("article", "First post");
        spec.author = Some(author.uid);
        let node = driver.create_node(&spec).await.unwrap();

        session.visit("/admin/content").await.unwrap();
        let rows = session
            .page()
            .await
            .unwrap()
            .find_all(SelectorKind::Css, "tr")
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text().await.unwrap(), "First post article alice Published Edit");

        session.visit(&node.path()).await.unwrap();
        let heading = session
            .page()
            .await
            .unwrap()
            .find(SelectorKind::Css, "h1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(heading.text().await.unwrap(), "First post");
    }
}

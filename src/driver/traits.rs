//! Authoring driver traits
//!
//! The driver provisions backend fixtures on the site under test. Steps only
//! consume it; how a driver talks to Drupal is its own business.

use async_trait::async_trait;
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::BTreeMap;

use crate::Result;

/// Random lower-case alphanumeric string
pub fn random_name(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// User to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSpec {
    pub name: String,
    pub mail: String,
    pub pass: String,
    pub roles: Vec<String>,
    /// Active (true) or blocked
    pub status: bool,
}

impl UserSpec {
    /// Active user with the given name, a derived mail and a random password
    pub fn new<S: Into<String>>(name: S) -> Self {
        let name = name.into();
        Self {
            mail: format!("{}@example.com", name),
            pass: random_name(16),
            name,
            roles: Vec::new(),
            status: true,
        }
    }

    /// Active user with a random name
    pub fn random() -> Self {
        Self::new(random_name(8))
    }

    /// Add a role
    pub fn with_role<S: Into<String>>(mut self, role: S) -> Self {
        self.roles.push(role.into());
        self
    }
}

/// User that exists on the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub uid: u64,
    pub name: String,
    pub mail: String,
    pub pass: String,
    pub roles: Vec<String>,
    pub status: bool,
}

/// Node to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSpec {
    pub content_type: String,
    pub title: String,
    /// Author uid; anonymous when unset
    pub author: Option<u64>,
    /// Published (true) or unpublished
    pub status: bool,
    /// Additional field values keyed by field name
    pub fields: BTreeMap<String, String>,
}

impl NodeSpec {
    /// Published node of the given type
    pub fn new<T: Into<String>, S: Into<String>>(content_type: T, title: S) -> Self {
        Self {
            content_type: content_type.into(),
            title: title.into(),
            author: None,
            status: true,
            fields: BTreeMap::new(),
        }
    }
}

/// Node that exists on the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub nid: u64,
    pub content_type: String,
    pub title: String,
    pub author: Option<u64>,
    pub status: bool,
    pub fields: BTreeMap<String, String>,
}

impl Node {
    /// Canonical path of the node
    pub fn path(&self) -> String {
        format!("/node/{}", self.nid)
    }
}

/// Taxonomy term to create
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermSpec {
    pub vocabulary: String,
    pub name: String,
    /// Name of the parent term in the same vocabulary
    pub parent: Option<String>,
    pub description: Option<String>,
}

impl TermSpec {
    /// Top-level term
    pub fn new<V: Into<String>, S: Into<String>>(vocabulary: V, name: S) -> Self {
        Self {
            vocabulary: vocabulary.into(),
            name: name.into(),
            parent: None,
            description: None,
        }
    }
}

/// Taxonomy term that exists on the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub tid: u64,
    pub vocabulary: String,
    pub name: String,
    pub parent: Option<u64>,
}

impl Term {
    /// Canonical path of the term
    pub fn path(&self) -> String {
        format!("/taxonomy/term/{}", self.tid)
    }
}

/// Role that exists on the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    /// Machine name
    pub rid: String,
    pub permissions: Vec<String>,
}

/// Language enabled on the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub langcode: String,
}

/// Authoring driver trait
#[async_trait]
pub trait Driver: Send + Sync + std::fmt::Debug {
    /// Create a user
    async fn create_user(&self, spec: &UserSpec) -> Result<User>;

    /// Delete a user
    async fn delete_user(&self, user: &User) -> Result<()>;

    /// Grant a role to a user
    async fn add_role_to_user(&self, user: &User, role: &str) -> Result<()>;

    /// Look up a user by name
    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>>;

    /// Create a node
    async fn create_node(&self, spec: &NodeSpec) -> Result<Node>;

    /// Delete a node
    async fn delete_node(&self, node: &Node) -> Result<()>;

    /// Create a taxonomy term
    async fn create_term(&self, spec: &TermSpec) -> Result<Term>;

    /// Delete a taxonomy term
    async fn delete_term(&self, term: &Term) -> Result<()>;

    /// Create a role holding exactly the given permissions
    async fn create_role(&self, permissions: &[String]) -> Result<Role>;

    /// Delete a role
    async fn delete_role(&self, role: &Role) -> Result<()>;

    /// Enable a language
    async fn create_language(&self, langcode: &str) -> Result<Language>;

    /// Disable a language
    async fn delete_language(&self, language: &Language) -> Result<()>;

    /// Clear a cache bin, or every cache when `None`
    async fn clear_cache(&self, cache_type: Option<&str>) -> Result<()>;

    /// Run scheduled maintenance tasks
    async fn run_cron(&self) -> Result<()>;
}

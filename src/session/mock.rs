//! Mock session implementation for testing
//!
//! An in-memory site: pages are registered as [`MockNode`] trees keyed by
//! path and rendered into fresh [`MockElement`] trees on every visit. Links
//! navigate on click, buttons navigate to their `formaction`, and visiting the
//! configured sign-in or sign-out path flips the session's signed-in flag so
//! the same path can render differently for authenticated users.

use async_trait::async_trait;
use phf::phf_set;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::selector::{Selector, SelectorTarget};
use super::traits::{Element, SelectorKind, Session};
use crate::{Error, Result};

/// `<input>` types that render as buttons
static BUTTON_INPUT_TYPES: phf::Set<&'static str> = phf_set! {
    "submit",
    "button",
    "reset",
    "image",
};

/// `<input>` types that are not fillable fields
static NON_FIELD_INPUT_TYPES: phf::Set<&'static str> = phf_set! {
    "submit",
    "button",
    "reset",
    "image",
    "hidden",
};

/// Static description of a page node
#[derive(Debug, Clone, Default)]
pub struct MockNode {
    tag: String,
    attributes: BTreeMap<String, String>,
    text: Option<String>,
    children: Vec<MockNode>,
}

impl MockNode {
    /// Create a node with the given tag
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    /// Set an attribute
    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    /// Set the `id` attribute
    pub fn id(self, id: &str) -> Self {
        self.attr("id", id)
    }

    /// Append a class
    pub fn class(mut self, class: &str) -> Self {
        let classes = match self.attributes.remove("class") {
            Some(existing) => format!("{} {}", existing, class),
            None => class.to_string(),
        };
        self.attributes.insert("class".to_string(), classes);
        self
    }

    /// Set the node's own text
    pub fn text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    /// Append a child
    pub fn child(mut self, child: MockNode) -> Self {
        self.children.push(child);
        self
    }

    /// Append children
    pub fn children<I: IntoIterator<Item = MockNode>>(mut self, children: I) -> Self {
        self.children.extend(children);
        self
    }

    /// `<html><body>` wrapping the given content
    pub fn document<I: IntoIterator<Item = MockNode>>(content: I) -> Self {
        Self::new("html").child(Self::new("body").children(content))
    }

    /// `<a href>` link
    pub fn link(text: &str, href: &str) -> Self {
        Self::new("a").attr("href", href).text(text)
    }

    /// Submit button
    pub fn button(label: &str) -> Self {
        Self::new("button").attr("type", "submit").text(label)
    }

    /// Heading of the given level
    pub fn heading(level: u8, text: &str) -> Self {
        Self::new(&format!("h{}", level.clamp(1, 6))).text(text)
    }

    /// Labelled text input, the way Drupal's form API renders one
    pub fn field(label: &str, name: &str) -> Self {
        let id = format!("edit-{}", name.replace('_', "-"));
        Self::new("div")
            .class("form-item")
            .child(Self::new("label").attr("for", &id).text(label))
            .child(Self::new("input").attr("type", "text").attr("name", name).id(&id))
    }

    /// `<tr>` with one `<td>` per cell
    pub fn row(cells: &[&str]) -> Self {
        Self::new("tr").children(cells.iter().map(|cell| Self::new("td").text(cell)))
    }

    /// `<table><tbody>` with one row per entry
    pub fn table(rows: &[&[&str]]) -> Self {
        Self::new("table").child(Self::new("tbody").children(rows.iter().map(|cells| Self::row(cells))))
    }

    fn not_found() -> Self {
        Self::document([Self::heading(1, "Page not found")])
    }

    fn blank() -> Self {
        Self::document([])
    }
}

/// Mock element reference
#[derive(Debug)]
pub struct MockElement {
    id: String,
    tag: String,
    attributes: BTreeMap<String, String>,
    text: Option<String>,
    hidden: bool,
    value: RwLock<Option<String>>,
    children: Vec<Arc<MockElement>>,
    state: Weak<MockState>,
}

impl MockElement {
    fn build(node: &MockNode, parent_hidden: bool, state: &Weak<MockState>) -> Arc<Self> {
        let hidden = parent_hidden
            || node.attributes.contains_key("hidden")
            || node
                .attributes
                .get("style")
                .map(|style| style.replace(' ', "").contains("display:none"))
                .unwrap_or(false);

        Arc::new(Self {
            id: Uuid::new_v4().to_string(),
            tag: node.tag.clone(),
            attributes: node.attributes.clone(),
            text: node.text.clone(),
            hidden,
            value: RwLock::new(node.attributes.get("value").cloned()),
            children: node
                .children
                .iter()
                .map(|child| Self::build(child, hidden, state))
                .collect(),
            state: state.clone(),
        })
    }

    fn rendered_text(&self) -> String {
        let mut words = Vec::new();
        self.push_words(&mut words);
        words.join(" ")
    }

    fn push_words<'a>(&'a self, words: &mut Vec<&'a str>) {
        if let Some(text) = &self.text {
            words.extend(text.split_whitespace());
        }
        for child in &self.children {
            child.push_words(words);
        }
    }

    fn describe(&self) -> String {
        match (self.attributes.get("id"), self.text.as_deref()) {
            (Some(id), _) => format!("{}#{}", self.tag, id),
            (None, Some(text)) => format!("{} \"{}\"", self.tag, text.trim()),
            (None, None) => self.tag.clone(),
        }
    }

    fn is_form_field(&self) -> bool {
        match self.tag.as_str() {
            "textarea" | "select" => true,
            "input" => !NON_FIELD_INPUT_TYPES.contains(self.input_type()),
            _ => false,
        }
    }

    fn is_button(&self) -> bool {
        match self.tag.as_str() {
            "button" => true,
            "input" => BUTTON_INPUT_TYPES.contains(self.input_type()),
            _ => false,
        }
    }

    fn input_type(&self) -> &str {
        self.attributes.get("type").map(String::as_str).unwrap_or("text")
    }

    fn attr_is(&self, name: &str, expected: &str) -> bool {
        self.attributes.get(name).map(String::as_str) == Some(expected)
    }

    /// Walk descendants in document order, keeping those the predicate accepts
    fn walk<'a, F>(&'a self, ancestors: &mut Vec<&'a MockElement>, accept: &F, out: &mut Vec<Arc<MockElement>>)
    where
        F: Fn(&MockElement, &[&MockElement]) -> bool,
    {
        ancestors.push(self);
        for child in &self.children {
            if accept(child.as_ref(), ancestors.as_slice()) {
                out.push(child.clone());
            }
            child.walk(ancestors, accept, out);
        }
        ancestors.pop();
    }

    fn select<F>(&self, accept: F) -> Vec<Arc<MockElement>>
    where
        F: Fn(&MockElement, &[&MockElement]) -> bool,
    {
        let mut out = Vec::new();
        self.walk(&mut Vec::new(), &accept, &mut out);
        out
    }

    fn select_fields(&self, locator: &str) -> Vec<Arc<MockElement>> {
        let labelled_ids: HashSet<String> = self
            .select(|el, _| el.tag == "label" && el.rendered_text().contains(locator))
            .iter()
            .filter_map(|label| label.attributes.get("for").cloned())
            .collect();

        self.select(|el, ancestors| {
            el.is_form_field()
                && (el.attr_is("id", locator)
                    || el.attr_is("name", locator)
                    || el.attr_is("placeholder", locator)
                    || el
                        .attributes
                        .get("id")
                        .map(|id| labelled_ids.contains(id))
                        .unwrap_or(false)
                    || ancestors
                        .iter()
                        .any(|a| a.tag == "label" && a.rendered_text().contains(locator)))
        })
    }
}

impl SelectorTarget for MockElement {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

#[async_trait]
impl Element for MockElement {
    fn id(&self) -> &str {
        &self.id
    }

    async fn tag_name(&self) -> Result<String> {
        Ok(self.tag.clone())
    }

    async fn text(&self) -> Result<String> {
        Ok(self.rendered_text())
    }

    async fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(self.attributes.get(name).cloned())
    }

    async fn value(&self) -> Result<Option<String>> {
        Ok(self.value.read().await.clone())
    }

    async fn set_value(&self, value: &str) -> Result<()> {
        if !self.is_form_field() {
            return Err(Error::session(format!("{} is not a form field", self.describe())));
        }
        *self.value.write().await = Some(value.to_string());
        Ok(())
    }

    async fn click(&self) -> Result<()> {
        if self.hidden {
            return Err(Error::session(format!("{} is not visible", self.describe())));
        }

        let state = self
            .state
            .upgrade()
            .ok_or_else(|| Error::session("Session has been closed"))?;
        state.clicks.write().await.push(self.describe());

        let target = match self.tag.as_str() {
            "a" => self.attributes.get("href"),
            "button" | "input" => self.attributes.get("formaction"),
            _ => None,
        };

        if let Some(target) = target {
            state.navigate(target).await?;
        }
        Ok(())
    }

    async fn is_visible(&self) -> Result<bool> {
        Ok(!self.hidden)
    }

    async fn find_all(&self, kind: SelectorKind, locator: &str) -> Result<Vec<Arc<dyn Element>>> {
        let found = match kind {
            SelectorKind::Css => {
                let selector = Selector::parse(locator)?;
                self.select(|el, ancestors| selector.matches(el, ancestors))
            }
            SelectorKind::XPath => {
                return Err(Error::session("XPath selectors are not supported by the mock session"));
            }
            SelectorKind::Link => self.select(|el, _| {
                el.tag == "a"
                    && el.attributes.contains_key("href")
                    && (el.attr_is("id", locator)
                        || el.attr_is("title", locator)
                        || el.rendered_text().contains(locator))
            }),
            SelectorKind::Button => self.select(|el, _| {
                el.is_button()
                    && (el.attr_is("id", locator)
                        || el.attr_is("name", locator)
                        || el.attr_is("title", locator)
                        || el
                            .attributes
                            .get("value")
                            .map(|value| value.contains(locator))
                            .unwrap_or(false)
                        || el.rendered_text().contains(locator))
            }),
            SelectorKind::Field => self.select_fields(locator),
        };

        Ok(found.into_iter().map(|el| el as Arc<dyn Element>).collect())
    }
}

/// Shared state behind a [`MockSession`] and the elements it renders
#[derive(Debug)]
struct MockState {
    base_url: String,
    pages: RwLock<HashMap<String, MockNode>>,
    signed_in_pages: RwLock<HashMap<String, MockNode>>,
    sign_in_path: RwLock<Option<String>>,
    sign_out_path: String,
    signed_in: AtomicBool,
    current_url: RwLock<String>,
    current_page: RwLock<Option<Arc<MockElement>>>,
    history: RwLock<Vec<String>>,
    clicks: RwLock<Vec<String>>,
}

impl MockState {
    fn absolute(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else {
            format!("{}/{}", self.base_url.trim_end_matches('/'), url.trim_start_matches('/'))
        }
    }

    async fn navigate(self: &Arc<Self>, url: &str) -> Result<()> {
        let absolute = self.absolute(url);
        let path = path_of(&absolute);

        if path == self.sign_out_path {
            self.signed_in.store(false, Ordering::Relaxed);
        }
        if self.sign_in_path.read().await.as_deref() == Some(path.as_str()) {
            self.signed_in.store(true, Ordering::Relaxed);
        }

        let signed_in_page = if self.signed_in.load(Ordering::Relaxed) {
            self.signed_in_pages.read().await.get(&path).cloned()
        } else {
            None
        };
        let node = match signed_in_page {
            Some(node) => node,
            None => self
                .pages
                .read()
                .await
                .get(&path)
                .cloned()
                .unwrap_or_else(MockNode::not_found),
        };

        let root = MockElement::build(&node, false, &Arc::downgrade(self));
        *self.current_url.write().await = absolute.clone();
        *self.current_page.write().await = Some(root);
        self.history.write().await.push(absolute);
        Ok(())
    }
}

/// Path, with query string, of an absolute URL
fn path_of(url: &str) -> String {
    let without_fragment = url.split('#').next().unwrap_or_default();
    let path = match without_fragment.find("://") {
        Some(scheme_end) => {
            let rest = &without_fragment[scheme_end + 3..];
            rest.find('/').map(|slash| &rest[slash..]).unwrap_or("/")
        }
        None => without_fragment,
    };

    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

/// Mock browser session
#[derive(Debug, Clone)]
pub struct MockSession {
    state: Arc<MockState>,
}

impl MockSession {
    /// Create a new mock session serving pages under `base_url`
    pub fn new(base_url: &str) -> Self {
        Self {
            state: Arc::new(MockState {
                base_url: base_url.to_string(),
                pages: RwLock::new(HashMap::new()),
                signed_in_pages: RwLock::new(HashMap::new()),
                sign_in_path: RwLock::new(None),
                sign_out_path: "/user/logout".to_string(),
                signed_in: AtomicBool::new(false),
                current_url: RwLock::new("about:blank".to_string()),
                current_page: RwLock::new(None),
                history: RwLock::new(Vec::new()),
                clicks: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Register a page
    pub async fn add_page(&self, path: &str, node: MockNode) {
        self.state.pages.write().await.insert(path.to_string(), node);
    }

    /// Register the variant of a page served while signed in
    pub async fn add_signed_in_page(&self, path: &str, node: MockNode) {
        self.state.signed_in_pages.write().await.insert(path.to_string(), node);
    }

    /// Visiting this path signs the session in
    pub async fn set_sign_in_path(&self, path: &str) {
        *self.state.sign_in_path.write().await = Some(path.to_string());
    }

    /// Whether the session is currently signed in
    pub fn is_signed_in(&self) -> bool {
        self.state.signed_in.load(Ordering::Relaxed)
    }

    /// Every URL visited, in order
    pub async fn history(&self) -> Vec<String> {
        self.state.history.read().await.clone()
    }

    /// Every element clicked, in order
    pub async fn clicks(&self) -> Vec<String> {
        self.state.clicks.read().await.clone()
    }
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new("http://localhost")
    }
}

#[async_trait]
impl Session for MockSession {
    async fn visit(&self, url: &str) -> Result<()> {
        self.state.navigate(url).await
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state.current_url.read().await.clone())
    }

    async fn page(&self) -> Result<Arc<dyn Element>> {
        let current = self.state.current_page.read().await.clone();
        let root = match current {
            Some(root) => root,
            None => MockElement::build(&MockNode::blank(), false, &Arc::downgrade(&self.state)),
        };
        Ok(root as Arc<dyn Element>)
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        // Return a minimal 1x1 PNG
        Ok(vec![
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
            0x00, 0x00, 0x00, 0x0D, // IHDR length
            0x49, 0x48, 0x44, 0x52, // IHDR
            0x00, 0x00, 0x00, 0x01, // Width: 1
            0x00, 0x00, 0x00, 0x01, // Height: 1
            0x08, 0x02, 0x00, 0x00, 0x00, // Bit depth: 8, Color type: 2 (RGB)
            0x90, 0x77, 0x53, 0xDE, // CRC
        ])
    }

    async fn reset(&self) -> Result<()> {
        self.state.signed_in.store(false, Ordering::Relaxed);
        *self.state.current_url.write().await = "about:blank".to_string();
        *self.state.current_page.write().await = None;
        Ok(())
    }
}

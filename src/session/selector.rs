//! CSS selector engine for the in-memory session
//!
//! Supports type, universal, `#id`, `.class`, `[attr]` and `[attr=value]`
//! simple selectors, descendant and child (`>`) combinators, and selector
//! lists separated by commas.

use std::iter::Peekable;
use std::str::Chars;

use crate::{Error, Result};

/// Node view the selector engine matches against
pub trait SelectorTarget {
    /// Lower-case tag name
    fn tag(&self) -> &str;

    /// Attribute value, if present
    fn attr(&self, name: &str) -> Option<&str>;
}

/// Parsed selector list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    // The combinator of the first part is never consulted.
    parts: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatch>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttributeMatch {
    name: String,
    value: Option<String>,
}

impl Selector {
    /// Parse a selector list
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = Parser {
            input,
            chars: input.chars().peekable(),
        };
        parser.parse_selector()
    }

    /// Check an element against the selector, given its ancestors from the
    /// outermost down to the direct parent
    pub fn matches<T: SelectorTarget>(&self, element: &T, ancestors: &[&T]) -> bool {
        self.alternatives
            .iter()
            .any(|complex| complex.matches(element, ancestors))
    }
}

impl Complex {
    fn matches<T: SelectorTarget>(&self, element: &T, ancestors: &[&T]) -> bool {
        match self.parts.last() {
            Some((_, last)) => {
                last.matches(element) && Self::match_left(&self.parts, self.parts.len() - 1, ancestors)
            }
            None => false,
        }
    }

    fn match_left<T: SelectorTarget>(
        parts: &[(Combinator, Compound)],
        idx: usize,
        ancestors: &[&T],
    ) -> bool {
        if idx == 0 {
            return true;
        }

        let combinator = parts[idx].0;
        let target = &parts[idx - 1].1;

        match combinator {
            Combinator::Child => match ancestors.split_last() {
                Some((parent, rest)) => target.matches(*parent) && Self::match_left(parts, idx - 1, rest),
                None => false,
            },
            Combinator::Descendant => (0..ancestors.len()).rev().any(|i| {
                target.matches(ancestors[i]) && Self::match_left(parts, idx - 1, &ancestors[..i])
            }),
        }
    }
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.ids.is_empty() && self.classes.is_empty() && self.attributes.is_empty()
    }

    fn matches<T: SelectorTarget>(&self, element: &T) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag().eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        let ids_match = self.ids.iter().all(|id| element.attr("id") == Some(id.as_str()));

        let classes_match = self.classes.iter().all(|class| {
            element
                .attr("class")
                .map(|classes| classes.split_whitespace().any(|c| c == class))
                .unwrap_or(false)
        });

        let attributes_match = self.attributes.iter().all(|attribute| {
            match (element.attr(&attribute.name), &attribute.value) {
                (Some(actual), Some(expected)) => actual == expected,
                (Some(_), None) => true,
                (None, _) => false,
            }
        });

        ids_match && classes_match && attributes_match
    }
}

struct Parser<'a> {
    input: &'a str,
    chars: Peekable<Chars<'a>>,
}

impl Parser<'_> {
    fn error(&self, detail: &str) -> Error {
        Error::session(format!("Invalid CSS selector \"{}\": {}", self.input, detail))
    }

    fn skip_whitespace(&mut self) -> bool {
        let mut skipped = false;
        while self.chars.peek().is_some_and(|c| c.is_whitespace()) {
            self.chars.next();
            skipped = true;
        }
        skipped
    }

    fn parse_selector(&mut self) -> Result<Selector> {
        let mut alternatives = vec![self.parse_complex()?];
        while self.chars.peek() == Some(&',') {
            self.chars.next();
            alternatives.push(self.parse_complex()?);
        }

        match self.chars.next() {
            None => Ok(Selector { alternatives }),
            Some(c) => Err(self.error(&format!("unexpected '{}'", c))),
        }
    }

    fn parse_complex(&mut self) -> Result<Complex> {
        self.skip_whitespace();
        let mut parts = vec![(Combinator::Descendant, self.parse_compound()?)];

        loop {
            let had_whitespace = self.skip_whitespace();
            match self.chars.peek().copied() {
                None | Some(',') => break,
                Some('>') => {
                    self.chars.next();
                    self.skip_whitespace();
                    parts.push((Combinator::Child, self.parse_compound()?));
                }
                Some(_) if had_whitespace => {
                    parts.push((Combinator::Descendant, self.parse_compound()?));
                }
                Some(c) => return Err(self.error(&format!("unexpected '{}'", c))),
            }
        }

        Ok(Complex { parts })
    }

    fn parse_compound(&mut self) -> Result<Compound> {
        let mut compound = Compound::default();
        let mut universal = false;

        match self.chars.peek().copied() {
            Some('*') => {
                self.chars.next();
                universal = true;
            }
            Some(c) if is_ident_char(c) => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
            }
            _ => {}
        }

        loop {
            match self.chars.peek().copied() {
                Some('#') => {
                    self.chars.next();
                    compound.ids.push(self.ident()?);
                }
                Some('.') => {
                    self.chars.next();
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.chars.next();
                    compound.attributes.push(self.attribute()?);
                }
                _ => break,
            }
        }

        if compound.is_empty() && !universal {
            return Err(self.error("expected a simple selector"));
        }

        Ok(compound)
    }

    fn ident(&mut self) -> Result<String> {
        let mut ident = String::new();
        while let Some(c) = self.chars.peek().copied().filter(|c| is_ident_char(*c)) {
            ident.push(c);
            self.chars.next();
        }

        if ident.is_empty() {
            return Err(self.error("expected an identifier"));
        }
        Ok(ident)
    }

    fn attribute(&mut self) -> Result<AttributeMatch> {
        self.skip_whitespace();
        let name = self.ident()?;
        self.skip_whitespace();

        let value = match self.chars.next() {
            Some(']') => return Ok(AttributeMatch { name, value: None }),
            Some('=') => {
                self.skip_whitespace();
                self.attribute_value()?
            }
            _ => return Err(self.error("malformed attribute selector")),
        };

        self.skip_whitespace();
        match self.chars.next() {
            Some(']') => Ok(AttributeMatch { name, value: Some(value) }),
            _ => Err(self.error("unterminated attribute selector")),
        }
    }

    fn attribute_value(&mut self) -> Result<String> {
        match self.chars.peek().copied() {
            Some(quote @ ('"' | '\'')) => {
                self.chars.next();
                let mut value = String::new();
                loop {
                    match self.chars.next() {
                        Some(c) if c == quote => return Ok(value),
                        Some(c) => value.push(c),
                        None => return Err(self.error("unterminated string")),
                    }
                }
            }
            _ => self.ident(),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Node {
        tag: &'static str,
        attrs: HashMap<&'static str, &'static str>,
    }

    impl Node {
        fn new(tag: &'static str, attrs: &[(&'static str, &'static str)]) -> Self {
            Self {
                tag,
                attrs: attrs.iter().copied().collect(),
            }
        }
    }

    impl SelectorTarget for Node {
        fn tag(&self) -> &str {
            self.tag
        }

        fn attr(&self, name: &str) -> Option<&str> {
            self.attrs.get(name).copied()
        }
    }

    #[test]
    fn test_type_selector() {
        let tr = Node::new("tr", &[]);
        let selector = Selector::parse("tr").unwrap();
        assert!(selector.matches(&tr, &[]));
        assert!(!Selector::parse("td").unwrap().matches(&tr, &[]));
    }

    #[test]
    fn test_id_class_and_attribute() {
        let node = Node::new(
            "div",
            &[("id", "content"), ("class", "region region-content"), ("role", "main")],
        );
        assert!(Selector::parse("#content").unwrap().matches(&node, &[]));
        assert!(Selector::parse("div.region-content").unwrap().matches(&node, &[]));
        assert!(Selector::parse("[role=main]").unwrap().matches(&node, &[]));
        assert!(Selector::parse("[role=\"main\"].region").unwrap().matches(&node, &[]));
        assert!(!Selector::parse(".sidebar").unwrap().matches(&node, &[]));
    }

    #[test]
    fn test_descendant_and_child_combinators() {
        let main = Node::new("main", &[("id", "main")]);
        let table = Node::new("table", &[]);
        let tr = Node::new("tr", &[]);

        assert!(Selector::parse("#main tr").unwrap().matches(&tr, &[&main, &table]));
        assert!(Selector::parse("table > tr").unwrap().matches(&tr, &[&main, &table]));
        assert!(!Selector::parse("main > tr").unwrap().matches(&tr, &[&main, &table]));
        assert!(!Selector::parse("aside tr").unwrap().matches(&tr, &[&main, &table]));
    }

    #[test]
    fn test_selector_list() {
        let h2 = Node::new("h2", &[]);
        assert!(Selector::parse("h1, h2, h3").unwrap().matches(&h2, &[]));
    }

    #[test]
    fn test_invalid_selectors() {
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("div[").is_err());
        assert!(Selector::parse("a[href=\"x]").is_err());
        assert!(Selector::parse("div ~ p").is_err());
    }
}

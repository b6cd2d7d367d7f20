//! Path selectors over an element tree.
//!
//! Supported: absolute child steps (`/cib/configuration`), descendant steps
//! (`//node`), the `*` name test, and attribute predicates `[@id='x']`,
//! `[@id="x"]`, `[@id]`, combined with `and`.

use std::collections::HashSet;

use super::Element;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Expected '/' at position {position}, found {found:?}")]
    Unexpected { position: usize, found: char },

    #[error("Missing element name at position {position}")]
    MissingName { position: usize },

    #[error("Unterminated predicate starting at position {position}")]
    Unterminated { position: usize },

    #[error("Unsupported predicate: {0}")]
    UnsupportedPredicate(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    descendant: bool,
    name: NameTest,
    predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Tag(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Exists(String),
    Equals(String, String),
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.' | b':' | b'*')
}

impl Selector {
    pub fn parse(expr: &str) -> Result<Self, SelectorError> {
        let expr = expr.trim();
        if expr.is_empty() {
            return Err(SelectorError::Empty);
        }

        let bytes = expr.as_bytes();
        let mut pos = 0;
        let mut steps = Vec::new();

        while pos < bytes.len() {
            let descendant = if expr[pos..].starts_with("//") {
                pos += 2;
                true
            } else if bytes[pos] == b'/' {
                pos += 1;
                false
            } else {
                return Err(SelectorError::Unexpected {
                    position: pos,
                    found: expr[pos..].chars().next().unwrap_or_default(),
                });
            };

            let start = pos;
            while pos < bytes.len() && is_name_byte(bytes[pos]) {
                pos += 1;
            }
            let name = match &expr[start..pos] {
                "" => return Err(SelectorError::MissingName { position: start }),
                "*" => NameTest::Any,
                tag => NameTest::Tag(tag.to_string()),
            };

            let mut predicates = Vec::new();
            while pos < bytes.len() && bytes[pos] == b'[' {
                let close = find_closing(expr, pos + 1).ok_or(SelectorError::Unterminated { position: pos })?;
                for term in split_and(&expr[pos + 1..close]) {
                    predicates.push(parse_predicate(term)?);
                }
                pos = close + 1;
            }

            steps.push(Step {
                descendant,
                name,
                predicates,
            });
        }

        Ok(Self { steps })
    }

    /// Matching elements in document order, each at most once
    pub fn select<'a>(
        &self,
        root: &'a Element,
    ) -> Vec<&'a Element> {
        let mut current: Vec<&'a Element> = Vec::new();

        for (i, step) in self.steps.iter().enumerate() {
            let mut next = Vec::new();
            if i == 0 {
                // the context is the document node, whose only child is `root`
                if step.descendant {
                    collect(root, step, &mut next);
                } else if step.matches(root) {
                    next.push(root);
                }
            } else {
                for context in &current {
                    for child in &context.children {
                        if step.descendant {
                            collect(child, step, &mut next);
                        } else if step.matches(child) {
                            next.push(child);
                        }
                    }
                }
            }

            let mut seen = HashSet::new();
            next.retain(|e| seen.insert(*e as *const Element));
            current = next;
            if current.is_empty() {
                break;
            }
        }
        current
    }
}

impl Step {
    fn matches(
        &self,
        element: &Element,
    ) -> bool {
        let name_ok = match &self.name {
            NameTest::Any => true,
            NameTest::Tag(tag) => &element.name == tag,
        };
        name_ok
            && self.predicates.iter().all(|p| match p {
                Predicate::Exists(key) => element.attributes.contains_key(key),
                Predicate::Equals(key, value) => element.attr(key) == Some(value.as_str()),
            })
    }
}

fn collect<'a>(
    element: &'a Element,
    step: &Step,
    out: &mut Vec<&'a Element>,
) {
    if step.matches(element) {
        out.push(element);
    }
    for child in &element.children {
        collect(child, step, out);
    }
}

/// Index of the `]` closing a predicate opened just before `from`
fn find_closing(
    expr: &str,
    from: usize,
) -> Option<usize> {
    let mut quote = None;
    for (offset, &b) in expr.as_bytes()[from..].iter().enumerate() {
        match (quote, b) {
            (None, b'\'' | b'"') => quote = Some(b),
            (Some(q), b) if q == b => quote = None,
            (None, b']') => return Some(from + offset),
            _ => {}
        }
    }
    None
}

fn split_and(inner: &str) -> Vec<&str> {
    let mut terms = Vec::new();
    let mut quote = None;
    let mut start = 0;
    let bytes = inner.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match (quote, bytes[i]) {
            (None, b'\'' | b'"') => quote = Some(bytes[i]),
            (Some(q), b) if q == b => quote = None,
            (None, b' ') if inner[i..].starts_with(" and ") => {
                terms.push(&inner[start..i]);
                i += " and ".len();
                start = i;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    terms.push(&inner[start..]);
    terms
}

fn parse_predicate(term: &str) -> Result<Predicate, SelectorError> {
    let unsupported = || SelectorError::UnsupportedPredicate(term.trim().to_string());
    let rest = term.trim().strip_prefix('@').ok_or_else(unsupported)?;

    let valid_name = |name: &str| !name.is_empty() && name.bytes().all(|b| is_name_byte(b) && b != b'*');

    match rest.find('=') {
        None => {
            let name = rest.trim();
            if !valid_name(name) {
                return Err(unsupported());
            }
            Ok(Predicate::Exists(name.to_string()))
        }
        Some(eq) => {
            let name = rest[..eq].trim();
            let value = rest[eq + 1..].trim();
            if !valid_name(name) || value.len() < 2 {
                return Err(unsupported());
            }
            let quote = value.as_bytes()[0];
            if !matches!(quote, b'\'' | b'"') || value.as_bytes()[value.len() - 1] != quote {
                return Err(unsupported());
            }
            Ok(Predicate::Equals(
                name.to_string(),
                value[1..value.len() - 1].to_string(),
            ))
        }
    }
}

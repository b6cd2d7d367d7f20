//! Configuration documents
//!
//! A [`CibDocument`] is an immutable, always well-formed element tree. It is
//! produced by decoding daemon output or from caller-built [`Element`]s, and
//! serializes to XML or to the JSON map form.

mod element;
mod json;
mod selector;
mod xml;

pub use element::*;
pub use selector::*;

#[cfg(test)]
mod document_test;

use std::fmt;
use std::str::FromStr;

use crate::DocumentError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CibDocument {
    root: Element,
}

impl CibDocument {
    /// Decode an XML document
    ///
    /// # Errors
    /// Returns a [`DocumentError`] naming the parse problem; no partially
    /// built document is ever returned.
    pub fn decode(bytes: &[u8]) -> Result<Self, DocumentError> {
        xml::parse(bytes).map(|root| Self { root })
    }

    /// Decode the JSON map form produced by [`encode_json`](Self::encode_json)
    pub fn from_json(bytes: &[u8]) -> Result<Self, DocumentError> {
        let value: serde_json::Value = serde_json::from_slice(bytes)?;
        json::from_value(value).map(|root| Self { root })
    }

    pub fn from_element(root: Element) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn into_root(self) -> Element {
        self.root
    }

    /// XML indented by two spaces per level
    pub fn encode_xml(&self) -> Vec<u8> {
        xml::write(&self.root, Some(2)).into_bytes()
    }

    /// XML on a single line, the form handed to transports
    pub fn encode_xml_compact(&self) -> Vec<u8> {
        xml::write(&self.root, None).into_bytes()
    }

    pub fn encode_json(&self) -> Vec<u8> {
        json::to_value(&self.root).to_string().into_bytes()
    }

    /// Elements matching a path selector, in document order
    pub fn select(
        &self,
        selector: &str,
    ) -> Result<Vec<&Element>, SelectorError> {
        Ok(Selector::parse(selector)?.select(&self.root))
    }
}

impl From<Element> for CibDocument {
    fn from(root: Element) -> Self {
        Self::from_element(root)
    }
}

impl FromStr for CibDocument {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s.as_bytes())
    }
}

impl fmt::Display for CibDocument {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&xml::write(&self.root, Some(2)))
    }
}

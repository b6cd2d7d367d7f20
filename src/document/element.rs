use std::collections::BTreeMap;

/// A node of the configuration tree.
///
/// Attributes are kept sorted by name, so serialization is stable even though
/// attribute order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_child(
        mut self,
        child: Element,
    ) -> Self {
        self.children.push(child);
        self
    }

    /// Value of the `id` attribute
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn attr(
        &self,
        key: &str,
    ) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn set_attr(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Two elements denote the same configuration object when tag and `id`
    /// agree. Elements without `id` match any same-tag element without `id`.
    pub fn same_object(
        &self,
        other: &Element,
    ) -> bool {
        self.name == other.name && self.id() == other.id()
    }

    /// First direct child with the given tag
    pub fn child(
        &self,
        name: &str,
    ) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Depth-first search, including `self`
    pub fn find(
        &self,
        predicate: &dyn Fn(&Element) -> bool,
    ) -> Option<&Element> {
        if predicate(self) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(predicate))
    }

    /// Copy of this element without its children
    pub fn shallow_clone(&self) -> Element {
        Element {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            children: Vec::new(),
        }
    }
}

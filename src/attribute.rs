use std::fmt::{Display, Formatter};

use crate::error::{Error, Result};

/// A namespace-qualified name. The namespace is the prefix as written in the
/// source (`x` for `x:item`), empty for unprefixed names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: String,
    pub name: String,
}

impl QName {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        QName {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn matches(&self, namespace: &str, name: &str) -> bool {
        self.namespace == namespace && self.name == name
    }

    /// The name as it appears in markup, `prefix:name` or `name`.
    pub fn qualified(&self) -> String {
        self.to_string()
    }
}

impl Display for QName {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}:{}", self.namespace, self.name)
        }
    }
}

/// A single attribute. Its qualified name is fixed at construction, only
/// the value can change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    name: QName,
    value: String,
}

impl Attribute {
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Attribute {
            name: QName::new(namespace, name),
            value: value.into(),
        }
    }

    pub fn qname(&self) -> &QName {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.name.namespace
    }

    pub fn name(&self) -> &str {
        &self.name.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }
}

impl Display for Attribute {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}=\"{}\"", self.name, self.value)
    }
}

/// Attributes of an element in declaration order. No two entries share a
/// (namespace, name) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    attrs: Vec<Attribute>,
}

impl AttributeMap {
    pub fn new() -> Self {
        AttributeMap::default()
    }

    pub fn num_attr(&self) -> usize {
        self.attrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn get_attr_at(&self, index: usize) -> Result<&Attribute> {
        self.attrs.get(index).ok_or(Error::OutOfBounds {
            index,
            len: self.attrs.len(),
        })
    }

    pub fn get_attr(&self, namespace: &str, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|attr| attr.name.matches(namespace, name))
    }

    pub fn get_attr_mut(&mut self, namespace: &str, name: &str) -> Option<&mut Attribute> {
        self.attrs.iter_mut().find(|attr| attr.name.matches(namespace, name))
    }

    /// Inserts or replaces. A replaced attribute keeps its position.
    pub fn set_attr(&mut self, attr: Attribute) {
        match self.attrs.iter().position(|a| a.name == attr.name) {
            Some(index) => self.attrs[index] = attr,
            None => self.attrs.push(attr),
        }
    }

    pub fn remove_attr(&mut self, namespace: &str, name: &str) -> Option<Attribute> {
        let index = self.attrs.iter().position(|attr| attr.name.matches(namespace, name))?;
        Some(self.attrs.remove(index))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.attrs.iter()
    }
}

impl<'a> IntoIterator for &'a AttributeMap {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attrs.iter()
    }
}

impl Display for AttributeMap {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        for (i, attr) in self.attrs.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", attr)?;
        }
        Ok(())
    }
}

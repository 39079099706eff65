use std::sync::atomic::{AtomicU64, Ordering};

use crate::attribute::{Attribute, AttributeMap, QName};
use crate::collection::{NodeCollection, ParentLink};
use crate::error::Result;

static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies the document that created a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    pub(crate) fn next() -> Self {
        DocumentId(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Handle to a node stored in a [`crate::Document`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) document: DocumentId,
    pub(crate) index: usize,
}

impl NodeId {
    /// The document this node was created by and is bound to.
    pub fn document(&self) -> DocumentId {
        self.document
    }
}

#[derive(Debug)]
pub enum NodeKind {
    Element(Element),
    Comment(Comment),
    Directive(Directive),
    ProcInst(ProcInst),
}

impl NodeKind {
    pub fn is_element(&self) -> bool {
        matches!(self, NodeKind::Element(_))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_comment(&self) -> Option<&Comment> {
        match self {
            NodeKind::Comment(comment) => Some(comment),
            _ => None,
        }
    }

    pub fn as_directive(&self) -> Option<&Directive> {
        match self {
            NodeKind::Directive(directive) => Some(directive),
            _ => None,
        }
    }

    pub fn as_proc_inst(&self) -> Option<&ProcInst> {
        match self {
            NodeKind::ProcInst(proc_inst) => Some(proc_inst),
            _ => None,
        }
    }
}

/// An element: qualified name, attributes, a scalar text value and child nodes.
#[derive(Debug)]
pub struct Element {
    name: QName,
    value: String,
    attrs: AttributeMap,
    children: NodeCollection<ParentLink>,
}

impl Element {
    pub(crate) fn new(id: NodeId, name: QName) -> Self {
        Element {
            name,
            value: String::new(),
            attrs: AttributeMap::new(),
            children: NodeCollection::new(ParentLink::new(id)),
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

    pub fn set_name(&mut self, namespace: impl Into<String>, name: impl Into<String>) {
        self.name = QName::new(namespace, name);
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn attributes(&self) -> &AttributeMap {
        &self.attrs
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attrs
    }

    pub fn num_attr(&self) -> usize {
        self.attrs.num_attr()
    }

    pub fn get_attr_at(&self, index: usize) -> Result<&Attribute> {
        self.attrs.get_attr_at(index)
    }

    pub fn get_attr(&self, namespace: &str, name: &str) -> Option<&Attribute> {
        self.attrs.get_attr(namespace, name)
    }

    pub fn set_attr(&mut self, attr: Attribute) {
        self.attrs.set_attr(attr)
    }

    pub fn remove_attr(&mut self, namespace: &str, name: &str) -> Option<Attribute> {
        self.attrs.remove_attr(namespace, name)
    }

    pub fn children(&self) -> &NodeCollection<ParentLink> {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut NodeCollection<ParentLink> {
        &mut self.children
    }
}

/// `<!--comment-->`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub comment: String,
}

/// `<!directive>`, e.g. a DOCTYPE declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub directive: String,
}

/// `<?target inst?>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcInst {
    pub target: String,
    pub inst: String,
}

use std::io::{Read, Write};
use std::ops::Deref;

use tracing::debug;

use crate::attribute::{Attribute, AttributeMap, QName};
use crate::collection::{CollectionMut, DocumentRoot, Links, NodeCollection, ParentLink};
use crate::encode::{Encoder, OutputConfig};
use crate::error::{Error, Result};
use crate::node::{Comment, Directive, DocumentId, Element, NodeId, NodeKind, ProcInst};
use crate::parse::TreeBuilder;
use crate::token::Token;
use crate::tokenize::XmlTokenizer;

/// An XML document. All nodes live in the document's arena and are addressed
/// by [`NodeId`]; the top-level collection holds at most one element, the root.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<NodeKind>,
    links: Links,
    top: NodeCollection<DocumentRoot>,
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl Document {
    /// A document holding a single empty root element with no name.
    ///
    /// Saved as is, the unnamed root is written as `<></>`, which is not
    /// well-formed XML. Name it with [`ElementMut::set_name`] or start from
    /// [`Document::with_root`] when the output must be parsed again.
    pub fn new() -> Self {
        Document::with_root("", "")
    }

    pub fn with_root(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        let mut doc = Document::empty();
        let root = doc.create_element(namespace, name);
        let seeded = doc.top.add(root, &mut doc.links);
        debug_assert!(seeded.is_ok(), "an empty document accepts a root element");
        doc
    }

    fn empty() -> Self {
        Document {
            nodes: Vec::new(),
            links: Links::new(DocumentId::next()),
            top: NodeCollection::new(DocumentRoot::default()),
        }
    }

    pub fn parse_str(xml: &str) -> Result<Self> {
        let mut doc = Document::empty();
        doc.load_str(xml)?;
        Ok(doc)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut doc = Document::empty();
        doc.load(reader)?;
        Ok(doc)
    }

    /// Changes whenever the document is reloaded, which invalidates old [`NodeId`]s.
    pub fn id(&self) -> DocumentId {
        self.links.document()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.top.hook().root()
    }

    pub fn nodes(&self) -> &NodeCollection<DocumentRoot> {
        &self.top
    }

    pub fn nodes_mut(&mut self) -> CollectionMut<'_, DocumentRoot> {
        CollectionMut::new(&mut self.top, &mut self.links)
    }

    pub fn children_mut(&mut self, element: NodeId) -> Result<CollectionMut<'_, ParentLink>> {
        Ok(self.element_mut(element)?.into_children())
    }

    pub fn node(&self, id: NodeId) -> Result<&NodeKind> {
        let index = self.links.index(id)?;
        self.nodes.get(index).ok_or(Error::ForeignNode(id))
    }

    /// The element whose collection holds `id`; `None` at the top level or when detached.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>> {
        self.links.index(id)?;
        Ok(self.links.parent(id))
    }

    pub fn element(&self, id: NodeId) -> Result<&Element> {
        self.node(id)?.as_element().ok_or(Error::NotAnElement(id))
    }

    pub fn element_mut(&mut self, id: NodeId) -> Result<ElementMut<'_>> {
        let index = self.links.index(id)?;
        match self.nodes.get_mut(index) {
            Some(NodeKind::Element(element)) => Ok(ElementMut {
                element,
                links: &mut self.links,
            }),
            _ => Err(Error::NotAnElement(id)),
        }
    }

    pub fn comment_mut(&mut self, id: NodeId) -> Result<&mut Comment> {
        match self.node_mut(id)? {
            NodeKind::Comment(comment) => Ok(comment),
            _ => Err(Error::UnexpectedKind { id, expected: "comment" }),
        }
    }

    pub fn directive_mut(&mut self, id: NodeId) -> Result<&mut Directive> {
        match self.node_mut(id)? {
            NodeKind::Directive(directive) => Ok(directive),
            _ => Err(Error::UnexpectedKind { id, expected: "directive" }),
        }
    }

    pub fn proc_inst_mut(&mut self, id: NodeId) -> Result<&mut ProcInst> {
        match self.node_mut(id)? {
            NodeKind::ProcInst(proc_inst) => Ok(proc_inst),
            _ => Err(Error::UnexpectedKind {
                id,
                expected: "processing instruction",
            }),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeKind> {
        let index = self.links.index(id)?;
        self.nodes.get_mut(index).ok_or(Error::ForeignNode(id))
    }

    pub fn create_element(
        &mut self,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> NodeId {
        let id = self.links.register(true);
        let name = QName::new(namespace, name);
        self.nodes.push(NodeKind::Element(Element::new(id, name)));
        id
    }

    pub fn create_comment(&mut self, comment: impl Into<String>) -> NodeId {
        self.push(NodeKind::Comment(Comment {
            comment: comment.into(),
        }))
    }

    pub fn create_directive(&mut self, directive: impl Into<String>) -> NodeId {
        self.push(NodeKind::Directive(Directive {
            directive: directive.into(),
        }))
    }

    pub fn create_proc_inst(
        &mut self,
        target: impl Into<String>,
        inst: impl Into<String>,
    ) -> NodeId {
        self.push(NodeKind::ProcInst(ProcInst {
            target: target.into(),
            inst: inst.into(),
        }))
    }

    /// Attributes are plain values and are not bound to the document.
    pub fn create_attribute(
        &self,
        namespace: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Attribute {
        Attribute::new(namespace, name, value)
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = self.links.register(kind.is_element());
        self.nodes.push(kind);
        id
    }

    /// Replaces the content of the document with the tree described by `tokens`.
    ///
    /// The old content is dropped before the first token is read. On error the
    /// document keeps whatever was built up to that point.
    pub fn load_tokens<I>(&mut self, tokens: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<Token>>,
    {
        *self = Document::empty();
        let mut builder = TreeBuilder::new(self);
        for token in tokens {
            builder.feed(token?)?;
        }
        builder.finish()?;
        debug!(nodes = self.nodes.len(), "loaded xml document");
        Ok(())
    }

    pub fn load_str(&mut self, xml: &str) -> Result<()> {
        debug!(bytes = xml.len(), "loading xml document");
        self.load_tokens(XmlTokenizer::new(xml))
    }

    pub fn load<R: Read>(&mut self, mut reader: R) -> Result<()> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let xml = String::from_utf8(bytes)?;
        self.load_str(&xml)
    }

    /// Writes the document depth first in collection order. The writer is
    /// flushed even when writing fails.
    pub fn save<W: Write>(&self, config: &OutputConfig, writer: W) -> Result<()> {
        let mut encoder = Encoder::new(writer, config);
        let written = self.encode_tree(&mut encoder);
        let flushed = encoder.flush();
        written.and(flushed)?;
        debug!(nodes = self.top.size(), "saved xml document");
        Ok(())
    }

    pub fn save_to_string(&self, config: &OutputConfig) -> Result<String> {
        let mut out = Vec::new();
        self.save(config, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    /// Walks the tree with an explicit stack of open elements, each paired
    /// with the index of its next child to write.
    fn encode_tree<W: Write>(&self, encoder: &mut Encoder<W>) -> Result<()> {
        let mut open: Vec<(NodeId, usize)> = Vec::new();
        for id in self.top.iter() {
            self.encode_node(encoder, id, &mut open)?;
            while let Some(frame) = open.last_mut() {
                let (parent, next) = *frame;
                let element = self.element(parent)?;
                if next < element.children().size() {
                    frame.1 += 1;
                    let child = element.children().get(next)?;
                    self.encode_node(encoder, child, &mut open)?;
                } else {
                    open.pop();
                    encoder.end_element(element.qname())?;
                }
            }
        }
        Ok(())
    }

    /// Writes a leaf node, or the start of an element which is then pushed
    /// onto `open`.
    fn encode_node<W: Write>(
        &self,
        encoder: &mut Encoder<W>,
        id: NodeId,
        open: &mut Vec<(NodeId, usize)>,
    ) -> Result<()> {
        match self.node(id)? {
            NodeKind::Element(element) => {
                encoder.start_element(element.qname(), element.attributes())?;
                if !element.value().is_empty() {
                    encoder.char_data(element.value())?;
                }
                open.push((id, 0));
                Ok(())
            }
            NodeKind::Comment(comment) => encoder.comment(&comment.comment),
            NodeKind::Directive(directive) => encoder.directive(&directive.directive),
            NodeKind::ProcInst(proc_inst) => {
                encoder.proc_inst(&proc_inst.target, &proc_inst.inst)
            }
        }
    }
}

/// Mutable access to an element. Children are changed through
/// [`ElementMut::children_mut`] so their parent links stay in sync.
pub struct ElementMut<'a> {
    element: &'a mut Element,
    links: &'a mut Links,
}

impl<'a> ElementMut<'a> {
    pub fn set_name(&mut self, namespace: impl Into<String>, name: impl Into<String>) {
        self.element.set_name(namespace, name);
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.element.set_value(value);
    }

    pub fn set_attr(&mut self, attr: Attribute) {
        self.element.set_attr(attr);
    }

    pub fn remove_attr(&mut self, namespace: &str, name: &str) -> Option<Attribute> {
        self.element.remove_attr(namespace, name)
    }

    pub fn attributes_mut(&mut self) -> &mut AttributeMap {
        self.element.attributes_mut()
    }

    pub fn children_mut(&mut self) -> CollectionMut<'_, ParentLink> {
        CollectionMut::new(self.element.children_mut(), &mut *self.links)
    }

    fn into_children(self) -> CollectionMut<'a, ParentLink> {
        let ElementMut { element, links } = self;
        CollectionMut::new(element.children_mut(), links)
    }
}

impl Deref for ElementMut<'_> {
    type Target = Element;

    fn deref(&self) -> &Element {
        self.element
    }
}

use tracing::trace;

use crate::attribute::QName;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::node::NodeId;
use crate::token::Token;
use crate::util::trim_xml;

/// Rebuilds a tree from a flat token stream with an explicit stack of open
/// elements. An empty stack means the document level.
pub(crate) struct TreeBuilder<'d> {
    doc: &'d mut Document,
    stack: Vec<NodeId>,
}

impl<'d> TreeBuilder<'d> {
    pub(crate) fn new(doc: &'d mut Document) -> Self {
        TreeBuilder {
            doc,
            stack: Vec::new(),
        }
    }

    pub(crate) fn feed(&mut self, token: Token) -> Result<()> {
        trace!(?token, depth = self.stack.len(), "tree builder token");
        match token {
            Token::StartElement { name, attrs } => {
                let element = self.doc.create_element(name.namespace, name.name);
                {
                    let mut target = self.doc.element_mut(element)?;
                    // repeated attribute names collapse onto the first position
                    for attr in attrs {
                        target.set_attr(attr);
                    }
                }
                self.append(element)?;
                self.stack.push(element);
            }
            Token::EndElement(name) => {
                let expected = self.current_name()?;
                if expected.as_ref() != Some(&name) {
                    return Err(Error::MismatchedEndTag {
                        expected,
                        found: name,
                    });
                }
                self.stack.pop();
            }
            Token::CharData(text) => {
                // only the last non-blank run of text is kept
                if let Some(&current) = self.stack.last() {
                    let text = trim_xml(&text);
                    if !text.is_empty() {
                        self.doc.element_mut(current)?.set_value(text);
                    }
                }
            }
            Token::Comment(text) => {
                let comment = self.doc.create_comment(text);
                self.append(comment)?;
            }
            Token::Directive(text) => {
                let directive = self.doc.create_directive(text);
                self.append(directive)?;
            }
            Token::ProcInst { target, inst } => {
                let proc_inst = self.doc.create_proc_inst(target, inst);
                self.append(proc_inst)?;
            }
        }
        Ok(())
    }

    /// Succeeds only if every element was closed.
    pub(crate) fn finish(self) -> Result<()> {
        match self.current_name()? {
            Some(name) => Err(Error::UnclosedElement(name)),
            None => Ok(()),
        }
    }

    fn append(&mut self, node: NodeId) -> Result<()> {
        match self.stack.last() {
            Some(&parent) => self.doc.children_mut(parent)?.add(node),
            None => self.doc.nodes_mut().add(node),
        }
    }

    fn current_name(&self) -> Result<Option<QName>> {
        match self.stack.last() {
            Some(&current) => Ok(Some(self.doc.element(current)?.qname().clone())),
            None => Ok(None),
        }
    }
}

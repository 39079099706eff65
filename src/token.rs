use crate::attribute::{Attribute, QName};

/// One lexical event of an XML document. [`crate::Document::load_tokens`]
/// consumes these and [`crate::encode::Encoder`] writes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    StartElement { name: QName, attrs: Vec<Attribute> },
    EndElement(QName),
    CharData(String),
    Comment(String),
    Directive(String),
    ProcInst { target: String, inst: String },
}

impl Token {
    pub fn start(namespace: &str, name: &str) -> Self {
        Token::StartElement {
            name: QName::new(namespace, name),
            attrs: Vec::new(),
        }
    }

    pub fn end(namespace: &str, name: &str) -> Self {
        Token::EndElement(QName::new(namespace, name))
    }
}

//! A mutable XML document object model.
//!
//! [`Document::load_str`] rebuilds a tree of elements, comments, directives and
//! processing instructions from the token stream of an XML 1.0 tokenizer, and
//! [`Document::save`] writes the tree back out as indented XML.
//!
//! ```
//! use xmldom::{Document, OutputConfig};
//!
//! let doc = Document::parse_str(r#"<a><b x="1">hi</b></a>"#).unwrap();
//! let root = doc.root().unwrap();
//! let b = doc.element(root).unwrap().children().get(0).unwrap();
//! assert_eq!(doc.element(b).unwrap().value(), "hi");
//!
//! let xml = doc.save_to_string(&OutputConfig::default()).unwrap();
//! assert_eq!(xml, "<a>\n\t<b x=\"1\">hi</b>\n</a>");
//! ```

pub mod attribute;
pub mod collection;
pub mod document;
pub mod encode;
pub mod error;
pub mod node;
pub mod token;
pub mod tokenize;

mod parse;
mod util;
mod xmlchar;

pub use attribute::{Attribute, AttributeMap, QName};
pub use collection::{AttachHook, CollectionMut, DocumentRoot, NodeCollection, ParentLink};
pub use document::{Document, ElementMut};
pub use encode::{Encoder, OutputConfig};
pub use error::{Error, Result};
pub use node::{Comment, Directive, DocumentId, Element, NodeId, NodeKind, ProcInst};
pub use token::Token;

use crate::attribute::QName;
use crate::node::NodeId;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("root element already exists in xml document")]
    DuplicateRoot,

    #[error("invalid end element </{found}>, expected {}", expected_tag(.expected))]
    MismatchedEndTag { expected: Option<QName>, found: QName },

    #[error("unexpected end of input, element <{0}> is not closed")]
    UnclosedElement(QName),

    #[error("index {index} is out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },

    #[error("node {0:?} belongs to another document")]
    ForeignNode(NodeId),

    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),

    #[error("node {id:?} is not a {expected}")]
    UnexpectedKind { id: NodeId, expected: &'static str },

    #[error("node {0:?} is already attached to a collection")]
    AlreadyAttached(NodeId),

    #[error("node {0:?} cannot be inserted into its own subtree")]
    Cycle(NodeId),

    #[error("unknown reference {0}")]
    UnknownReference(String),

    #[error("comment {0:?} cannot be written as well-formed xml")]
    InvalidComment(String),

    #[error("processing instruction {0:?} cannot be written as well-formed xml")]
    InvalidProcInst(String),

    #[error(transparent)]
    Syntax(#[from] xmlparser::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn expected_tag(expected: &Option<QName>) -> String {
    match expected {
        Some(name) => format!("</{}>", name),
        None => "no end element".to_string(),
    }
}

impl Error {
    /// The piece of input or tree content the error is about.
    pub fn get_target(&self) -> String {
        match self {
            Error::MismatchedEndTag { found, .. } => found.to_string(),
            Error::UnclosedElement(name) => name.to_string(),
            Error::UnknownReference(reference) => reference.clone(),
            Error::InvalidComment(text) | Error::InvalidProcInst(text) => text.clone(),
            Error::OutOfBounds { index, .. } => index.to_string(),
            Error::ForeignNode(id)
            | Error::NotAnElement(id)
            | Error::AlreadyAttached(id)
            | Error::Cycle(id)
            | Error::UnexpectedKind { id, .. } => format!("{:?}", id),
            other => other.to_string(),
        }
    }
}

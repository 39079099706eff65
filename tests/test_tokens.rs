use std::io;

use xmldom::tokenize::XmlTokenizer;
use xmldom::{Attribute, Document, Encoder, Error, OutputConfig, QName, Token};

fn ok(tokens: Vec<Token>) -> Vec<Result<Token, Error>> {
    tokens.into_iter().map(Ok).collect()
}

#[test]
pub fn test_mismatched_end_token() {
    let mut doc = Document::new();
    let actual_err = doc
        .load_tokens(ok(vec![Token::start("a", "x"), Token::end("a", "y")]))
        .unwrap_err();
    match actual_err {
        Error::MismatchedEndTag { expected, found } => {
            assert_eq!(Some(QName::new("a", "x")), expected);
            assert_eq!(QName::new("a", "y"), found);
        }
        other => panic!("unexpected error {:?}", other),
    }

    // the tree stays as it was when the error hit
    let root = doc.root().unwrap();
    let element = doc.element(root).unwrap();
    assert_eq!(("a", "x"), (element.namespace(), element.name()));
    assert_eq!(0, element.children().size());
}

#[test]
pub fn test_end_token_without_open_element() {
    let mut doc = Document::new();
    let actual_err = doc.load_tokens(ok(vec![Token::end("", "a")])).unwrap_err();
    assert!(matches!(actual_err, Error::MismatchedEndTag { expected: None, .. }));
    assert_eq!(None, doc.root());
}

#[test]
pub fn test_unclosed_element() {
    let mut doc = Document::new();
    let actual_err = doc
        .load_tokens(ok(vec![Token::start("", "a"), Token::start("", "b"), Token::end("", "b")]))
        .unwrap_err();
    assert!(matches!(actual_err, Error::UnclosedElement(_)));
    assert_eq!("a", actual_err.get_target());
}

#[test]
pub fn test_second_root() {
    let mut doc = Document::new();
    let actual_err = doc
        .load_tokens(ok(vec![
            Token::start("", "a"),
            Token::end("", "a"),
            Token::Comment("between".to_string()),
            Token::start("", "b"),
            Token::end("", "b"),
        ]))
        .unwrap_err();
    assert!(matches!(actual_err, Error::DuplicateRoot));
    assert_eq!(2, doc.nodes().size());
}

#[test]
pub fn test_stream_errors_propagate() {
    let mut doc = Document::new();
    let tokens = vec![
        Ok(Token::start("", "a")),
        Err(Error::Io(io::Error::new(io::ErrorKind::Other, "broken pipe"))),
        Ok(Token::end("", "a")),
    ];
    let actual_err = doc.load_tokens(tokens).unwrap_err();
    assert!(matches!(actual_err, Error::Io(_)));
    assert!(doc.root().is_some());
}

#[test]
pub fn test_duplicate_attributes_collapse() {
    let mut doc = Document::new();
    doc.load_tokens(ok(vec![
        Token::StartElement {
            name: QName::new("", "a"),
            attrs: vec![
                Attribute::new("", "x", "1"),
                Attribute::new("", "y", "2"),
                Attribute::new("", "x", "3"),
            ],
        },
        Token::end("", "a"),
    ]))
    .unwrap();
    let element = doc.element(doc.root().unwrap()).unwrap();
    assert_eq!(2, element.num_attr());
    assert_eq!("3", element.get_attr_at(0).unwrap().value());
    assert_eq!("y", element.get_attr_at(1).unwrap().name());
}

#[test]
pub fn test_top_level_char_data_is_ignored() {
    let mut doc = Document::new();
    doc.load_tokens(ok(vec![
        Token::CharData("stray".to_string()),
        Token::start("", "a"),
        Token::CharData("   ".to_string()),
        Token::end("", "a"),
    ]))
    .unwrap();
    assert_eq!(1, doc.nodes().size());
    assert_eq!("", doc.element(doc.root().unwrap()).unwrap().value());
}

#[test]
pub fn test_tokenizer_output() {
    let xml = "<?xml version=\"1.0\"?><a x=\"1\"><b/>t<!--c--></a>";
    let tokens: Vec<Token> = XmlTokenizer::new(xml).collect::<Result<_, _>>().unwrap();
    assert_eq!(
        vec![
            Token::ProcInst {
                target: "xml".to_string(),
                inst: "version=\"1.0\"".to_string(),
            },
            Token::StartElement {
                name: QName::new("", "a"),
                attrs: vec![Attribute::new("", "x", "1")],
            },
            Token::start("", "b"),
            Token::end("", "b"),
            Token::CharData("t".to_string()),
            Token::Comment("c".to_string()),
            Token::end("", "a"),
        ],
        tokens
    );
}

#[test]
pub fn test_tokenizer_continues_after_root() {
    let tokens: Vec<Token> = XmlTokenizer::new("<a/><!--c--> tail<b>x</b>")
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        vec![
            Token::start("", "a"),
            Token::end("", "a"),
            Token::Comment("c".to_string()),
            Token::CharData(" tail".to_string()),
            Token::start("", "b"),
            Token::CharData("x".to_string()),
            Token::end("", "b"),
        ],
        tokens
    );
}

#[test]
pub fn test_encoder_writes_tokens() {
    let mut encoder = Encoder::new(Vec::new(), &OutputConfig::new("", " "));
    let tokens = vec![
        Token::Directive("DOCTYPE a".to_string()),
        Token::start("", "a"),
        Token::start("", "b"),
        Token::CharData("1 < 2".to_string()),
        Token::end("", "b"),
        Token::ProcInst {
            target: "p".to_string(),
            inst: String::new(),
        },
        Token::end("", "a"),
    ];
    for token in &tokens {
        encoder.encode_token(token).unwrap();
    }
    let xml = String::from_utf8(encoder.into_inner()).unwrap();
    assert_eq!("<!DOCTYPE a>\n<a>\n <b>1 &lt; 2</b>\n <?p?>\n</a>", xml);
}

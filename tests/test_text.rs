use xmldom::{Document, NodeKind, OutputConfig};

fn root_value(xml: &str) -> String {
    let doc = Document::parse_str(xml).unwrap();
    let root = doc.root().unwrap();
    doc.element(root).unwrap().value().to_string()
}

#[test]
pub fn test_single() {
    let text = "this is some text";
    assert_eq!(text, root_value(&format!("<root>{}</root>", text)));
}

#[test]
pub fn test_spaces_are_trimmed() {
    assert_eq!("indented text", root_value("<root>\r\n  \n    indented text\n  </root>"));
}

#[test]
pub fn test_blank_text_is_ignored() {
    let doc = Document::parse_str("<root>\n  <a/>\n  \t</root>").unwrap();
    let root = doc.element(doc.root().unwrap()).unwrap();
    assert_eq!("", root.value());
    assert_eq!(1, root.children().size());
}

#[test]
pub fn test_last_text_run_wins() {
    let xml = "<root>root level<a>first level<b>second level</b>more first level</a>another root level</root>";
    let doc = Document::parse_str(xml).unwrap();
    let root = doc.root().unwrap();
    assert_eq!("another root level", doc.element(root).unwrap().value());

    let a = doc.element(root).unwrap().children().get(0).unwrap();
    assert_eq!("more first level", doc.element(a).unwrap().value());

    let b = doc.element(a).unwrap().children().get(0).unwrap();
    assert_eq!("second level", doc.element(b).unwrap().value());
}

#[test]
pub fn test_cdata_is_character_data() {
    let doc = Document::parse_str("<root><![CDATA[<x> & y]]></root>").unwrap();
    let root = doc.root().unwrap();
    assert_eq!("<x> & y", doc.element(root).unwrap().value());

    let xml = doc.save_to_string(&OutputConfig::default()).unwrap();
    assert_eq!("<root>&lt;x&gt; &amp; y</root>", xml);
}

#[test]
pub fn test_valid_unicode() {
    let valid_text = "😀;->ä和製漢字";
    assert_eq!(valid_text, root_value(&format!("<root>{}</root>", valid_text)));
}

#[test]
pub fn test_text_outside_root_is_ignored() {
    let doc = Document::parse_str("<!--before-->\n<root/>\n<!--after-->\n").unwrap();
    let kinds: Vec<bool> = doc
        .nodes()
        .iter()
        .map(|id| matches!(doc.node(id).unwrap(), NodeKind::Comment(_)))
        .collect();
    assert_eq!(vec![true, false, true], kinds);
}

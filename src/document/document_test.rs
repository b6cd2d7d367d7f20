use super::*;
use crate::DocumentError;

const NODE: &str = r#"<node id="xxx" uname="c001n01" type="normal"/>"#;

const RESOURCE: &str = r#"<primitive id="res" class="systemd" type="some_type">
    <operations>
        <op name="stop" interval="0" timeout="100" id="res-stop-20"/>
        <op name="start" interval="0" timeout="100" id="res-start-20"/>
        <op name="monitor" interval="20" timeout="20" id="res-monitor-20"/>
    </operations>
</primitive>"#;

#[test]
fn test_decode_single_element() {
    let doc = CibDocument::decode(NODE.as_bytes()).unwrap();
    let root = doc.root();
    assert_eq!(root.name, "node");
    assert_eq!(root.id(), Some("xxx"));
    assert_eq!(root.attr("uname"), Some("c001n01"));
    assert!(root.children.is_empty());
}

#[test]
fn test_encode_sorts_attributes() {
    let doc = CibDocument::decode(NODE.as_bytes()).unwrap();
    assert_eq!(
        String::from_utf8(doc.encode_xml()).unwrap(),
        r#"<node id="xxx" type="normal" uname="c001n01"/>"#
    );
}

#[test]
fn test_round_trip_preserves_names_attributes_and_order() {
    let doc = CibDocument::decode(RESOURCE.as_bytes()).unwrap();
    let again = CibDocument::decode(&doc.encode_xml()).unwrap();
    assert_eq!(doc, again);

    let compact = CibDocument::decode(&doc.encode_xml_compact()).unwrap();
    assert_eq!(doc, compact);

    let ops: Vec<_> = again.root().children[0]
        .children
        .iter()
        .map(|op| op.attr("name").unwrap())
        .collect();
    assert_eq!(ops, vec!["stop", "start", "monitor"]);
}

#[test]
fn test_indented_output_layout() {
    let doc = CibDocument::from_element(
        Element::new("nodes").with_child(Element::new("node").with_attr("id", "1")),
    );
    assert_eq!(
        doc.to_string(),
        "<nodes>\n  <node id=\"1\"/>\n</nodes>"
    );
    assert_eq!(
        String::from_utf8(doc.encode_xml_compact()).unwrap(),
        "<nodes><node id=\"1\"/></nodes>"
    );
}

#[test]
fn test_attribute_values_are_escaped_and_unescaped() {
    let element = Element::new("nvpair").with_attr("value", r#"a<b & "c""#);
    let doc = CibDocument::from_element(element.clone());
    let xml = String::from_utf8(doc.encode_xml()).unwrap();
    assert!(!xml.contains("a<b"));

    let decoded = CibDocument::decode(xml.as_bytes()).unwrap();
    assert_eq!(decoded.root(), &element);
}

#[test]
fn test_declaration_comments_and_text_are_skipped() {
    let input = r#"<?xml version="1.0"?>
<!-- generated -->
<cib epoch="1">some text<configuration/></cib>"#;
    let doc = CibDocument::decode(input.as_bytes()).unwrap();
    assert_eq!(doc.root().name, "cib");
    assert_eq!(doc.root().children.len(), 1);
}

#[test]
fn test_decode_rejects_empty_input() {
    assert!(matches!(
        CibDocument::decode(b"   "),
        Err(DocumentError::Empty)
    ));
}

#[test]
fn test_decode_rejects_unclosed_element() {
    let err = CibDocument::decode(b"<cib><configuration>").unwrap_err();
    assert!(
        matches!(err, DocumentError::UnexpectedEnd { .. } | DocumentError::Xml(_)),
        "unexpected error: {err:?}"
    );
}

#[test]
fn test_decode_rejects_mismatched_end_tag() {
    let err = CibDocument::decode(b"<cib><nodes></cib>").unwrap_err();
    assert!(
        matches!(err, DocumentError::MismatchedEnd { .. } | DocumentError::Xml(_)),
        "unexpected error: {err:?}"
    );
    assert!(!err.to_string().is_empty());
}

#[test]
fn test_decode_rejects_invalid_utf8_names() {
    let err = CibDocument::decode(b"<a\xff\xfe id=\"x\"/>").unwrap_err();
    assert!(
        matches!(err, DocumentError::InvalidUtf8 { what: "tag name", .. }),
        "unexpected error: {err:?}"
    );
    assert!(err.to_string().contains("tag name"));

    let err = CibDocument::decode(b"<a i\xffd=\"x\"/>").unwrap_err();
    assert!(
        matches!(err, DocumentError::InvalidUtf8 { what: "attribute name", .. }),
        "unexpected error: {err:?}"
    );
}

#[test]
fn test_decode_rejects_multiple_roots() {
    assert!(matches!(
        CibDocument::decode(b"<a/><b/>"),
        Err(DocumentError::MultipleRoots)
    ));
}

#[test]
fn test_decode_rejects_duplicate_attributes() {
    assert!(CibDocument::decode(br#"<a id="1" id="2"/>"#).is_err());
}

#[test]
fn test_encode_json_map_form() {
    let doc = CibDocument::decode(
        br#"<nodes><node id="a"/><node id="b"/><extra/></nodes>"#,
    )
    .unwrap();
    let value: serde_json::Value = serde_json::from_slice(&doc.encode_json()).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "nodes": {
                "node": [{"-id": "a"}, {"-id": "b"}],
                "extra": ""
            }
        })
    );
}

#[test]
fn test_from_json_builds_element_tree() {
    let doc = CibDocument::from_json(
        br#"{"node": {"-id": "zzz", "-uname": "unique", "-type": "normal"}}"#,
    )
    .unwrap();
    assert_eq!(
        doc.root(),
        &Element::new("node")
            .with_attr("id", "zzz")
            .with_attr("uname", "unique")
            .with_attr("type", "normal")
    );
}

#[test]
fn test_json_round_trip_for_single_tag_children() {
    let doc = CibDocument::decode(RESOURCE.as_bytes()).unwrap();
    let again = CibDocument::from_json(&doc.encode_json()).unwrap();
    assert_eq!(doc, again);
}

#[test]
fn test_from_json_rejects_non_tree_values() {
    assert!(matches!(
        CibDocument::from_json(b"[1, 2]"),
        Err(DocumentError::InvalidJson(_))
    ));
    assert!(matches!(
        CibDocument::from_json(br#"{"a": {}, "b": {}}"#),
        Err(DocumentError::InvalidJson(_))
    ));
    assert!(matches!(
        CibDocument::from_json(br#"{"a": 5}"#),
        Err(DocumentError::InvalidJson(_))
    ));
    assert!(matches!(
        CibDocument::from_json(b"{not json"),
        Err(DocumentError::Json(_))
    ));
}

//! End-to-end tests of the public document API: parse, navigate, edit,
//! search, and serialize.

#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use xmlarbor::parser::ParseOptions;
use xmlarbor::serial::{
    escape, serialize_content, serialize_content_with_options, serialize_document, serialize_node,
    serialize_node_with_options, unescape, SerializeOptions,
};
use xmlarbor::{Document, ErrorKind, NodeId, SearchQuery};

/// Asserts that two subtrees have the same names, attributes (in order),
/// text, and child structure.
fn assert_same_tree(a: &Document, a_id: NodeId, b: &Document, b_id: NodeId) {
    assert_eq!(a.node_name(a_id), b.node_name(b_id));
    assert_eq!(a.node_text(a_id), b.node_text(b_id));
    assert_eq!(a.attributes(a_id), b.attributes(b_id));
    let a_children: Vec<NodeId> = a.children(a_id).collect();
    let b_children: Vec<NodeId> = b.children(b_id).collect();
    assert_eq!(a_children.len(), b_children.len(), "child count differs");
    for (&x, &y) in a_children.iter().zip(&b_children) {
        assert_same_tree(a, x, b, y);
    }
}

// --- Parsing and navigation ---

#[test]
fn test_small_document_end_to_end() {
    let input = r#"<a x="1"><b>hi</b><b>bye</b></a>"#;
    let doc = Document::parse_str(input).unwrap();
    let a = doc.root_element().unwrap();

    assert!(doc.is_named(a, "a"));
    assert_eq!(doc.attribute_or(a, "x", ""), "1");
    assert_eq!(doc.attribute_numeric(a, "x", 0.0), 1.0);

    let bs: Vec<NodeId> = doc.elements(a, Some("b")).collect();
    assert_eq!(bs.len(), 2);
    assert_eq!(doc.text_content(bs[0]), "hi");
    assert_eq!(doc.text_content(bs[1]), "bye");
    assert_eq!(doc.parent(bs[1]), Some(a));
    assert_eq!(doc.ancestor(bs[1], None), Some(a));

    assert_eq!(serialize_node(&doc, a), input);
    assert_eq!(serialize_content(&doc, a), "<b>hi</b><b>bye</b>");
}

#[test]
fn test_children_and_elements_views_agree() {
    let doc = Document::parse_str("<r>one<x/>two<y/>three<x/></r>").unwrap();
    let r = doc.root_element().unwrap();

    let children: Vec<NodeId> = doc.children(r).collect();
    let from_children: Vec<NodeId> = children
        .iter()
        .copied()
        .filter(|&id| doc.is_element(id))
        .collect();
    let elements: Vec<NodeId> = doc.elements(r, None).collect();
    assert_eq!(children.len(), 6);
    assert_eq!(elements, from_children);
    assert_eq!(doc.elements(r, Some("x")).count(), 2);
    assert_eq!(doc.first_element(r, Some("y")), Some(elements[1]));
    assert_eq!(doc.first_element(r, Some("z")), None);
}

#[test]
fn test_ancestor_lookup() {
    let doc = Document::parse_str(r#"<top><mid k="m"><mid k="inner"><leaf/></mid></mid></top>"#)
        .unwrap();
    let top = doc.root_element().unwrap();
    let leaf = doc.search_first(top, &SearchQuery::new().element("leaf")).unwrap();

    let nearest_mid = doc.ancestor(leaf, Some("mid")).unwrap();
    assert_eq!(doc.attribute(nearest_mid, "k"), Some("inner"));
    assert_eq!(doc.ancestor(leaf, None), Some(top));
    assert_eq!(doc.ancestor(leaf, Some("nowhere")), None);
    assert_eq!(doc.ancestor(top, None), None);
    assert_eq!(doc.ancestors(leaf).count(), 4);
}

#[test]
fn test_attributes_inherited_from_context() {
    let doc = Document::parse_str(
        r#"<figure scale="2.5px" color="red"><group color="blue"><shape/></group></figure>"#,
    )
    .unwrap();
    let root = doc.root_element().unwrap();
    let shape = doc.search_first(root, &SearchQuery::new().element("shape")).unwrap();

    assert_eq!(doc.attribute_in_context(shape, "color", "black"), "blue");
    assert_eq!(doc.attribute_numeric_in_context(shape, "scale", 1.0), 2.5);
    assert_eq!(doc.attribute_in_context(shape, "missing", "fallback"), "fallback");
    assert_eq!(doc.attribute_or(shape, "color", ""), "");
}

// --- Editing ---

#[test]
fn test_build_tree_by_hand() {
    let mut doc = Document::new();
    let list = doc.create_element("list").unwrap();
    doc.set_attribute(list, "kind", "todo").unwrap();
    for task in ["write", "test"] {
        let item = doc.create_element("item").unwrap();
        let text = doc.create_text(task);
        doc.append_child(item, text).unwrap();
        doc.append_child_pretty(list, item).unwrap();
    }
    doc.set_root_element(list).unwrap();

    assert_eq!(
        serialize_document(&doc, &SerializeOptions::default().declaration(true)),
        concat!(
            "<?xml version=\"1.0\"?>\n",
            "<list kind=\"todo\">\n<item>write</item>\n<item>test</item>\n</list>"
        )
    );
}

#[test]
fn test_set_attribute_keeps_position() {
    let mut doc = Document::parse_str(r#"<e a="1" b="2" c="3"/>"#).unwrap();
    let e = doc.root_element().unwrap();
    doc.set_attribute(e, "b", "changed").unwrap();
    doc.set_attribute(e, "d", "4").unwrap();
    assert_eq!(
        serialize_node(&doc, e),
        r#"<e a="1" b="changed" c="3" d="4"/>"#
    );
    assert_eq!(doc.set_or_get_attribute(e, "a", None).unwrap(), "1");
    assert_eq!(doc.set_or_get_attribute(e, "a", Some("9")).unwrap(), "9");
}

#[test]
fn test_replace_child_and_content() {
    let mut doc = Document::parse_str("<cfg><name>old</name><port>80</port>note</cfg>").unwrap();
    let cfg = doc.root_element().unwrap();

    let name = doc.create_element("name").unwrap();
    let value = doc.create_text("new");
    doc.append_child(name, value).unwrap();
    doc.replace_child(cfg, name).unwrap();
    assert_eq!(
        serialize_content(&doc, cfg),
        "<name>new</name><port>80</port>note"
    );

    let host = doc.create_element("host").unwrap();
    doc.replace_child(cfg, host).unwrap();
    assert_eq!(doc.elements(cfg, None).count(), 3);

    let port = doc.first_element(cfg, Some("port")).unwrap();
    let only = doc.create_text("443");
    doc.replace_content(port, only).unwrap();
    assert_eq!(serialize_node(&doc, port), "<port>443</port>");
}

#[test]
fn test_deep_copy_is_independent() {
    let mut doc = Document::parse_str(r#"<a k="v"><b>text</b><c><d/></c></a>"#).unwrap();
    let a = doc.root_element().unwrap();
    let copy = doc.deep_copy(a);
    assert_eq!(doc.parent(copy), None);
    assert_same_tree(&doc, a, &doc, copy);

    doc.set_attribute(copy, "k", "changed").unwrap();
    let b_copy = doc.first_element(copy, Some("b")).unwrap();
    doc.detach(b_copy);
    assert_eq!(doc.attribute(a, "k"), Some("v"));
    assert_eq!(serialize_node(&doc, a), r#"<a k="v"><b>text</b><c><d/></c></a>"#);
}

#[test]
fn test_text_nodes_reject_children_and_attributes() {
    let mut doc = Document::new();
    let text = doc.create_text("t");
    let child = doc.create_element("c").unwrap();
    assert_eq!(
        doc.append_child(text, child).unwrap_err().kind,
        ErrorKind::InvalidOperation
    );
    assert_eq!(
        doc.set_attribute(text, "k", "v").unwrap_err().kind,
        ErrorKind::InvalidOperation
    );
    assert_eq!(doc.create_element("").unwrap_err().kind, ErrorKind::InvalidOperation);
}

// --- Search ---

#[test]
fn test_search_document_order() {
    let doc = Document::parse_str(
        r#"<menu>
             <item id="1" type="dish"><item id="2" type="side"/></item>
             <group><item id="3" type="dish"/></group>
           </menu>"#,
    )
    .unwrap();
    let menu = doc.root_element().unwrap();

    let ids = |query: &SearchQuery| -> Vec<String> {
        doc.search(menu, query)
            .into_iter()
            .map(|id| doc.attribute_or(id, "id", "?").to_string())
            .collect()
    };
    assert_eq!(ids(&SearchQuery::new().element("item")), vec!["1", "2", "3"]);
    assert_eq!(ids(&SearchQuery::new().attribute("type", "dish")), vec!["1", "3"]);
    assert_eq!(ids(&SearchQuery::new().element("group")), vec!["?"]);
}

// --- Serialization ---

#[test]
fn test_escaped_and_raw_output() {
    let doc = Document::parse_str(r#"<m note="a &quot;b&quot;">1 &lt; 2 &amp; 3 &gt; 0</m>"#)
        .unwrap();
    let m = doc.root_element().unwrap();
    assert_eq!(doc.attribute(m, "note"), Some(r#"a "b""#));
    assert_eq!(doc.text_content(m), "1 < 2 & 3 > 0");

    assert_eq!(
        serialize_node(&doc, m),
        r#"<m note="a &quot;b&quot;">1 &lt; 2 &amp; 3 &gt; 0</m>"#
    );
    let raw = SerializeOptions::default().escape(false);
    assert_eq!(serialize_node_with_options(&doc, m, &raw), r#"<m note="a "b"">1 < 2 & 3 > 0</m>"#);
    assert_eq!(serialize_content_with_options(&doc, m, &raw), "1 < 2 & 3 > 0");
}

#[test]
fn test_escape_functions() {
    assert_eq!(escape("a&b<c>\"d\""), "a&amp;b&lt;c&gt;&quot;d&quot;");
    assert_eq!(unescape("&amp;lt;"), "&lt;");
    assert_eq!(unescape(&escape("<&amp;>")), "<&amp;>");
}

#[test]
fn test_serialize_then_reparse() {
    let input = r#"<doc v="1"><p>Hello &amp; <em>welcome</em>!</p><br/><q k="&lt;&gt;"/></doc>"#;
    let doc = Document::parse_str(input).unwrap();
    let root = doc.root_element().unwrap();
    let again = Document::parse_str(&serialize_node(&doc, root)).unwrap();
    assert_same_tree(&doc, root, &again, again.root_element().unwrap());
}

// --- Errors and options ---

#[test]
fn test_malformed_documents() {
    for bad in [
        "",
        "   ",
        "<a>",
        "<a></b>",
        "</a>",
        "<a/><b/>",
        "text<a/>",
        "<a/>text",
        "<a><b></a>",
        "<a>&#0;</a>",
        "<a>&undeclared;</a>",
    ] {
        let err = Document::parse_str(bad).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedDocument, "input {bad:?}: {err}");
    }
}

#[test]
fn test_doctype_entities_expand() {
    let xml = r#"<!DOCTYPE note [
  <!ENTITY org "Acme &amp; Co">
  <!ENTITY sign "-- &org;">
]>
<note from="&org;">Thanks&#x21; &sign;</note>"#;
    let doc = Document::parse_str(xml).unwrap();
    let note = doc.root_element().unwrap();
    assert_eq!(doc.attribute(note, "from"), Some("Acme & Co"));
    assert_eq!(doc.text_content(note), "Thanks! -- Acme & Co");
    assert_eq!(doc.children(note).count(), 1);
    assert_eq!(
        serialize_node(&doc, note),
        r#"<note from="Acme &amp; Co">Thanks! -- Acme &amp; Co</note>"#
    );
}

#[test]
fn test_max_depth_option() {
    let deep = "<a><b><c><d/></c></b></a>";
    assert!(Document::parse_str(deep).is_ok());
    let err =
        Document::parse_str_with_options(deep, &ParseOptions::default().max_depth(3)).unwrap_err();
    assert_eq!(err.kind, ErrorKind::MalformedDocument);
}

#[test]
fn test_parse_file_and_missing_file() {
    let path = std::env::temp_dir().join(format!("xmlarbor-test-{}.xml", std::process::id()));
    std::fs::write(&path, "<?xml version=\"1.0\"?>\n<cfg><port>8080</port></cfg>\n").unwrap();
    let doc = Document::parse_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    let cfg = doc.root_element().unwrap();
    let port = doc.first_element(cfg, Some("port")).unwrap();
    assert_eq!(doc.text_content(port), "8080");

    let err = Document::parse_file("/nonexistent/xmlarbor/input.xml").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Io);
}

#[test]
fn test_parse_bytes_with_bom() {
    let doc = Document::parse_bytes(b"\xEF\xBB\xBF<r>ok</r>").unwrap();
    assert_eq!(doc.text_content(doc.root_element().unwrap()), "ok");
}

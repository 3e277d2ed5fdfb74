#![no_main]
use libfuzzer_sys::fuzz_target;
use xmlarbor::serial::serialize_node;
use xmlarbor::{Document, SearchQuery};

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mut doc) = Document::parse_str(s) else {
        return;
    };
    let Some(root) = doc.root_element() else {
        return;
    };

    // A parsed tree serializes to markup that parses back to the same text.
    let output = serialize_node(&doc, root);
    let again = Document::parse_str(&output).unwrap_or_else(|e| panic!("reparse failed: {e}"));
    let again_root = again.root_element().unwrap_or_else(|| panic!("reparse lost the root"));
    assert_eq!(serialize_node(&again, again_root), output);

    let all = doc.search(root, &SearchQuery::new());
    assert_eq!(doc.search_first(root, &SearchQuery::new()), all.first().copied());

    let copy = doc.deep_copy(root);
    assert_eq!(serialize_node(&doc, copy), output);
});

//! Scanner behavior on realistic template fragments.

use assembler_tags::{
    fills, find_block, find_conditional, has_tags, strip_slot_keys, Sigil, Tags,
};

// ============================================================================
// Slotted references
// ============================================================================

#[test]
fn layout_with_two_numbered_slots() {
    let text = concat!(
        "<body>{{#Layout}}",
        "{{@HTMLPLACEHOLDER1}}<h1>Title</h1>{{/HTMLPLACEHOLDER1}}",
        "{{@HTMLPLACEHOLDER2}}<p>Body</p>{{/HTMLPLACEHOLDER2}}",
        "{{/Layout}}</body>",
    );
    let block = find_block(text, 0, Sigil::Slotted, "Layout").unwrap();
    let inner = block.inner_text(text);
    let found = fills(inner);

    let contents: Vec<_> = found.iter().map(|f| &inner[f.content.clone()]).collect();
    assert_eq!(contents, vec!["<h1>Title</h1>", "<p>Body</p>"]);
    assert_eq!(found[0].slot_key(), "{{$HTMLPLACEHOLDER1}}");
    assert_eq!(found[1].slot_key(), "{{$HTMLPLACEHOLDER2}}");
}

#[test]
fn second_reference_found_after_first() {
    let text = "{{#A}}1{{/A}} {{#A}}2{{/A}}";
    let first = find_block(text, 0, Sigil::Slotted, "A").unwrap();
    let second = find_block(text, first.span.end, Sigil::Slotted, "A").unwrap();
    assert_eq!(first.inner_text(text), "1");
    assert_eq!(second.inner_text(text), "2");
}

// ============================================================================
// Data blocks
// ============================================================================

#[test]
fn array_and_empty_blocks_share_close_tag() {
    let text = "{{@items}}<li>{{$n}}</li>{{/items}}{{^items}}none{{/items}}";
    let array = find_block(text, 0, Sigil::Section, "items").unwrap();
    let empty = find_block(text, 0, Sigil::Inverted, "items").unwrap();
    assert_eq!(array.inner_text(text), "<li>{{$n}}</li>");
    assert_eq!(empty.inner_text(text), "none");
    assert_eq!(array.span.end, empty.span.start);
}

#[test]
fn conditional_with_either_close() {
    let text = "{{@a}}x{{/a}}{{@b}}y{{ /b}}";
    assert_eq!(find_conditional(text, 0, "a").unwrap().inner_text(text), "x");
    assert_eq!(find_conditional(text, 0, "b").unwrap().inner_text(text), "y");
}

// ============================================================================
// Leftovers
// ============================================================================

#[test]
fn tokenizer_sees_all_forms() {
    let text = "{{A}}{{#B}}{{@C}}{{^D}}{{$E}}{{/F}}";
    let sigils: Vec<_> = Tags::new(text).map(|t| t.sigil).collect();
    assert_eq!(
        sigils,
        vec![
            Sigil::Plain,
            Sigil::Slotted,
            Sigil::Section,
            Sigil::Inverted,
            Sigil::Value,
            Sigil::Close
        ]
    );
}

#[test]
fn stripped_markers_leave_no_tags() {
    let text = "<div>{{$HTMLPLACEHOLDER}}</div><div>{{$HTMLPLACEHOLDER12}}</div>";
    let stripped = strip_slot_keys(text);
    assert_eq!(stripped, "<div></div><div></div>");
    assert!(!has_tags(&stripped));
}

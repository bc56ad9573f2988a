//! Documented behavior of the template language, checked through both
//! engines.

use assembler::{
    CompiledEngine, EngineConfig, InterpretiveEngine, MergeError, MergeRequest, PreprocessedSite,
    TemplateEngine, TemplateSet,
};
use proptest::prelude::*;

/// Merges `template` with both engines, asserting they agree.
fn merge(set: &TemplateSet, request: &MergeRequest) -> String {
    let config = EngineConfig::new().view_prefix("Main");
    let interpretive = InterpretiveEngine::new(config.clone())
        .merge(set, request)
        .unwrap();
    let compiled = CompiledEngine::new(config)
        .merge(&PreprocessedSite::analyze(set), request)
        .unwrap();
    assert_eq!(interpretive, compiled, "engines disagree on {request:?}");
    interpretive
}

fn page(set: TemplateSet) -> String {
    merge(&set, &MergeRequest::new("s", "Page"))
}

// ============================================================================
// Composition
// ============================================================================

#[test]
fn nested_same_name_references_resolve_depth_first() {
    let set = TemplateSet::new("s")
        .with("A", "<a>{{$HTMLPLACEHOLDER}}</a>")
        .with(
            "Page",
            "{{#A}}{{@HTMLPLACEHOLDER}}{{#A}}{{@HTMLPLACEHOLDER}}X{{/HTMLPLACEHOLDER}}{{/A}}{{/HTMLPLACEHOLDER}}{{/A}}",
        );
    assert_eq!(page(set), "<a><a>X</a></a>");
}

#[test]
fn slot_fill_placeholders_resolve() {
    let set = TemplateSet::new("s")
        .with("Page", "{{#Card}}{{@HTMLPLACEHOLDER}}{{Title}}{{/HTMLPLACEHOLDER}}{{/Card}}")
        .with("Card", "<div>{{$HTMLPLACEHOLDER}}</div>")
        .with("Title", "<h2>t</h2>");
    assert_eq!(page(set), "<div><h2>t</h2></div>");
}

#[test]
fn reference_reached_through_placeholder() {
    let set = TemplateSet::new("s")
        .with("Page", "[{{Body}}]")
        .with("Body", "{{#Card}}{{@HTMLPLACEHOLDER}}x{{/HTMLPLACEHOLDER}}{{/Card}}")
        .with("Card", "<i>{{$HTMLPLACEHOLDER}}</i>");
    assert_eq!(page(set), "[<i>x</i>]");
}

#[test]
fn loose_reference_text_is_discarded() {
    let set = TemplateSet::new("s")
        .with("Page", "{{#Card}}  body  {{/Card}}")
        .with("Card", "[{{$HTMLPLACEHOLDER}}]");
    assert_eq!(page(set), "[]");
}

#[test]
fn missing_main_template_merges_empty() {
    let set = TemplateSet::new("s").with("Other", "x");
    assert_eq!(page(set), "");
}

// ============================================================================
// Data blocks
// ============================================================================

const LIST: &str = "{{@items}}<i>{{$n}}</i>{{/items}}{{^items}}none{{/items}}";

#[test]
fn empty_array_shows_empty_block() {
    let set = TemplateSet::new("s").with_json("Page", LIST, r#"{"items":[]}"#);
    assert_eq!(page(set), "none");
}

#[test]
fn single_item_hides_empty_block() {
    let set = TemplateSet::new("s").with_json("Page", LIST, r#"{"items":[{"n":"x"}]}"#);
    assert_eq!(page(set), "<i>x</i>");
}

#[test]
fn absent_array_shows_empty_block() {
    let set = TemplateSet::new("s").with_json("Page", LIST, r#"{"other":1}"#);
    assert_eq!(page(set), "{{@items}}<i>{{$n}}</i>{{/items}}none");
}

#[test]
fn false_string_is_falsy_in_items() {
    let template = "{{@items}}{{@flag}}Y{{/flag}}{{/items}}";
    let set = TemplateSet::new("s").with_json("Page", template, r#"{"items":[{"flag":"false"}]}"#);
    assert_eq!(page(set), "");
}

#[test]
fn other_strings_are_truthy_in_items() {
    let template = "{{@items}}{{@flag}}Y{{/flag}}{{/items}}";
    let set = TemplateSet::new("s").with_json("Page", template, r#"{"items":[{"flag":"yes"}]}"#);
    assert_eq!(page(set), "Y");
}

#[test]
fn missing_item_field_renders_empty() {
    let template = "{{@items}}<{{$n}}|{{$m}}>{{/items}}";
    let json = r#"{"items":[{"n":"x","m":null},{"n":"y"}]}"#;
    let set = TemplateSet::new("s").with_json("Page", template, json);
    assert_eq!(page(set), "<x|><y|>");
}

#[test]
fn every_block_of_an_array_tag_expands() {
    let template: String = (0..18)
        .map(|i| format!("{{{{@items}}}}<{i}{{{{$n}}}}>{{{{/items}}}}|"))
        .collect();
    let set = TemplateSet::new("s").with_json("Page", &template, r#"{"items":[{"n":"x"}]}"#);
    let expected: String = (0..18).map(|i| format!("<{i}x>|")).collect();
    assert_eq!(page(set), expected);
}

#[test]
fn binding_disabled_leaves_data_tags() {
    let set = TemplateSet::new("s").with_json("Page", LIST, r#"{"items":[]}"#);
    let request = MergeRequest::new("s", "Page").bind_json(false);
    assert_eq!(merge(&set, &request), LIST);
}

#[test]
fn malformed_json_is_empty_data() {
    let set = TemplateSet::new("s").with_json("Page", "{{$n}}|{{^items}}none{{/items}}", "[1,");
    assert_eq!(page(set), "{{$n}}|none");
}

// ============================================================================
// Site values
// ============================================================================

#[test]
fn site_value_conflict_resolves_to_last_key() {
    let set = TemplateSet::new("s")
        .with("Page", "{{$title}}")
        .with_json("Alpha", "", r#"{"title":"from alpha"}"#)
        .with_json("Beta", "", r#"{"title":"from beta"}"#);
    assert_eq!(page(set), "from beta");
}

#[test]
fn own_value_wins_over_site_value() {
    let set = TemplateSet::new("s")
        .with_json("Page", "{{$title}}", r#"{"title":"own"}"#)
        .with_json("Zed", "", r#"{"title":"site"}"#);
    assert_eq!(page(set), "own");
}

// ============================================================================
// Views
// ============================================================================

#[test]
fn view_variant_preferred() {
    let set = TemplateSet::new("s")
        .with("Page", "{{MainContent}}")
        .with("MainContent", "main")
        .with("AltContent", "alt");
    let request = MergeRequest::new("s", "Page").view("Alt");
    assert_eq!(merge(&set, &request), "alt");
}

#[test]
fn view_variant_falls_back() {
    let set = TemplateSet::new("s")
        .with("Page", "{{MainContent}}")
        .with("MainContent", "main");
    let request = MergeRequest::new("s", "Page").view("Alt");
    assert_eq!(merge(&set, &request), "main");
}

#[test]
fn slotted_targets_ignore_view() {
    let set = TemplateSet::new("s")
        .with("Page", "{{#MainBox}}{{@HTMLPLACEHOLDER}}x{{/HTMLPLACEHOLDER}}{{/MainBox}}")
        .with("MainBox", "[{{$HTMLPLACEHOLDER}}]")
        .with("AltBox", "<{{$HTMLPLACEHOLDER}}>");
    let request = MergeRequest::new("s", "Page").view("Alt");
    assert_eq!(merge(&set, &request), "[x]");
}

// ============================================================================
// Faults
// ============================================================================

#[test]
fn interpretive_reports_cycles_compiled_does_not() {
    let set = TemplateSet::new("s").with("Page", "{{#Page}}{{/Page}}");
    let request = MergeRequest::new("s", "Page");

    let interpretive = InterpretiveEngine::default().merge(&set, &request);
    assert!(matches!(interpretive, Err(MergeError::DepthLimit { .. })));

    let compiled = CompiledEngine::default()
        .merge(&PreprocessedSite::analyze(&set), &request)
        .unwrap();
    assert_eq!(compiled, "{{#Page}}{{/Page}}");
}

// ============================================================================
// Flags
// ============================================================================

fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z ]{0,4}",
        Just("{{A}}".to_string()),
        Just("{{B}}".to_string()),
        Just("{{$v}}".to_string()),
        Just("{{#A}}".to_string()),
        Just("{{/A}}".to_string()),
        Just("{{@HTMLPLACEHOLDER}}".to_string()),
        Just("{{/HTMLPLACEHOLDER}}".to_string()),
        Just("{{@items}}".to_string()),
        Just("{{/items}}".to_string()),
        Just("{{^items}}".to_string()),
        Just("{{".to_string()),
        Just("}}".to_string()),
    ]
}

fn soup() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..10).prop_map(|parts| parts.concat())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn stored_flags_match_recomputed(
        a in soup(),
        b in soup(),
        json in prop::option::of(Just(r#"{"v":"x","items":[{"n":1}]}"#)),
    ) {
        let mut set = TemplateSet::new("s").with("B", &b);
        set = match json {
            Some(json) => set.with_json("A", &a, json),
            None => set.with("A", &a),
        };
        let site = PreprocessedSite::analyze(&set);
        for template in site.iter() {
            prop_assert_eq!(template.flags(), template.recompute_flags());
            let flags = template.flags();
            prop_assert_eq!(flags.has_placeholders, !template.plain.placeholders.is_empty());
            prop_assert!(!flags.has_json_data || flags.requires_processing);
        }
    }
}

//! Binding a template's own JSON data into its content.
//!
//! [`Binder::plan`] walks the content once and records each rewrite it
//! makes as a [`ReplacementMapping`]. [`Binder::bind`] replays that plan, so
//! the interpretive engine binding live and the compiled engine replaying
//! stored mappings always agree.
//!
//! The plan runs in four stages over a working copy:
//!
//! 1. array blocks `{{@Tag}}...{{/Tag}}`, one expansion per object element,
//! 2. empty-array blocks `{{^Tag}}...{{/Tag}}`,
//! 3. top-level conditionals `{{@Key}}...{{/Key}}` for non-array keys,
//! 4. `{{$key}}` for top-level scalars.

use std::collections::BTreeMap;

use assembler_tags::{
    contains_ci, find_block, find_ci, find_conditional, is_name, is_slot_name, replace_all_ci,
    Sigil, Tag, Tags, OPEN,
};
use serde::Serialize;

use crate::json::{JsonObject, JsonValue};
use crate::template::{MappingKind, ReplacementMapping};

pub struct Binder<'a> {
    data: &'a JsonObject,
}

impl<'a> Binder<'a> {
    pub fn new(data: &'a JsonObject) -> Self {
        Self { data }
    }

    /// Bound content.
    ///
    /// ```rust
    /// use assembler::{Binder, JsonObject};
    ///
    /// let data = JsonObject::parse(r#"{"items":[{"n":"a"},{"n":"b"}]}"#);
    /// let html = Binder::new(&data).bind("<ul>{{@items}}<li>{{$n}}</li>{{/items}}</ul>");
    /// assert_eq!(html, "<ul><li>a</li><li>b</li></ul>");
    /// ```
    pub fn bind(&self, content: &str) -> String {
        self.plan(content)
            .iter()
            .fold(content.to_string(), |text, mapping| mapping.apply(&text))
    }

    /// The rewrites that bind `content`, in application order.
    pub fn plan(&self, content: &str) -> Vec<ReplacementMapping> {
        let mut plan = Plan::new(content);
        self.bind_arrays(&mut plan);
        self.bind_empty_blocks(&mut plan);
        bind_conditionals(&mut plan, |name| match self.data.lookup(name) {
            None | Some(JsonValue::Array(_)) => None,
            Some(value) => Some(value.is_truthy()),
        });
        self.bind_values(&mut plan);
        plan.steps
    }

    fn bind_arrays(&self, plan: &mut Plan) {
        for (key, value) in self.data.iter() {
            let JsonValue::Array(items) = value else {
                continue;
            };
            if is_slot_name(key) {
                continue;
            }
            for tag in tag_candidates(key) {
                // Resume after each expansion; expanded text is never rescanned.
                let mut pos = 0;
                let mut expanded = false;
                while let Some(block) = find_block(&plan.text, pos, Sigil::Section, &tag) {
                    let original = block.text(&plan.text).to_string();
                    let expansion = expand_items(block.inner_text(&plan.text), items);
                    pos = block.span.start + expansion.len();
                    plan.replace(original, expansion);
                    expanded = true;
                }
                if expanded {
                    break;
                }
            }
        }
    }

    fn bind_empty_blocks(&self, plan: &mut Plan) {
        let mut pos = 0;
        while let Some(at) = find_ci(&plan.text, "{{^", pos) {
            let Some(tag) = Tag::at(&plan.text, at) else {
                break;
            };
            let name = tag.name.to_string();
            let block = (!name.is_empty())
                .then(|| find_block(&plan.text, at, Sigil::Inverted, &name))
                .flatten()
                .filter(|block| block.span.start == at);
            let Some(block) = block else {
                pos = at + 1;
                continue;
            };
            let keep = self.array_for(&name).map_or(true, <[JsonValue]>::is_empty);
            let original = block.text(&plan.text).to_string();
            let replacement = if keep {
                block.inner_text(&plan.text).to_string()
            } else {
                String::new()
            };
            plan.replace(original, replacement);
            pos = at;
        }
    }

    fn bind_values(&self, plan: &mut Plan) {
        for (key, value) in self.data.iter() {
            let Some(text) = value.as_text() else {
                continue;
            };
            let tag = Sigil::Value.tag(key);
            if !is_slot_name(key) && contains_ci(&plan.text, &tag) {
                plan.replace(tag, text);
            }
        }
    }

    /// The array an empty-block tag refers to, matched the way array blocks are.
    fn array_for(&self, tag: &str) -> Option<&'a [JsonValue]> {
        self.data.iter().find_map(|(key, value)| {
            let items = value.as_array()?;
            tag_candidates(key)
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(tag))
                .then_some(items)
        })
    }
}

/// Working text plus the rewrites applied to it so far.
struct Plan {
    text: String,
    steps: Vec<ReplacementMapping>,
}

impl Plan {
    fn new(content: &str) -> Self {
        Self {
            text: content.to_string(),
            steps: Vec::new(),
        }
    }

    fn replace(&mut self, original: String, replacement: String) {
        let mapping = ReplacementMapping::new(original, replacement, MappingKind::JsonPlaceholder);
        self.text = mapping.apply(&self.text);
        self.steps.push(mapping);
    }
}

/// Block tags tried for a JSON array key: the key, then lower-cased,
/// singular and plural forms. Duplicates under ASCII case are dropped.
fn tag_candidates(key: &str) -> Vec<String> {
    let lower = key.to_ascii_lowercase();
    let mut candidates = vec![key.to_string(), lower.clone()];
    if let Some(singular) = lower.strip_suffix('s').filter(|s| !s.is_empty()) {
        candidates.push(singular.to_string());
    }
    candidates.push(format!("{lower}s"));

    let mut unique: Vec<String> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !unique.iter().any(|u| u.eq_ignore_ascii_case(&candidate)) {
            unique.push(candidate);
        }
    }
    unique
}

fn expand_items(block: &str, items: &[JsonValue]) -> String {
    items
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|fields| render_item(block, fields))
        .collect()
}

/// One element's copy of the block: its fields substituted, then its
/// conditionals applied. A `{{$key}}` the element has no field for renders
/// empty, like a null one. Slot keys are kept.
fn render_item(block: &str, fields: &JsonObject) -> String {
    let mut text = block.to_string();
    for (key, value) in fields.iter() {
        if is_slot_name(key) {
            continue;
        }
        let rendered = value.as_text().unwrap_or_default();
        text = replace_all_ci(&text, &Sigil::Value.tag(key), &rendered);
    }
    let unfilled: Vec<String> = Tags::new(&text)
        .filter(|tag| tag.sigil == Sigil::Value)
        .filter(|tag| !tag.name.is_empty() && !tag.name.contains(OPEN) && !is_slot_name(tag.name))
        .map(|tag| text[tag.span].to_string())
        .collect();
    for tag in unfilled {
        text = replace_all_ci(&text, &tag, "");
    }
    let mut plan = Plan::new(&text);
    bind_conditionals(&mut plan, |name| {
        Some(fields.lookup(name).is_some_and(JsonValue::is_truthy))
    });
    plan.text
}

/// Keeps or drops every `{{@Name}}` block for which `decide` has an answer.
/// Slot fills are never conditionals.
fn bind_conditionals(plan: &mut Plan, decide: impl Fn(&str) -> Option<bool>) {
    let mut pos = 0;
    while let Some(at) = find_ci(&plan.text, "{{@", pos) {
        let Some(tag) = Tag::at(&plan.text, at) else {
            break;
        };
        let name = tag.name.to_string();
        let keep = (!name.is_empty() && !is_slot_name(&name))
            .then(|| decide(&name))
            .flatten();
        let block = keep
            .and_then(|_| find_conditional(&plan.text, at, &name))
            .filter(|block| block.span.start == at);
        match (keep, block) {
            (Some(keep), Some(block)) => {
                let original = block.text(&plan.text).to_string();
                let replacement = if keep {
                    block.inner_text(&plan.text).to_string()
                } else {
                    String::new()
                };
                plan.replace(original, replacement);
                pos = at;
            }
            _ => pos = at + 1,
        }
    }
}

/// Site-wide string values consulted by `{{$key}}` and `{{key}}`.
///
/// Keys are lower-cased. Sources are visited in the order given and a later
/// source overwrites an earlier one; both engines pass templates in
/// ascending key order, so the template whose key sorts last wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValueTable(BTreeMap<String, String>);

impl ValueTable {
    pub fn collect<'a>(sources: impl IntoIterator<Item = &'a JsonObject>) -> Self {
        let mut values = BTreeMap::new();
        for data in sources {
            for (key, value) in data.iter() {
                if let JsonValue::String(text) = value {
                    if !is_slot_name(key) {
                        values.insert(key.to_ascii_lowercase(), text.clone());
                    }
                }
            }
        }
        Self(values)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(&key.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The table as rewrite rules: `{{$key}}` for every key, `{{key}}` for
    /// keys that are valid placeholder names.
    pub fn mappings(&self) -> Vec<ReplacementMapping> {
        let mut mappings = Vec::with_capacity(self.0.len() * 2);
        for (key, value) in self.iter() {
            mappings.push(ReplacementMapping::new(
                Sigil::Value.tag(key),
                value,
                MappingKind::JsonPlaceholder,
            ));
            if is_name(key) {
                mappings.push(ReplacementMapping::new(
                    Sigil::Plain.tag(key),
                    value,
                    MappingKind::JsonPlaceholder,
                ));
            }
        }
        mappings
    }
}

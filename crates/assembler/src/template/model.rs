//! Structures produced by template analysis.

use std::ops::Range;

use assembler_tags::{fills, find_ci, replace_all_ci, slot_key, Sigil, Tags};
use serde::Serialize;

use super::source::template_key;
use crate::slots::reference_at;

/// What produced a [`ReplacementMapping`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MappingKind {
    JsonPlaceholder,
    SimpleTemplateRef,
    SlottedTemplateRef,
}

/// The compiled engine's unit of work: `original_text` becomes `replacement_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementMapping {
    pub original_text: String,
    pub replacement_text: String,
    pub kind: MappingKind,
}

impl ReplacementMapping {
    pub fn new(
        original_text: impl Into<String>,
        replacement_text: impl Into<String>,
        kind: MappingKind,
    ) -> Self {
        Self {
            original_text: original_text.into(),
            replacement_text: replacement_text.into(),
            kind,
        }
    }

    /// Replaces every occurrence of the original text, ignoring ASCII case.
    pub fn apply(&self, text: &str) -> String {
        replace_all_ci(text, &self.original_text, &self.replacement_text)
    }
}

/// A `{{Name}}` reference to a sibling template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placeholder {
    pub name: String,
    pub span: Range<usize>,
    /// Lookup key of the sibling, site and name lower-cased.
    pub key: String,
}

impl Placeholder {
    /// Every well-formed placeholder candidate in `text`, including
    /// overlapping ones.
    pub fn scan(text: &str, site: &str) -> Vec<Placeholder> {
        Tags::new(text)
            .filter(|tag| tag.is_placeholder())
            .map(|tag| Placeholder {
                name: tag.name.to_string(),
                span: tag.span,
                key: template_key(site, tag.name),
            })
            .collect()
    }

    /// The tag text as it appears in the template.
    pub fn full_match(&self) -> String {
        Sigil::Plain.tag(&self.name)
    }
}

/// Content supplied for one slot of a slotted reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotFill {
    /// Digits after `HTMLPLACEHOLDER`; empty for the default slot.
    pub suffix: String,
    pub content: String,
    /// Marker in the target template this fill replaces.
    pub slot_key: String,
    pub references: Vec<SlottedTemplateReference>,
    pub placeholders: Vec<Placeholder>,
}

impl SlotFill {
    fn new(suffix: &str, content: &str, site: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
            content: content.to_string(),
            slot_key: slot_key(suffix),
            references: SlottedTemplateReference::scan(content, site),
            placeholders: Placeholder::scan(content, site),
        }
    }

    pub fn is_default(&self) -> bool {
        self.suffix.is_empty()
    }
}

/// A `{{#Name}}...{{/Name}}` region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlottedTemplateReference {
    pub name: String,
    pub span: Range<usize>,
    pub full_match: String,
    pub inner: String,
    /// `{{@HTMLPLACEHOLDER[n]}}` fills; other inner text contributes nothing.
    pub fills: Vec<SlotFill>,
}

impl SlottedTemplateReference {
    /// Well-formed references in `text`, outermost first. References nested
    /// inside one of them are reached through its fills.
    pub fn scan(text: &str, site: &str) -> Vec<SlottedTemplateReference> {
        let mut found = Vec::new();
        let mut pos = 0;
        while let Some(at) = find_ci(text, "{{#", pos) {
            let Some(reference) = reference_at(text, at) else {
                pos = at + 1;
                continue;
            };
            let inner = &text[reference.inner.clone()];
            let fills = fills(inner)
                .iter()
                .map(|fill| SlotFill::new(fill.suffix, &inner[fill.content.clone()], site))
                .collect();
            found.push(SlottedTemplateReference {
                name: reference.name.to_string(),
                span: reference.span.clone(),
                full_match: text[reference.span.clone()].to_string(),
                inner: inner.to_string(),
                fills,
            });
            pos = reference.span.end;
        }
        found
    }
}

/// Shortcut flags derived from a template's collections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateFlags {
    pub has_placeholders: bool,
    pub has_slotted_templates: bool,
    pub has_json_data: bool,
    pub requires_processing: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    mod placeholders {
        use super::*;

        #[test]
        fn skips_other_forms_and_bad_names() {
            let found = Placeholder::scan("{{Header}} {{$v}} {{#A}} {{bad name}} {{}}", "Site");
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].name, "Header");
            assert_eq!(found[0].span, 0..10);
            assert_eq!(found[0].key, "site_header");
            assert_eq!(found[0].full_match(), "{{Header}}");
        }
    }

    mod references {
        use super::*;

        #[test]
        fn fills_and_nested_structure() {
            let text = "{{#Outer}}{{@HTMLPLACEHOLDER}}{{#Inner}}{{@HTMLPLACEHOLDER2}}{{Leaf}}{{/HTMLPLACEHOLDER2}}{{/Inner}}{{/HTMLPLACEHOLDER}}{{/Outer}}";
            let found = SlottedTemplateReference::scan(text, "s");
            assert_eq!(found.len(), 1);
            let outer = &found[0];
            assert_eq!(outer.name, "Outer");
            assert_eq!(outer.full_match, text);
            assert_eq!(outer.fills.len(), 1);
            assert!(outer.fills[0].is_default());

            let inner = &outer.fills[0].references;
            assert_eq!(inner.len(), 1);
            assert_eq!(inner[0].name, "Inner");
            assert_eq!(inner[0].fills[0].suffix, "2");
            assert_eq!(inner[0].fills[0].slot_key, "{{$HTMLPLACEHOLDER2}}");
            assert_eq!(inner[0].fills[0].placeholders[0].name, "Leaf");
        }

        #[test]
        fn loose_inner_text_is_not_a_fill() {
            let found = SlottedTemplateReference::scan("{{#Card}}  hello {{Leaf}} {{/Card}}", "s");
            assert_eq!(found[0].inner, "  hello {{Leaf}} ");
            assert!(found[0].fills.is_empty());
        }

        #[test]
        fn unclosed_or_bad_names_are_skipped() {
            assert!(SlottedTemplateReference::scan("{{#Card}} never closed", "s").is_empty());
            assert!(SlottedTemplateReference::scan("{{#my-card}}x{{/my-card}}", "s").is_empty());
        }
    }

    mod mappings {
        use super::*;

        #[test]
        fn apply_replaces_all_ignoring_case() {
            let mapping =
                ReplacementMapping::new("{{$title}}", "Hi", MappingKind::JsonPlaceholder);
            assert_eq!(mapping.apply("{{$title}} / {{$TITLE}}"), "Hi / Hi");
        }
    }
}

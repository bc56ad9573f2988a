//! One-time analysis of a template set.
//!
//! Analysis runs per binding mode, because binding changes the text the
//! scanners see. For each mode every template gets its effective content,
//! its placeholders and references, and the slotted and simple mappings the
//! compiled engine replays. The site keeps the value table and an index of
//! all mappings so that a merge does no parsing of its own.

use std::collections::{BTreeMap, HashMap, HashSet};

use assembler_tags::Sigil;
use serde::Serialize;

use super::model::{
    MappingKind, Placeholder, ReplacementMapping, SlottedTemplateReference, TemplateFlags,
};
use super::source::{template_key, TemplateSet, TemplateSource};
use crate::binder::{Binder, ValueTable};
use crate::config::DEFAULT_MAX_DEPTH;
use crate::json::JsonObject;
use crate::slots::{render, sweep, SiteContents};

/// Whether templates are bound with their JSON data before resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Binding {
    Raw,
    Bound,
}

impl From<bool> for Binding {
    fn from(bind_json: bool) -> Self {
        if bind_json {
            Binding::Bound
        } else {
            Binding::Raw
        }
    }
}

/// What one template looks like under one binding mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateAnalysis {
    /// Effective content: raw, or bound with the template's own data.
    pub content: String,
    pub placeholders: Vec<Placeholder>,
    pub references: Vec<SlottedTemplateReference>,
    /// Slotted mappings first, then simple ones.
    pub mappings: Vec<ReplacementMapping>,
}

impl TemplateAnalysis {
    fn build(content: &str, contents: &SiteContents) -> Self {
        let site = contents.site();
        let placeholders = Placeholder::scan(content, site);
        let references = SlottedTemplateReference::scan(content, site);

        let mut mappings: Vec<ReplacementMapping> = Vec::new();
        for reference in sweep(content, contents) {
            let inner = &content[reference.inner.clone()];
            match render(reference.name, reference.target, inner, contents, 1) {
                Ok(rendered) => mappings.push(ReplacementMapping::new(
                    &content[reference.span.clone()],
                    rendered,
                    MappingKind::SlottedTemplateRef,
                )),
                Err(error) => {
                    tracing::warn!(template = reference.name, %error, "dropping slotted reference");
                }
            }
        }
        for placeholder in &placeholders {
            let original = &content[placeholder.span.clone()];
            let replacement = contents.by_key(&placeholder.key).unwrap_or(original);
            mappings.push(ReplacementMapping::new(
                original,
                replacement,
                MappingKind::SimpleTemplateRef,
            ));
        }
        dedup(&mut mappings);

        Self {
            content: content.to_string(),
            placeholders,
            references,
            mappings,
        }
    }
}

fn dedup(mappings: &mut Vec<ReplacementMapping>) {
    let mut seen = HashSet::new();
    mappings.retain(|m| seen.insert(m.original_text.clone()));
}

/// A template with everything analysis learned about it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreprocessedTemplate {
    pub key: String,
    pub name: String,
    pub source: TemplateSource,
    pub data: JsonObject,
    /// The binder's plan for this template's own data.
    pub json_mappings: Vec<ReplacementMapping>,
    pub plain: TemplateAnalysis,
    pub bound: TemplateAnalysis,
    flags: TemplateFlags,
}

impl PreprocessedTemplate {
    pub fn flags(&self) -> TemplateFlags {
        self.flags
    }

    /// Flags derived from the collections as they are now.
    pub fn recompute_flags(&self) -> TemplateFlags {
        let has_placeholders = !self.plain.placeholders.is_empty();
        let has_slotted_templates = !self.plain.references.is_empty();
        let has_json_data = !self.data.is_empty();
        TemplateFlags {
            has_placeholders,
            has_slotted_templates,
            has_json_data,
            requires_processing: has_placeholders
                || has_slotted_templates
                || has_json_data
                || !self.json_mappings.is_empty()
                || !self.plain.mappings.is_empty()
                || !self.bound.mappings.is_empty(),
        }
    }

    pub fn analysis(&self, binding: Binding) -> &TemplateAnalysis {
        match binding {
            Binding::Raw => &self.plain,
            Binding::Bound => &self.bound,
        }
    }
}

/// Every mapping of a site under one binding mode, keyed for lookup at a
/// tag position.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct MappingIndex {
    /// Open tag text to `(span, rendering)` pairs.
    pub slotted: HashMap<String, Vec<(String, String)>>,
    /// Lower-cased `{{Name}}` to the placeholder name.
    pub simple: HashMap<String, String>,
}

impl MappingIndex {
    fn build<'a>(analyses: impl IntoIterator<Item = &'a TemplateAnalysis>) -> Self {
        let mut index = Self::default();
        for analysis in analyses {
            for reference in mappings_of(analysis, MappingKind::SlottedTemplateRef) {
                let Some(open) = open_tag(&reference.original_text) else {
                    continue;
                };
                let rules = index.slotted.entry(open.to_string()).or_default();
                if !rules.iter().any(|(span, _)| *span == reference.original_text) {
                    rules.push((
                        reference.original_text.clone(),
                        reference.replacement_text.clone(),
                    ));
                }
            }
            for placeholder in &analysis.placeholders {
                index
                    .simple
                    .entry(placeholder.full_match().to_ascii_lowercase())
                    .or_insert_with(|| placeholder.name.clone());
            }
        }
        index
    }
}

fn mappings_of(
    analysis: &TemplateAnalysis,
    kind: MappingKind,
) -> impl Iterator<Item = &ReplacementMapping> {
    analysis.mappings.iter().filter(move |m| m.kind == kind)
}

/// The `{{#Name}}` prefix of a slotted reference span.
fn open_tag(span: &str) -> Option<&str> {
    span.find("}}").map(|end| &span[..end + 2])
}

/// Summary counts for a preprocessed site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSummary {
    pub site_name: String,
    pub total_templates: usize,
    pub templates_requiring_processing: usize,
    pub templates_with_json_data: usize,
    pub templates_with_placeholders: usize,
}

/// A whole site after analysis, ready for the compiled engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreprocessedSite {
    pub site: String,
    pub templates: BTreeMap<String, PreprocessedTemplate>,
    pub values: ValueTable,
    /// The value table as rewrite rules.
    pub value_mappings: Vec<ReplacementMapping>,
    #[serde(skip)]
    raw_index: MappingIndex,
    #[serde(skip)]
    bound_index: MappingIndex,
    #[serde(skip)]
    value_index: HashMap<String, String>,
}

impl PreprocessedSite {
    /// Analyzes every template of `set` under both binding modes.
    pub fn analyze(set: &TemplateSet) -> Self {
        Self::analyze_with_max_depth(set, DEFAULT_MAX_DEPTH)
    }

    /// Like [`analyze`](Self::analyze). References nested deeper than
    /// `max_depth` get no mapping and stay literal in compiled output.
    pub fn analyze_with_max_depth(set: &TemplateSet, max_depth: usize) -> Self {
        let data: BTreeMap<String, JsonObject> = set
            .iter()
            .filter_map(|(key, source)| {
                let json = source.json.as_deref()?;
                Some((key.to_string(), JsonObject::parse(json)))
            })
            .collect();

        let plans: BTreeMap<String, Vec<ReplacementMapping>> = data
            .iter()
            .filter_map(|(key, object)| {
                let source = set.get_key(key)?;
                Some((key.clone(), Binder::new(object).plan(&source.content)))
            })
            .collect();

        let raw_contents = SiteContents::from_parts(
            set.site(),
            set.iter()
                .map(|(key, source)| (key.to_string(), source.content.clone()))
                .collect(),
        )
        .with_max_depth(max_depth);
        let bound_contents = SiteContents::from_parts(
            set.site(),
            set.iter()
                .map(|(key, source)| {
                    let content = match plans.get(key) {
                        Some(plan) => plan
                            .iter()
                            .fold(source.content.clone(), |text, m| m.apply(&text)),
                        None => source.content.clone(),
                    };
                    (key.to_string(), content)
                })
                .collect(),
        )
        .with_max_depth(max_depth);

        let templates: BTreeMap<String, PreprocessedTemplate> = set
            .iter()
            .map(|(key, source)| {
                let plain = TemplateAnalysis::build(
                    raw_contents.by_key(key).unwrap_or_default(),
                    &raw_contents,
                );
                let bound = TemplateAnalysis::build(
                    bound_contents.by_key(key).unwrap_or_default(),
                    &bound_contents,
                );
                let mut template = PreprocessedTemplate {
                    key: key.to_string(),
                    name: source.name.clone(),
                    source: source.clone(),
                    data: data.get(key).cloned().unwrap_or_default(),
                    json_mappings: plans.get(key).cloned().unwrap_or_default(),
                    plain,
                    bound,
                    flags: TemplateFlags::default(),
                };
                template.flags = template.recompute_flags();
                (key.to_string(), template)
            })
            .collect();

        let values = ValueTable::collect(data.values());
        let value_mappings = values.mappings();
        let value_index = value_mappings
            .iter()
            .map(|m| (m.original_text.to_ascii_lowercase(), m.replacement_text.clone()))
            .collect();
        // Values reach merged text through the placeholder sweep, so tags
        // inside them need rules too.
        let value_analyses: Vec<TemplateAnalysis> = values
            .iter()
            .map(|(_, value)| TemplateAnalysis::build(value, &bound_contents))
            .collect();

        let site = Self {
            site: set.site().to_string(),
            raw_index: MappingIndex::build(templates.values().map(|t| &t.plain)),
            bound_index: MappingIndex::build(
                templates.values().map(|t| &t.bound).chain(&value_analyses),
            ),
            templates,
            values,
            value_mappings,
            value_index,
        };
        tracing::debug!(
            site = %site.site,
            templates = site.templates.len(),
            values = site.values.len(),
            "analyzed site"
        );
        site
    }

    pub fn get(&self, name: &str) -> Option<&PreprocessedTemplate> {
        self.templates.get(&template_key(&self.site, name))
    }

    /// Effective content of `name` under `binding`.
    pub fn content(&self, name: &str, binding: Binding) -> Option<&str> {
        self.get(name)
            .map(|template| template.analysis(binding).content.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PreprocessedTemplate> {
        self.templates.values()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub(crate) fn index(&self, binding: Binding) -> &MappingIndex {
        match binding {
            Binding::Raw => &self.raw_index,
            Binding::Bound => &self.bound_index,
        }
    }

    /// Value for a lower-cased `{{$key}}` or `{{key}}` tag.
    pub(crate) fn value_for(&self, tag: &str) -> Option<&str> {
        self.value_index.get(tag).map(String::as_str)
    }

    pub fn summary(&self) -> SiteSummary {
        let count = |pick: fn(TemplateFlags) -> bool| self.iter().filter(|t| pick(t.flags())).count();
        SiteSummary {
            site_name: self.site.clone(),
            total_templates: self.len(),
            templates_requiring_processing: count(|f| f.requires_processing),
            templates_with_json_data: count(|f| f.has_json_data),
            templates_with_placeholders: count(|f| f.has_placeholders),
        }
    }
}

/// The value tag for a key, lower-cased as the index stores it.
pub(crate) fn value_tag(sigil: Sigil, name: &str) -> String {
    sigil.tag(name).to_ascii_lowercase()
}

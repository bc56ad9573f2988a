//! The interpretive engine: every pass scans and resolves the raw text.

use std::collections::BTreeMap;

use assembler_tags::{strip_slot_keys, Sigil};

use super::{check_output, substitute, EngineKind, MergeRequest, TemplateEngine};
use crate::binder::ValueTable;
use crate::config::EngineConfig;
use crate::error::MergeError;
use crate::json::JsonObject;
use crate::slots::{expand, SiteContents};
use crate::template::{Binding, TemplateSet};
use crate::view::ViewResolver;

/// Resolves templates straight from a [`TemplateSet`].
///
/// ```rust
/// use assembler::{EngineConfig, InterpretiveEngine, MergeRequest, TemplateEngine, TemplateSet};
///
/// let set = TemplateSet::new("shop")
///     .with("Page", "<main>{{#Card}}{{@HTMLPLACEHOLDER}}hello{{/HTMLPLACEHOLDER}}{{/Card}}</main>")
///     .with("Card", "<div>{{$HTMLPLACEHOLDER}}</div>");
/// let engine = InterpretiveEngine::new(EngineConfig::default());
/// let html = engine.merge(&set, &MergeRequest::new("shop", "Page")).unwrap();
/// assert_eq!(html, "<main><div>hello</div></main>");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InterpretiveEngine {
    config: EngineConfig,
}

impl InterpretiveEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl TemplateEngine for InterpretiveEngine {
    type Source = TemplateSet;

    fn kind(&self) -> EngineKind {
        EngineKind::Interpretive
    }

    fn merge(&self, set: &TemplateSet, request: &MergeRequest) -> Result<String, MergeError> {
        let views = ViewResolver::new(&self.config.view_prefix, request.view.as_deref());
        let (contents, values) = match request.binding() {
            Binding::Raw => (SiteContents::new(set, &BTreeMap::new()), ValueTable::default()),
            Binding::Bound => {
                let data = site_data(set);
                let values = ValueTable::collect(data.values());
                (SiteContents::new(set, &data), values)
            }
        };
        let contents = contents.with_max_depth(self.config.max_depth);

        let Some(main) = views.resolve(&request.template, |name| contents.content(name)) else {
            tracing::debug!(site = set.site(), template = %request.template, "main template not found");
            return Ok(String::new());
        };

        let limit = self.config.interpretive_pass_limit;
        let mut text = main.to_string();
        for pass in 1..=limit {
            let expanded = expand(&text, &contents, 0)?;
            let next = substitute(&expanded, |tag| {
                if tag.sigil == Sigil::Value {
                    return values.get(tag.name);
                }
                views
                    .resolve(tag.name, |name| contents.content(name))
                    .or_else(|| values.get(tag.name))
            });
            check_output(&next, self.config.output_limit)?;
            if next == text {
                tracing::trace!(pass, "fixed point reached");
                return Ok(strip_slot_keys(&next));
            }
            text = next;
        }

        tracing::warn!(
            site = set.site(),
            template = %request.template,
            passes = limit,
            "no fixed point within the pass limit"
        );
        Err(MergeError::PassLimit {
            engine: EngineKind::Interpretive,
            passes: limit,
            partial: text,
        })
    }
}

/// Parsed JSON of every template that has a side-channel, by key.
fn site_data(set: &TemplateSet) -> BTreeMap<String, JsonObject> {
    set.iter()
        .filter_map(|(key, source)| {
            let json = source.json.as_deref()?;
            Some((key.to_string(), JsonObject::parse(json)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merge(set: &TemplateSet, request: &MergeRequest) -> Result<String, MergeError> {
        InterpretiveEngine::new(EngineConfig::new().view_prefix("Main")).merge(set, request)
    }

    #[test]
    fn missing_main_template_is_empty() {
        let set = TemplateSet::new("s").with("A", "a");
        assert_eq!(merge(&set, &MergeRequest::new("s", "Nope")).unwrap(), "");
    }

    #[test]
    fn placeholders_resolve_recursively() {
        let set = TemplateSet::new("s")
            .with("Page", "[{{Header}}]")
            .with("Header", "<h1>{{Title}}</h1>")
            .with("Title", "Hi");
        assert_eq!(merge(&set, &MergeRequest::new("s", "Page")).unwrap(), "[<h1>Hi</h1>]");
    }

    #[test]
    fn main_template_follows_view() {
        let set = TemplateSet::new("s")
            .with("MainContent", "main")
            .with("AltContent", "alt");
        let request = MergeRequest::new("s", "MainContent").view("Alt");
        assert_eq!(merge(&set, &request).unwrap(), "alt");
        let request = MergeRequest::new("s", "MainContent").view("Other");
        assert_eq!(merge(&set, &request).unwrap(), "main");
    }

    #[test]
    fn values_come_from_sibling_json() {
        let set = TemplateSet::new("s")
            .with("Page", "{{$brand}}|{{Brand}}|{{$missing}}")
            .with_json("Data", "", r#"{"Brand":"ACME"}"#);
        let out = merge(&set, &MergeRequest::new("s", "Page")).unwrap();
        assert_eq!(out, "ACME|ACME|{{$missing}}");
        let raw = merge(&set, &MergeRequest::new("s", "Page").bind_json(false)).unwrap();
        assert_eq!(raw, "{{$brand}}|{{Brand}}|{{$missing}}");
    }

    #[test]
    fn template_wins_over_value() {
        let set = TemplateSet::new("s")
            .with("Page", "{{Brand}}")
            .with("Brand", "<b>template</b>")
            .with_json("Data", "", r#"{"brand":"value"}"#);
        assert_eq!(merge(&set, &MergeRequest::new("s", "Page")).unwrap(), "<b>template</b>");
    }

    #[test]
    fn unused_slot_keys_are_stripped() {
        let set = TemplateSet::new("s").with("Page", "a{{$HTMLPLACEHOLDER3}}b");
        assert_eq!(merge(&set, &MergeRequest::new("s", "Page")).unwrap(), "ab");
    }

    #[test]
    fn placeholder_cycle_hits_pass_limit() {
        let set = TemplateSet::new("s").with("A", "x{{A}}");
        let error = merge(&set, &MergeRequest::new("s", "A")).unwrap_err();
        match error {
            MergeError::PassLimit { engine, passes, partial } => {
                assert_eq!(engine, EngineKind::Interpretive);
                assert_eq!(passes, 100);
                assert!(partial.starts_with("xxxx"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn depth_limit_comes_from_config() {
        let set = TemplateSet::new("s")
            .with("Page", "{{#A}}{{/A}}")
            .with("A", "{{#B}}{{/B}}")
            .with("B", "b");
        let request = MergeRequest::new("s", "Page");
        let shallow = InterpretiveEngine::new(EngineConfig::new().max_depth(1));
        let error = shallow.merge(&set, &request).unwrap_err();
        assert!(matches!(error, MergeError::DepthLimit { depth: 1, .. }));
        let deep = InterpretiveEngine::new(EngineConfig::new().max_depth(2));
        assert_eq!(deep.merge(&set, &request).unwrap(), "b");
    }

    #[test]
    fn growth_hits_output_limit() {
        let set = TemplateSet::new("s").with("A", "{{A}}{{A}}");
        let engine = InterpretiveEngine::new(EngineConfig::new().output_limit(1024));
        let error = engine.merge(&set, &MergeRequest::new("s", "A")).unwrap_err();
        assert!(matches!(error, MergeError::OutputLimit { limit: 1024 }));
    }
}

//! The compiled engine: merges replay the mappings analysis produced.

use assembler_tags::{find_ci, strip_slot_keys, Sigil, Tag};

use super::{check_output, substitute, EngineKind, MergeRequest, TemplateEngine};
use crate::config::EngineConfig;
use crate::error::MergeError;
use crate::template::{value_tag, Binding, MappingIndex, PreprocessedSite};
use crate::view::ViewResolver;

/// Resolves templates from a [`PreprocessedSite`].
///
/// No tag is parsed or resolved at merge time beyond locating it: slotted
/// references are replaced by their analyzed rendering, `{{Name}}` tags by
/// the effective content of the template they name (through the view), and
/// value tags from the site's value table.
#[derive(Debug, Clone, Default)]
pub struct CompiledEngine {
    config: EngineConfig,
}

impl CompiledEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl TemplateEngine for CompiledEngine {
    type Source = PreprocessedSite;

    fn kind(&self) -> EngineKind {
        EngineKind::Compiled
    }

    fn merge(&self, site: &PreprocessedSite, request: &MergeRequest) -> Result<String, MergeError> {
        let binding = request.binding();
        let views = ViewResolver::new(&self.config.view_prefix, request.view.as_deref());
        let content = |name: &str| site.content(name, binding);

        let Some(main) = views.resolve(&request.template, content) else {
            tracing::debug!(site = %site.site, template = %request.template, "main template not found");
            return Ok(String::new());
        };

        let index = site.index(binding);
        let mut text = main.to_string();
        for pass in 1..=self.config.compiled_pass_limit {
            let expanded = apply_slotted(&text, index);
            let next = substitute(&expanded, |tag| {
                let lowered = value_tag(tag.sigil, tag.name);
                let template = match tag.sigil {
                    Sigil::Plain => index
                        .simple
                        .get(&lowered)
                        .and_then(|name| views.resolve(name, content)),
                    _ => None,
                };
                template.or_else(|| match binding {
                    Binding::Bound => site.value_for(&lowered),
                    Binding::Raw => None,
                })
            });
            check_output(&next, self.config.output_limit)?;
            if next == text {
                tracing::trace!(pass, "fixed point reached");
                return Ok(strip_slot_keys(&next));
            }
            text = next;
        }

        tracing::debug!(
            site = %site.site,
            template = %request.template,
            passes = self.config.compiled_pass_limit,
            "pass limit reached, returning text as is"
        );
        Ok(strip_slot_keys(&text))
    }
}

/// One slot sweep: each `{{#` that begins an analyzed reference span is
/// replaced by that span's rendering.
fn apply_slotted(text: &str, index: &MappingIndex) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut pos = 0;
    while let Some(at) = find_ci(text, "{{#", pos) {
        let rule = Tag::at(text, at)
            .and_then(|tag| index.slotted.get(&text[tag.span]))
            .and_then(|rules| {
                rules
                    .iter()
                    .find(|(span, _)| text[at..].starts_with(span.as_str()))
            });
        match rule {
            Some((span, rendering)) => {
                out.push_str(&text[cursor..at]);
                out.push_str(rendering);
                cursor = at + span.len();
                pos = cursor;
            }
            None => pos = at + 1,
        }
    }
    out.push_str(&text[cursor..]);
    out
}

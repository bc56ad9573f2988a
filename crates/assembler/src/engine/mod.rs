//! The two resolution strategies.
//!
//! Both engines rewrite a template to a fixed point with the same pass:
//! one sweep that replaces resolvable slotted references with their
//! rendering, then one sweep that replaces resolvable `{{Name}}` and
//! `{{$key}}` tags. A tag is either replaced whole and skipped, or left and
//! stepped over by one byte. Since a replacement depends only on the tag
//! text, the site, the view and the binding mode, the two engines produce
//! the same output.
//!
//! - [`InterpretiveEngine`] computes every replacement live from a
//!   [`TemplateSet`](crate::TemplateSet).
//! - [`CompiledEngine`] looks every replacement up in a
//!   [`PreprocessedSite`](crate::PreprocessedSite) built ahead of time.
//!
//! The engines differ only in how they give up: the interpretive engine
//! reports [`MergeError::PassLimit`] and [`MergeError::DepthLimit`], the
//! compiled engine stops quietly after its pass limit and analysis drops
//! references that exceed the depth limit.

mod compiled;
mod interpretive;

use std::fmt;
use std::str::FromStr;

use assembler_tags::{find_ci, is_name, Sigil, Tag, OPEN};
use serde::Serialize;

pub use compiled::CompiledEngine;
pub use interpretive::InterpretiveEngine;

use crate::error::{MergeError, ParseEngineError};
use crate::template::Binding;

/// Which engine resolves a merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Interpretive,
    Compiled,
}

impl EngineKind {
    pub const ALL: [EngineKind; 2] = [EngineKind::Interpretive, EngineKind::Compiled];

    pub fn as_str(self) -> &'static str {
        match self {
            EngineKind::Interpretive => "interpretive",
            EngineKind::Compiled => "compiled",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = ParseEngineError;

    /// Accepts `interpretive`/`normal` and `compiled`/`preprocess`, ignoring
    /// case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "interpretive" | "normal" => Ok(EngineKind::Interpretive),
            "compiled" | "preprocess" | "preprocessed" => Ok(EngineKind::Compiled),
            _ => Err(ParseEngineError(s.to_string())),
        }
    }
}

/// One merge: which template of which site, seen through which view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    pub site: String,
    pub template: String,
    pub view: Option<String>,
    pub bind_json: bool,
}

impl MergeRequest {
    pub fn new(site: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            template: template.into(),
            view: None,
            bind_json: true,
        }
    }

    pub fn view(mut self, view: impl Into<String>) -> Self {
        let view = view.into();
        self.view = (!view.is_empty()).then_some(view);
        self
    }

    pub fn bind_json(mut self, enabled: bool) -> Self {
        self.bind_json = enabled;
        self
    }

    pub fn binding(&self) -> Binding {
        Binding::from(self.bind_json)
    }
}

/// A resolution strategy over some form of a site's templates.
pub trait TemplateEngine: Send + Sync {
    /// What the engine reads templates from.
    type Source;

    fn kind(&self) -> EngineKind;

    /// Resolves the requested template to text with no resolvable tag left.
    ///
    /// A main template that does not exist merges to the empty string.
    fn merge(&self, source: &Self::Source, request: &MergeRequest) -> Result<String, MergeError>;
}

/// One placeholder sweep over `text`.
///
/// `resolve` sees each `{{$key}}` tag and each `{{Name}}` tag with a valid
/// name; other tags are stepped over. A resolved tag is replaced and the
/// sweep continues after it, so replacement text is not rescanned until the
/// next pass.
fn substitute<'r>(text: &str, mut resolve: impl FnMut(&Tag<'_>) -> Option<&'r str>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut pos = 0;
    while let Some(at) = find_ci(text, OPEN, pos) {
        let Some(tag) = Tag::at(text, at) else {
            break;
        };
        let replacement = match tag.sigil {
            Sigil::Value => resolve(&tag),
            Sigil::Plain if is_name(tag.name) => resolve(&tag),
            _ => None,
        };
        match replacement {
            Some(replacement) => {
                out.push_str(&text[cursor..at]);
                out.push_str(replacement);
                cursor = tag.span.end;
                pos = tag.span.end;
            }
            None => pos = at + 1,
        }
    }
    out.push_str(&text[cursor..]);
    out
}

/// Errors when `text` has outgrown the configured ceiling.
fn check_output(text: &str, limit: usize) -> Result<(), MergeError> {
    if text.len() > limit {
        return Err(MergeError::OutputLimit { limit });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_aliases() {
        assert_eq!("normal".parse::<EngineKind>(), Ok(EngineKind::Interpretive));
        assert_eq!("Preprocess".parse::<EngineKind>(), Ok(EngineKind::Compiled));
        assert_eq!(" COMPILED ".parse::<EngineKind>(), Ok(EngineKind::Compiled));
        assert!("fast".parse::<EngineKind>().is_err());
    }

    #[test]
    fn kind_round_trips_through_display() {
        for kind in EngineKind::ALL {
            assert_eq!(kind.to_string().parse::<EngineKind>(), Ok(kind));
        }
    }

    #[test]
    fn substitute_skips_structural_and_bad_names() {
        let text = "{{#A}}{{A}}{{$v}}{{bad name}}{{/A}}";
        let out = substitute(text, |tag| match tag.name {
            "A" => Some("x"),
            "v" => Some("y"),
            _ => None,
        });
        assert_eq!(out, "{{#A}}xy{{bad name}}{{/A}}");
    }

    #[test]
    fn substitute_does_not_rescan_replacements() {
        let out = substitute("{{A}}", |_| Some("{{A}}{{A}}"));
        assert_eq!(out, "{{A}}{{A}}");
    }

    #[test]
    fn substitute_steps_one_byte_past_misses() {
        let out = substitute("{{{{A}}", |tag| (tag.name == "A").then_some("x"));
        assert_eq!(out, "{{x");
    }

    #[test]
    fn empty_view_is_no_view() {
        let request = MergeRequest::new("s", "Main").view("");
        assert_eq!(request.view, None);
        assert_eq!(request.binding(), Binding::Bound);
        assert_eq!(request.bind_json(false).binding(), Binding::Raw);
    }
}

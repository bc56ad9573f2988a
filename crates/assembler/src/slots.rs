//! Slotted-reference rendering.
//!
//! Both engines render a `{{#Name}}...{{/Name}}` reference with the same
//! function, so a reference always becomes the same text whether it is met
//! live during a merge or ahead of time during analysis. Rendering:
//!
//! 1. substitutes every fill into the slot key it names in the target,
//! 2. strips slot keys left without a fill; inner text outside any fill is
//!    dropped,
//! 3. renders the references that now appear in the result, one level
//!    deeper.
//!
//! Targets resolve by plain key. Simple placeholders inside fills are left
//! for the placeholder sweep, which knows the request's view.

use std::collections::BTreeMap;
use std::ops::Range;

use assembler_tags::{
    fills, find_ci, find_matching_close, is_name, replace_all_ci, strip_slot_keys, Sigil, Tag,
};

use crate::binder::Binder;
use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::MergeError;
use crate::json::JsonObject;
use crate::template::{template_key, TemplateSet};

/// Effective content of every template of a site: raw, or bound with the
/// template's own JSON data. Also carries how deep references may nest.
#[derive(Debug, Clone)]
pub struct SiteContents {
    site: String,
    contents: BTreeMap<String, String>,
    max_depth: usize,
}

impl SiteContents {
    /// Binds each template whose key appears in `data`; the rest stay raw.
    pub fn new(set: &TemplateSet, data: &BTreeMap<String, JsonObject>) -> Self {
        let contents = set
            .iter()
            .map(|(key, source)| {
                let content = match data.get(key) {
                    Some(object) => Binder::new(object).bind(&source.content),
                    None => source.content.clone(),
                };
                (key.to_string(), content)
            })
            .collect();
        Self {
            site: set.site().to_string(),
            contents,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Contents already computed, keyed by [`template_key`].
    pub fn from_parts(site: impl Into<String>, contents: BTreeMap<String, String>) -> Self {
        Self {
            site: site.into(),
            contents,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn content(&self, name: &str) -> Option<&str> {
        self.by_key(&template_key(&self.site, name))
    }

    pub fn by_key(&self, key: &str) -> Option<&str> {
        self.contents.get(key).map(String::as_str)
    }
}

/// A well-formed reference: alphanumeric name and a balanced close tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReferenceSpan<'a> {
    pub name: &'a str,
    pub span: Range<usize>,
    pub inner: Range<usize>,
}

/// Reads the reference whose open tag starts at `at`.
pub(crate) fn reference_at(text: &str, at: usize) -> Option<ReferenceSpan<'_>> {
    let tag = Tag::at(text, at)?;
    if tag.sigil != Sigil::Slotted || !is_name(tag.name) {
        return None;
    }
    let open = Sigil::Slotted.tag(tag.name);
    let close = find_matching_close(text, tag.span.end, &open, &[&Sigil::Close.tag(tag.name)])?;
    Some(ReferenceSpan {
        name: tag.name,
        span: at..close.end,
        inner: tag.span.end..close.start,
    })
}

/// A reference whose target exists, as met by a left-to-right sweep.
#[derive(Debug, Clone)]
pub(crate) struct Resolvable<'t, 'c> {
    pub name: &'t str,
    pub span: Range<usize>,
    pub inner: Range<usize>,
    pub target: &'c str,
}

/// Sweeps `text` for resolvable references. After one is found the sweep
/// continues past its close tag; after anything else, one byte further on.
pub(crate) struct Sweep<'t, 'c> {
    text: &'t str,
    contents: &'c SiteContents,
    pos: usize,
}

impl<'t, 'c> Iterator for Sweep<'t, 'c> {
    type Item = Resolvable<'t, 'c>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(at) = find_ci(self.text, "{{#", self.pos) {
            let found = reference_at(self.text, at)
                .and_then(|r| self.contents.content(r.name).map(|target| (r, target)));
            match found {
                Some((reference, target)) => {
                    self.pos = reference.span.end;
                    return Some(Resolvable {
                        name: reference.name,
                        span: reference.span,
                        inner: reference.inner,
                        target,
                    });
                }
                None => self.pos = at + 1,
            }
        }
        None
    }
}

pub(crate) fn sweep<'t, 'c>(text: &'t str, contents: &'c SiteContents) -> Sweep<'t, 'c> {
    Sweep {
        text,
        contents,
        pos: 0,
    }
}

/// Replaces every resolvable reference in `text` with its rendering.
pub fn expand(text: &str, contents: &SiteContents, depth: usize) -> Result<String, MergeError> {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for reference in sweep(text, contents) {
        out.push_str(&text[cursor..reference.span.start]);
        let inner = &text[reference.inner.clone()];
        out.push_str(&render(reference.name, reference.target, inner, contents, depth + 1)?);
        cursor = reference.span.end;
    }
    out.push_str(&text[cursor..]);
    Ok(out)
}

/// Renders one reference to `name`, whose effective content is `target`.
pub fn render(
    name: &str,
    target: &str,
    inner: &str,
    contents: &SiteContents,
    depth: usize,
) -> Result<String, MergeError> {
    if depth > contents.max_depth {
        return Err(MergeError::DepthLimit {
            template: name.to_string(),
            depth: contents.max_depth,
        });
    }

    let mut text = target.to_string();
    for fill in fills(inner) {
        text = replace_all_ci(&text, &fill.slot_key(), &inner[fill.content.clone()]);
    }

    expand(&strip_slot_keys(&text), contents, depth)
}

//! The six tag forms and a tokenizer over `{{...}}` candidates.

use std::ops::Range;

use crate::search::find_ci;

pub const OPEN: &str = "{{";
pub const CLOSE: &str = "}}";

/// The character directly after `{{` that selects the tag form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sigil {
    /// `{{#Name}}` opens a slotted-template reference.
    Slotted,
    /// `{{/Name}}` closes any block.
    Close,
    /// `{{@Name}}` opens a slot fill, conditional or array block.
    Section,
    /// `{{^Name}}` opens an empty-array block.
    Inverted,
    /// `{{$Name}}` is a value placeholder.
    Value,
    /// `{{Name}}` is a simple template placeholder.
    Plain,
}

impl Sigil {
    pub fn from_char(c: char) -> Self {
        match c {
            '#' => Sigil::Slotted,
            '/' => Sigil::Close,
            '@' => Sigil::Section,
            '^' => Sigil::Inverted,
            '$' => Sigil::Value,
            _ => Sigil::Plain,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sigil::Slotted => "#",
            Sigil::Close => "/",
            Sigil::Section => "@",
            Sigil::Inverted => "^",
            Sigil::Value => "$",
            Sigil::Plain => "",
        }
    }

    /// Builds the full tag text for `name`.
    ///
    /// ```rust
    /// use assembler_tags::Sigil;
    ///
    /// assert_eq!(Sigil::Slotted.tag("Card"), "{{#Card}}");
    /// assert_eq!(Sigil::Plain.tag("Header"), "{{Header}}");
    /// ```
    pub fn tag(self, name: &str) -> String {
        format!("{OPEN}{}{name}{CLOSE}", self.as_str())
    }
}

/// The space-variant close tag `{{ /Name}}` accepted by conditional blocks.
pub fn spaced_close(name: &str) -> String {
    format!("{OPEN} /{name}{CLOSE}")
}

/// Names of simple placeholders and slotted references: non-empty ASCII alphanumerics.
pub fn is_name(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// One `{{...}}` candidate: the text between `{{` and the first following `}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag<'a> {
    pub sigil: Sigil,
    /// Tag body after the sigil, verbatim.
    pub name: &'a str,
    /// Byte range of the whole tag including braces.
    pub span: Range<usize>,
}

impl<'a> Tag<'a> {
    /// Reads the candidate starting at `at`, which must point at `{{`.
    pub fn at(text: &'a str, at: usize) -> Option<Tag<'a>> {
        let body_start = at + OPEN.len();
        let body_end = find_ci(text, CLOSE, body_start)?;
        let body = &text[body_start..body_end];
        let sigil = body.chars().next().map(Sigil::from_char).unwrap_or(Sigil::Plain);
        let name = &body[sigil.as_str().len()..];
        Some(Tag {
            sigil,
            name,
            span: at..body_end + CLOSE.len(),
        })
    }

    /// True for a `{{Name}}` tag whose name is a valid template name.
    pub fn is_placeholder(&self) -> bool {
        self.sigil == Sigil::Plain && is_name(self.name)
    }
}

/// Iterates every tag candidate in a text, one per `{{` occurrence.
///
/// Candidates may overlap: `{{{{a}}` yields three of them. That is the
/// superset any left-to-right sweep can observe, which is what structural
/// analysis needs.
pub struct Tags<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tags<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for Tags<'a> {
    type Item = Tag<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let at = find_ci(self.text, OPEN, self.pos)?;
        let tag = Tag::at(self.text, at)?;
        self.pos = at + 1;
        Some(tag)
    }
}

/// True if any `{{...}}` tag remains in `text`.
pub fn has_tags(text: &str) -> bool {
    Tags::new(text).next().is_some()
}

//! Depth-counting match of open and close tags.

use std::ops::Range;

use crate::search::find_ci;
use crate::tag::{spaced_close, Sigil};

/// Finds the close tag that balances an open tag already consumed.
///
/// `from` is the first byte after the open tag. Every further `open` seen
/// before the next close raises the depth; every close lowers it. The match
/// is the close at which depth returns to zero. Any of `closes` counts as a
/// close. Returns `None` when the text runs out first.
///
/// ```rust
/// use assembler_tags::find_matching_close;
///
/// let text = "{{#A}}x{{#A}}y{{/A}}z{{/A}}";
/// let close = find_matching_close(text, 6, "{{#A}}", &["{{/A}}"]).unwrap();
/// assert_eq!(close, 21..27);
/// ```
pub fn find_matching_close(
    text: &str,
    from: usize,
    open: &str,
    closes: &[&str],
) -> Option<Range<usize>> {
    let mut depth = 1usize;
    let mut pos = from;
    loop {
        let close = closes
            .iter()
            .filter_map(|c| find_ci(text, c, pos).map(|at| at..at + c.len()))
            .min_by_key(|r| r.start)?;
        match find_ci(text, open, pos) {
            Some(at) if at < close.start => {
                depth += 1;
                pos = at + open.len();
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some(close);
                }
                pos = close.end;
            }
        }
    }
}

/// A balanced `open ... close` region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// The whole region, both tags included.
    pub span: Range<usize>,
    /// The text between the tags.
    pub inner: Range<usize>,
}

impl Block {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.clone()]
    }

    pub fn inner_text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.inner.clone()]
    }
}

/// Finds the first balanced `{{<sigil>name}} ... {{/name}}` block at or
/// after `from`. An open tag without a matching close is skipped.
pub fn find_block(text: &str, from: usize, sigil: Sigil, name: &str) -> Option<Block> {
    find_block_with(text, from, sigil, name, &[&Sigil::Close.tag(name)])
}

/// Like [`find_block`], also accepting the `{{ /name}}` close variant.
pub fn find_conditional(text: &str, from: usize, name: &str) -> Option<Block> {
    let close = Sigil::Close.tag(name);
    let spaced = spaced_close(name);
    find_block_with(text, from, Sigil::Section, name, &[&spaced, &close])
}

fn find_block_with(
    text: &str,
    from: usize,
    sigil: Sigil,
    name: &str,
    closes: &[&str],
) -> Option<Block> {
    let open = sigil.tag(name);
    let mut pos = from;
    while let Some(at) = find_ci(text, &open, pos) {
        let body = at + open.len();
        if let Some(close) = find_matching_close(text, body, &open, closes) {
            return Some(Block {
                span: at..close.end,
                inner: body..close.start,
            });
        }
        pos = at + 1;
    }
    None
}

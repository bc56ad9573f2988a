//! Slot fills and slot keys.
//!
//! A slotted reference carries its fills as
//! `{{@HTMLPLACEHOLDER[n]}}...{{/HTMLPLACEHOLDER[n]}}`; the referenced
//! template marks where each fill lands with `{{$HTMLPLACEHOLDER[n]}}`.
//! The suffix `n` is optional decimal digits, kept verbatim.

use std::ops::Range;

use crate::matching::find_matching_close;
use crate::search::{find_ci, starts_with_ci};
use crate::tag::{Sigil, CLOSE};

pub const SLOT_NAME: &str = "HTMLPLACEHOLDER";

const FILL_PREFIX: &str = "{{@HTMLPLACEHOLDER";
const KEY_PREFIX: &str = "{{$HTMLPLACEHOLDER";

/// The marker a target template uses for the slot with `suffix`.
pub fn slot_key(suffix: &str) -> String {
    Sigil::Value.tag(&format!("{SLOT_NAME}{suffix}"))
}

/// True for names reserved by the slot syntax, which are never bound to data.
pub fn is_slot_name(name: &str) -> bool {
    starts_with_ci(name, 0, SLOT_NAME)
}

/// One fill found inside a slotted reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillSpan<'a> {
    /// Digits after `HTMLPLACEHOLDER`; empty for the default slot.
    pub suffix: &'a str,
    pub span: Range<usize>,
    pub content: Range<usize>,
}

impl FillSpan<'_> {
    pub fn slot_key(&self) -> String {
        slot_key(self.suffix)
    }
}

/// Reads the digits after a slot prefix at `at` and returns them with the
/// offset just past the closing `}}`.
fn suffix_at<'a>(text: &'a str, at: usize, prefix: &str) -> Option<(&'a str, usize)> {
    let start = at + prefix.len();
    let digits = text[start..].bytes().take_while(u8::is_ascii_digit).count();
    let end = start + digits;
    text[end..]
        .starts_with(CLOSE)
        .then(|| (&text[start..end], end + CLOSE.len()))
}

/// Top-level slot fills of a reference's inner content, left to right.
///
/// Fills nested inside another fill belong to a nested reference and are not
/// returned. A fill without a matching close is left as text.
pub fn fills(inner: &str) -> Vec<FillSpan<'_>> {
    let mut found = Vec::new();
    let mut pos = 0;
    while let Some(at) = find_ci(inner, FILL_PREFIX, pos) {
        let Some((suffix, body)) = suffix_at(inner, at, FILL_PREFIX) else {
            pos = at + 1;
            continue;
        };
        let name = format!("{SLOT_NAME}{suffix}");
        let open = Sigil::Section.tag(&name);
        let close = Sigil::Close.tag(&name);
        match find_matching_close(inner, body, &open, &[&close]) {
            Some(end) => {
                found.push(FillSpan {
                    suffix,
                    span: at..end.end,
                    content: body..end.start,
                });
                pos = end.end;
            }
            None => pos = at + 1,
        }
    }
    found
}

/// Removes every `{{$HTMLPLACEHOLDER[n]}}` marker left without a fill.
///
/// ```rust
/// use assembler_tags::strip_slot_keys;
///
/// assert_eq!(strip_slot_keys("<a>{{$HTMLPLACEHOLDER}}{{$HTMLPLACEHOLDER2}}</a>"), "<a></a>");
/// ```
pub fn strip_slot_keys(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    let mut pos = 0;
    while let Some(at) = find_ci(text, KEY_PREFIX, pos) {
        match suffix_at(text, at, KEY_PREFIX) {
            Some((_, end)) => {
                out.push_str(&text[cursor..at]);
                cursor = end;
                pos = end;
            }
            None => pos = at + 1,
        }
    }
    out.push_str(&text[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    mod keys {
        use super::*;

        #[test]
        fn default_and_numbered() {
            assert_eq!(slot_key(""), "{{$HTMLPLACEHOLDER}}");
            assert_eq!(slot_key("2"), "{{$HTMLPLACEHOLDER2}}");
        }

        #[test]
        fn reserved_names() {
            assert!(is_slot_name("HTMLPLACEHOLDER"));
            assert!(is_slot_name("htmlplaceholder3"));
            assert!(!is_slot_name("items"));
        }
    }

    mod fill_scan {
        use super::*;

        #[test]
        fn default_and_numbered_fills() {
            let inner = "{{@HTMLPLACEHOLDER}}a{{/HTMLPLACEHOLDER}} {{@HTMLPLACEHOLDER1}}b{{/HTMLPLACEHOLDER1}}";
            let found = fills(inner);
            assert_eq!(found.len(), 2);
            assert_eq!(found[0].suffix, "");
            assert_eq!(&inner[found[0].content.clone()], "a");
            assert_eq!(found[1].suffix, "1");
            assert_eq!(found[1].slot_key(), "{{$HTMLPLACEHOLDER1}}");
            assert_eq!(&inner[found[1].content.clone()], "b");
        }

        #[test]
        fn nested_fill_stays_inside_outer() {
            let inner = "{{@HTMLPLACEHOLDER}}{{#A}}{{@HTMLPLACEHOLDER}}X{{/HTMLPLACEHOLDER}}{{/A}}{{/HTMLPLACEHOLDER}}";
            let found = fills(inner);
            assert_eq!(found.len(), 1);
            assert_eq!(
                &inner[found[0].content.clone()],
                "{{#A}}{{@HTMLPLACEHOLDER}}X{{/HTMLPLACEHOLDER}}{{/A}}"
            );
        }

        #[test]
        fn unclosed_fill_is_ignored() {
            assert!(fills("{{@HTMLPLACEHOLDER}}dangling").is_empty());
        }

        #[test]
        fn malformed_suffix_is_ignored() {
            assert!(fills("{{@HTMLPLACEHOLDERx}}a{{/HTMLPLACEHOLDERx}}").is_empty());
        }
    }

    mod strip {
        use super::*;

        #[test]
        fn keeps_unrelated_text() {
            assert_eq!(strip_slot_keys("a {{$title}} b"), "a {{$title}} b");
        }

        #[test]
        fn ignores_case() {
            assert_eq!(strip_slot_keys("x{{$htmlPlaceholder}}y"), "xy");
        }

        #[test]
        fn leaves_malformed_marker() {
            assert_eq!(strip_slot_keys("{{$HTMLPLACEHOLDERa}}"), "{{$HTMLPLACEHOLDERa}}");
        }
    }
}

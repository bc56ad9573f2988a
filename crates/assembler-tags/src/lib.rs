//! Tag grammar and scanner for the assembler template language.
//!
//! Templates are HTML-like text carrying six `{{...}}` tag forms, selected by
//! the sigil right after `{{`:
//!
//! | Form                        | Meaning                                  |
//! |-----------------------------|------------------------------------------|
//! | `{{Name}}`                  | simple template placeholder              |
//! | `{{#Name}}...{{/Name}}`     | slotted-template reference               |
//! | `{{@Name}}...{{/Name}}`     | slot fill, conditional or array block    |
//! | `{{^Name}}...{{/Name}}`     | empty-array block                        |
//! | `{{$Name}}`                 | value placeholder or slot key            |
//! | `{{/Name}}`                 | close tag                                |
//!
//! This crate knows nothing about templates or data. It recognizes tags,
//! balances same-named nested blocks by depth counting and offers the ASCII
//! case-insensitive search primitives every consumer shares.
//!
//! # Example
//!
//! ```rust
//! use assembler_tags::{find_block, fills, Sigil};
//!
//! let text = "{{#Card}}{{@HTMLPLACEHOLDER}}Hello{{/HTMLPLACEHOLDER}}{{/Card}}";
//! let block = find_block(text, 0, Sigil::Slotted, "Card").unwrap();
//! let inner = block.inner_text(text);
//!
//! let found = fills(inner);
//! assert_eq!(found.len(), 1);
//! assert_eq!(&inner[found[0].content.clone()], "Hello");
//! ```
//!
//! # Unbalanced input
//!
//! An open tag with no matching close is never an error. Scanners report
//! "no match" and callers leave the text untouched.

mod matching;
mod search;
mod slot;
mod tag;

pub use matching::{find_block, find_conditional, find_matching_close, Block};
pub use search::{contains_ci, find_ci, replace_all_ci, replace_first_ci, starts_with_ci};
pub use slot::{fills, is_slot_name, slot_key, strip_slot_keys, FillSpan, SLOT_NAME};
pub use tag::{has_tags, is_name, spaced_close, Sigil, Tag, Tags, CLOSE, OPEN};

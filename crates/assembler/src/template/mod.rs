//! Template sources and their analysis.
//!
//! [`TemplateSet`] holds a site's templates as loaded. [`PreprocessedSite`]
//! is the same set after the one-time analysis the compiled engine works
//! from: per-template placeholders, slotted references, JSON plans and
//! replacement mappings, for both binding modes.

mod model;
mod preprocess;
mod source;

pub use model::{
    MappingKind, Placeholder, ReplacementMapping, SlotFill, SlottedTemplateReference,
    TemplateFlags,
};
pub(crate) use preprocess::{value_tag, MappingIndex};
pub use preprocess::{Binding, PreprocessedSite, PreprocessedTemplate, SiteSummary, TemplateAnalysis};
pub use source::{template_key, TemplateSet, TemplateSource};

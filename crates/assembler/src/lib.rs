//! # Assembler - Slot-Composed HTML Templates
//!
//! `assembler` resolves a small template language embedded in HTML: sibling
//! templates pulled in by name, templates composed through slots, blocks
//! driven by per-template JSON data, and view variants that swap one family
//! of templates for another.
//!
//! ## Core Concepts
//!
//! - [`TemplateSet`]: a site's templates with their optional JSON data
//! - [`InterpretiveEngine`]: resolves a set directly, scanning on every pass
//! - [`PreprocessedSite`]: a set analyzed once into replacement mappings
//! - [`CompiledEngine`]: resolves a preprocessed site by replaying mappings
//! - [`TemplateProvider`]: loads sites from disk into an explicit cache
//! - [`Assembler`]: the merge entry point over a provider and both engines
//!
//! The two engines always agree. Which one to use is a performance choice:
//! analysis costs once per site, after which compiled merges do no parsing.
//!
//! ## Quick Start
//!
//! ```rust
//! use assembler::{
//!     CompiledEngine, EngineConfig, InterpretiveEngine, MergeRequest, PreprocessedSite,
//!     TemplateEngine, TemplateSet,
//! };
//!
//! let set = TemplateSet::new("shop")
//!     .with("MainContent", "<main>{{Header}}{{#Panel}}{{@HTMLPLACEHOLDER}}{{Offers}}{{/HTMLPLACEHOLDER}}{{/Panel}}</main>")
//!     .with("MobileContent", "<main>{{Offers}}</main>")
//!     .with("Header", "<h1>{{$shopName}}</h1>")
//!     .with("Panel", "<section>{{$HTMLPLACEHOLDER}}</section>")
//!     .with_json(
//!         "Offers",
//!         "<ul>{{@offers}}<li>{{$title}}{{@new}} (new){{/new}}</li>{{/offers}}</ul>{{^offers}}none{{/offers}}",
//!         r#"{"shopName":"ACME","offers":[{"title":"Tea","new":true},{"title":"Cake"}]}"#,
//!     );
//!
//! let config = EngineConfig::new().view_prefix("Main");
//! let request = MergeRequest::new("shop", "MainContent");
//!
//! let interpretive = InterpretiveEngine::new(config.clone()).merge(&set, &request).unwrap();
//! let compiled = CompiledEngine::new(config.clone())
//!     .merge(&PreprocessedSite::analyze(&set), &request)
//!     .unwrap();
//!
//! assert_eq!(
//!     interpretive,
//!     "<main><h1>ACME</h1><section><ul><li>Tea (new)</li><li>Cake</li></ul></section></main>"
//! );
//! assert_eq!(interpretive, compiled);
//!
//! let mobile = InterpretiveEngine::new(config)
//!     .merge(&set, &request.clone().view("Mobile"))
//!     .unwrap();
//! assert_eq!(mobile, "<main><ul><li>Tea (new)</li><li>Cake</li></ul></main>");
//! ```
//!
//! ## Tag Forms
//!
//! | Form | Resolved to |
//! |------|-------------|
//! | `{{Name}}` | the sibling template `Name`, else the site value `name` |
//! | `{{#Name}}...{{/Name}}` | template `Name` with its slots filled |
//! | `{{@HTMLPLACEHOLDER[n]}}...{{/HTMLPLACEHOLDER[n]}}` | content for slot `n` |
//! | `{{$HTMLPLACEHOLDER[n]}}` | where slot `n` lands in the target |
//! | `{{@key}}...{{/key}}` | the block per array element, or kept when `key` is truthy |
//! | `{{^key}}...{{/key}}` | kept when array `key` is empty or absent |
//! | `{{$key}}` | a JSON value of the template, else a site value |
//!
//! Anything that does not resolve stays as written. Missing templates,
//! unbalanced tags and malformed JSON are never errors; see [`MergeError`]
//! for what is.

mod assembler;
mod binder;
mod config;
mod engine;
mod error;
mod json;
pub mod provider;
pub mod slots;
pub mod template;
mod view;

pub use crate::assembler::{Assembler, Comparison, MergeOutput, MergeTiming};
pub use binder::{Binder, ValueTable};
pub use config::EngineConfig;
pub use engine::{CompiledEngine, EngineKind, InterpretiveEngine, MergeRequest, TemplateEngine};
pub use error::{AssemblerError, LoadError, MergeError, ParseEngineError, Result};
pub use json::{JsonObject, JsonValue};
pub use provider::{load_site, TemplateCache, TemplateProvider};
pub use template::{
    template_key, Binding, MappingKind, Placeholder, PreprocessedSite, PreprocessedTemplate,
    ReplacementMapping, SiteSummary, SlotFill, SlottedTemplateReference, TemplateAnalysis,
    TemplateFlags, TemplateSet, TemplateSource,
};
pub use view::ViewResolver;

//! Raw template sources and the per-site set they live in.

use std::collections::BTreeMap;

use serde::Serialize;

/// Builds the case-insensitive lookup key for a template of a site.
///
/// ```rust
/// use assembler::template_key;
///
/// assert_eq!(template_key("Shop", "MainContent"), "shop_maincontent");
/// ```
pub fn template_key(site: &str, name: &str) -> String {
    format!("{site}_{name}").to_ascii_lowercase()
}

/// One template as loaded: HTML-like text plus its optional JSON side-channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSource {
    pub name: String,
    pub content: String,
    pub json: Option<String>,
}

impl TemplateSource {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            json: None,
        }
    }

    pub fn with_json(mut self, json: impl Into<String>) -> Self {
        self.json = Some(json.into());
        self
    }
}

/// All templates of one site, keyed by [`template_key`] and iterated in key
/// order.
///
/// ```rust
/// use assembler::TemplateSet;
///
/// let set = TemplateSet::new("shop")
///     .with("Page", "<main>{{Header}}</main>")
///     .with_json("Header", "<h1>{{$title}}</h1>", r#"{"title":"Hello"}"#);
///
/// assert_eq!(set.len(), 2);
/// assert!(set.get("header").is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateSet {
    site: String,
    templates: BTreeMap<String, TemplateSource>,
}

impl TemplateSet {
    pub fn new(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            templates: BTreeMap::new(),
        }
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn with(mut self, name: &str, content: &str) -> Self {
        self.insert(TemplateSource::new(name, content));
        self
    }

    pub fn with_json(mut self, name: &str, content: &str, json: &str) -> Self {
        self.insert(TemplateSource::new(name, content).with_json(json));
        self
    }

    /// Adds a template, returning the one it replaced under the same key.
    pub fn insert(&mut self, source: TemplateSource) -> Option<TemplateSource> {
        let key = self.key(&source.name);
        self.templates.insert(key, source)
    }

    pub fn key(&self, name: &str) -> String {
        template_key(&self.site, name)
    }

    pub fn get(&self, name: &str) -> Option<&TemplateSource> {
        self.templates.get(&self.key(name))
    }

    pub fn get_key(&self, key: &str) -> Option<&TemplateSource> {
        self.templates.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TemplateSource)> {
        self.templates.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

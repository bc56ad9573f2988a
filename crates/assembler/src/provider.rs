//! Loading sites from disk, with an explicit cache.
//!
//! A site is a directory under the provider's root. Every `*.html` file in
//! it, at any depth, is a template named by its file stem; a `.json` file
//! with the same stem next to it is the template's data.
//!
//! ```text
//! root/
//! └── shop/
//!     ├── MainContent.html
//!     └── Views/
//!         ├── Offers.html
//!         └── Offers.json
//! ```
//!
//! Loaded sets and their analysis are cached per site until
//! [`TemplateProvider::clear_cache`]. The cache belongs to the provider, so
//! separate providers never share state.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use walkdir::WalkDir;

use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::LoadError;
use crate::template::{template_key, PreprocessedSite, TemplateSet, TemplateSource};

/// Cached template sets and preprocessed sites, by site name.
#[derive(Debug, Default)]
pub struct TemplateCache {
    sets: RwLock<HashMap<String, Arc<TemplateSet>>>,
    preprocessed: RwLock<HashMap<String, Arc<PreprocessedSite>>>,
}

impl TemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        self.sets.write().clear();
        self.preprocessed.write().clear();
    }

    /// Number of cached template sets and preprocessed sites.
    pub fn counts(&self) -> (usize, usize) {
        (self.sets.read().len(), self.preprocessed.read().len())
    }
}

/// Loads the sites under one root directory.
#[derive(Debug)]
pub struct TemplateProvider {
    root: PathBuf,
    cache: TemplateCache,
    max_depth: usize,
}

impl TemplateProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: TemplateCache::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Depth limit used when analyzing sites for the compiled engine.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    /// The templates of `site`, read on first use.
    pub fn load_templates(&self, site: &str) -> Result<Arc<TemplateSet>, LoadError> {
        if let Some(set) = self.cache.sets.read().get(site) {
            return Ok(Arc::clone(set));
        }
        let set = Arc::new(load_site(&self.root, site)?);
        let mut sets = self.cache.sets.write();
        // Another reader may have loaded it meanwhile; keep the first.
        Ok(Arc::clone(sets.entry(site.to_string()).or_insert(set)))
    }

    /// The analysis of `site`, computed on first use.
    pub fn load_preprocessed(&self, site: &str) -> Result<Arc<PreprocessedSite>, LoadError> {
        if let Some(preprocessed) = self.cache.preprocessed.read().get(site) {
            return Ok(Arc::clone(preprocessed));
        }
        let set = self.load_templates(site)?;
        let preprocessed = Arc::new(PreprocessedSite::analyze_with_max_depth(&set, self.max_depth));
        let mut cached = self.cache.preprocessed.write();
        Ok(Arc::clone(
            cached.entry(site.to_string()).or_insert(preprocessed),
        ))
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        tracing::debug!(root = %self.root.display(), "template cache cleared");
    }

    /// Names of the site directories under the root, sorted.
    pub fn sites(&self) -> Result<Vec<String>, LoadError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(LoadError::Io {
                    path: self.root.clone(),
                    source,
                })
            }
        };
        let mut sites = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| LoadError::Io {
                path: self.root.clone(),
                source,
            })?;
            if entry.path().is_dir() {
                sites.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        sites.sort();
        Ok(sites)
    }
}

/// Reads every template of `site` under `root`. A missing site directory is
/// an empty set; a name that would leave the root is an error.
pub fn load_site(root: &Path, site: &str) -> Result<TemplateSet, LoadError> {
    let mut components = Path::new(site).components();
    if !matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) {
        return Err(LoadError::InvalidSite(site.to_string()));
    }
    let dir = root.join(site);
    let mut set = TemplateSet::new(site);
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "site directory not found");
        return Ok(set);
    }

    let mut origins: HashMap<String, PathBuf> = HashMap::new();
    for entry in WalkDir::new(&dir).sort_by_file_name() {
        let entry = entry.map_err(|source| LoadError::Walk {
            root: dir.clone(),
            source,
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "html") {
            continue;
        }
        let Some(name) = path.file_stem().map(|s| s.to_string_lossy().into_owned()) else {
            continue;
        };

        let key = template_key(site, &name);
        if let Some(first) = origins.get(&key) {
            return Err(LoadError::Collision {
                name,
                first: first.clone(),
                second: path.to_path_buf(),
            });
        }
        origins.insert(key, path.to_path_buf());

        let mut source = TemplateSource::new(name, read(path)?);
        let json_path = path.with_extension("json");
        if json_path.is_file() {
            source = source.with_json(read(&json_path)?);
        }
        set.insert(source);
    }

    tracing::debug!(site, templates = set.len(), "loaded site");
    Ok(set)
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

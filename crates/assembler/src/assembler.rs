//! The merge entry point: provider plus both engines.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::config::EngineConfig;
use crate::engine::{CompiledEngine, EngineKind, InterpretiveEngine, MergeRequest, TemplateEngine};
use crate::error::Result;
use crate::provider::TemplateProvider;

/// How long a merge took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeTiming {
    pub engine: EngineKind,
    /// Loading (or fetching from cache) and merging together.
    pub total: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeOutput {
    pub html: String,
    pub timing: MergeTiming,
}

/// Both engines' output for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    pub interpretive: MergeOutput,
    pub compiled: MergeOutput,
}

impl Comparison {
    pub fn is_match(&self) -> bool {
        self.interpretive.html == self.compiled.html
    }
}

/// Resolves merge requests against the sites of one provider.
///
/// ```rust,no_run
/// use assembler::{Assembler, EngineConfig, EngineKind, MergeRequest};
///
/// let assembler = Assembler::new("./sites", EngineConfig::new().view_prefix("Main"));
/// let request = MergeRequest::new("shop", "MainContent").view("Mobile");
/// let output = assembler.merge(&request, EngineKind::Compiled)?;
/// println!("{} ({:?})", output.html, output.timing.total);
/// # Ok::<(), assembler::AssemblerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Assembler {
    provider: Arc<TemplateProvider>,
    interpretive: InterpretiveEngine,
    compiled: CompiledEngine,
}

impl Assembler {
    pub fn new(root: impl Into<std::path::PathBuf>, config: EngineConfig) -> Self {
        let provider = TemplateProvider::new(root).with_max_depth(config.max_depth);
        Self::with_provider(Arc::new(provider), config)
    }

    /// Shares an existing provider, and so its cache. Compiled merges use
    /// the provider's depth limit.
    pub fn with_provider(provider: Arc<TemplateProvider>, config: EngineConfig) -> Self {
        Self {
            provider,
            interpretive: InterpretiveEngine::new(config.clone()),
            compiled: CompiledEngine::new(config),
        }
    }

    pub fn provider(&self) -> &TemplateProvider {
        &self.provider
    }

    pub fn config(&self) -> &EngineConfig {
        self.interpretive.config()
    }

    pub fn merge(&self, request: &MergeRequest, engine: EngineKind) -> Result<MergeOutput> {
        let start = Instant::now();
        let html = match engine {
            EngineKind::Interpretive => {
                let set = self.provider.load_templates(&request.site)?;
                self.interpretive.merge(&set, request)?
            }
            EngineKind::Compiled => {
                let site = self.provider.load_preprocessed(&request.site)?;
                self.compiled.merge(&site, request)?
            }
        };
        let timing = MergeTiming {
            engine,
            total: start.elapsed(),
        };
        tracing::info!(
            site = %request.site,
            template = %request.template,
            view = request.view.as_deref().unwrap_or(""),
            %engine,
            elapsed_us = timing.total.as_micros() as u64,
            bytes = html.len(),
            "merged"
        );
        Ok(MergeOutput { html, timing })
    }

    /// Runs `request` through both engines.
    pub fn compare(&self, request: &MergeRequest) -> Result<Comparison> {
        let comparison = Comparison {
            interpretive: self.merge(request, EngineKind::Interpretive)?,
            compiled: self.merge(request, EngineKind::Compiled)?,
        };
        if !comparison.is_match() {
            tracing::warn!(
                site = %request.site,
                template = %request.template,
                view = request.view.as_deref().unwrap_or(""),
                "engines disagree"
            );
        }
        Ok(comparison)
    }
}

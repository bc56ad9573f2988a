//! Subcommand arguments and their implementations.
//!
//! Each command writes its report to the given writer so tests can capture
//! it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use assembler::{Assembler, EngineConfig, EngineKind, MergeRequest, TemplateProvider};
use clap::Args;
use console::Style;

#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Directory holding one subdirectory per site
    #[arg(long)]
    pub root: PathBuf,

    #[arg(long)]
    pub site: String,

    /// Template name, without extension
    #[arg(long)]
    pub template: String,

    /// View replacing the prefix in template names
    #[arg(long)]
    pub view: Option<String>,

    #[arg(long, default_value_t = EngineKind::Compiled)]
    pub engine: EngineKind,

    /// Leave data tags unbound
    #[arg(long)]
    pub no_json: bool,
}

#[derive(Debug, Args)]
pub struct CompareArgs {
    #[arg(long)]
    pub root: PathBuf,

    /// Sites to compare (all sites under the root when omitted)
    #[arg(long = "site")]
    pub sites: Vec<String>,

    /// Views to compare (discovered from each site's Views directory when omitted)
    #[arg(long = "view")]
    pub views: Vec<String>,

    #[arg(long)]
    pub no_json: bool,
}

#[derive(Debug, Args)]
pub struct DumpArgs {
    #[arg(long)]
    pub root: PathBuf,

    #[arg(long)]
    pub site: String,

    /// Every analyzed template instead of the summary
    #[arg(long)]
    pub full: bool,
}

#[derive(Debug, Args)]
pub struct BenchArgs {
    #[arg(long)]
    pub root: PathBuf,

    #[arg(long)]
    pub site: String,

    #[arg(long)]
    pub template: String,

    #[arg(long)]
    pub view: Option<String>,

    #[arg(long, default_value_t = 100)]
    pub iterations: u32,
}

fn build_request(site: &str, template: &str, view: Option<&str>, bind_json: bool) -> MergeRequest {
    let request = MergeRequest::new(site, template).bind_json(bind_json);
    match view {
        Some(view) => request.view(view),
        None => request,
    }
}

pub fn merge(args: &MergeArgs, config: EngineConfig, out: &mut impl Write) -> Result<()> {
    let assembler = Assembler::new(args.root.clone(), config);
    let request = build_request(&args.site, &args.template, args.view.as_deref(), !args.no_json);
    let output = assembler
        .merge(&request, args.engine)
        .with_context(|| format!("merging {}/{}", args.site, args.template))?;
    writeln!(out, "{}", output.html)?;
    Ok(())
}

// ============================================================================
// Compare
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Status {
    Match,
    Mismatch,
    Failed(String),
}

#[derive(Debug, Clone)]
struct Row {
    site: String,
    template: String,
    view: String,
    timings: Option<(Duration, Duration)>,
    status: Status,
}

impl Row {
    fn view_label(&self) -> &str {
        if self.view.is_empty() {
            "-"
        } else {
            &self.view
        }
    }
}

/// Runs both engines over every template of every selected site and view.
/// Returns whether every merge agreed.
pub fn compare(args: &CompareArgs, config: EngineConfig, out: &mut impl Write) -> Result<bool> {
    let assembler = Assembler::new(args.root.clone(), config);
    let sites = if args.sites.is_empty() {
        assembler.provider().sites().context("listing sites")?
    } else {
        args.sites.clone()
    };

    let mut rows = Vec::new();
    for site in &sites {
        let set = assembler
            .provider()
            .load_templates(site)
            .with_context(|| format!("loading site {site}"))?;
        let views = if args.views.is_empty() {
            discover_views(&args.root.join(site))?
        } else {
            args.views.clone()
        };
        tracing::debug!(%site, templates = set.len(), ?views, "comparing site");

        for (_, source) in set.iter() {
            for view in &views {
                let request = build_request(site, &source.name, Some(view.as_str()), !args.no_json);
                let (timings, status) = match assembler.compare(&request) {
                    Ok(comparison) => {
                        let timings = (
                            comparison.interpretive.timing.total,
                            comparison.compiled.timing.total,
                        );
                        let status = if comparison.is_match() {
                            Status::Match
                        } else {
                            Status::Mismatch
                        };
                        (Some(timings), status)
                    }
                    Err(error) => (None, Status::Failed(error.to_string())),
                };
                rows.push(Row {
                    site: site.clone(),
                    template: source.name.clone(),
                    view: view.clone(),
                    timings,
                    status,
                });
            }
        }
    }

    write_table(&rows, out)?;
    Ok(rows.iter().all(|row| row.status == Status::Match))
}

/// Views offered by a site: the default view plus one per
/// `Views/<View>Content*.html` file.
pub fn discover_views(site_dir: &Path) -> Result<Vec<String>> {
    let mut views = vec![String::new()];
    let dir = site_dir.join("Views");
    if !dir.is_dir() {
        return Ok(views);
    }

    let mut found = Vec::new();
    for entry in fs::read_dir(&dir).with_context(|| format!("reading {}", dir.display()))? {
        let path = entry?.path();
        if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("html") {
            continue;
        }
        if let Some(view) = path.file_stem().and_then(|stem| stem.to_str()).and_then(view_of_stem) {
            found.push(view);
        }
    }
    found.sort();
    found.dedup();
    views.extend(found);
    Ok(views)
}

/// `mobileContent` -> `Mobile`; stems starting with "content" name no view.
fn view_of_stem(stem: &str) -> Option<String> {
    let at = stem.to_ascii_lowercase().find("content")?;
    let mut chars = stem[..at].chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

fn micros(duration: Duration) -> String {
    format!("{}us", duration.as_micros())
}

fn write_table(rows: &[Row], out: &mut impl Write) -> Result<()> {
    let header = Style::new().bold();
    let ok = Style::new().green();
    let bad = Style::new().red().bold();
    let muted = Style::new().dim();

    let width = |title: &str, pick: fn(&Row) -> &str| {
        rows.iter().map(|row| pick(row).len()).fold(title.len(), usize::max)
    };
    let sw = width("SITE", |row| &row.site);
    let tw = width("TEMPLATE", |row| &row.template);
    let vw = width("VIEW", Row::view_label);

    writeln!(
        out,
        "{}",
        header.apply_to(format!(
            "{:<sw$}  {:<tw$}  {:<vw$}  {:>12}  {:>12}  STATUS",
            "SITE", "TEMPLATE", "VIEW", "INTERPRETIVE", "COMPILED"
        ))
    )?;

    let mut mismatches = 0;
    for row in rows {
        let (interpretive, compiled) = match row.timings {
            Some((i, c)) => (micros(i), micros(c)),
            None => ("-".to_string(), "-".to_string()),
        };
        let status = match &row.status {
            Status::Match => ok.apply_to("ok".to_string()),
            Status::Mismatch => bad.apply_to("DIFFERENT".to_string()),
            Status::Failed(error) => bad.apply_to(format!("error: {error}")),
        };
        if row.status != Status::Match {
            mismatches += 1;
        }
        writeln!(
            out,
            "{:<sw$}  {:<tw$}  {:<vw$}  {:>12}  {:>12}  {}",
            row.site,
            row.template,
            row.view_label(),
            interpretive,
            compiled,
            status
        )?;
    }

    let summary = format!("{} merges, {} failed", rows.len(), mismatches);
    if mismatches == 0 {
        writeln!(out, "{}", muted.apply_to(summary))?;
    } else {
        writeln!(out, "{}", bad.apply_to(summary))?;
    }
    Ok(())
}

// ============================================================================
// Dump and bench
// ============================================================================

pub fn dump(args: &DumpArgs, out: &mut impl Write) -> Result<()> {
    let provider = TemplateProvider::new(args.root.clone());
    let site = provider
        .load_preprocessed(&args.site)
        .with_context(|| format!("loading site {}", args.site))?;
    let json = if args.full {
        serde_json::to_string_pretty(&*site)?
    } else {
        serde_json::to_string_pretty(&site.summary())?
    };
    writeln!(out, "{json}")?;
    Ok(())
}

pub fn bench(args: &BenchArgs, config: EngineConfig, out: &mut impl Write) -> Result<()> {
    let assembler = Assembler::new(args.root.clone(), config);
    let request = build_request(&args.site, &args.template, args.view.as_deref(), true);
    let iterations = args.iterations.max(1);

    writeln!(
        out,
        "{}",
        Style::new()
            .bold()
            .apply_to(format!("{}/{} x{iterations}", args.site, args.template))
    )?;
    for engine in EngineKind::ALL {
        // The first merge pays for loading (and, compiled, analysis).
        let first = assembler
            .merge(&request, engine)
            .with_context(|| format!("merging {}/{} with {engine}", args.site, args.template))?
            .timing
            .total;
        let start = Instant::now();
        for _ in 0..iterations {
            assembler.merge(&request, engine)?;
        }
        let mean = start.elapsed() / iterations;
        writeln!(
            out,
            "{:<12}  first {:>10}  mean {:>10}",
            engine.as_str(),
            micros(first),
            micros(mean)
        )?;
    }
    Ok(())
}

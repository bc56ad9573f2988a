//! `assembler`: merge, compare, dump and benchmark template sites on disk.
//!
//! Every subcommand takes `--root`, the directory holding one subdirectory
//! per site. Logs go to stderr; `RUST_LOG` overrides `-v`.

mod commands;

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::Result;
use assembler::EngineConfig;
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::commands::{BenchArgs, CompareArgs, DumpArgs, MergeArgs};

#[derive(Debug, Parser)]
#[command(name = "assembler")]
#[command(version)]
#[command(about = "Merge slot-composed HTML templates with either engine")]
struct Cli {
    /// Part of template names that a view replaces
    #[arg(long, global = true, default_value = "Main", env = "ASSEMBLER_VIEW_PREFIX")]
    prefix: String,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Merge one template and print the html
    Merge(MergeArgs),

    /// Run both engines over every template and view, reporting differences
    Compare(CompareArgs),

    /// Print a site's analysis as JSON
    Dump(DumpArgs),

    /// Time both engines on one template
    Bench(BenchArgs),
}

fn level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level(verbose)));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = EngineConfig::new().view_prefix(cli.prefix);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let code = match cli.command {
        Command::Merge(args) => {
            commands::merge(&args, config, &mut out)?;
            ExitCode::SUCCESS
        }
        Command::Compare(args) => {
            if commands::compare(&args, config, &mut out)? {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Dump(args) => {
            commands::dump(&args, &mut out)?;
            ExitCode::SUCCESS
        }
        Command::Bench(args) => {
            commands::bench(&args, config, &mut out)?;
            ExitCode::SUCCESS
        }
    };
    out.flush()?;
    Ok(code)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assembler::EngineKind;

    mod parsing {
        use super::*;

        #[test]
        fn merge_defaults() {
            let cli = Cli::try_parse_from([
                "assembler", "--prefix", "Main", "merge", "--root", "sites", "--site", "shop",
                "--template", "MainContent",
            ])
            .unwrap();
            assert_eq!(cli.prefix, "Main");
            assert_eq!(cli.verbose, 0);
            match cli.command {
                Command::Merge(args) => {
                    assert_eq!(args.engine, EngineKind::Compiled);
                    assert!(args.view.is_none());
                    assert!(!args.no_json);
                }
                other => panic!("unexpected command: {other:?}"),
            }
        }

        #[test]
        fn engine_names_and_aliases() {
            for (text, kind) in [
                ("interpretive", EngineKind::Interpretive),
                ("normal", EngineKind::Interpretive),
                ("Preprocess", EngineKind::Compiled),
            ] {
                let cli = Cli::try_parse_from([
                    "assembler", "merge", "--root", "r", "--site", "s", "--template", "t",
                    "--engine", text,
                ])
                .unwrap();
                match cli.command {
                    Command::Merge(args) => assert_eq!(args.engine, kind),
                    other => panic!("unexpected command: {other:?}"),
                }
            }
        }

        #[test]
        fn unknown_engine_rejected() {
            let result = Cli::try_parse_from([
                "assembler", "merge", "--root", "r", "--site", "s", "--template", "t",
                "--engine", "fast",
            ]);
            assert!(result.is_err());
        }

        #[test]
        fn compare_repeats_sites_and_views() {
            let cli = Cli::try_parse_from([
                "assembler", "-vv", "compare", "--root", "r", "--site", "a", "--site", "b",
                "--view", "Alt", "--no-json",
            ])
            .unwrap();
            assert_eq!(cli.verbose, 2);
            match cli.command {
                Command::Compare(args) => {
                    assert_eq!(args.sites, ["a", "b"]);
                    assert_eq!(args.views, ["Alt"]);
                    assert!(args.no_json);
                }
                other => panic!("unexpected command: {other:?}"),
            }
        }

        #[test]
        fn verbose_is_global() {
            let cli = Cli::try_parse_from(["assembler", "dump", "--root", "r", "--site", "s", "-v"])
                .unwrap();
            assert_eq!(cli.verbose, 1);
        }
    }

    mod logging {
        use super::*;

        #[test]
        fn verbosity_levels() {
            assert_eq!(level(0), "warn");
            assert_eq!(level(1), "info");
            assert_eq!(level(2), "debug");
            assert_eq!(level(9), "trace");
        }
    }
}

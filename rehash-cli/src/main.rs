//! rehash CLI - コマンドラインインターフェース
//!
//! 標準入力のクラッシュログに、デバッグ情報から求めたソース位置を書き足して
//! 標準出力へ流す。

use anyhow::{Context, Result};
use clap::Parser;
use rehash_core::parse::parse_address;
use rehash_core::{AnnotatorConfig, LineAnnotator, OverrideTable, DEFAULT_ANCHOR_SYMBOL};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// rehash - crash log source annotator
#[derive(Parser)]
#[command(name = "rehash")]
#[command(version)]
#[command(
    about = "Annotate stack trace addresses in a crash log with source locations",
    long_about = None
)]
struct Cli {
    /// Debug information file (PDB or an object file with DWARF)
    debug_info: PathBuf,

    /// Runtime address of the anchor symbol (hex with 0x prefix, or decimal)
    #[arg(value_parser = parse_anchor)]
    anchor: Option<u64>,

    /// Symbol whose runtime address the anchor gives
    #[arg(long, value_name = "NAME", default_value = DEFAULT_ANCHOR_SYMBOL)]
    anchor_symbol: String,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_anchor(s: &str) -> std::result::Result<u64, String> {
    parse_address(s).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("rehash: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// ログは標準エラーへ。RUST_LOG があればそちらを優先する
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let debug_info = rehash_debuginfo::open(&cli.debug_info)
        .with_context(|| format!("failed to load debug information from {}", cli.debug_info.display()))?;
    debug!(
        "Loaded debug information from {} ({:?})",
        cli.debug_info.display(),
        debug_info.address_width()
    );

    let config = AnnotatorConfig {
        anchor_symbol: cli.anchor_symbol,
        ..Default::default()
    };
    let mut annotator = LineAnnotator::new(debug_info.as_ref(), config, OverrideTable::builtin()?)?;
    if let Some(anchor) = cli.anchor {
        annotator = annotator.with_explicit_anchor(anchor);
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let stats = annotator.annotate(stdin.lock(), stdout.lock())?;

    info!(
        "Processed {} lines: {} annotated, {} unresolved",
        stats.lines, stats.annotated, stats.unresolved
    );
    Ok(())
}

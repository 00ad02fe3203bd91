use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use exif_scrub::pipeline::{self, ImageKind, Outcome, ProcessOptions};
use exif_scrub::{attrs, metadata};

#[derive(Parser, Debug)]
#[command(
    name = "exif-scrub",
    version,
    about = "Strip privacy-sensitive metadata from images in place: embedded EXIF tags and filesystem extended attributes"
)]
struct Cli {
    /// Image files to process (non-images are skipped silently)
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Report what would be stripped without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Copy each file to <name>.<ext>.bak before rewriting it
    #[arg(long)]
    backup: bool,

    /// Display embedded metadata and extended attributes, then exit
    #[arg(long)]
    show: bool,

    /// Output per-file results as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --show
    if cli.show {
        return show_metadata(&cli.paths);
    }

    if cli.dry_run {
        log::info!("DRY RUN — no files will be modified");
    }

    let options = ProcessOptions {
        dry_run: cli.dry_run,
        backup: cli.backup,
    };
    let reports = pipeline::process_batch(&cli.paths, &options);

    // JSON output
    if cli.json {
        let values: Vec<serde_json::Value> = reports
            .iter()
            .map(|r| {
                serde_json::json!({
                    "path": r.path.display().to_string(),
                    "outcome": r.outcome,
                    "error": r.error,
                })
            })
            .collect();

        match serde_json::to_string_pretty(&values) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                log::error!("Failed to serialize report: {e}");
                return ExitCode::from(2);
            }
        }
    }

    // Summary
    let total = reports.len();
    let stripped = reports.iter().filter(|r| r.changed()).count();
    let clean = reports
        .iter()
        .filter(|r| r.outcome == Some(Outcome::Clean))
        .count();
    let skipped = reports
        .iter()
        .filter(|r| r.outcome == Some(Outcome::NotAnImage))
        .count();
    let failed = reports.iter().filter(|r| r.error.is_some()).count();
    log::info!(
        "Done: {stripped} stripped, {clean} clean, {skipped} skipped, {failed} failed out of {total} file(s)"
    );

    // Exit status doubles as the hook contract: 1 means files changed
    // (or would change, under --dry-run), 2 means something went wrong.
    if failed > 0 {
        ExitCode::from(2)
    } else if stripped > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

// ANSI color codes
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Max width for the value column before wrapping.
const VAL_WIDTH: usize = 46;
/// Indent for continuation lines (tag column width + " : " = 25 chars + 2 leading spaces).
const INDENT: &str = "                           ";

/// Handle --show: print every file's metadata without modifying anything.
fn show_metadata(paths: &[PathBuf]) -> ExitCode {
    let mut failed = 0usize;
    for path in paths {
        if let Err(e) = print_file_metadata(path) {
            log::error!("{e:#}");
            failed += 1;
        }
    }

    if failed > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}

/// Print the embedded metadata and extended attributes of one file,
/// organized by section.
fn print_file_metadata(path: &Path) -> Result<()> {
    println!();
    println!("{BOLD}File:{RESET} {}", path.display());
    println!("{DIM}{}{RESET}", "═".repeat(72));

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            println!("  {DIM}(no such file){RESET}");
            println!();
            return Ok(());
        }
        Err(e) => {
            return Err(e).context(format!("Failed to read {}", path.display()));
        }
    };

    if ImageKind::detect(&bytes).is_none() {
        println!("  {DIM}(not a supported image){RESET}");
        println!();
        return Ok(());
    }

    // --- Embedded metadata ---
    let tags = metadata::read_tags(&bytes);
    if tags.is_empty() {
        println!("  {DIM}(no embedded metadata){RESET}");
    } else {
        println!("  {BOLD}Embedded Metadata{RESET}");
        println!("  {DIM}{}{RESET}", "─".repeat(70));
        for entry in &tags {
            let label = match entry.ifd {
                0 => entry.tag.clone(),
                1 => format!("{} (thumbnail)", entry.tag),
                n => format!("{} (ifd{n})", entry.tag),
            };
            print_row(&label, &entry.value);
        }
    }
    println!();

    // --- Extended attributes ---
    let names = attrs::names(path);
    if !attrs::supported() {
        println!("  {DIM}(extended attributes not supported on this platform){RESET}");
    } else if names.is_empty() {
        println!("  {DIM}(no extended attributes){RESET}");
    } else {
        println!("  {BOLD}Extended Attributes{RESET}");
        println!("  {DIM}{}{RESET}", "─".repeat(70));
        for name in &names {
            println!("  {}", name.to_string_lossy());
        }
    }
    println!();

    Ok(())
}

/// Print a single row in the metadata display table.
fn print_row(tag: &str, val: &str) {
    let tag_col = format!("{:<22}", tag);
    let lines = wrap_text(val, VAL_WIDTH);
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            println!("  {tag_col} : {line}");
        } else {
            println!("  {INDENT}{line}");
        }
    }
}

/// Wrap text at word boundaries to fit within max_width.
fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in s.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.len() + 1 + word.len() <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(s.to_string());
    }

    lines
}

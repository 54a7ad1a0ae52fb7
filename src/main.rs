//! ns-migrate: move C/C++ identifiers into a namespace.
//!
//! Qualifies bare identifiers (`Inode` -> `vfs::Inode`) across headers, or
//! injects a `using namespace` directive into a block, either from command
//! line flags or from a JSON migration plan.

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Args, Commands, QualifyOptions, Selection};
use colored::Colorize;
use dialoguer::Confirm;
use ns_migrate::analyzer;
use ns_migrate::migrate::{self, FileChange, Strategy, Summary};
use ns_migrate::plan::{MigrationPlan, Task};
use ns_migrate::scanner::{self, FileFilter};
use ns_migrate::{Injection, Qualification};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let args = Args::parse();

    let no_color = args.no_color || std::env::var_os("NO_COLOR").is_some();
    if no_color {
        colored::control::set_override(false);
    }
    init_tracing(args.verbose, no_color);

    let failed = match args.command {
        Commands::Detect {
            selection,
            options,
            json,
        } => cmd_detect(&selection, &options, json)?,
        Commands::Qualify {
            selection,
            options,
            write,
            interactive,
        } => cmd_qualify(&selection, &options, write, interactive)?,
        Commands::Inject {
            files,
            anchor,
            directive,
            ensure_once,
            write,
        } => cmd_inject(files, &anchor, &directive, ensure_once, write)?,
        Commands::Run {
            plan,
            write,
            interactive,
            json,
        } => cmd_run(&plan, write, interactive, json)?,
        Commands::Scan { selection } => cmd_scan(&selection)?,
    };

    check_failures(failed)
}

/// Turns a failed-file count into the process result.
fn check_failures(failed: usize) -> Result<()> {
    if failed > 0 {
        anyhow::bail!("{} file(s) failed", failed);
    }
    Ok(())
}

/// Initializes the tracing subscriber. `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool, no_color: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "warn" })
    });

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(!no_color)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn collect(selection: &Selection) -> Result<Vec<PathBuf>> {
    let filter = FileFilter::new(
        &selection.extensions,
        &selection.exclude,
        !selection.no_default_excludes,
    )?;
    let paths = selection
        .paths
        .clone()
        .unwrap_or_else(|| vec![PathBuf::from(".")]);
    let files = scanner::collect_source_files(&paths, &filter)?;
    info!(files = files.len(), "collected source files");
    Ok(files)
}

fn qualification(options: &QualifyOptions) -> Result<Qualification> {
    Qualification::new(&options.identifiers, &options.qualifier, &options.delimiter)
        .context("Invalid qualify options")
}

fn cmd_detect(selection: &Selection, options: &QualifyOptions, json: bool) -> Result<usize> {
    let q = qualification(options)?;
    let files = collect(selection)?;

    let mut scanned = Vec::with_capacity(files.len());
    let mut failed = 0;
    for file in files {
        match migrate::read_source(&file) {
            Ok(source) => {
                let occurrences = scanner::find_occurrences(&source, &q);
                scanned.push((file, occurrences));
            }
            Err(err) => {
                failed += 1;
                eprintln!("{} {:#}", "error:".red().bold(), err);
            }
        }
    }

    let result = analyzer::analyze(scanned, |ident| q.qualify(ident));

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_detection_result(&result);
    }

    Ok(failed)
}

fn cmd_qualify(
    selection: &Selection,
    options: &QualifyOptions,
    write: bool,
    interactive: bool,
) -> Result<usize> {
    let strategy = Strategy::Qualify(qualification(options)?);
    let tasks = collect(selection)?
        .into_iter()
        .map(|path| Task {
            path,
            strategy: strategy.clone(),
        })
        .collect::<Vec<_>>();

    let summary = run_tasks(&tasks, write, interactive)?;
    print_summary(&summary, write);
    Ok(summary.files_failed)
}

fn cmd_inject(
    files: Vec<PathBuf>,
    anchor: &str,
    directive: &str,
    ensure_once: bool,
    write: bool,
) -> Result<usize> {
    let injection = Injection::new(anchor, &cli::unescape(directive), ensure_once)
        .context("Invalid inject options")?;
    let strategy = Strategy::Inject(injection);
    let tasks = files
        .into_iter()
        .map(|path| Task {
            path,
            strategy: strategy.clone(),
        })
        .collect::<Vec<_>>();

    let summary = run_tasks(&tasks, write, false)?;
    print_summary(&summary, write);
    Ok(summary.files_failed)
}

fn cmd_run(plan_path: &Path, write: bool, interactive: bool, json: bool) -> Result<usize> {
    let plan = MigrationPlan::load(plan_path)?;
    let base = plan_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let tasks = plan.tasks(base)?;

    if tasks.is_empty() {
        println!("{} Plan matched no files", "info:".blue().bold());
        return Ok(0);
    }

    let summary = run_tasks(&tasks, write, interactive && !json)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary, write);
    }
    Ok(summary.files_failed)
}

fn cmd_scan(selection: &Selection) -> Result<usize> {
    let files = collect(selection)?;

    println!("Would scan {} files:", files.len());
    for file in files {
        println!("  {}", file.display());
    }

    Ok(0)
}

/// Prepares every task, shows the edits, and writes when asked to.
///
/// A failure on one file is reported and counted; the remaining files still run.
fn run_tasks(tasks: &[Task], write: bool, interactive: bool) -> Result<Summary> {
    let mut summary = Summary::default();

    for task in tasks {
        let change = match migrate::prepare(&task.path, &task.strategy) {
            Ok(change) => change,
            Err(err) => {
                warn!(path = %task.path.display(), "skipping file");
                eprintln!("{} {:#}", "error:".red().bold(), err);
                summary.record_failure();
                continue;
            }
        };

        if !change.is_changed() {
            summary.record(&change);
            continue;
        }

        print_change(&change, write);

        if write {
            if interactive && !confirm(&change.path)? {
                println!("  {}", "skipped".dimmed());
                summary.record(&FileChange {
                    updated: change.original.clone(),
                    ..change
                });
                continue;
            }
            if let Err(err) = migrate::commit(&change) {
                eprintln!("{} {:#}", "error:".red().bold(), err);
                summary.record_failure();
                continue;
            }
        }

        summary.record(&change);
    }

    Ok(summary)
}

fn confirm(path: &Path) -> Result<bool> {
    Confirm::new()
        .with_prompt(format!("Apply changes to {}?", path.display()))
        .default(true)
        .interact()
        .context("Failed to read confirmation")
}

fn print_change(change: &FileChange, write: bool) {
    println!(
        "\n{} {}",
        if write { "Updating:" } else { "Would update:" }
            .yellow()
            .bold(),
        change.path.display()
    );
    for edit in &change.edits {
        println!(
            "  {}:{}: {} -> {}",
            edit.line,
            edit.column,
            edit.before.escape_debug().to_string().red(),
            edit.after.escape_debug().to_string().green()
        );
    }
}

fn print_summary(summary: &Summary, write: bool) {
    println!(
        "\n{} {} file(s) examined, {} changed, {} unchanged, {} failed ({} edit(s))",
        "Summary:".bold(),
        summary.files_examined,
        summary.files_changed,
        summary.files_unchanged,
        summary.files_failed,
        summary.edits
    );

    if !write && summary.files_changed > 0 {
        println!("{} Use --write to apply changes", "hint:".cyan().bold());
    }
}

fn print_detection_result(result: &analyzer::DetectionResult) {
    let d = &result.diagnostics;

    info!(
        files = d.files_scanned,
        occurrences = d.total_occurrences,
        qualified = d.qualified,
        "detection finished"
    );

    if result.unqualified.is_empty() {
        println!("{} No unqualified identifiers found", "ok:".green().bold());
        return;
    }

    println!(
        "\n{} {} unqualified occurrence(s) in {} file(s):\n",
        "Found".red().bold(),
        d.unqualified,
        d.files_needing_changes
    );

    for finding in &result.unqualified {
        let loc = format!(
            "{}:{}:{}",
            finding.file.display(),
            finding.occurrence.line,
            finding.occurrence.column
        );
        println!(
            "  {} {} {} {}",
            loc.dimmed(),
            finding.occurrence.identifier.red(),
            "->".green(),
            finding.suggestion.green()
        );
    }
}

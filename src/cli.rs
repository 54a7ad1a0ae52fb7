//! Command-line interface definitions.
//!
//! Defines the argument parser and subcommands using clap's derive API.
//! Each subcommand corresponds to a distinct operation: reporting unqualified
//! identifiers, qualifying them, injecting a directive, running a JSON plan,
//! or listing scan targets.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// Migrate C/C++ identifiers into a namespace.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Print debug logging to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output. Also honored via the NO_COLOR environment variable.
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Which files to look at.
#[derive(Debug, Clone, ClapArgs)]
pub struct Selection {
    /// Files or directories to scan. Defaults to current directory.
    #[arg(short, long, num_args = 1..)]
    pub paths: Option<Vec<PathBuf>>,

    /// Glob patterns for directories/files to exclude (e.g., "build", "*.generated.hpp").
    /// By default, entries starting with `.` or `_` are excluded.
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Disable default exclusion of `.` and `_` prefixed entries.
    #[arg(long)]
    pub no_default_excludes: bool,

    /// File extensions to scan (repeatable or comma separated). Defaults to common C/C++ extensions.
    #[arg(long = "ext", value_delimiter = ',')]
    pub extensions: Vec<String>,
}

/// What to qualify and how.
#[derive(Debug, Clone, ClapArgs)]
pub struct QualifyOptions {
    /// Identifiers to qualify (repeatable or comma separated).
    #[arg(short = 'I', long = "ident", value_delimiter = ',', required = true)]
    pub identifiers: Vec<String>,

    /// Namespace prefix, e.g. `vfs`.
    #[arg(short, long)]
    pub qualifier: String,

    /// Scope-resolution token between qualifier and identifier.
    #[arg(long, default_value = "::")]
    pub delimiter: String,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Report identifiers that are not yet qualified.
    Detect {
        #[command(flatten)]
        selection: Selection,

        #[command(flatten)]
        options: QualifyOptions,

        /// Emit JSON instead of human-readable output.
        #[arg(long)]
        json: bool,
    },

    /// Qualify identifiers in place.
    Qualify {
        #[command(flatten)]
        selection: Selection,

        #[command(flatten)]
        options: QualifyOptions,

        /// Actually modify files (default is dry-run).
        #[arg(long)]
        write: bool,

        /// Interactively confirm each file's changes before applying.
        #[arg(short, long)]
        interactive: bool,
    },

    /// Insert a directive after the first anchor in each file.
    Inject {
        /// Files to modify.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Literal text marking the insertion point, e.g. "namespace ramfs {".
        #[arg(short, long)]
        anchor: String,

        /// Literal text to insert after the anchor. Escapes `\n` and `\t` are expanded.
        #[arg(short, long)]
        directive: String,

        /// Skip files where the directive already directly follows the anchor.
        #[arg(long)]
        ensure_once: bool,

        /// Actually modify files (default is dry-run).
        #[arg(long)]
        write: bool,
    },

    /// Execute a JSON migration plan.
    Run {
        /// Path to the plan file.
        plan: PathBuf,

        /// Actually modify files (default is dry-run).
        #[arg(long)]
        write: bool,

        /// Interactively confirm each file's changes before applying.
        #[arg(short, long)]
        interactive: bool,

        /// Emit a JSON summary instead of human-readable output.
        #[arg(long)]
        json: bool,
    },

    /// List files that would be scanned without processing them.
    Scan {
        #[command(flatten)]
        selection: Selection,
    },
}

/// Expands `\n`, `\t`, `\\` in a command-line directive.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

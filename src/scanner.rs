//! Source scanner.
//!
//! Splits a text buffer into word tokens (maximal runs of alphanumerics and
//! underscores) and reports every whole-token occurrence of a configured
//! identifier. Also walks directories to collect the C/C++ sources a
//! migration should look at, skipping entries whose names start with `.` or
//! `_` and anything matching a user exclude glob.

use crate::rewriter::Qualification;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions scanned when no `--ext` is given.
pub const DEFAULT_EXTENSIONS: &[&str] = &["h", "hh", "hpp", "hxx", "c", "cc", "cpp", "cxx"];

/// A whole-token occurrence of a configured identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occurrence {
    /// The identifier that matched.
    pub identifier: String,
    /// Line number, 1-indexed.
    pub line: usize,
    /// Column number, 1-indexed, counted in characters.
    pub column: usize,
    /// Byte offset of the first character of the identifier.
    pub start_offset: usize,
    /// Byte offset one past the last character of the identifier.
    pub end_offset: usize,
    /// Whether the occurrence is already directly preceded by `qualifier + delimiter`.
    pub qualified: bool,
}

/// A maximal run of token characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Characters that make up a word token. Everything else is a boundary.
pub fn is_token_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Returns `true` if `s` is exactly one non-empty token.
pub fn is_single_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_token_char)
}

/// Iterates over the word tokens of `source` in order.
pub fn tokens(source: &str) -> impl Iterator<Item = Token<'_>> {
    let mut chars = source.char_indices().peekable();

    std::iter::from_fn(move || {
        let start = loop {
            let (i, c) = chars.next()?;
            if is_token_char(c) {
                break i;
            }
        };

        let mut end = source.len();
        while let Some(&(i, c)) = chars.peek() {
            if !is_token_char(c) {
                end = i;
                break;
            }
            chars.next();
        }

        Some(Token {
            text: &source[start..end],
            start,
            end,
        })
    })
}

/// Finds every whole-token occurrence of the qualification's identifiers.
///
/// Each occurrence is classified against the buffer as given, so the result
/// does not depend on the order identifiers were configured in.
pub fn find_occurrences(source: &str, qualification: &Qualification) -> Vec<Occurrence> {
    tokens(source)
        .filter(|token| qualification.contains(token.text))
        .map(|token| {
            let (line, column) = offset_to_line_col(source, token.start);
            Occurrence {
                identifier: token.text.to_string(),
                line,
                column,
                start_offset: token.start,
                end_offset: token.end,
                qualified: is_qualified(
                    source,
                    token.start,
                    qualification.qualifier(),
                    qualification.delimiter(),
                ),
            }
        })
        .collect()
}

/// Checks whether the text ending at `start` is exactly `qualifier + delimiter`.
///
/// Only the characters directly before the identifier count, so
/// `myvfs::Inode` is already qualified by `vfs`.
pub fn is_qualified(source: &str, start: usize, qualifier: &str, delimiter: &str) -> bool {
    source[..start]
        .strip_suffix(delimiter)
        .is_some_and(|rest| rest.ends_with(qualifier))
}

pub fn offset_to_line_col(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut col = 1;
    for (i, c) in source.char_indices() {
        if i >= offset {
            break;
        }
        if c == '\n' {
            line += 1;
            col = 1;
        } else {
            col += 1;
        }
    }
    (line, col)
}

/// Which files a directory walk keeps.
#[derive(Debug, Clone)]
pub struct FileFilter {
    pub extensions: Vec<String>,
    pub excludes: Vec<glob::Pattern>,
    pub default_excludes: bool,
}

impl Default for FileFilter {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            excludes: Vec::new(),
            default_excludes: true,
        }
    }
}

impl FileFilter {
    /// Builds a filter from raw CLI values. Empty `extensions` means the defaults.
    pub fn new(extensions: &[String], excludes: &[String], default_excludes: bool) -> Result<Self> {
        let excludes = excludes
            .iter()
            .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid exclude glob '{}'", p)))
            .collect::<Result<Vec<_>>>()?;

        let extensions = if extensions.is_empty() {
            Self::default().extensions
        } else {
            extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect()
        };

        Ok(Self {
            extensions,
            excludes,
            default_excludes,
        })
    }

    fn is_excluded(&self, entry: &walkdir::DirEntry) -> bool {
        // Roots are always walked, even `.`.
        if entry.depth() == 0 {
            return false;
        }

        let name = entry.file_name().to_string_lossy();
        if self.default_excludes && (name.starts_with('.') || name.starts_with('_')) {
            return true;
        }

        self.excludes
            .iter()
            .any(|p| p.matches(&name) || p.matches_path(entry.path()))
    }

    fn has_wanted_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}

/// Collects source files under `paths` that pass `filter`, sorted and deduplicated.
///
/// A path that names a file directly is kept regardless of its extension.
pub fn collect_source_files(paths: &[PathBuf], filter: &FileFilter) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }

        for entry in WalkDir::new(path)
            .into_iter()
            .filter_entry(|e| !filter.is_excluded(e))
        {
            let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
            if entry.file_type().is_file() && filter.has_wanted_extension(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

//! Applying strategies to files.
//!
//! Every file goes through the same read-transform-write sequence: the whole
//! buffer is read, the strategy produces a complete new buffer, and only then
//! is the file overwritten. A failed read or a failed transform means nothing
//! is written for that file.

use crate::error;
use crate::injector::{Injection, Outcome};
use crate::rewriter::Qualification;
use crate::scanner::offset_to_line_col;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The transform applied to one file.
#[derive(Debug, Clone)]
pub enum Strategy {
    Qualify(Qualification),
    Inject(Injection),
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Qualify(_) => "qualify",
            Strategy::Inject(_) => "inject",
        }
    }

    /// Runs the strategy over `buffer`, returning the new buffer and the edits made.
    pub fn apply(&self, buffer: &str) -> error::Result<(String, Vec<Edit>)> {
        match self {
            Strategy::Qualify(q) => {
                let edits = q
                    .plan(buffer)
                    .into_iter()
                    .map(|o| Edit {
                        line: o.line,
                        column: o.column,
                        after: q.qualify(&o.identifier),
                        before: o.identifier,
                    })
                    .collect();
                Ok((q.rewrite(buffer), edits))
            }
            Strategy::Inject(injection) => {
                let outcome = injection.apply(buffer)?;
                let edits = if outcome.is_inserted() {
                    let start = outcome.offset() - injection.anchor().len();
                    let (line, column) = offset_to_line_col(buffer, start);
                    vec![Edit {
                        line,
                        column,
                        before: injection.anchor().to_string(),
                        after: format!("{}{}", injection.anchor(), injection.directive()),
                    }]
                } else {
                    Vec::new()
                };
                Ok((outcome.into_buffer(), edits))
            }
        }
    }
}

/// A single change, positioned in the original buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub line: usize,
    pub column: usize,
    pub before: String,
    pub after: String,
}

/// A fully computed, not yet written, change to one file.
#[derive(Debug, Clone)]
pub struct FileChange {
    pub path: PathBuf,
    pub original: String,
    pub updated: String,
    pub edits: Vec<Edit>,
}

impl FileChange {
    pub fn is_changed(&self) -> bool {
        self.original != self.updated
    }
}

/// Counts from a migration run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub files_examined: usize,
    pub files_changed: usize,
    pub files_unchanged: usize,
    pub files_failed: usize,
    pub edits: usize,
}

impl Summary {
    pub fn record(&mut self, change: &FileChange) {
        self.files_examined += 1;
        if change.is_changed() {
            self.files_changed += 1;
            self.edits += change.edits.len();
        } else {
            self.files_unchanged += 1;
        }
    }

    pub fn record_failure(&mut self) {
        self.files_examined += 1;
        self.files_failed += 1;
    }
}

pub fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

pub fn write_source(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Reads `path` and computes the result of `strategy` without writing anything.
pub fn prepare(path: &Path, strategy: &Strategy) -> Result<FileChange> {
    let original = read_source(path)?;
    let (updated, edits) = strategy
        .apply(&original)
        .with_context(|| format!("Cannot {} {}", strategy.name(), path.display()))?;

    debug!(
        path = %path.display(),
        strategy = strategy.name(),
        edits = edits.len(),
        "prepared file"
    );

    Ok(FileChange {
        path: path.to_path_buf(),
        original,
        updated,
        edits,
    })
}

/// Writes a prepared change. Unchanged files are left untouched.
///
/// Returns whether the file was written.
pub fn commit(change: &FileChange) -> Result<bool> {
    if !change.is_changed() {
        return Ok(false);
    }
    write_source(&change.path, &change.updated)?;
    debug!(path = %change.path.display(), "wrote file");
    Ok(true)
}

/// Prepares and commits in one step.
pub fn migrate_file(path: &Path, strategy: &Strategy) -> Result<FileChange> {
    let change = prepare(path, strategy)?;
    commit(&change)?;
    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn qualify() -> Strategy {
        Strategy::Qualify(Qualification::new(["Inode", "File"], "vfs", "::").unwrap())
    }

    fn inject(ensure_once: bool) -> Strategy {
        Strategy::Inject(
            Injection::new("namespace ramfs {", "\nusing namespace vfs;", ensure_once).unwrap(),
        )
    }

    #[test]
    fn qualify_reports_each_edit() {
        let (out, edits) = qualify().apply("vfs::Inode a;\nFile* f; Inode b;").unwrap();
        assert_eq!(out, "vfs::Inode a;\nvfs::File* f; vfs::Inode b;");
        assert_eq!(
            edits,
            vec![
                Edit {
                    line: 2,
                    column: 1,
                    before: "File".to_string(),
                    after: "vfs::File".to_string(),
                },
                Edit {
                    line: 2,
                    column: 10,
                    before: "Inode".to_string(),
                    after: "vfs::Inode".to_string(),
                },
            ]
        );
    }

    #[test]
    fn inject_reports_anchor_position() {
        let (out, edits) = inject(false).apply("// a\nnamespace ramfs {\n}").unwrap();
        assert_eq!(out, "// a\nnamespace ramfs {\nusing namespace vfs;\n}");
        assert_eq!(edits.len(), 1);
        assert_eq!((edits[0].line, edits[0].column), (2, 1));
    }

    #[test]
    fn inject_ensure_once_reports_nothing_when_present() {
        let (out, edits) = inject(true)
            .apply("namespace ramfs {\nusing namespace vfs;\n}")
            .unwrap();
        assert_eq!(out, "namespace ramfs {\nusing namespace vfs;\n}");
        assert!(edits.is_empty());
    }

    #[test]
    fn inject_missing_anchor_is_an_error() {
        let err = inject(false).apply("int x;").unwrap_err();
        assert!(matches!(err, error::Error::AnchorNotFound { .. }));
    }

    #[test]
    fn prepare_missing_file_names_path() {
        let err = prepare(Path::new("/definitely/not/here.hpp"), &qualify()).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.hpp"));
    }

    #[test]
    fn summary_counts_changes() {
        let mut summary = Summary::default();
        summary.record(&FileChange {
            path: PathBuf::from("a.hpp"),
            original: "Inode".to_string(),
            updated: "vfs::Inode".to_string(),
            edits: vec![Edit {
                line: 1,
                column: 1,
                before: "Inode".to_string(),
                after: "vfs::Inode".to_string(),
            }],
        });
        summary.record(&FileChange {
            path: PathBuf::from("b.hpp"),
            original: "x".to_string(),
            updated: "x".to_string(),
            edits: Vec::new(),
        });
        summary.record_failure();
        assert_eq!(
            summary,
            Summary {
                files_examined: 3,
                files_changed: 1,
                files_unchanged: 1,
                files_failed: 1,
                edits: 1,
            }
        );
    }
}

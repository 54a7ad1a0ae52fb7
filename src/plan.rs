//! Migration plans.
//!
//! A plan is a JSON file that says which files get their identifiers
//! qualified and which get a directive injected. It is the only place that
//! decides which strategy applies to which file; the rewriting core takes all
//! of its configuration as explicit arguments.
//!
//! ```json
//! {
//!   "qualifier": "vfs",
//!   "identifiers": ["FileSystem", "Inode", "File"],
//!   "qualify": ["include/*.hpp"],
//!   "inject": [
//!     { "files": ["*.cpp"], "anchor": "namespace ramfs {", "directive": "\n\nusing namespace vfs;\n" }
//!   ]
//! }
//! ```
//!
//! Relative globs resolve against the directory containing the plan.

use crate::injector::Injection;
use crate::migrate::Strategy;
use crate::rewriter::Qualification;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

fn default_delimiter() -> String {
    "::".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationPlan {
    pub qualifier: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
    #[serde(default)]
    pub identifiers: Vec<String>,
    /// Globs of files whose identifiers are qualified in place.
    #[serde(default)]
    pub qualify: Vec<String>,
    #[serde(default)]
    pub inject: Vec<InjectTarget>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InjectTarget {
    pub files: Vec<String>,
    pub anchor: String,
    pub directive: String,
    #[serde(default)]
    pub ensure_once: bool,
}

/// One file paired with the strategy to run on it.
#[derive(Debug, Clone)]
pub struct Task {
    pub path: PathBuf,
    pub strategy: Strategy,
}

impl MigrationPlan {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read plan {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Invalid plan {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse plan JSON")
    }

    /// Validates every strategy, then expands globs relative to `base`.
    ///
    /// Nothing is read from the matched files. A glob matching no file is
    /// logged and skipped.
    pub fn tasks(&self, base: &Path) -> Result<Vec<Task>> {
        let mut tasks = Vec::new();

        if !self.qualify.is_empty() {
            let qualification =
                Qualification::new(&self.identifiers, &self.qualifier, &self.delimiter)
                    .context("Invalid qualify settings")?;
            for path in expand_globs(base, &self.qualify)? {
                tasks.push(Task {
                    path,
                    strategy: Strategy::Qualify(qualification.clone()),
                });
            }
        }

        for (i, target) in self.inject.iter().enumerate() {
            let injection = Injection::new(&target.anchor, &target.directive, target.ensure_once)
                .with_context(|| format!("Invalid inject entry #{}", i + 1))?;
            for path in expand_globs(base, &target.files)? {
                tasks.push(Task {
                    path,
                    strategy: Strategy::Inject(injection.clone()),
                });
            }
        }

        debug!(count = tasks.len(), "expanded migration plan");
        Ok(tasks)
    }
}

fn expand_globs(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        let full = if Path::new(pattern).is_absolute() {
            PathBuf::from(pattern)
        } else {
            base.join(pattern)
        };
        let full = full.to_string_lossy();

        let before = paths.len();
        for entry in glob::glob(&full).with_context(|| format!("Invalid glob '{}'", pattern))? {
            let path = entry.with_context(|| format!("Failed to expand '{}'", pattern))?;
            if path.is_file() {
                paths.push(path);
            }
        }
        if paths.len() == before {
            warn!(pattern = %pattern, "glob matched no files");
        }
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
    }

    #[test]
    fn parses_minimal_plan_with_defaults() {
        let plan = MigrationPlan::from_json(r#"{ "qualifier": "vfs" }"#).unwrap();
        assert_eq!(plan.delimiter, "::");
        assert!(plan.identifiers.is_empty());
        assert!(plan.qualify.is_empty());
        assert!(plan.inject.is_empty());
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = MigrationPlan::from_json(r#"{ "qualifier": "vfs", "qualfy": [] }"#).unwrap_err();
        assert!(format!("{:#}", err).contains("unknown field"));
    }

    #[test]
    fn loads_fixture_plan() {
        let plan = MigrationPlan::load(&fixtures().join("plan.json")).unwrap();
        assert_eq!(plan.qualifier, "vfs");
        assert_eq!(plan.identifiers.len(), 8);
        assert_eq!(plan.inject.len(), 1);
        assert!(plan.inject[0].ensure_once);
    }

    #[test]
    fn expands_fixture_plan_into_tasks() {
        let plan = MigrationPlan::load(&fixtures().join("plan.json")).unwrap();
        let tasks = plan.tasks(&fixtures()).unwrap();
        assert_eq!(tasks.len(), 2);
        assert!(tasks[0].path.ends_with("ramfs/include/ramfs.hpp"));
        assert!(matches!(tasks[0].strategy, Strategy::Qualify(_)));
        assert!(tasks[1].path.ends_with("ramfs/ramfs.cpp"));
        assert!(matches!(tasks[1].strategy, Strategy::Inject(_)));
    }

    #[test]
    fn unmatched_glob_yields_no_tasks() {
        let plan = MigrationPlan::from_json(
            r#"{ "qualifier": "vfs", "identifiers": ["Inode"], "qualify": ["nope/*.hpp"] }"#,
        )
        .unwrap();
        assert!(plan.tasks(&fixtures()).unwrap().is_empty());
    }

    #[test]
    fn invalid_qualification_fails_before_expansion() {
        let plan = MigrationPlan::from_json(
            r#"{ "qualifier": "vfs", "identifiers": [], "qualify": ["ramfs/**/*.hpp"] }"#,
        )
        .unwrap();
        let err = plan.tasks(&fixtures()).unwrap_err();
        assert!(format!("{:#}", err).contains("at least one is required"));
    }

    #[test]
    fn empty_anchor_is_rejected() {
        let plan = MigrationPlan::from_json(
            r#"{ "qualifier": "vfs", "inject": [{ "files": ["*.cpp"], "anchor": "", "directive": "x" }] }"#,
        )
        .unwrap();
        let err = plan.tasks(&fixtures()).unwrap_err();
        assert!(format!("{:#}", err).contains("Invalid inject entry #1"));
    }
}

//! Detection reports.
//!
//! Aggregates per-file occurrences into the list of places a qualify run
//! would change, plus summary counts for `detect`.

use crate::scanner::Occurrence;
use serde::Serialize;
use std::path::PathBuf;

/// An unqualified occurrence together with the file it was found in.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub file: PathBuf,
    #[serde(flatten)]
    pub occurrence: Occurrence,
    /// The spelling a rewrite would produce.
    pub suggestion: String,
}

/// Summary statistics from a detection run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostics {
    pub files_scanned: usize,
    pub total_occurrences: usize,
    pub qualified: usize,
    pub unqualified: usize,
    pub files_needing_changes: usize,
}

/// Complete detection results.
#[derive(Debug, Serialize)]
pub struct DetectionResult {
    pub unqualified: Vec<Finding>,
    pub diagnostics: Diagnostics,
}

/// Splits occurrences into qualified and unqualified, keeping the latter as findings.
///
/// `qualify` maps an identifier to its qualified spelling.
pub fn analyze<F>(files: Vec<(PathBuf, Vec<Occurrence>)>, qualify: F) -> DetectionResult
where
    F: Fn(&str) -> String,
{
    let mut diagnostics = Diagnostics {
        files_scanned: files.len(),
        ..Diagnostics::default()
    };
    let mut unqualified = Vec::new();

    for (file, occurrences) in files {
        diagnostics.total_occurrences += occurrences.len();
        let before = unqualified.len();

        for occurrence in occurrences {
            if occurrence.qualified {
                diagnostics.qualified += 1;
            } else {
                unqualified.push(Finding {
                    file: file.clone(),
                    suggestion: qualify(&occurrence.identifier),
                    occurrence,
                });
            }
        }

        if unqualified.len() > before {
            diagnostics.files_needing_changes += 1;
        }
    }

    diagnostics.unqualified = unqualified.len();

    DetectionResult {
        unqualified,
        diagnostics,
    }
}

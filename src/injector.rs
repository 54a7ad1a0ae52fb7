//! Scoped directive injection.
//!
//! Inserts a literal directive (typically `using namespace vfs;`) right after
//! the first occurrence of an anchor such as `namespace ramfs {`. Only the
//! first anchor is used. Plain [`inject`] is not idempotent: a second call
//! inserts a second copy. [`Injection`] with `ensure_once` set checks for a
//! directive already sitting right after the anchor and leaves the buffer
//! alone in that case.

use crate::error::{Error, Result};

/// Inserts `directive` immediately after the first occurrence of `anchor`.
///
/// Fails with [`Error::AnchorNotFound`] when `anchor` does not occur, and with
/// [`Error::Configuration`] when `anchor` is empty.
///
/// ```
/// let out = ns_migrate::injector::inject("namespace ramfs {\n}", "namespace ramfs {", "\nusing namespace vfs;").unwrap();
/// assert_eq!(out, "namespace ramfs {\nusing namespace vfs;\n}");
/// ```
pub fn inject(buffer: &str, anchor: &str, directive: &str) -> Result<String> {
    let injection = Injection::new(anchor, directive, false)?;
    Ok(injection.apply(buffer)?.into_buffer())
}

/// A validated injection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    anchor: String,
    directive: String,
    ensure_once: bool,
}

/// What [`Injection::apply`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The directive was inserted at the given byte offset.
    Inserted { buffer: String, offset: usize },
    /// `ensure_once` was set and the directive already follows the anchor.
    AlreadyPresent { buffer: String, offset: usize },
}

impl Outcome {
    pub fn into_buffer(self) -> String {
        match self {
            Outcome::Inserted { buffer, .. } | Outcome::AlreadyPresent { buffer, .. } => buffer,
        }
    }

    pub fn offset(&self) -> usize {
        match self {
            Outcome::Inserted { offset, .. } | Outcome::AlreadyPresent { offset, .. } => *offset,
        }
    }

    pub fn is_inserted(&self) -> bool {
        matches!(self, Outcome::Inserted { .. })
    }
}

impl Injection {
    pub fn new(anchor: &str, directive: &str, ensure_once: bool) -> Result<Self> {
        if anchor.is_empty() {
            return Err(Error::config("anchor", "must not be empty"));
        }
        Ok(Self {
            anchor: anchor.to_string(),
            directive: directive.to_string(),
            ensure_once,
        })
    }

    pub fn anchor(&self) -> &str {
        &self.anchor
    }

    pub fn directive(&self) -> &str {
        &self.directive
    }

    /// Byte offset just past the first anchor, where the directive goes.
    pub fn locate(&self, buffer: &str) -> Result<usize> {
        buffer
            .find(&self.anchor)
            .map(|start| start + self.anchor.len())
            .ok_or_else(|| Error::AnchorNotFound {
                anchor: self.anchor.clone(),
            })
    }

    /// Whether the directive already sits directly after the first anchor.
    pub fn is_present(&self, buffer: &str) -> Result<bool> {
        let offset = self.locate(buffer)?;
        Ok(buffer[offset..].starts_with(&self.directive))
    }

    pub fn apply(&self, buffer: &str) -> Result<Outcome> {
        let offset = self.locate(buffer)?;

        if self.ensure_once && self.is_present(buffer)? {
            return Ok(Outcome::AlreadyPresent {
                buffer: buffer.to_string(),
                offset,
            });
        }

        let mut result = String::with_capacity(buffer.len() + self.directive.len());
        result.push_str(&buffer[..offset]);
        result.push_str(&self.directive);
        result.push_str(&buffer[offset..]);

        Ok(Outcome::Inserted {
            buffer: result,
            offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use std::path::PathBuf;

    const ANCHOR: &str = "namespace ramfs {";
    const DIRECTIVE: &str = "\nusing namespace vfs;\n";

    #[test]
    fn inserts_after_single_anchor() {
        let out = inject("namespace ramfs {\nInode* root;\n}", ANCHOR, DIRECTIVE).unwrap();
        assert_eq!(out, "namespace ramfs {\nusing namespace vfs;\n\nInode* root;\n}");
        assert_eq!(out.matches("using namespace vfs;").count(), 1);
    }

    #[test]
    fn only_first_anchor_is_used() {
        let source = "namespace ramfs {\n}\nnamespace ramfs {\n}";
        let out = inject(source, ANCHOR, DIRECTIVE).unwrap();
        assert_eq!(
            out,
            "namespace ramfs {\nusing namespace vfs;\n\n}\nnamespace ramfs {\n}"
        );
    }

    #[test]
    fn missing_anchor_fails() {
        let err = inject("namespace other {\n}", ANCHOR, DIRECTIVE).unwrap_err();
        assert_eq!(
            err,
            Error::AnchorNotFound {
                anchor: ANCHOR.to_string()
            }
        );
    }

    #[test]
    fn empty_buffer_has_no_anchor() {
        assert!(matches!(
            inject("", ANCHOR, DIRECTIVE),
            Err(Error::AnchorNotFound { .. })
        ));
    }

    #[test]
    fn empty_anchor_is_configuration_error() {
        let err = inject("anything", "", DIRECTIVE).unwrap_err();
        assert!(matches!(err, Error::Configuration { field: "anchor", .. }));
    }

    #[test]
    fn injecting_twice_duplicates_directive() {
        let once = inject("namespace ramfs {\n}", ANCHOR, DIRECTIVE).unwrap();
        let twice = inject(&once, ANCHOR, DIRECTIVE).unwrap();
        assert_ne!(once, twice);
        assert_eq!(twice.matches("using namespace vfs;").count(), 2);
        assert_eq!(
            twice,
            "namespace ramfs {\nusing namespace vfs;\n\nusing namespace vfs;\n\n}"
        );
    }

    #[test]
    fn ensure_once_skips_when_directive_follows_anchor() {
        let injection = Injection::new(ANCHOR, DIRECTIVE, true).unwrap();
        let first = injection.apply("namespace ramfs {\n}").unwrap();
        assert!(first.is_inserted());

        let buffer = first.into_buffer();
        let second = injection.apply(&buffer).unwrap();
        assert_eq!(
            second,
            Outcome::AlreadyPresent {
                buffer: buffer.clone(),
                offset: ANCHOR.len()
            }
        );
    }

    #[test]
    fn ensure_once_still_inserts_when_directive_is_elsewhere() {
        // The directive appears, but not directly after the anchor.
        let source = "namespace ramfs {\nint x;\nusing namespace vfs;\n}";
        let injection = Injection::new(ANCHOR, DIRECTIVE, true).unwrap();
        assert!(!injection.is_present(source).unwrap());
        assert!(injection.apply(source).unwrap().is_inserted());
    }

    #[test]
    fn locate_reports_insertion_offset() {
        let injection = Injection::new(ANCHOR, DIRECTIVE, false).unwrap();
        assert_eq!(injection.locate("// x\nnamespace ramfs {").unwrap(), 22);
    }

    #[test]
    fn injects_into_ramfs_source_fixture() {
        let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/ramfs/ramfs.cpp");
        let source = std::fs::read_to_string(fixture).unwrap();
        let out = inject(&source, ANCHOR, "\n\nusing namespace vfs;\n").unwrap();
        assert_snapshot!(out, @r#"
        #include "ramfs.hpp"

        #include "vfs.hpp"

        namespace ramfs {

        using namespace vfs;


        static FileOps g_ramfs_file_ops = {
            .read = RamFs::RamRead,
            .seek = RamFs::RamSeek,
            .readdir = RamFs::RamReadDir,
        };

        auto RamFs::GetFileOps() -> FileOps* { return &g_ramfs_file_ops; }

        }  // namespace ramfs
        "#);
    }
}

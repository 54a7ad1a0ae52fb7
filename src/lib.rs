//! ns-migrate library for moving C/C++ identifiers into a namespace.
//!
//! Two independent text transforms do the work:
//!
//! 1. **Qualifying** ([`rewriter`]): prefix every bare occurrence of a known
//!    identifier with `qualifier + delimiter`, e.g. `Inode` becomes
//!    `vfs::Inode`. Matching is by whole word token and already-qualified
//!    occurrences are skipped, so a rewrite can be run any number of times.
//! 2. **Injecting** ([`injector`]): insert a directive such as
//!    `using namespace vfs;` right after the first anchor like
//!    `namespace ramfs {`.
//!
//! Both are pure functions over a `&str`. [`migrate`] wraps them with file
//! reads and writes, and [`plan`] loads a JSON description of which files get
//! which treatment.
//!
//! # Example
//!
//! ```
//! use ns_migrate::{injector, rewriter};
//!
//! let header = rewriter::rewrite("SuperInode x; Inode y;", ["Inode"], "vfs", "::").unwrap();
//! assert_eq!(header, "SuperInode x; vfs::Inode y;");
//!
//! let source = injector::inject("namespace ramfs {\n}", "namespace ramfs {", "\nusing namespace vfs;").unwrap();
//! assert_eq!(source, "namespace ramfs {\nusing namespace vfs;\n}");
//! ```

pub mod analyzer;
pub mod error;
pub mod injector;
pub mod migrate;
pub mod plan;
pub mod rewriter;
pub mod scanner;

// Re-export commonly used types at crate root
pub use analyzer::{DetectionResult, Diagnostics, Finding};
pub use error::Error;
pub use injector::{Injection, inject};
pub use migrate::{FileChange, Strategy, Summary};
pub use plan::MigrationPlan;
pub use rewriter::{Qualification, rewrite};
pub use scanner::Occurrence;

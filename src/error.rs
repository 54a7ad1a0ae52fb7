//! Error types for the rewriting core.
//!
//! The pure transforms in [`crate::rewriter`] and [`crate::injector`] fail in
//! exactly two ways: the caller handed them an unusable configuration, or the
//! injector could not find its anchor. I/O failures never reach this type; they
//! are reported by [`crate::migrate`] through `anyhow` with the offending path
//! attached.

/// Errors raised by the qualifier rewriter and the directive injector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A configuration value was rejected before any scanning began.
    #[error("invalid {field}: {reason}")]
    Configuration {
        /// The configuration field that was rejected.
        field: &'static str,
        /// Explanation of why the value is unusable.
        reason: String,
    },

    /// The injector's anchor does not occur in the buffer.
    #[error("anchor not found: {anchor:?}")]
    AnchorNotFound {
        /// The literal anchor that was searched for.
        anchor: String,
    },
}

impl Error {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Error::Configuration {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

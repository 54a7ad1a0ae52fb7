//! Qualifier rewriting.
//!
//! Prefixes every unqualified whole-token occurrence of a configured
//! identifier with `qualifier + delimiter`. All spans are located against the
//! original buffer first, then spliced in reverse offset order, so inserted
//! text is never rescanned and never mistaken for a pre-existing
//! qualification. Running a rewrite on its own output is a no-op.

use crate::error::{Error, Result};
use crate::scanner::{self, Occurrence};
use std::collections::HashSet;

/// A validated qualifier rewrite configuration.
#[derive(Debug, Clone)]
pub struct Qualification {
    lookup: HashSet<String>,
    qualifier: String,
    delimiter: String,
}

impl Qualification {
    /// Validates the configuration.
    ///
    /// Fails with [`Error::Configuration`] if the identifier set is empty, an
    /// identifier is not a single token or is repeated, the qualifier or
    /// delimiter is empty, the delimiter ends in a word character, or an
    /// identifier appears as a whole token inside `qualifier + delimiter`
    /// (rewriting the qualifier itself would never settle).
    pub fn new<I, S>(identifiers: I, qualifier: &str, delimiter: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if qualifier.is_empty() {
            return Err(Error::config("qualifier", "must not be empty"));
        }
        if delimiter.is_empty() {
            return Err(Error::config("delimiter", "must not be empty"));
        }
        // Otherwise the inserted prefix fuses with the identifier into a new token.
        if delimiter.ends_with(scanner::is_token_char) {
            return Err(Error::config(
                "delimiter",
                format!("'{}' must not end with a word character", delimiter),
            ));
        }

        let prefix = format!("{}{}", qualifier, delimiter);
        let prefix_tokens: HashSet<&str> = scanner::tokens(&prefix).map(|t| t.text).collect();

        let mut lookup = HashSet::new();
        for ident in identifiers {
            let ident = ident.as_ref();
            if !scanner::is_single_token(ident) {
                return Err(Error::config(
                    "identifier",
                    format!("'{}' is not a single word token", ident),
                ));
            }
            if prefix_tokens.contains(ident) {
                return Err(Error::config(
                    "identifier",
                    format!("'{}' occurs in the qualifier '{}'", ident, prefix),
                ));
            }
            if !lookup.insert(ident.to_string()) {
                return Err(Error::config(
                    "identifier",
                    format!("'{}' is listed more than once", ident),
                ));
            }
        }

        if lookup.is_empty() {
            return Err(Error::config("identifiers", "at least one is required"));
        }

        Ok(Self {
            lookup,
            qualifier: qualifier.to_string(),
            delimiter: delimiter.to_string(),
        })
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn contains(&self, token: &str) -> bool {
        self.lookup.contains(token)
    }

    /// The qualified spelling of `identifier`, e.g. `vfs::Inode`.
    pub fn qualify(&self, identifier: &str) -> String {
        format!("{}{}{}", self.qualifier, self.delimiter, identifier)
    }

    /// Returns the occurrences a rewrite of `buffer` would change.
    pub fn plan(&self, buffer: &str) -> Vec<Occurrence> {
        scanner::find_occurrences(buffer, self)
            .into_iter()
            .filter(|o| !o.qualified)
            .collect()
    }

    /// Rewrites `buffer`, qualifying every unqualified occurrence.
    pub fn rewrite(&self, buffer: &str) -> String {
        let occurrences = self.plan(buffer);
        if occurrences.is_empty() {
            return buffer.to_string();
        }
        apply_qualifications(buffer, &self.qualifier, &self.delimiter, &occurrences)
    }
}

/// Validates the configuration and rewrites `buffer` in one call.
///
/// ```
/// let out = ns_migrate::rewriter::rewrite("vfs::Inode a; Inode b;", &["Inode"], "vfs", "::").unwrap();
/// assert_eq!(out, "vfs::Inode a; vfs::Inode b;");
/// ```
pub fn rewrite<I, S>(buffer: &str, identifiers: I, qualifier: &str, delimiter: &str) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ok(Qualification::new(identifiers, qualifier, delimiter)?.rewrite(buffer))
}

/// Inserts `qualifier + delimiter` in front of each occurrence.
///
/// Offsets refer to `content` as given. Insertions are applied from the end of
/// the buffer towards the start so earlier offsets stay valid.
fn apply_qualifications(
    content: &str,
    qualifier: &str,
    delimiter: &str,
    occurrences: &[Occurrence],
) -> String {
    let mut starts: Vec<usize> = occurrences.iter().map(|o| o.start_offset).collect();
    starts.sort_unstable_by(|a, b| b.cmp(a));
    starts.dedup();

    let prefix = format!("{}{}", qualifier, delimiter);
    let mut result = String::with_capacity(content.len() + prefix.len() * starts.len());
    result.push_str(content);
    for start in starts {
        if start <= result.len() {
            result.insert_str(start, &prefix);
        }
    }

    result
}

//! The fixed, ordered deck of documents.
//!
//! A [`Catalog`] is built once at startup and never changes afterwards.
//! Every other component refers to documents by position or identifier.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use thiserror::Error;

/// Errors raised while assembling the catalog at startup.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("no documents to show")]
    Empty,
    #[error("document listed twice: {0}")]
    Duplicate(String),
    #[error("{identifier} has the same label as {existing}: {label}")]
    DuplicateLabel {
        label: String,
        identifier: String,
        existing: String,
    },
    #[error("failed to read manifest {path}: {source}")]
    Manifest {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// An immutable entry describing one selectable document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    identifier: String,
    label: String,
    position: usize,
}

impl DocumentRef {
    /// Stable key used to fetch the document (a path relative to the root).
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Label shown in the sidebar, pager and export file names.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub const fn position(&self) -> usize {
        self.position
    }
}

/// Derive a display label from an identifier.
///
/// Takes the file name and strips a trailing `.md`, ignoring case.
pub fn format_label(identifier: &str) -> String {
    let name = identifier
        .rsplit(['/', '\\'])
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or(identifier);
    match name.len().checked_sub(3) {
        Some(cut) if name.is_char_boundary(cut) && name[cut..].eq_ignore_ascii_case(".md") => {
            name[..cut].to_string()
        }
        _ => name.to_string(),
    }
}

/// The ordered, non-empty document sequence.
#[derive(Debug, Clone)]
pub struct Catalog {
    documents: Vec<DocumentRef>,
}

impl Catalog {
    /// Build a catalog from identifiers in display order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Empty`] when no identifiers are given and
    /// [`CatalogError::Duplicate`] when an identifier repeats.
    /// [`CatalogError::DuplicateLabel`] is returned when two identifiers in
    /// different directories share a file name, since labels name exports.
    pub fn new<I, S>(identifiers: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut labels: HashMap<String, String> = HashMap::new();
        let mut documents = Vec::new();
        for (position, identifier) in identifiers.into_iter().enumerate() {
            let identifier = identifier.into();
            if !seen.insert(identifier.clone()) {
                return Err(CatalogError::Duplicate(identifier));
            }
            let label = format_label(&identifier);
            if let Some(existing) = labels.insert(label.to_lowercase(), identifier.clone()) {
                return Err(CatalogError::DuplicateLabel {
                    label,
                    identifier,
                    existing,
                });
            }
            documents.push(DocumentRef {
                label,
                identifier,
                position,
            });
        }
        if documents.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { documents })
    }

    /// Load identifiers from a manifest file, one per line.
    ///
    /// Blank lines and lines starting with `#` are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the resulting list is
    /// empty or contains duplicates.
    pub fn from_manifest(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Manifest {
            path: path.display().to_string(),
            source,
        })?;
        Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&DocumentRef> {
        self.documents.get(position)
    }

    pub fn first(&self) -> &DocumentRef {
        &self.documents[0]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DocumentRef> {
        self.documents.iter()
    }

    pub fn position_of(&self, identifier: &str) -> Option<usize> {
        self.documents
            .iter()
            .position(|doc| doc.identifier == identifier)
    }

    /// Positions of the entries whose label matches `query`.
    ///
    /// Matching is a case-insensitive substring test on the label. An empty
    /// (or all-whitespace) query matches everything.
    pub fn filter(&self, query: &str) -> Vec<usize> {
        let query = query.trim().to_lowercase();
        self.documents
            .iter()
            .filter(|doc| query.is_empty() || doc.label.to_lowercase().contains(&query))
            .map(|doc| doc.position)
            .collect()
    }
}

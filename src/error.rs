//! Error types for indexer operations.
//!
//! This module provides the [`IndexerError`] type for all pipeline
//! operations and the [`Result`] convenience type.

use thiserror::Error;

/// Error type for all indexer operations.
///
/// Represents the error conditions that can occur while fetching catalog
/// records, enriching them, and assembling statement documents.
#[derive(Error, Debug)]
pub enum IndexerError {
    /// The institution source tag is not recognized, so no identifier can
    /// be derived for the record.
    #[error("Unknown institution source: {0}")]
    UnknownSource(String),

    /// The statement set for a record could not be assembled into a
    /// document (e.g. no bib group was found).
    #[error("Document assembly failed: {0}")]
    Assembly(String),

    /// An upstream collaborator (catalog API, off-site registry) failed.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A payload could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The search index rejected a write or delete (not-found deletes are
    /// not errors; see [`crate::search_index::SearchIndex`]).
    #[error("Search index error: {0}")]
    Index(String),

    /// Invalid configuration.
    #[error("Config error: {0}")]
    Config(String),
}

/// Convenience type alias for [`std::result::Result`] with [`IndexerError`].
pub type Result<T> = std::result::Result<T, IndexerError>;

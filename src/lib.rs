#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Discovery Indexer
//!
//! A library for rebuilding normalized, denormalized search documents for a
//! research catalog from Bib, Item, and Holding records.
//!
//! The core is the **record assembly pipeline**: raw, independently-fetched
//! catalog records are turned into a single classified, enriched,
//! hierarchically-grouped statement graph per bibliographic record, ready
//! for the index-writing layer to wrap.
//!
//! ## Quick Start
//!
//! ```ignore
//! use discovery_indexer::pipeline::{rebuild_bibs, PipelineContext};
//!
//! # async fn run(context: PipelineContext, bibs: Vec<discovery_indexer::records::Bib>)
//! # -> discovery_indexer::error::Result<()> {
//! let counts = rebuild_bibs(bibs, &context).await?;
//! println!("Wrote {} doc(s)", counts.processed);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`statement`] — statements and statement groups, the pipeline's unit
//!   of data
//! - [`grouping`] — grouping by subject and group classification
//! - [`nesting`] — blank-node nesting
//! - [`identifier`] — prefixed identifiers and the legacy check digit
//! - [`research`] — research vs. circulating classification
//! - [`recap`] — off-site storage customer-code enrichment
//! - [`holdings_cache`] — per-batch holdings prefetching
//! - [`pipeline`] — per-bib assembly and the batch driver
//! - [`records`], [`tables`], [`document`] — record, vocabulary, and
//!   output structures
//! - [`platform`], [`search_index`], [`extractor`] — external collaborator
//!   contracts and clients
//! - [`config`], [`error`] — run configuration and error types

pub mod config;
pub mod document;
pub mod error;
pub mod extractor;
pub mod grouping;
pub mod holdings_cache;
pub mod identifier;
pub mod nesting;
pub mod pipeline;
pub mod platform;
pub mod recap;
pub mod records;
pub mod research;
pub mod search_index;
pub mod statement;
pub mod tables;

pub use config::Config;
pub use document::RecordDocument;
pub use error::{IndexerError, Result};
pub use grouping::{classify, group_by_subject, GroupKind};
pub use holdings_cache::HoldingsCache;
pub use identifier::{check_digit, identifier_for, RecordKind};
pub use nesting::nest_blank_nodes;
pub use pipeline::{build_documents, rebuild_bibs, BatchCounts, PipelineContext};
pub use records::{Bib, BibBundle, Holding, Item, Location};
pub use research::{classify_bib, classify_item, Classification};
pub use statement::{Statement, StatementGroup};
pub use tables::{ClassificationTable, ItemTypeTable, LocationTable};

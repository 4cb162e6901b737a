//! Statement extractor interface.
//!
//! Extraction of raw statements from source records is an external
//! collaborator; the pipeline treats it as opaque and flattens its output.
//! Implementations may issue their own network calls (e.g. vocabulary
//! lookups), hence the async contract.

use crate::error::Result;
use crate::records::{Bib, Holding, Item};
use crate::statement::Statement;
use async_trait::async_trait;

/// Extracts flat statement lists from raw catalog records.
#[async_trait]
pub trait StatementExtractor: Send + Sync {
    /// Extract statements from a bib record. May include electronic-item
    /// statements (subjects suffixed `-e`) and a suppression statement for
    /// deleted bibs.
    async fn extract_bib(&self, bib: &Bib) -> Result<Vec<Statement>>;

    /// Extract statements from an item record, including any enrichment
    /// already attached (e.g. `recapCustomerCode`).
    async fn extract_item(&self, item: &Item) -> Result<Vec<Statement>>;

    /// Extract statements from a holdings record, including check-in box
    /// blank nodes.
    async fn extract_holding(&self, holding: &Holding) -> Result<Vec<Statement>>;
}

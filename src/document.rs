//! The assembled record document.
//!
//! A [`RecordDocument`] is the pipeline's output for one research-eligible
//! bib: the bib statement group plus ordered item and holding groups, with
//! blank nodes already nested. The index-writing layer wraps these into
//! search documents; nothing here is mutated after assembly.

use crate::statement::StatementGroup;
use serde::{Deserialize, Serialize};

/// Predicate carrying the suppression signal on a bib group.
pub const SUPPRESSED_PREDICATE: &str = "nypl:suppressed";

/// A classified, nested statement graph for one bibliographic record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDocument {
    /// The bib URI; always equals the bib group's subject.
    pub uri: String,
    /// The bib statement group.
    pub bib: StatementGroup,
    /// Item groups, in first-seen order (electronic items last).
    pub items: Vec<StatementGroup>,
    /// Holding groups, in first-seen order.
    pub holdings: Vec<StatementGroup>,
}

impl RecordDocument {
    /// Whether the bib carries a suppression statement. Deleted bibs are
    /// extracted with `nypl:suppressed` set `"true"` and are flagged for
    /// removal rather than indexing.
    #[must_use]
    pub fn is_suppressed(&self) -> bool {
        self.bib.first_literal(SUPPRESSED_PREDICATE) == Some("true")
    }
}

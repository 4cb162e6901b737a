//! Research vs. circulating classification.
//!
//! The search index serves the research catalog only, so circulating
//! records must be kept out of it. Bibs default to research unless their
//! locations prove otherwise; items default to research unless their item
//! type proves otherwise. Circulating bibs are additionally deleted from
//! the index in case they snuck in before being identified.

use crate::config::Config;
use crate::records::{Bib, Item};
use crate::search_index::SearchIndex;
use crate::tables::{ItemTypeTable, LocationTable};
use tracing::{debug, error, info};

/// Whether a record belongs in the research index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// In scope for the research index.
    Research,
    /// Circulating material, out of scope.
    Circulating,
}

/// Location codes whose circulation status is ambiguous (on-the-fly
/// records); suppression for these is deferred to the index layer.
const AMBIGUOUS_LOCATION_CODES: [&str; 2] = ["none", "os"];

/// Classify a bib from its locations.
///
/// Defaults to research unless proven otherwise: partner bibs are always
/// research; zero locations is research (absence of evidence is not
/// evidence of absence); a first location of `none` or `os` is research
/// with suppression deferred downstream. Otherwise the bib is circulating
/// exactly when some location is classified exclusively as `Branch` —
/// a mixed Branch/Research location never counts.
#[must_use]
pub fn classify_bib(bib: &Bib, locations: &LocationTable) -> Classification {
    if bib.is_partner() {
        return Classification::Research;
    }
    if bib.locations.is_empty() {
        return Classification::Research;
    }
    if AMBIGUOUS_LOCATION_CODES.contains(&bib.locations[0].code.as_str()) {
        return Classification::Research;
    }

    let branch_only = bib.locations.iter().any(|location| {
        locations
            .get(&location.code)
            .is_some_and(crate::tables::ClassificationEntry::is_branch_only)
    });
    if branch_only {
        Classification::Circulating
    } else {
        Classification::Research
    }
}

/// Classify an item from its fixed Item Type code.
///
/// Partner items are always research. A mapped item type whose collection
/// types exclude `Research` makes the item circulating; unknown or
/// unmapped codes default to research.
#[must_use]
pub fn classify_item(item: &Item, item_types: &ItemTypeTable) -> Classification {
    if item.is_partner() {
        return Classification::Research;
    }
    let Some(code) = item.fixed("Item Type") else {
        return Classification::Research;
    };
    match item_types.get(&code) {
        Some(entry) if !entry.includes_research() => Classification::Circulating,
        _ => Classification::Research,
    }
}

/// Drop circulating items, keeping only those that may be research.
#[must_use]
pub fn filter_research_items(items: Vec<Item>, item_types: &ItemTypeTable) -> Vec<Item> {
    let original_count = items.len();
    let research: Vec<Item> = items
        .into_iter()
        .filter(|item| {
            let keep = classify_item(item, item_types) == Classification::Research;
            if !keep {
                debug!(
                    item = %format!("{}/{}", item.nypl_source, item.id),
                    "Skipping item due to non-Research Item Type"
                );
            }
            keep
        })
        .collect();
    info!(
        original = original_count,
        removed = original_count - research.len(),
        research = research.len(),
        "Filtered circulating item(s)"
    );
    research
}

/// Split a batch into research bibs (returned) and circulating bibs
/// (removed, and deleted from the index).
///
/// Deletes are issued per circulating bib unless disabled by
/// configuration; the index client treats not-found as success, and any
/// other delete failure is logged without aborting the batch.
pub async fn filter_and_delete_circulating(
    bibs: Vec<Bib>,
    index: &dyn SearchIndex,
    locations: &LocationTable,
    config: &Config,
) -> Vec<Bib> {
    let original_count = bibs.len();
    let (research, circulating): (Vec<Bib>, Vec<Bib>) = bibs
        .into_iter()
        .partition(|bib| classify_bib(bib, locations) == Classification::Research);

    if original_count > 0 {
        info!(
            original = original_count,
            removed = circulating.len(),
            research = research.len(),
            "Filtered circulating bib(s)"
        );
    }

    for bib in &circulating {
        if config.disable_circulating_delete {
            continue;
        }
        let Some(uri) =
            crate::identifier::identifier_for(&bib.nypl_source, &bib.id, crate::identifier::RecordKind::Bib)
        else {
            error!(bib = %bib.source_and_id(), "Cannot build identifier for delete");
            continue;
        };
        debug!(%uri, "Issuing DELETE for circulating bib");
        if let Err(e) = index.delete(&uri).await {
            error!(%uri, error = %e, "Error deleting circulating bib");
        }
    }

    research
}

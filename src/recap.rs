//! Off-site storage (recap) customer-code enrichment.
//!
//! Bibs with items shelved off-site carry a customer code per item in the
//! off-site registry, keyed by the owning institution's bib number with
//! check digit. Eligible bibs get one registry lookup; the response is
//! normalized into a flat item-id → code map at the boundary, and matching
//! items get their `recapCustomerCode` attached.

use crate::config::Config;
use crate::error::Result;
use crate::identifier::bnumber_with_check_digit;
use crate::records::BibBundle;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Location-code prefix reserved for off-site storage.
pub const OFFSITE_LOCATION_PREFIX: &str = "rc";

/// A search query against the off-site registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScsbQuery {
    /// Whether to include deleted registry rows.
    pub deleted: bool,
    /// Field to match on (e.g. `OwningInstitutionBibId`).
    pub field_name: String,
    /// Value to match (e.g. `.b158301717`).
    pub field_value: String,
    /// Institutions to search within.
    pub owning_institutions: Vec<String>,
}

/// One item row in a registry search result.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScsbItemRow {
    /// Item id in the owning institution's scheme (`.i` prefix and check
    /// digit included).
    #[serde(default)]
    pub owning_institution_item_id: Option<String>,
    /// The item's off-site customer code.
    #[serde(default)]
    pub customer_code: Option<String>,
}

/// One result row in a registry search response. Single-item bibs carry
/// the item fields inline; serials nest per-item rows.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScsbResultRow {
    /// Item id, populated on the single-item shape.
    #[serde(default)]
    pub owning_institution_item_id: Option<String>,
    /// Customer code, populated on the single-item shape.
    #[serde(default)]
    pub customer_code: Option<String>,
    /// Per-item rows, populated on the serial shape.
    #[serde(default)]
    pub search_item_result_rows: Vec<ScsbItemRow>,
}

/// A registry search response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScsbResponse {
    /// Matching rows; empty when the bib is unknown to the registry.
    #[serde(default)]
    pub search_result_rows: Vec<ScsbResultRow>,
}

/// Search access to the off-site registry.
#[async_trait]
pub trait ScsbClient: Send + Sync {
    /// Run a registry search.
    async fn search(&self, query: &ScsbQuery) -> Result<ScsbResponse>;
}

/// Registry item ids arrive as `.i{id}{check}`; strip the two-character
/// prefix and the trailing check digit to recover the catalog item id.
/// Returns `None` for ids too short to carry all three parts, or with
/// non-ASCII bytes at the cut points.
fn normalize_item_id(registry_id: &str) -> Option<String> {
    if registry_id.len() <= 3 {
        return None;
    }
    registry_id
        .get(2..registry_id.len() - 1)
        .map(ToString::to_string)
}

/// Flatten both response shapes into `(item_id, customer_code)` pairs.
///
/// Downstream logic never branches on response shape: a single-result row
/// and a nested serial row produce the same flat pairs.
fn normalize_response(response: &ScsbResponse) -> Vec<(String, String)> {
    let Some(first) = response.search_result_rows.first() else {
        return Vec::new();
    };

    if first.search_item_result_rows.is_empty() {
        first
            .owning_institution_item_id
            .as_deref()
            .and_then(normalize_item_id)
            .zip(first.customer_code.clone())
            .into_iter()
            .collect()
    } else {
        first
            .search_item_result_rows
            .iter()
            .filter_map(|row| {
                row.owning_institution_item_id
                    .as_deref()
                    .and_then(normalize_item_id)
                    .zip(row.customer_code.clone())
            })
            .collect()
    }
}

fn is_eligible(bundle: &BibBundle, config: &Config) -> bool {
    if bundle.bib.is_partner() || config.disable_scsb_query {
        return false;
    }
    bundle.items.iter().any(|item| {
        item.location
            .as_ref()
            .is_some_and(|location| location.code.starts_with(OFFSITE_LOCATION_PREFIX))
    })
}

/// Query the registry for a bib's per-item customer codes.
///
/// Returns `Ok(None)` (not an empty map) when the bib is ineligible —
/// partner-owned, no off-site items, live querying disabled — or when the
/// registry has no rows for it.
///
/// # Errors
///
/// Propagates registry failures for eligible bibs.
pub async fn recap_code_map(
    bundle: &BibBundle,
    client: &dyn ScsbClient,
    config: &Config,
) -> Result<Option<HashMap<String, String>>> {
    if !is_eligible(bundle, config) {
        return Ok(None);
    }

    // The registry requires the bib number with .b prefix and check digit;
    // the catalog serves ids without either.
    let Some(bnumber) = bnumber_with_check_digit(&bundle.bib.id) else {
        return Ok(None);
    };
    let query = ScsbQuery {
        deleted: false,
        field_name: "OwningInstitutionBibId".to_string(),
        field_value: format!(".b{bnumber}"),
        owning_institutions: vec!["NYPL".to_string()],
    };
    let response = client.search(&query).await?;
    let pairs = normalize_response(&response);
    debug!(
        bib = %bundle.bib.source_and_id(),
        codes = pairs.len(),
        "Recap customer-code lookup"
    );

    if pairs.is_empty() {
        Ok(None)
    } else {
        Ok(Some(pairs.into_iter().collect()))
    }
}

/// Attach customer codes to a bundle's items.
///
/// Items present in the registry map get `recap_customer_code`; items
/// absent from it are left untouched. Ineligible bundles are returned
/// unmodified — callers must not assume enrichment occurred.
///
/// # Errors
///
/// Propagates registry failures for eligible bibs.
pub async fn attach_recap_customer_codes(
    mut bundle: BibBundle,
    client: &dyn ScsbClient,
    config: &Config,
) -> Result<BibBundle> {
    let Some(code_map) = recap_code_map(&bundle, client, config).await? else {
        return Ok(bundle);
    };
    for item in &mut bundle.items {
        if let Some(code) = code_map.get(&item.id) {
            item.recap_customer_code = Some(code.clone());
        }
    }
    Ok(bundle)
}

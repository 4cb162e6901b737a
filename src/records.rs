//! Raw catalog record structures.
//!
//! These are the bib, item, and holding payloads as the catalog platform
//! API serves them (camelCase JSON). The pipeline fetches them, enriches
//! them, and hands them to a statement extractor; it never writes them
//! back.

use crate::identifier::is_partner_source;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A Sierra location attached to a bib or item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Sierra location code (e.g. `ssj`, `marr2`, `rc2ma`).
    pub code: String,
    /// Human-readable location name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One fixed field on a Sierra record, keyed by numeric tag in the wire
/// payload but addressed by label in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedField {
    /// Field label (e.g. `Item Type`).
    pub label: String,
    /// Field value; numeric in some payloads, string in others.
    #[serde(default)]
    pub value: Option<Value>,
    /// Display form, when distinct from the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// A bibliographic record as fetched from the catalog platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bib {
    /// Record id without prefix or check digit (e.g. `10010064`).
    pub id: String,
    /// Institution source tag (e.g. `sierra-nypl`, `recap-pul`).
    pub nypl_source: String,
    /// Locations holding this bib.
    #[serde(default)]
    pub locations: Vec<Location>,
    /// Whether the record has been deleted upstream. Deleted bibs flow
    /// through assembly and surface as suppressed documents.
    #[serde(default)]
    pub deleted: bool,
    /// Remaining record fields, passed through to the statement extractor.
    #[serde(flatten)]
    pub rest: HashMap<String, Value>,
}

impl Bib {
    /// Whether this bib is owned by a partner institution.
    #[must_use]
    pub fn is_partner(&self) -> bool {
        is_partner_source(&self.nypl_source)
    }

    /// `"{source}/{id}"`, the form used for cache keys and log lines.
    #[must_use]
    pub fn source_and_id(&self) -> String {
        format!("{}/{}", self.nypl_source, self.id)
    }
}

/// An item record as fetched from the catalog platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Record id without prefix or check digit.
    pub id: String,
    /// Institution source tag.
    pub nypl_source: String,
    /// Ids of the bibs this item belongs to.
    #[serde(default, deserialize_with = "ids_as_strings")]
    pub bib_ids: Vec<String>,
    /// The item's physical location, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Sierra fixed fields, keyed by numeric tag.
    #[serde(default)]
    pub fixed_fields: HashMap<String, FixedField>,
    /// Off-site storage customer code, attached by recap enrichment; never
    /// present in the upstream payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recap_customer_code: Option<String>,
    /// Remaining record fields, passed through to the statement extractor.
    #[serde(flatten)]
    pub rest: HashMap<String, Value>,
}

impl Item {
    /// Whether this item is owned by a partner institution.
    #[must_use]
    pub fn is_partner(&self) -> bool {
        is_partner_source(&self.nypl_source)
    }

    /// Look up a fixed field by label (e.g. `fixed("Item Type")`),
    /// returning its value as a string.
    #[must_use]
    pub fn fixed(&self, label: &str) -> Option<String> {
        let field = self.fixed_fields.values().find(|f| f.label == label)?;
        match field.value.as_ref()? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// A holdings record as fetched from the catalog platform.
///
/// Holdings are only tracked for the home institution; the bib reference
/// field is multi-valued.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holding {
    /// Record id without prefix.
    pub id: String,
    /// Ids of the bibs this holding describes.
    #[serde(default, deserialize_with = "ids_as_strings")]
    pub bib_ids: Vec<String>,
    /// Remaining record fields, passed through to the statement extractor.
    #[serde(flatten)]
    pub rest: HashMap<String, Value>,
}

/// A bib together with its fetched children, the unit that flows through
/// enrichment and assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct BibBundle {
    /// The bib record.
    pub bib: Bib,
    /// The bib's items, already filtered to research items.
    pub items: Vec<Item>,
    /// The bib's holdings.
    pub holdings: Vec<Holding>,
}

/// Deserialize an id list whose elements may arrive as JSON numbers or
/// strings, normalizing to strings.
fn ids_as_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Value> = Vec::deserialize(deserializer)?;
    raw.into_iter()
        .map(|v| match v {
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(serde::de::Error::custom(format!(
                "expected string or number id, got {other}"
            ))),
        })
        .collect()
}

//! Location and item-type classification tables.
//!
//! Static lookups from a Sierra location code or catalog item-type code to
//! its collection-type classification (`Research`, `Branch`, or both).
//! These are dumps of the upstream vocabulary service, loaded once at
//! startup and consulted by the research classifier.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Collection-type label for research material.
pub const RESEARCH: &str = "Research";

/// Collection-type label for circulating branch material.
pub const BRANCH: &str = "Branch";

/// Classification of one location or item-type code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationEntry {
    /// The collection types the code belongs to.
    #[serde(default)]
    pub collection_types: Vec<String>,
}

impl ClassificationEntry {
    /// Build an entry from collection-type labels.
    #[must_use]
    pub fn new(collection_types: &[&str]) -> Self {
        ClassificationEntry {
            collection_types: collection_types.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// Whether the code is classified exclusively as `Branch`.
    #[must_use]
    pub fn is_branch_only(&self) -> bool {
        !self.collection_types.is_empty() && self.collection_types.iter().all(|t| t == BRANCH)
    }

    /// Whether the code's classification includes `Research`.
    #[must_use]
    pub fn includes_research(&self) -> bool {
        self.collection_types.iter().any(|t| t == RESEARCH)
    }
}

/// Lookup table from code to [`ClassificationEntry`].
///
/// Used for both Sierra location codes and catalog item-type codes; the
/// two vocabularies are loaded into separate instances.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassificationTable {
    entries: HashMap<String, ClassificationEntry>,
}

/// Table keyed by Sierra location code (`by-sierra-location`).
pub type LocationTable = ClassificationTable;

/// Table keyed by catalog item-type code (`by-catalog-item-type`).
pub type ItemTypeTable = ClassificationTable;

impl ClassificationTable {
    /// Build a table from `(code, collection_types)` pairs.
    #[must_use]
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [&'a str])>,
    {
        ClassificationTable {
            entries: entries
                .into_iter()
                .map(|(code, types)| (code.to_string(), ClassificationEntry::new(types)))
                .collect(),
        }
    }

    /// Load a table from a JSON vocabulary dump
    /// (`{ "code": { "collectionTypes": [...] }, ... }`).
    ///
    /// # Errors
    ///
    /// Returns an error if the payload is not a valid vocabulary dump.
    pub fn from_json(json: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Look up a code.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&ClassificationEntry> {
        self.entries.get(code)
    }

    /// Number of codes in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no codes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_branch_only() {
        assert!(ClassificationEntry::new(&[BRANCH]).is_branch_only());
        assert!(!ClassificationEntry::new(&[BRANCH, RESEARCH]).is_branch_only());
        assert!(!ClassificationEntry::new(&[RESEARCH]).is_branch_only());
        // Empty classification never counts as Branch-only:
        assert!(!ClassificationEntry::new(&[]).is_branch_only());
    }

    #[test]
    fn test_from_json_vocabulary_dump() {
        let table = ClassificationTable::from_json(
            r#"{
                "ssj": { "collectionTypes": ["Branch"] },
                "marr2": { "collectionTypes": ["Research"] },
                "myrhr": { "collectionTypes": ["Branch", "Research"] }
            }"#,
        )
        .expect("valid dump");

        assert_eq!(table.len(), 3);
        assert!(table.get("ssj").expect("ssj").is_branch_only());
        assert!(table.get("marr2").expect("marr2").includes_research());
        assert!(!table.get("myrhr").expect("myrhr").is_branch_only());
        assert!(table.get("sc").is_none());
    }
}

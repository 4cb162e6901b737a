//! Statement and statement-group structures.
//!
//! A [`Statement`] is an atomic fact extracted from a bib, item, or holding
//! record: one subject, one predicate, and either a literal value or a
//! reference to another entity. A [`StatementGroup`] is the ordered set of
//! statements sharing one subject, which is the unit the rest of the
//! pipeline classifies, nests, and assembles into documents.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An atomic fact about a subject.
///
/// Exactly one of `object_literal` / `object_id` is meaningfully populated.
/// Statements that reference a generated anonymous node carry an
/// `object_id` of the form `"{subject_id}#{ordinal}"`; after nesting, the
/// referenced group is attached via `blanknode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    /// Subject entity identifier (e.g. `b10010064`, `i10005201`, or a
    /// blank-node id like `h1032862#1.0000`).
    pub subject_id: String,
    /// Predicate (e.g. `dcterms:title`, `rdfs:type`).
    pub predicate: String,
    /// Institution source tag of the originating record.
    pub source_id: String,
    /// Identifier of the originating record.
    pub source_record_id: String,
    /// Identifier of the process that created the statement.
    pub creator_id: u32,
    /// Position of this statement among statements with the same predicate;
    /// determines display priority downstream.
    pub index: u32,
    /// Path into the source record the statement was derived from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_record_path: Option<String>,
    /// Literal object value. May be numeric or boolean at extraction time;
    /// normalized to string form before grouping (see
    /// [`stringify_statement_literals`]).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_literal: Option<Value>,
    /// Entity object reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    /// Human-readable label for the object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_label: Option<String>,
    /// Declared type of the object value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    /// Nested anonymous sub-document, attached during blank-node nesting.
    /// Never populated by extractors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blanknode: Option<Box<StatementGroup>>,
}

impl Statement {
    /// The literal object as a string, if the statement carries a string
    /// literal.
    #[must_use]
    pub fn literal_str(&self) -> Option<&str> {
        match &self.object_literal {
            Some(Value::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Whether this statement references the given blank-node subject.
    #[must_use]
    pub fn references_blank_node(&self) -> Option<&str> {
        let object_id = self.object_id.as_deref()?;
        let rest = object_id.strip_prefix(self.subject_id.as_str())?;
        if rest.starts_with('#') {
            Some(object_id)
        } else {
            None
        }
    }
}

/// The ordered set of statements sharing one `subject_id`.
///
/// Insertion order is preserved: it determines display and priority order
/// downstream, so grouping and nesting must never reorder statements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementGroup {
    /// The shared subject of every statement in the group.
    pub subject_id: String,
    /// The statements, in original extraction order.
    pub statements: Vec<Statement>,
}

impl StatementGroup {
    /// Create a group from statements known to share `subject_id`.
    #[must_use]
    pub fn new(subject_id: String, statements: Vec<Statement>) -> Self {
        StatementGroup {
            subject_id,
            statements,
        }
    }

    /// Whether this group's subject is an anonymous ("blank") node.
    ///
    /// Blank-node subject ids are built as `"{parent}#{ordinal}"`, so they
    /// are identifiable by `#`.
    #[must_use]
    pub fn is_blank_node(&self) -> bool {
        self.subject_id.contains('#')
    }

    /// First literal value asserted for `predicate`, if any.
    #[must_use]
    pub fn first_literal(&self, predicate: &str) -> Option<&str> {
        self.statements
            .iter()
            .find(|s| s.predicate == predicate)
            .and_then(Statement::literal_str)
    }

    /// Whether any statement asserts `rdfs:type` with the given object.
    #[must_use]
    pub fn has_type_assertion(&self, object: &str) -> bool {
        self.statements.iter().any(|s| {
            s.predicate == crate::grouping::TYPE_PREDICATE && s.object_id.as_deref() == Some(object)
        })
    }
}

/// Normalize numeric and boolean literals to their string form.
///
/// Literals are persisted as strings in the legacy statement store, so
/// grouping and downstream equality comparisons must see `"1"` and `"true"`
/// rather than `1` and `true` regardless of how the extractor produced
/// them. Returns new statement values; the input is consumed, not mutated
/// in place.
#[must_use]
pub fn stringify_statement_literals(statements: Vec<Statement>) -> Vec<Statement> {
    statements
        .into_iter()
        .map(|s| {
            let object_literal = match s.object_literal {
                Some(Value::Number(n)) => Some(Value::String(n.to_string())),
                Some(Value::Bool(b)) => Some(Value::String(b.to_string())),
                other => other,
            };
            Statement {
                object_literal,
                ..s
            }
        })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::test_support::{literal, reference};
    use super::*;
    use serde_json::json;

    #[test]
    fn test_stringify_numeric_literal() {
        let statements = vec![literal("b123", "nypl:volume", json!(12))];
        let out = stringify_statement_literals(statements);
        assert_eq!(out[0].literal_str(), Some("12"));
    }

    #[test]
    fn test_stringify_boolean_literal() {
        let statements = vec![literal("b123", "nypl:suppressed", json!(true))];
        let out = stringify_statement_literals(statements);
        assert_eq!(out[0].literal_str(), Some("true"));
    }

    #[test]
    fn test_stringify_leaves_strings_untouched() {
        let statements = vec![literal("b123", "dcterms:title", json!("AAHGS news"))];
        let out = stringify_statement_literals(statements);
        assert_eq!(out[0].literal_str(), Some("AAHGS news"));
    }

    #[test]
    fn test_references_blank_node() {
        let s = reference("b123", "bf:note", "b123#1.0000");
        assert_eq!(s.references_blank_node(), Some("b123#1.0000"));

        // References to other entities are not blank-node references:
        let s = reference("b123", "nypl:holdingLocation", "loc:scdd2");
        assert_eq!(s.references_blank_node(), None);

        // A different subject's blank node is not ours:
        let s = reference("b123", "bf:note", "b999#1.0000");
        assert_eq!(s.references_blank_node(), None);
    }

    #[test]
    fn test_group_is_blank_node() {
        let group = StatementGroup::new(
            "h1032862#1.0000".to_string(),
            vec![literal("h1032862#1.0000", "bf:status", json!("Arrived"))],
        );
        assert!(group.is_blank_node());

        let group = StatementGroup::new(
            "b123".to_string(),
            vec![literal("b123", "dcterms:title", json!("x"))],
        );
        assert!(!group.is_blank_node());
    }

    #[test]
    fn test_first_literal() {
        let group = StatementGroup::new(
            "b123".to_string(),
            vec![
                literal("b123", "dcterms:title", json!("First")),
                literal("b123", "dcterms:title", json!("Second")),
            ],
        );
        assert_eq!(group.first_literal("dcterms:title"), Some("First"));
        assert_eq!(group.first_literal("bf:note"), None);
    }
}

//! Statement grouping and group classification.
//!
//! Extractors hand the pipeline a flat sequence of statements covering one
//! bib and all of its items and holdings, in no guaranteed segment order.
//! [`group_by_subject`] partitions them into [`StatementGroup`]s preserving
//! first-seen order, and [`classify`] assigns each group its entity kind.

use crate::statement::{Statement, StatementGroup};
use indexmap::IndexMap;

/// The predicate used for type assertions on item and holding groups.
pub const TYPE_PREDICATE: &str = "rdfs:type";

/// Type objects that mark a group as an item.
pub const ITEM_TYPES: [&str; 2] = ["bf:Item", "nypl:CheckinCardItem"];

/// Type object that marks a group as a holding.
pub const HOLDING_TYPE: &str = "nypl:Holding";

/// The entity kind of a statement group.
///
/// Every well-formed group is exactly one of these; `Unclassified`
/// indicates upstream extraction drift, which callers log and drop rather
/// than treating as fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    /// The bibliographic description group.
    Bib,
    /// A physical, electronic, or check-in-card item group.
    Item,
    /// An aggregate holdings group.
    Holding,
    /// An anonymous sub-statement group, referenced positionally from a
    /// parent statement.
    BlankNode,
    /// A group matching no known shape.
    Unclassified,
}

/// Partition statements into groups keyed by `subject_id`.
///
/// First-seen ordering of subjects is preserved, as is the order of
/// statements within each subject: both determine display and priority
/// order downstream. Every input statement lands in exactly one group.
#[must_use]
pub fn group_by_subject(statements: Vec<Statement>) -> Vec<StatementGroup> {
    let mut groups: IndexMap<String, Vec<Statement>> = IndexMap::new();
    for statement in statements {
        groups
            .entry(statement.subject_id.clone())
            .or_default()
            .push(statement);
    }
    groups
        .into_iter()
        .map(|(subject_id, statements)| StatementGroup::new(subject_id, statements))
        .collect()
}

/// Classify a statement group by its type assertions or URI shape.
///
/// Evaluation follows a fixed priority: Bib (subject equals the expected
/// bib URI for the batch), then Item (`bf:Item` or `nypl:CheckinCardItem`
/// type assertion), then Holding (`nypl:Holding`), then blank node
/// (subject contains `#`). Anything else is [`GroupKind::Unclassified`].
#[must_use]
pub fn classify(group: &StatementGroup, expected_bib_uri: Option<&str>) -> GroupKind {
    if expected_bib_uri == Some(group.subject_id.as_str()) {
        return GroupKind::Bib;
    }
    if ITEM_TYPES.iter().any(|t| group.has_type_assertion(t)) {
        return GroupKind::Item;
    }
    if group.has_type_assertion(HOLDING_TYPE) {
        return GroupKind::Holding;
    }
    if group.is_blank_node() {
        return GroupKind::BlankNode;
    }
    GroupKind::Unclassified
}

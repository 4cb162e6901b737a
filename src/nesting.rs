//! Blank-node nesting.
//!
//! Blank-node statement groups have subject ids built as
//! `"{parent subject}#{ordinal}"`. [`nest_blank_nodes`] consumes those
//! groups and attaches each one to the statement that references it,
//! turning the flat edge list into a tree: a holding's check-in boxes, a
//! bib's structured notes, and so on end up as `blanknode` sub-documents on
//! their referencing statements.

use crate::statement::{Statement, StatementGroup};
use std::collections::HashMap;
use tracing::error;

/// Attach blank-node groups to the statements that reference them.
///
/// The input is the full set of groups for one entity's statements (or a
/// whole record's worth); the output contains only the non-blank-node
/// groups, with each referencing statement rebuilt to carry its blank-node
/// sub-document. Statement order is preserved, so multiple blank-node
/// references under one subject nest independently and deterministically.
///
/// A statement referencing a blank-node subject with no matching group is
/// logged and left un-nested; its literal/id value is still usable.
#[must_use]
pub fn nest_blank_nodes(groups: Vec<StatementGroup>) -> Vec<StatementGroup> {
    let (blank, root): (Vec<StatementGroup>, Vec<StatementGroup>) =
        groups.into_iter().partition(StatementGroup::is_blank_node);

    let blank_by_subject: HashMap<String, StatementGroup> = blank
        .into_iter()
        .map(|group| (group.subject_id.clone(), group))
        .collect();

    root.into_iter()
        .map(|group| {
            let statements = group
                .statements
                .into_iter()
                .map(|statement| nest_statement(statement, &blank_by_subject))
                .collect();
            StatementGroup::new(group.subject_id, statements)
        })
        .collect()
}

fn nest_statement(
    statement: Statement,
    blank_by_subject: &HashMap<String, StatementGroup>,
) -> Statement {
    let Some(object_id) = statement.references_blank_node() else {
        return statement;
    };

    match blank_by_subject.get(object_id) {
        Some(group) => Statement {
            blanknode: Some(Box::new(group.clone())),
            ..statement
        },
        None => {
            error!(
                subject_id = %statement.subject_id,
                object_id = %object_id,
                "Bad blanknode: no statements found for referenced subject"
            );
            statement
        }
    }
}

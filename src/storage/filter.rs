//! Boolean filters over indexed document fields.

use super::document::{Document, FieldValue, ID_FIELD};
use crate::compute::tier::BoxRange;

/// Exact-match filter evaluated by the index store.
///
/// `And` is evaluated coarse-first: the store resolves its first clause
/// through the postings and then checks the remaining clauses against each
/// surviving document, so put the most selective clause first.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Every document.
    All,
    /// Keyword field equal to `value` (or the document id when `field` is `"id"`).
    Term { field: String, value: String },
    /// Box field inside a block of cells.
    BoxRange { field: String, range: BoxRange },
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl Filter {
    pub fn term(field: impl Into<String>, value: impl Into<String>) -> Self {
        Filter::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn id(id: impl Into<String>) -> Self {
        Filter::term(ID_FIELD, id)
    }

    pub fn box_range(field: impl Into<String>, range: BoxRange) -> Self {
        Filter::BoxRange {
            field: field.into(),
            range,
        }
    }

    /// Whether `doc` satisfies the filter, without consulting any postings.
    pub fn matches(&self, doc: &Document) -> bool {
        match self {
            Filter::All => true,
            Filter::Term { field, value } if field == ID_FIELD => doc.id() == value,
            Filter::Term { field, value } => doc.keyword(field) == Some(value.as_str()),
            Filter::BoxRange { field, range } => match doc.get(field) {
                Some(FieldValue::Box(id)) => range.contains(id),
                _ => false,
            },
            Filter::And(clauses) => clauses.iter().all(|clause| clause.matches(doc)),
            Filter::Or(clauses) => clauses.iter().any(|clause| clause.matches(doc)),
        }
    }
}

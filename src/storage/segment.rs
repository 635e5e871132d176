//! In-memory segment: documents plus inverted postings for their indexed fields.

use super::document::{Document, FieldValue, ID_FIELD};
use super::filter::Filter;
use crate::compute::tier::{BoxId, BoxRange};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One published change to a segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Change {
    /// Insert or replace each document, in order.
    Upsert(Vec<Document>),
    Remove(String),
    Clear,
}

/// A consistent set of documents and the postings that index them.
///
/// Documents are kept ordered by id, which is also the order results come
/// back in.
#[derive(Debug, Clone, Default)]
pub struct Segment {
    documents: BTreeMap<String, Document>,
    /// field -> term -> document ids
    keywords: FxHashMap<String, FxHashMap<String, BTreeSet<String>>>,
    /// field -> box -> document ids, column-major so a column is one range scan
    boxes: FxHashMap<String, BTreeMap<BoxId, BTreeSet<String>>>,
}

impl Segment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_documents(documents: impl IntoIterator<Item = Document>) -> Self {
        let mut segment = Self::new();
        for doc in documents {
            segment.upsert(doc);
        }
        segment
    }

    /// Insert `doc`, replacing and returning any document with the same id.
    pub fn upsert(&mut self, doc: Document) -> Option<Document> {
        let previous = self.remove(doc.id());
        self.index(&doc);
        self.documents.insert(doc.id().to_string(), doc);
        previous
    }

    pub fn remove(&mut self, id: &str) -> Option<Document> {
        let doc = self.documents.remove(id)?;
        self.unindex(&doc);
        Some(doc)
    }

    pub fn clear(&mut self) {
        self.documents.clear();
        self.keywords.clear();
        self.boxes.clear();
    }

    /// Apply `change` in place. Cost is proportional to the change, not the segment.
    pub fn apply(&mut self, change: Change) {
        match change {
            Change::Upsert(docs) => {
                for doc in docs {
                    self.upsert(doc);
                }
            }
            Change::Remove(id) => {
                self.remove(&id);
            }
            Change::Clear => self.clear(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.get(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.documents.values()
    }

    /// Number of distinct (field, value) postings lists.
    pub fn posting_count(&self) -> usize {
        self.keywords.values().map(|terms| terms.len()).sum::<usize>()
            + self.boxes.values().map(|cells| cells.len()).sum::<usize>()
    }

    /// Documents matching `filter`, at most `limit`, in id order.
    pub fn search(&self, filter: &Filter, limit: usize) -> Vec<&Document> {
        self.resolve(filter)
            .into_iter()
            .take(limit)
            .filter_map(|id| self.documents.get(id))
            .collect()
    }

    pub fn count(&self, filter: &Filter) -> usize {
        self.resolve(filter).len()
    }

    fn resolve<'a>(&'a self, filter: &Filter) -> BTreeSet<&'a str> {
        match filter {
            Filter::All => self.documents.keys().map(String::as_str).collect(),
            Filter::Term { field, value } if field == ID_FIELD => self
                .documents
                .get_key_value(value.as_str())
                .map(|(id, _)| id.as_str())
                .into_iter()
                .collect(),
            Filter::Term { field, value } => self
                .keywords
                .get(field)
                .and_then(|terms| terms.get(value))
                .map(|ids| ids.iter().map(String::as_str).collect())
                .unwrap_or_default(),
            Filter::BoxRange { field, range } => self.resolve_box_range(field, range),
            Filter::And(clauses) => match clauses.split_first() {
                None => self.resolve(&Filter::All),
                Some((first, rest)) => {
                    let mut candidates = self.resolve(first);
                    if !rest.is_empty() {
                        candidates.retain(|id| {
                            self.documents
                                .get(*id)
                                .is_some_and(|doc| rest.iter().all(|clause| clause.matches(doc)))
                        });
                    }
                    candidates
                }
            },
            Filter::Or(clauses) => clauses
                .iter()
                .flat_map(|clause| self.resolve(clause))
                .collect(),
        }
    }

    fn resolve_box_range<'a>(&'a self, field: &str, range: &BoxRange) -> BTreeSet<&'a str> {
        let mut ids = BTreeSet::new();
        let Some(cells) = self.boxes.get(field) else {
            return ids;
        };
        if range.box_count() == 0 {
            return ids;
        }

        if range.column_count() > cells.len() as u64 {
            // Sparse field: walking the occupied cells is cheaper than one scan per column.
            for (id, docs) in cells {
                if range.contains(id) {
                    ids.extend(docs.iter().map(String::as_str));
                }
            }
        } else {
            for column in range.columns.clone() {
                let lo = BoxId::new(column, *range.rows.start());
                let hi = BoxId::new(column, *range.rows.end());
                for docs in cells.range(lo..=hi).map(|(_, docs)| docs) {
                    ids.extend(docs.iter().map(String::as_str));
                }
            }
        }
        ids
    }

    fn index(&mut self, doc: &Document) {
        for (name, value) in doc.indexed_fields() {
            match value {
                FieldValue::Keyword(term) => {
                    self.keywords
                        .entry(name.to_string())
                        .or_default()
                        .entry(term.clone())
                        .or_default()
                        .insert(doc.id().to_string());
                }
                FieldValue::Box(cell) => {
                    self.boxes
                        .entry(name.to_string())
                        .or_default()
                        .entry(*cell)
                        .or_default()
                        .insert(doc.id().to_string());
                }
                FieldValue::Text(_) | FieldValue::Float(_) => {}
            }
        }
    }

    fn unindex(&mut self, doc: &Document) {
        for (name, value) in doc.indexed_fields() {
            match value {
                FieldValue::Keyword(term) => {
                    if let Some(terms) = self.keywords.get_mut(name) {
                        remove_posting(terms, term, doc.id());
                        if terms.is_empty() {
                            self.keywords.remove(name);
                        }
                    }
                }
                FieldValue::Box(cell) => {
                    if let Some(cells) = self.boxes.get_mut(name) {
                        if let Some(ids) = cells.get_mut(cell) {
                            ids.remove(doc.id());
                            if ids.is_empty() {
                                cells.remove(cell);
                            }
                        }
                        if cells.is_empty() {
                            self.boxes.remove(name);
                        }
                    }
                }
                FieldValue::Text(_) | FieldValue::Float(_) => {}
            }
        }
    }
}

fn remove_posting(terms: &mut FxHashMap<String, BTreeSet<String>>, term: &str, id: &str) {
    if let Some(ids) = terms.get_mut(term) {
        ids.remove(id);
        if ids.is_empty() {
            terms.remove(term);
        }
    }
}

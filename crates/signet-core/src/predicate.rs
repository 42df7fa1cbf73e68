//! Typed document predicates
//!
//! Each constraint a caller supplies becomes one `Predicate`. A
//! `DocumentFilter` is their conjunction. Storage backends translate
//! predicates into their own query language; `DocumentFilter::matches` is
//! the reference in-memory semantics they must agree with.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

use crate::model::Document;

/// One independently optional constraint on the document set
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `id IN (...)`
    Ids(BTreeSet<i64>),
    /// `phid IN (...)`
    Phids(BTreeSet<String>),
    /// `creator_phid IN (...)`
    CreatorPhids(BTreeSet<String>),
    /// Document has a `HasContributor` edge to one of these users
    ContributorPhids(BTreeSet<String>),
    /// `created_at >= bound`
    CreatedAfter(DateTime<Utc>),
    /// `created_at <= bound`
    CreatedBefore(DateTime<Utc>),
}

impl Predicate {
    /// Stable name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Predicate::Ids(_) => "ids",
            Predicate::Phids(_) => "phids",
            Predicate::CreatorPhids(_) => "creator_phids",
            Predicate::ContributorPhids(_) => "contributor_phids",
            Predicate::CreatedAfter(_) => "created_after",
            Predicate::CreatedBefore(_) => "created_before",
        }
    }

    /// Whether evaluating this predicate needs the relation store
    pub fn requires_relation_join(&self) -> bool {
        matches!(self, Predicate::ContributorPhids(_))
    }

    /// An empty set restricts nothing
    fn is_vacuous(&self) -> bool {
        match self {
            Predicate::Ids(set) => set.is_empty(),
            Predicate::Phids(set)
            | Predicate::CreatorPhids(set)
            | Predicate::ContributorPhids(set) => set.is_empty(),
            Predicate::CreatedAfter(_) | Predicate::CreatedBefore(_) => false,
        }
    }

    fn matches(&self, document: &Document, contributors: &BTreeSet<String>) -> bool {
        match self {
            Predicate::Ids(ids) => ids.contains(&document.id),
            Predicate::Phids(phids) => phids.contains(&document.phid),
            Predicate::CreatorPhids(phids) => phids.contains(&document.creator_phid),
            Predicate::ContributorPhids(phids) => !phids.is_disjoint(contributors),
            Predicate::CreatedAfter(bound) => document.created_at.timestamp() >= bound.timestamp(),
            Predicate::CreatedBefore(bound) => document.created_at.timestamp() <= bound.timestamp(),
        }
    }
}

/// Conjunction of predicates; the empty filter matches every document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentFilter {
    predicates: Vec<Predicate>,
}

impl DocumentFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate, dropping it if it restricts nothing
    pub fn push(&mut self, predicate: Predicate) {
        if !predicate.is_vacuous() {
            self.predicates.push(predicate);
        }
    }

    pub fn with(mut self, predicate: Predicate) -> Self {
        self.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_unrestricted(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn requires_relation_join(&self) -> bool {
        self.predicates.iter().any(Predicate::requires_relation_join)
    }

    /// Predicate names joined with `,` for log fields
    pub fn describe(&self) -> String {
        self.predicates
            .iter()
            .map(Predicate::name)
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Evaluate the filter in memory
    ///
    /// `contributors` is the document's `HasContributor` destination set.
    /// Timestamps compare at whole-second precision, as stored.
    pub fn matches(&self, document: &Document, contributors: &BTreeSet<String>) -> bool {
        self.predicates
            .iter()
            .all(|p| p.matches(document, contributors))
    }
}

//! Document query builder and executor
//!
//! `DocumentQuery` collects independently optional constraints, then runs
//! one page through these stages:
//!
//! 1. one fetch of `limit + 1` rows past the cursor
//! 2. the visibility policy
//! 3. the required-signer filter, reconciled against each document's version
//! 4. batched hydration of bodies, contributors and valid signatures
//!
//! The next cursor is taken from the fetched rows before stages 2 and 3, so
//! filtering can shrink a page but never makes the following page skip or
//! repeat a row. A shrunken page is not backfilled.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use signet_core::config::QueryConfig;
use signet_core::errors::ExError;
use signet_core::model::Document;
use signet_core::pager::{Cursor, PageRequest, Pager, SortOrder};
use signet_core::policy::{AllowAllPolicy, VisibilityPolicy};
use signet_core::predicate::{DocumentFilter, Predicate};
use signet_core::reconcile::retain_fully_signed;
use signet_core::storage::{DocumentStorage, RelationStore};
use signet_core::{log_op_end, log_op_error, log_op_start};
use signet_core_types::RequestContext;

use crate::deadline::{CancelToken, Deadline};
use crate::hydrate::{Hydrator, Needs};
use crate::Result;

const OP: &str = "document_query";

static ALLOW_ALL: AllowAllPolicy = AllowAllPolicy;

/// One page of query results
#[derive(Debug, Clone)]
pub struct DocumentPage {
    pub documents: Vec<Document>,
    /// Token for the next page; `None` on the last page
    pub next_cursor: Option<String>,
    pub has_more: bool,
    /// Rows in this page before policy and signer filtering
    pub fetched: usize,
}

/// Fluent query over documents
///
/// ```
/// use signet_engine::DocumentQuery;
/// use signet_store::{db, SqliteStorage};
///
/// let conn = db::open_in_memory_migrated().unwrap();
/// let storage = SqliteStorage::new(&conn);
///
/// let page = DocumentQuery::new(&storage, &storage)
///     .with_creator_phids(["PHID-USER-alice"])
///     .need_document_bodies(true)
///     .with_limit(20)
///     .execute_page()
///     .unwrap();
/// assert!(page.documents.is_empty());
/// assert!(page.next_cursor.is_none());
/// ```
pub struct DocumentQuery<'a> {
    documents: &'a dyn DocumentStorage,
    relations: &'a dyn RelationStore,
    policy: &'a dyn VisibilityPolicy,

    ids: BTreeSet<i64>,
    phids: BTreeSet<String>,
    creator_phids: BTreeSet<String>,
    contributor_phids: BTreeSet<String>,
    created_after: Option<DateTime<Utc>>,
    created_before: Option<DateTime<Utc>>,
    signer_phids: BTreeSet<String>,

    needs: Needs,
    limit: Option<usize>,
    after: Option<String>,
    order: SortOrder,
    viewer: Option<String>,
    config: QueryConfig,
    context: Option<RequestContext>,
    cancel: Option<CancelToken>,
}

fn strings<S: Into<String>>(items: impl IntoIterator<Item = S>) -> BTreeSet<String> {
    items.into_iter().map(Into::into).collect()
}

impl<'a> DocumentQuery<'a> {
    pub fn new(documents: &'a dyn DocumentStorage, relations: &'a dyn RelationStore) -> Self {
        Self {
            documents,
            relations,
            policy: &ALLOW_ALL,
            ids: BTreeSet::new(),
            phids: BTreeSet::new(),
            creator_phids: BTreeSet::new(),
            contributor_phids: BTreeSet::new(),
            created_after: None,
            created_before: None,
            signer_phids: BTreeSet::new(),
            needs: Needs::default(),
            limit: None,
            after: None,
            order: SortOrder::Ascending,
            viewer: None,
            config: QueryConfig::default(),
            context: None,
            cancel: None,
        }
    }

    // Each setter replaces any earlier value for the same constraint. An
    // empty set leaves the constraint off.

    pub fn with_ids(mut self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.ids = ids.into_iter().collect();
        self
    }

    pub fn with_phids<S: Into<String>>(mut self, phids: impl IntoIterator<Item = S>) -> Self {
        self.phids = strings(phids);
        self
    }

    pub fn with_creator_phids<S: Into<String>>(
        mut self,
        phids: impl IntoIterator<Item = S>,
    ) -> Self {
        self.creator_phids = strings(phids);
        self
    }

    /// Documents with a contributor edge to any of these users
    pub fn with_contributor_phids<S: Into<String>>(
        mut self,
        phids: impl IntoIterator<Item = S>,
    ) -> Self {
        self.contributor_phids = strings(phids);
        self
    }

    /// Inclusive lower bound on creation time
    pub fn with_date_created_after(mut self, bound: DateTime<Utc>) -> Self {
        self.created_after = Some(bound);
        self
    }

    /// Inclusive upper bound on creation time
    pub fn with_date_created_before(mut self, bound: DateTime<Utc>) -> Self {
        self.created_before = Some(bound);
        self
    }

    /// Keep only documents every one of these users has signed at the
    /// current version
    pub fn with_signer_phids<S: Into<String>>(
        mut self,
        phids: impl IntoIterator<Item = S>,
    ) -> Self {
        self.signer_phids = strings(phids);
        self
    }

    pub fn need_document_bodies(mut self, need: bool) -> Self {
        self.needs.body = need;
        self
    }

    pub fn need_contributors(mut self, need: bool) -> Self {
        self.needs.contributors = need;
        self
    }

    /// Attach signatures valid for each document's current version
    pub fn need_signatures(mut self, need: bool) -> Self {
        self.needs.signatures = need;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resume after a `next_cursor` token from an earlier page
    pub fn after_cursor(mut self, token: impl Into<String>) -> Self {
        self.after = Some(token.into());
        self
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn with_viewer(mut self, viewer: impl Into<String>) -> Self {
        self.viewer = Some(viewer.into());
        self
    }

    pub fn with_policy(mut self, policy: &'a dyn VisibilityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_config(mut self, config: QueryConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_request_context(mut self, context: RequestContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Stop with `Cancelled` at the next stage boundary once `token` is
    /// cancelled
    pub fn with_cancellation(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The storage-level filter these constraints translate to
    pub fn filter(&self) -> DocumentFilter {
        let mut filter = DocumentFilter::new();
        filter.push(Predicate::Ids(self.ids.clone()));
        filter.push(Predicate::Phids(self.phids.clone()));
        filter.push(Predicate::CreatorPhids(self.creator_phids.clone()));
        filter.push(Predicate::ContributorPhids(self.contributor_phids.clone()));
        if let Some(bound) = self.created_after {
            filter.push(Predicate::CreatedAfter(bound));
        }
        if let Some(bound) = self.created_before {
            filter.push(Predicate::CreatedBefore(bound));
        }
        filter
    }

    /// The documents of one page
    ///
    /// # Errors
    ///
    /// See `execute_page`.
    pub fn execute(&self) -> Result<Vec<Document>> {
        Ok(self.execute_page()?.documents)
    }

    /// The first matching document in sort order, fetched as a page of one
    ///
    /// Post-filtering applies to that single row, so a document rejected by
    /// the policy or the signer filter yields `None` even if a later row
    /// would pass.
    ///
    /// # Errors
    ///
    /// See `execute_page`.
    pub fn execute_one(&self) -> Result<Option<Document>> {
        Ok(self.run(Some(1))?.documents.into_iter().next())
    }

    /// One page of documents with its continuation cursor
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a limit of zero or above the configured maximum
    /// - `InvalidCursor` for a malformed token or one issued for the other order
    /// - `Persistence` / `Serialization` from any storage call
    /// - `Timeout` when the configured budget runs out between stages
    /// - `Cancelled` when the cancellation token is tripped
    ///
    /// On error no documents are returned.
    pub fn execute_page(&self) -> Result<DocumentPage> {
        self.run(self.limit)
    }

    fn run(&self, requested_limit: Option<usize>) -> Result<DocumentPage> {
        let context = self.context.clone().unwrap_or_default();
        let filter = self.filter();
        log_op_start!(
            OP,
            predicates = %filter.describe(),
            signers = self.signer_phids.len(),
            request_id = %context.request_id,
        );
        let mut deadline = Deadline::new(self.config.timeout());
        if let Some(token) = &self.cancel {
            deadline = deadline.with_cancellation(token.clone());
        }

        let result = self
            .run_stages(filter, requested_limit, &deadline)
            .map_err(|e| correlate(e, &context));

        let elapsed = deadline.elapsed_ms();
        match &result {
            Ok(page) => {
                log_op_end!(
                    OP,
                    duration_ms = elapsed,
                    fetched = page.fetched,
                    returned = page.documents.len(),
                    has_more = page.has_more,
                    request_id = %context.request_id,
                );
            }
            Err(e) => {
                log_op_error!(
                    OP,
                    e.clone(),
                    duration_ms = elapsed,
                    request_id = %context.request_id,
                );
            }
        }
        result
    }

    fn run_stages(
        &self,
        filter: DocumentFilter,
        requested_limit: Option<usize>,
        deadline: &Deadline,
    ) -> Result<DocumentPage> {
        let limit = self.config.resolve_limit(requested_limit)?;
        let mut pager = match &self.after {
            Some(token) => Pager::resume(Cursor::decode_for(token, self.order)?, limit),
            None => Pager::new(self.order, limit),
        };
        let after = pager.begin_fetch()?;
        let request = PageRequest {
            filter,
            order: self.order,
            after,
            limit,
        };

        deadline.check("fetch_documents")?;
        let raw = self.documents.fetch_documents(&request)?;
        let page = pager.complete(raw, |doc| doc.id)?;
        let fetched = page.items.len();

        let visible = self
            .policy
            .filter_visible(self.viewer.as_deref(), page.items);

        let hydrator = Hydrator::new(self.documents, self.relations);
        let (documents, preloaded) = if self.signer_phids.is_empty() {
            (visible, None)
        } else {
            deadline.check("load_signatures")?;
            let index = hydrator.load_signature_index(&visible)?;
            let signed = retain_fully_signed(visible, &index, &self.signer_phids);
            (signed, Some(index))
        };

        let documents = hydrator.hydrate(documents, self.needs, preloaded, deadline)?;
        deadline.check("returning the page")?;

        Ok(DocumentPage {
            documents,
            next_cursor: page.next_cursor.map(|cursor| cursor.encode()),
            has_more: page.has_more,
            fetched,
        })
    }
}

fn correlate(err: ExError, context: &RequestContext) -> ExError {
    let err = err.with_request_id(context.request_id.clone());
    match &context.trace_id {
        Some(trace_id) => err.with_trace_id(trace_id.clone()),
        None => err,
    }
}

//! Visibility policy trait and implementations
//!
//! The rules deciding who may see a document live outside this crate. The
//! query only needs a filter that, given the fetched candidates, returns the
//! visible subset without reordering it.

use std::collections::HashSet;

use crate::model::Document;

/// Decides which fetched documents a viewer may see
pub trait VisibilityPolicy {
    /// Whether `viewer` may see `document`
    ///
    /// `viewer` is `None` for an anonymous request.
    fn can_view(&self, viewer: Option<&str>, document: &Document) -> bool;

    /// Visible subset of `documents`, in input order
    fn filter_visible(&self, viewer: Option<&str>, documents: Vec<Document>) -> Vec<Document> {
        documents
            .into_iter()
            .filter(|doc| self.can_view(viewer, doc))
            .collect()
    }
}

/// Policy that lets everyone see everything
///
/// ```
/// use signet_core::policy::{AllowAllPolicy, VisibilityPolicy};
/// use signet_core::model::Document;
///
/// let doc = Document::new(1, "PHID-LEGD-1".into(), "PHID-USER-a".into(), "PHID-LEGB-1".into());
/// assert!(AllowAllPolicy.can_view(None, &doc));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllPolicy;

impl VisibilityPolicy for AllowAllPolicy {
    fn can_view(&self, _viewer: Option<&str>, _document: &Document) -> bool {
        true
    }

    fn filter_visible(&self, _viewer: Option<&str>, documents: Vec<Document>) -> Vec<Document> {
        documents
    }
}

/// Policy where a viewer sees only documents they created
#[derive(Debug, Clone, Copy, Default)]
pub struct CreatorOnlyPolicy;

impl VisibilityPolicy for CreatorOnlyPolicy {
    fn can_view(&self, viewer: Option<&str>, document: &Document) -> bool {
        viewer == Some(document.creator_phid.as_str())
    }
}

/// Policy that exposes an explicit set of document phids to every viewer
#[derive(Debug, Clone, Default)]
pub struct SelectedVisibilityPolicy {
    visible: HashSet<String>,
}

impl SelectedVisibilityPolicy {
    pub fn new(visible: HashSet<String>) -> Self {
        Self { visible }
    }
}

impl VisibilityPolicy for SelectedVisibilityPolicy {
    fn can_view(&self, _viewer: Option<&str>, document: &Document) -> bool {
        self.visible.contains(&document.phid)
    }
}

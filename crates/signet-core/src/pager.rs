//! Seek-based pagination
//!
//! Pages are fetched with a seek predicate on the document id
//! (`id > cursor` ascending, `id < cursor` descending) and an over-fetch of
//! one row to learn whether more rows exist. Offsets are never used, so a
//! concurrent insert cannot shift rows between pages.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SignetError};
use crate::predicate::DocumentFilter;

/// Direction of the id ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    fn token(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        match token {
            "asc" => Some(SortOrder::Ascending),
            "desc" => Some(SortOrder::Descending),
            _ => None,
        }
    }

    /// Whether `id` comes strictly after `cursor_id` in this ordering
    pub fn is_past(&self, id: i64, cursor_id: i64) -> bool {
        match self {
            SortOrder::Ascending => id > cursor_id,
            SortOrder::Descending => id < cursor_id,
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Ascending => write!(f, "ascending"),
            SortOrder::Descending => write!(f, "descending"),
        }
    }
}

/// Position after the last row a caller has seen
///
/// Opaque to callers: they receive it as a token from `encode` and hand the
/// token back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    order: SortOrder,
    after_id: i64,
}

impl Cursor {
    pub fn new(order: SortOrder, after_id: i64) -> Self {
        Self { order, after_id }
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn after_id(&self) -> i64 {
        self.after_id
    }

    /// Encode as an opaque URL-safe token
    pub fn encode(&self) -> String {
        let raw = format!("{}|{}", self.order.token(), self.after_id);
        URL_SAFE_NO_PAD.encode(raw.as_bytes())
    }

    /// # Errors
    ///
    /// `InvalidCursor` if the token is not one produced by `encode`.
    pub fn decode(token: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| invalid("base64 decode failed"))?;
        let raw = String::from_utf8(bytes).map_err(|_| invalid("UTF-8 decode failed"))?;

        let (order, id) = raw.split_once('|').ok_or_else(|| invalid("wrong format"))?;
        let order = SortOrder::from_token(order).ok_or_else(|| invalid("unknown direction"))?;
        let after_id = id
            .parse::<i64>()
            .map_err(|_| invalid("id parse failed"))?;

        Ok(Self { order, after_id })
    }

    /// Decode a token and check it was issued for `order`
    ///
    /// # Errors
    ///
    /// `InvalidCursor` for a malformed token, `CursorDirectionMismatch` for a
    /// token minted under the other ordering.
    pub fn decode_for(token: &str, order: SortOrder) -> Result<Self> {
        let cursor = Self::decode(token)?;
        if cursor.order != order {
            return Err(SignetError::CursorDirectionMismatch {
                expected: order.to_string(),
                found: cursor.order.to_string(),
            });
        }
        Ok(cursor)
    }
}

fn invalid(reason: &str) -> SignetError {
    SignetError::InvalidCursor {
        reason: reason.to_string(),
    }
}

/// Everything the storage layer needs to fetch one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub filter: DocumentFilter,
    pub order: SortOrder,
    pub after: Option<Cursor>,
    /// Rows the caller wants; storage is asked for one more
    pub limit: usize,
}

impl PageRequest {
    /// Number of rows to request from storage
    pub fn fetch_limit(&self) -> usize {
        self.limit + 1
    }
}

/// One page of results
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Position to resume from; `None` when this is the last page
    pub next_cursor: Option<Cursor>,
    pub has_more: bool,
}

impl<T> Page<T> {
    /// Build a page from a raw over-fetched result
    ///
    /// `raw` holds at most `limit + 1` rows in sort order. If it holds more
    /// than `limit`, the extra row is dropped and the cursor points at the
    /// last kept row.
    pub fn from_overshot(
        mut raw: Vec<T>,
        limit: usize,
        order: SortOrder,
        sort_key: impl Fn(&T) -> i64,
    ) -> Self {
        let has_more = raw.len() > limit;
        if has_more {
            raw.truncate(limit);
        }
        let next_cursor = if has_more {
            raw.last().map(|item| Cursor::new(order, sort_key(item)))
        } else {
            None
        };
        Page {
            items: raw,
            next_cursor,
            has_more,
        }
    }
}

/// Pager lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PagerState {
    NotStarted,
    /// A fetch was issued from this position (`None` = from the start)
    Fetching(Option<Cursor>),
    HasMore(Cursor),
    Exhausted,
}

impl PagerState {
    fn label(&self) -> &'static str {
        match self {
            PagerState::NotStarted => "not started",
            PagerState::Fetching(_) => "fetching",
            PagerState::HasMore(_) => "has more",
            PagerState::Exhausted => "exhausted",
        }
    }
}

/// Drives a scan page by page
///
/// ```
/// use signet_core::pager::{Pager, PagerState, SortOrder};
///
/// let mut pager = Pager::new(SortOrder::Ascending, 2);
/// let from = pager.begin_fetch().unwrap();
/// assert_eq!(from, None);
///
/// let page = pager.complete(vec![1_i64, 2, 3], |id| *id).unwrap();
/// assert_eq!(page.items, vec![1, 2]);
/// assert!(matches!(pager.state(), PagerState::HasMore(_)));
/// ```
#[derive(Debug, Clone)]
pub struct Pager {
    order: SortOrder,
    limit: usize,
    state: PagerState,
}

impl Pager {
    pub fn new(order: SortOrder, limit: usize) -> Self {
        Self {
            order,
            limit,
            state: PagerState::NotStarted,
        }
    }

    /// Resume a scan from a cursor handed back by a caller
    pub fn resume(cursor: Cursor, limit: usize) -> Self {
        Self {
            order: cursor.order(),
            limit,
            state: PagerState::HasMore(cursor),
        }
    }

    pub fn state(&self) -> &PagerState {
        &self.state
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == PagerState::Exhausted
    }

    /// Move to `Fetching` and return the position to fetch from
    ///
    /// Calling this again while already fetching returns the same position,
    /// so a failed fetch can be re-issued.
    ///
    /// # Errors
    ///
    /// `PagerExhausted` once the last page has been returned.
    pub fn begin_fetch(&mut self) -> Result<Option<Cursor>> {
        let from = match &self.state {
            PagerState::NotStarted => None,
            PagerState::Fetching(from) => *from,
            PagerState::HasMore(cursor) => Some(*cursor),
            PagerState::Exhausted => return Err(SignetError::PagerExhausted),
        };
        self.state = PagerState::Fetching(from);
        Ok(from)
    }

    /// Finish a fetch with the raw over-fetched rows
    ///
    /// # Errors
    ///
    /// `PagerOutOfSequence` if no fetch is in flight.
    pub fn complete<T>(&mut self, raw: Vec<T>, sort_key: impl Fn(&T) -> i64) -> Result<Page<T>> {
        if !matches!(self.state, PagerState::Fetching(_)) {
            return Err(SignetError::PagerOutOfSequence {
                state: self.state.label(),
            });
        }
        let page = Page::from_overshot(raw, self.limit, self.order, sort_key);
        self.state = match page.next_cursor {
            Some(cursor) => PagerState::HasMore(cursor),
            None => PagerState::Exhausted,
        };
        Ok(page)
    }
}

//! Page-number pagination over lazy record streams
//!
//! `paginate` pulls from a [`Stream`] only as far as the requested page
//! reaches: it skips `(page - 1) * itemsPerPage` records, collects at most
//! `itemsPerPage` more and drops the source, which releases whatever cursor
//! the store had open.
//!
//! Pages are computed independently. When the store changes between two page
//! requests, the second page reflects the new contents; no snapshot is held
//! across calls.

use futures_util::{pin_mut, Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;

/// Page size used when `itemsPerPage` is absent or not a positive integer
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// First page number; pages are 1-indexed
pub const FIRST_PAGE: usize = 1;

/// Normalized page parameters
///
/// Construction never fails: out-of-range or malformed values fall back to
/// [`DEFAULT_ITEMS_PER_PAGE`] and [`FIRST_PAGE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    items_per_page: usize,
    page: usize,
}

impl PageRequest {
    /// Coerce raw `itemsPerPage` / `page` arguments
    pub fn new(items_per_page: Option<i32>, page: Option<i32>) -> Self {
        Self::from_raw(items_per_page.map(i64::from), page.map(i64::from))
    }

    /// Coerce untyped JSON arguments
    ///
    /// Anything that is not an integral number (strings, floats, booleans,
    /// null) is treated as absent.
    pub fn from_json(items_per_page: Option<&Value>, page: Option<&Value>) -> Self {
        Self::from_raw(
            items_per_page.and_then(Value::as_i64),
            page.and_then(Value::as_i64),
        )
    }

    fn from_raw(items_per_page: Option<i64>, page: Option<i64>) -> Self {
        Self {
            items_per_page: positive(items_per_page).unwrap_or(DEFAULT_ITEMS_PER_PAGE),
            page: positive(page).unwrap_or(FIRST_PAGE),
        }
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// Number of records to skip before the page starts
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.items_per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            page: FIRST_PAGE,
        }
    }
}

fn positive(value: Option<i64>) -> Option<usize> {
    value
        .filter(|v| *v > 0)
        .and_then(|v| usize::try_from(v).ok())
}

/// One bounded slice of a result set
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub request: PageRequest,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Collect the page described by `request` from `source`.
///
/// Source order is preserved. An offset beyond the end of the source yields
/// an empty page. The first error pulled from the source, skipped region
/// included, aborts the page.
pub async fn paginate<T, E, S>(source: S, request: PageRequest) -> Result<Page<T>, E>
where
    S: Stream<Item = Result<T, E>>,
{
    pin_mut!(source);

    let offset = request.offset();
    let limit = request.items_per_page();
    let mut skipped = 0usize;
    let mut items = Vec::with_capacity(limit.min(DEFAULT_ITEMS_PER_PAGE));

    while items.len() < limit {
        let Some(record) = source.next().await else {
            break;
        };
        let record = record?;
        if skipped < offset {
            skipped += 1;
            continue;
        }
        items.push(record);
    }

    Ok(Page { items, request })
}

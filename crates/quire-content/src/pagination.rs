//! Pagination window calculation.
//!
//! Computes the `first / previous / 1..N / next / last` navigation shown
//! around the current page of a paginated result, e.g. search hits or a
//! collection overview. Pages hold [`ITEMS_PER_PAGE`] items each.

use serde::Serialize;
use serde::ser::SerializeMap;

use crate::collection::Collection;
use crate::fragment::{Fragment, FragmentOrder};

/// Items shown per page.
pub const ITEMS_PER_PAGE: u64 = 10;

/// One navigation entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub text: String,
    pub active: bool,
    /// Target page number.
    pub url: String,
}

impl PageLink {
    fn new(text: impl Into<String>, active: bool, page: i64) -> Self {
        Self {
            text: text.into(),
            active,
            url: page.to_string(),
        }
    }

    fn page(page: i64) -> Self {
        Self::new(page.to_string(), true, page)
    }
}

/// Navigation around the current page.
///
/// Serializes as a map with the keys `first`, `previous`, `"1"`..`"N"` for
/// the numbered pages, `next` and `last`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaginationWindow {
    pub first: PageLink,
    pub previous: PageLink,
    /// Numbered pages in ascending order; keyed `"1"`..`"N"` when serialized.
    pub pages: Vec<PageLink>,
    pub next: PageLink,
    pub last: PageLink,
}

impl PaginationWindow {
    /// Number of slots, navigation included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len() + 4
    }

    /// Always false: the navigation slots are always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Look up a slot by its serialized key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PageLink> {
        match key {
            "first" => Some(&self.first),
            "previous" => Some(&self.previous),
            "next" => Some(&self.next),
            "last" => Some(&self.last),
            _ => key
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| self.pages.get(i)),
        }
    }
}

impl Serialize for PaginationWindow {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        map.serialize_entry("first", &self.first)?;
        map.serialize_entry("previous", &self.previous)?;
        for (i, page) in self.pages.iter().enumerate() {
            map.serialize_entry(&(i + 1).to_string(), page)?;
        }
        map.serialize_entry("next", &self.next)?;
        map.serialize_entry("last", &self.last)?;
        map.end()
    }
}

/// Compute the pagination window.
///
/// `current_page` is 1-based, `window_size` is the maximum number of
/// numbered pages shown and `total_items` the size of the whole result.
/// The window is centered on the current page and saturates at both ends.
/// Even sizes show one page fewer, `(window_size - 1) / 2` on each side.
///
/// # Examples
///
/// ```
/// use quire_content::calculate_pagination;
///
/// let window = calculate_pagination(1, 5, 100);
/// assert_eq!(window.len(), 9);
/// assert_eq!(window.pages.first().map(|p| p.url.as_str()), Some("1"));
/// assert_eq!(window.last.url, "10");
/// assert!(window.next.active);
/// ```
#[must_use]
pub fn calculate_pagination(current_page: u32, window_size: u32, total_items: u64) -> PaginationWindow {
    let current = i64::from(current_page);
    let total_pages = i64::try_from(total_items.div_ceil(ITEMS_PER_PAGE)).unwrap_or(i64::MAX);
    let window = i64::from(window_size).min(total_pages);

    let mut from = current - (window - 1) / 2;
    let mut to = current + (window - 1) / 2;
    if from < 1 {
        to += 1 - from;
        from = 1;
    }
    if to > total_pages {
        let shift = to - total_pages;
        to -= shift;
        from -= shift;
    }

    let (mut next, mut last) = if total_pages <= window {
        (
            PageLink::new("next", false, total_pages),
            PageLink::new("last", false, total_pages),
        )
    } else {
        (
            PageLink::new("next", true, current + 1),
            PageLink::new("last", true, total_pages),
        )
    };

    let (first, previous) = if current == 1 {
        (PageLink::new("first", false, 1), PageLink::new("previous", false, 1))
    } else {
        (
            PageLink::new("first", true, 1),
            PageLink::new("previous", true, current - 1),
        )
    };

    if current == total_pages {
        next = PageLink::new("next", false, current);
        last = PageLink::new("last", false, total_pages);
    }

    let pages = (from..=to).map(PageLink::page).collect();
    tracing::debug!(from, to, total_pages, "Pagination window");

    PaginationWindow {
        first,
        previous,
        pages,
        next,
        last,
    }
}

impl Collection {
    /// Pagination window over the visible fragments.
    #[must_use]
    pub fn pagination(&self, current_page: u32, window_size: u32) -> PaginationWindow {
        let total = u64::try_from(self.visible_len()).unwrap_or(u64::MAX);
        calculate_pagination(current_page, window_size, total)
    }

    /// Visible fragments on a 1-based page, sorted by the given strategy.
    ///
    /// Pages past the end are empty.
    #[must_use]
    pub fn visible_page(&self, page: u32, order: FragmentOrder) -> Vec<&Fragment> {
        let per_page = usize::try_from(ITEMS_PER_PAGE).unwrap_or(usize::MAX);
        let skip = usize::try_from(page.saturating_sub(1))
            .unwrap_or(usize::MAX)
            .saturating_mul(per_page);
        self.visible_ordered(order)
            .into_iter()
            .skip(skip)
            .take(per_page)
            .collect()
    }
}

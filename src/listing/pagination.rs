use serde::Serialize;
use std::ops::Range;

pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// One entry of the page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PageLink {
    Page { number: usize, current: bool },
    Ellipsis,
}

impl Pagination {
    /// Clamps `requested` into `[1, total_pages]`.
    pub fn new(total: usize, requested: usize, per_page: usize) -> Self {
        let per_page = per_page.max(1);
        let total_pages = total.div_ceil(per_page);
        let page = requested.clamp(1, total_pages.max(1));
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }

    pub fn range(&self) -> Range<usize> {
        let start = ((self.page - 1) * self.per_page).min(self.total);
        let end = (self.page * self.per_page).min(self.total);
        start..end
    }

    pub fn previous(&self) -> usize {
        if self.page > 1 {
            self.page - 1
        } else {
            self.page
        }
    }

    pub fn next(&self) -> usize {
        if self.page < self.total_pages {
            self.page + 1
        } else {
            self.page
        }
    }

    /// First, last, current and its neighbours; any gap collapses to a
    /// single ellipsis.
    pub fn window(&self) -> Vec<PageLink> {
        if self.total_pages == 0 {
            return Vec::new();
        }
        let last = self.total_pages;
        let mut numbers = vec![1, self.page.saturating_sub(1), self.page, self.page + 1, last];
        numbers.retain(|n| (1..=last).contains(n));
        numbers.sort_unstable();
        numbers.dedup();

        let mut links = Vec::with_capacity(numbers.len() * 2);
        let mut previous = 0;
        for number in numbers {
            if previous != 0 && number > previous + 1 {
                links.push(PageLink::Ellipsis);
            }
            links.push(PageLink::Page {
                number,
                current: number == self.page,
            });
            previous = number;
        }
        links
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(flatten)]
    pub pagination: Pagination,
    pub page_window: Vec<PageLink>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
            page_window: self.page_window,
        }
    }
}

/// Slices an already filtered and sorted list. Never touches the source
/// beyond the requested window.
pub fn paginate<T>(items: Vec<T>, requested: usize, per_page: usize) -> Page<T> {
    let pagination = Pagination::new(items.len(), requested, per_page);
    let range = pagination.range();
    let items = items
        .into_iter()
        .skip(range.start)
        .take(range.len())
        .collect();
    Page {
        items,
        page_window: pagination.window(),
        pagination,
    }
}

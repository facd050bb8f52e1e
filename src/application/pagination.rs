//! Page-number pagination over offset-based listings.

/// One page of a listing with `total` items, `per_page` at a time. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl PageWindow {
    pub fn new(page: u32, per_page: u32, total: u64) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
            total,
        }
    }

    pub fn total_pages(&self) -> u32 {
        let pages = self.total.div_ceil(u64::from(self.per_page));
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    /// Whether the requested page lies past the last one.
    pub fn is_out_of_range(&self) -> bool {
        self.page > self.total_pages().max(1)
    }

    pub fn previous(&self) -> Option<u32> {
        (self.page > 1).then(|| self.page - 1)
    }

    pub fn next(&self) -> Option<u32> {
        (self.page < self.total_pages()).then(|| self.page + 1)
    }

    /// Slice the current page out of an in-memory list.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        if start >= items.len() {
            return &[];
        }
        let end = start.saturating_add(self.per_page as usize).min(items.len());
        &items[start..end]
    }
}

/// Parse a `page` query value, falling back to the first page for anything unusable.
pub fn parse_page(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|page| *page > 0)
        .unwrap_or(1)
}

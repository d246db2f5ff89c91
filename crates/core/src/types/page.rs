//! Offset pagination.

/// A validated page request.
///
/// Pages are 1-based. Both `page` and `limit` are always at least 1, so the
/// derived offset and page count never come from a malformed query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub const DEFAULT_PAGE: u64 = 1;
    pub const DEFAULT_LIMIT: u64 = 10;

    /// Build a page request, clamping zero values up to 1.
    #[must_use]
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// Build a page request from raw query-string values.
    ///
    /// Missing or non-numeric values use the defaults; zero and negative
    /// values clamp to 1.
    #[must_use]
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        Self::new(
            parse_clamped(page, Self::DEFAULT_PAGE),
            parse_clamped(limit, Self::DEFAULT_LIMIT),
        )
    }

    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Number of records to skip: `(page - 1) * limit`.
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Total number of pages for `total` records: `ceil(total / limit)`.
    #[must_use]
    pub const fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}

fn parse_clamped(raw: Option<&str>, default: u64) -> u64 {
    match raw.map(|v| v.trim().parse::<i64>()) {
        Some(Ok(n)) => u64::try_from(n).unwrap_or(1).max(1),
        Some(Err(_)) | None => default,
    }
}

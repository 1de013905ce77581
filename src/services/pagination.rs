// src/services/pagination.rs

use crate::models::comment::RootListParams;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 30;
pub const MAX_LIMIT: i64 = 100;

/// Column the root listing is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    Author,
    Content,
    #[default]
    CreatedAt,
}

impl SortKey {
    /// Category keywords accepted from callers, paired with the key they select.
    const CATEGORIES: [(&'static str, SortKey); 3] = [
        ("author", SortKey::Author),
        ("text_content", SortKey::Content),
        ("created", SortKey::CreatedAt),
    ];

    /// Resolves a caller-supplied sort value. Any non-empty value contained in
    /// a category keyword selects that category ("AUTHOR ", "auth", "content").
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim().to_lowercase();
        if value.is_empty() {
            return Self::default();
        }

        Self::CATEGORIES
            .iter()
            .find(|(keyword, _)| keyword.contains(value.as_str()))
            .map(|(_, key)| *key)
            .unwrap_or_default()
    }

    /// Storage column name.
    pub fn column(self) -> &'static str {
        match self {
            SortKey::Author => "author",
            SortKey::Content => "content",
            SortKey::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim().to_lowercase();
        if value.is_empty() {
            return Self::default();
        }

        if "ascending".contains(value.as_str()) {
            SortOrder::Asc
        } else if "descending".contains(value.as_str()) {
            SortOrder::Desc
        } else {
            SortOrder::default()
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Well-formed root listing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub sort: SortKey,
    pub order: SortOrder,
}

impl Pagination {
    /// Rows to skip. Saturates instead of overflowing for huge page numbers.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: SortKey::default(),
            order: SortOrder::default(),
        }
    }
}

impl RootListParams {
    /// Replaces missing or out-of-range values with defaults. Never fails.
    pub fn normalize(&self) -> Pagination {
        let page = match self.page {
            Some(page) if page > 0 => page,
            _ => DEFAULT_PAGE,
        };

        let limit = match self.limit {
            Some(limit) if limit > 0 && limit <= MAX_LIMIT => limit,
            _ => DEFAULT_LIMIT,
        };

        Pagination {
            page,
            limit,
            sort: self.sort.as_deref().map(SortKey::parse).unwrap_or_default(),
            order: self.order.as_deref().map(SortOrder::parse).unwrap_or_default(),
        }
    }
}

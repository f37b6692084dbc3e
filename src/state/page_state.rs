//! Pagination, search, sort and filter state of one list view.
//!
//! State transitions for user events live here as pure functions; the
//! synchronizer decides where the resulting state is persisted.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::crud::SearchParams;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_SIZE: u32 = 10;

/// Encoded as `1` (ascending) and `-1` (descending) everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_i8(self) -> i8 {
        match self {
            SortDirection::Ascending => 1,
            SortDirection::Descending => -1,
        }
    }

    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            1 => Some(SortDirection::Ascending),
            -1 => Some(SortDirection::Descending),
            _ => None,
        }
    }

    /// Accepts `1`/`-1` and, leniently, `asc`/`desc`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Some(SortDirection::Ascending),
            "desc" | "descending" => Some(SortDirection::Descending),
            other => other.parse::<i64>().ok().and_then(Self::from_i64),
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl Serialize for SortDirection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i8(self.as_i8())
    }
}

impl<'de> Deserialize<'de> for SortDirection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        SortDirection::from_i64(raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid sort direction {}", raw)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

/// Full state of a list view. `page >= 1`, `size > 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageState {
    pub page: u32,
    pub size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filters: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            size: DEFAULT_SIZE,
            search: None,
            filters: None,
            sort: None,
        }
    }
}

/// Paginator event: zero-based page index and rows per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagerEvent {
    pub page_index: u32,
    pub rows: Option<u32>,
}

/// A state fragment from one source (URL or session cache). Absent fields
/// leave the underlying value untouched when overlaid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialPageState {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub filters: Option<Map<String, Value>>,
    #[serde(default)]
    pub sort: Option<Sort>,
}

impl PartialPageState {
    pub fn is_empty(&self) -> bool {
        self == &PartialPageState::default()
    }
}

impl PageState {
    /// Apply `partial` on top of `self`; present fields win. Zero page or
    /// size values are ignored.
    pub fn overlay(mut self, partial: PartialPageState) -> Self {
        if let Some(page) = partial.page.filter(|p| *p > 0) {
            self.page = page;
        }
        if let Some(size) = partial.size.filter(|s| *s > 0) {
            self.size = size;
        }
        if let Some(search) = partial.search.filter(|s| !s.is_empty()) {
            self.search = Some(search);
        }
        if let Some(filters) = partial.filters {
            self.filters = Some(filters);
        }
        if let Some(sort) = partial.sort {
            self.sort = Some(sort);
        }
        self
    }

    /// Minimal URL query: default-valued and empty fields are left out.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if self.page != DEFAULT_PAGE {
            pairs.push(("page".to_string(), self.page.to_string()));
        }
        if self.size != DEFAULT_SIZE {
            pairs.push(("size".to_string(), self.size.to_string()));
        }
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("search".to_string(), search.to_string()));
        }
        if let Some(filters) = self.filters.as_ref().filter(|f| !f.is_empty()) {
            pairs.push((
                "filters".to_string(),
                Value::Object(filters.clone()).to_string(),
            ));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sortField".to_string(), sort.field.clone()));
            pairs.push((
                "sortDirection".to_string(),
                sort.direction.as_i8().to_string(),
            ));
        }
        pairs
    }

    /// New search text; always returns to the first page.
    pub fn with_search(&self, text: Option<&str>) -> Self {
        Self {
            search: text.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string),
            page: DEFAULT_PAGE,
            ..self.clone()
        }
    }

    /// Replace the structured filters; always returns to the first page.
    pub fn with_filters(&self, filters: Option<Map<String, Value>>) -> Self {
        Self {
            filters: filters.filter(|f| !f.is_empty()),
            page: DEFAULT_PAGE,
            ..self.clone()
        }
    }

    /// Quick filter on `status`, cleared by `None`.
    pub fn with_status_filter(&self, status: Option<&str>) -> Self {
        let filters = status.filter(|s| !s.is_empty()).map(|s| {
            let mut map = Map::new();
            map.insert("status".to_string(), Value::String(s.to_string()));
            map
        });
        self.with_filters(filters)
    }

    /// Column header click: same column flips direction, another column
    /// starts ascending.
    pub fn with_sort_click(&self, field: &str) -> Self {
        let direction = match &self.sort {
            Some(sort) if sort.field == field => sort.direction.toggled(),
            _ => SortDirection::Ascending,
        };
        Self {
            sort: Some(Sort {
                field: field.to_string(),
                direction,
            }),
            ..self.clone()
        }
    }

    pub fn with_pager(&self, event: PagerEvent) -> Self {
        Self {
            page: event.page_index.saturating_add(1),
            size: event.rows.filter(|r| *r > 0).unwrap_or(DEFAULT_SIZE),
            ..self.clone()
        }
    }

    pub fn to_search_params(&self) -> SearchParams {
        SearchParams {
            page_number: self.page,
            page_size: self.size,
            src: self.search.clone(),
            column_name: self.sort.as_ref().map(|s| s.field.clone()),
            asc_desc: self.sort.as_ref().map(|s| s.direction.as_i8()),
            custom_filter: self.filters.clone(),
        }
    }
}

impl From<&SearchParams> for PageState {
    fn from(params: &SearchParams) -> Self {
        let sort = params.column_name.as_ref().map(|field| Sort {
            field: field.clone(),
            direction: params
                .asc_desc
                .and_then(|d| SortDirection::from_i64(d.into()))
                .unwrap_or_default(),
        });
        Self {
            page: params.page_number.max(DEFAULT_PAGE),
            size: if params.page_size == 0 {
                DEFAULT_SIZE
            } else {
                params.page_size
            },
            search: params.src.clone(),
            filters: params.custom_filter.clone(),
            sort,
        }
    }
}

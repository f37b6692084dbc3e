//! List-endpoint query parameters and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Generic list query, translated into the backend's parameter names by
/// [`SearchParams::to_query`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub page_number: u32,
    pub page_size: u32,
    /// Free-text search. The backend names this `src`, not `SearchText`.
    pub src: Option<String>,
    pub column_name: Option<String>,
    /// 1 ascending, -1 descending.
    pub asc_desc: Option<i8>,
    pub custom_filter: Option<Map<String, Value>>,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: 10,
            src: None,
            column_name: None,
            asc_desc: None,
            custom_filter: None,
        }
    }
}

impl SearchParams {
    /// Backend query pairs. Absent or empty optional fields are left out and
    /// `CustomFilter` travels as a JSON string.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = vec![
            ("PageNumber".to_string(), self.page_number.to_string()),
            ("PageSize".to_string(), self.page_size.to_string()),
        ];

        if let Some(src) = self.src.as_deref().filter(|s| !s.is_empty()) {
            query.push(("src".to_string(), src.to_string()));
        }
        if let Some(column) = self.column_name.as_deref().filter(|c| !c.is_empty()) {
            query.push(("ColumnName".to_string(), column.to_string()));
        }
        if let Some(direction) = self.asc_desc {
            query.push(("AscDesc".to_string(), direction.to_string()));
        }
        if let Some(filter) = self.custom_filter.as_ref().filter(|f| !f.is_empty()) {
            query.push((
                "CustomFilter".to_string(),
                Value::Object(filter.clone()).to_string(),
            ));
        }
        query
    }
}

/// `{data, success, message}` envelope used by non-list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// The payload when the backend flagged the call as successful.
    pub fn into_data(self) -> Option<T> {
        if self.success { self.data } else { None }
    }
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedList<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub page_number: u32,
    #[serde(default)]
    pub total_pages: u32,
    /// The backend spells this `totalItens`.
    #[serde(default, rename = "totalItens")]
    pub total_items: u64,
    #[serde(default, rename = "hasPagePrevious")]
    pub has_previous_page: bool,
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub success: bool,
}

impl<T> PaginatedList<T> {
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

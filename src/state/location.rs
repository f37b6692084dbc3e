//! The "current URL" of a list view: a path plus query pairs.
//!
//! URL state is parsed leniently. A malformed number or filter is skipped
//! with a warning and never aborts the load.

use std::fmt;

use reqwest::Url;
use serde_json::Value;
use tracing::warn;

use super::page_state::{PartialPageState, Sort, SortDirection};

const ORIGIN: &str = "http://adminhub.local/";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: Vec<(String, String)>,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            query: Vec::new(),
        }
    }
}

impl Location {
    /// Parse `"/clients?page=2&search=acme"`. Input that cannot be read as
    /// a relative URL becomes the root location.
    pub fn parse(input: &str) -> Self {
        let joined = Url::parse(ORIGIN).and_then(|origin| origin.join(input.trim()));
        match joined {
            Ok(url) => Self {
                path: url.path().to_string(),
                query: url
                    .query_pairs()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect(),
            },
            Err(e) => {
                warn!(input, error = %e, "unreadable location, using root");
                Self::default()
            }
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Same path, query replaced.
    pub fn with_query(&self, query: Vec<(String, String)>) -> Self {
        Self {
            path: self.path.clone(),
            query,
        }
    }

    pub fn route_key(&self) -> RouteKey {
        RouteKey::from_path(&self.path)
    }

    /// Page state carried by the query string.
    pub fn page_state(&self) -> PartialPageState {
        let sort = self.query_value("sortField").filter(|f| !f.is_empty()).map(|field| {
            let direction = match self.query_value("sortDirection") {
                Some(raw) => SortDirection::parse(raw).unwrap_or_else(|| {
                    warn!(value = raw, "ignoring malformed sortDirection");
                    SortDirection::Ascending
                }),
                None => SortDirection::Ascending,
            };
            Sort {
                field: field.to_string(),
                direction,
            }
        });

        PartialPageState {
            page: self.positive_number("page"),
            size: self.positive_number("size"),
            search: self
                .query_value("search")
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            filters: self.filters(),
            sort,
        }
    }

    fn positive_number(&self, key: &str) -> Option<u32> {
        let raw = self.query_value(key)?;
        match raw.parse::<u32>() {
            Ok(n) if n > 0 => Some(n),
            _ => {
                warn!(param = key, value = raw, "ignoring malformed number");
                None
            }
        }
    }

    fn filters(&self) -> Option<serde_json::Map<String, Value>> {
        let raw = self.query_value("filters")?;
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) => {
                warn!(value = raw, "filters parameter is not a JSON object");
                None
            }
            Err(e) => {
                warn!(value = raw, error = %e, "ignoring malformed filters parameter");
                None
            }
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.query.is_empty() {
            return write!(f, "{}", self.path);
        }
        let mut url = Url::parse(ORIGIN).map_err(|_| fmt::Error)?;
        url.query_pairs_mut().extend_pairs(self.query.iter());
        write!(f, "{}?{}", self.path, url.query().unwrap_or_default())
    }
}

/// Cache key of a route: path segments joined by `/`, then every
/// non-alphanumeric character replaced by `_`. The bare root is `root`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteKey(String);

impl RouteKey {
    pub fn from_path(path: &str) -> Self {
        let path = path.split('?').next().unwrap_or_default();
        let joined = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        let joined = if joined.is_empty() {
            "root".to_string()
        } else {
            joined
        };
        Self(
            joined
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
                .collect(),
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key under which the session cache keeps this route's state.
    pub fn storage_key(&self) -> String {
        format!("page_state_{}", self.0)
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

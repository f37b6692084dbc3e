//! Keeps a list view's [`PageState`] in the location query and, on the
//! client, in a session cache.
//!
//! Precedence when reading: defaults, then the cache, then the URL. The URL
//! always wins per field, which keeps shared links authoritative.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, warn};

use super::location::{Location, RouteKey};
use super::page_state::{PageState, PartialPageState};
use super::storage::KeyValueStore;

/// Where the code runs. The session cache exists only on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderContext {
    Server,
    Client,
}

pub struct PageStateSync {
    context: RenderContext,
    location: Mutex<Location>,
    session: Arc<dyn KeyValueStore>,
}

impl PageStateSync {
    pub fn new(context: RenderContext, location: Location, session: Arc<dyn KeyValueStore>) -> Self {
        Self {
            context,
            location: Mutex::new(location),
            session,
        }
    }

    pub fn context(&self) -> RenderContext {
        self.context
    }

    pub fn location(&self) -> Location {
        self.location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the current location (navigation, back/forward).
    pub fn navigate(&self, location: Location) {
        *self.location.lock().unwrap_or_else(PoisonError::into_inner) = location;
    }

    pub fn route_key(&self) -> RouteKey {
        self.location().route_key()
    }

    /// State carried by the current URL alone.
    pub fn url_state(&self) -> PartialPageState {
        self.location().page_state()
    }

    pub fn get_state(&self, key: &RouteKey) -> PageState {
        let cached = self.cached_state(key).unwrap_or_default();
        PageState::default()
            .overlay(cached)
            .overlay(self.url_state())
    }

    pub fn save_state(&self, key: &RouteKey, state: &PageState) {
        {
            let mut location = self.location.lock().unwrap_or_else(PoisonError::into_inner);
            *location = location.with_query(state.to_query_pairs());
            debug!(route = %key, location = %location, "page state saved to location");
        }

        if self.context != RenderContext::Client {
            return;
        }
        match serde_json::to_string(state) {
            Ok(json) => {
                if let Err(e) = self.session.set(&key.storage_key(), &json) {
                    warn!(route = %key, error = %e, "failed to cache page state");
                }
            }
            Err(e) => warn!(route = %key, error = %e, "failed to encode page state"),
        }
    }

    pub fn clear_state(&self, key: &RouteKey) {
        self.navigate(self.location().with_query(Vec::new()));
        if self.context != RenderContext::Client {
            return;
        }
        if let Err(e) = self.session.remove(&key.storage_key()) {
            warn!(route = %key, error = %e, "failed to clear cached page state");
        }
    }

    fn cached_state(&self, key: &RouteKey) -> Option<PartialPageState> {
        if self.context != RenderContext::Client {
            return None;
        }
        let raw = match self.session.get(&key.storage_key()) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(route = %key, error = %e, "session cache unavailable");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(partial) => Some(partial),
            Err(e) => {
                warn!(route = %key, error = %e, "ignoring malformed cached page state");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::page_state::{Sort, SortDirection};
    use crate::state::storage::MemoryStore;
    use serde_json::json;

    fn client_sync(url: &str) -> (PageStateSync, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let sync = PageStateSync::new(RenderContext::Client, Location::parse(url), store.clone());
        (sync, store)
    }

    #[test]
    fn defaults_without_url_or_cache() {
        let (sync, _) = client_sync("/clients");
        assert_eq!(sync.get_state(&sync.route_key()), PageState::default());
    }

    #[test]
    fn url_wins_over_cache_per_field() {
        let (sync, store) = client_sync("/clients?page=3");
        store
            .set(
                "page_state_clients",
                &json!({"page": 5, "size": 20, "search": "acme"}).to_string(),
            )
            .unwrap();

        let state = sync.get_state(&sync.route_key());
        assert_eq!(state.page, 3);
        assert_eq!(state.size, 20);
        assert_eq!(state.search.as_deref(), Some("acme"));
    }

    #[test]
    fn saved_state_reads_back() {
        let (sync, _) = client_sync("/users");
        let key = sync.route_key();
        let state = PageState {
            page: 4,
            size: 25,
            search: Some("ana".into()),
            filters: json!({"status": "active"}).as_object().cloned(),
            sort: Some(Sort {
                field: "email".into(),
                direction: SortDirection::Descending,
            }),
        };
        sync.save_state(&key, &state);
        assert_eq!(sync.get_state(&key), state);

        // The URL alone carries everything too.
        let fresh = PageStateSync::new(
            RenderContext::Server,
            sync.location(),
            Arc::new(MemoryStore::new()),
        );
        assert_eq!(fresh.get_state(&key), state);
    }

    #[test]
    fn default_fields_stay_out_of_the_url() {
        let (sync, _) = client_sync("/users?page=9");
        let key = sync.route_key();
        sync.save_state(&key, &PageState::default().with_search(Some("x")));
        assert_eq!(sync.location().to_string(), "/users?search=x");
    }

    #[test]
    fn server_context_never_touches_cache() {
        let store = Arc::new(MemoryStore::new());
        store
            .set("page_state_clients", &json!({"page": 7}).to_string())
            .unwrap();
        let sync = PageStateSync::new(RenderContext::Server, Location::parse("/clients"), store.clone());
        let key = sync.route_key();

        assert_eq!(sync.get_state(&key).page, 1);
        sync.save_state(&key, &PageState { page: 2, ..PageState::default() });
        assert_eq!(
            store.get("page_state_clients").unwrap().as_deref(),
            Some(json!({"page": 7}).to_string().as_str())
        );
        assert_eq!(sync.location().to_string(), "/clients?page=2");
    }

    #[test]
    fn malformed_cache_is_ignored() {
        let (sync, store) = client_sync("/clients");
        store.set("page_state_clients", "{not json").unwrap();
        assert_eq!(sync.get_state(&sync.route_key()), PageState::default());
    }

    #[test]
    fn clear_state_strips_query_and_cache() {
        let (sync, store) = client_sync("/clients?page=2");
        let key = sync.route_key();
        sync.save_state(&key, &PageState { page: 2, ..PageState::default() });
        sync.clear_state(&key);
        assert_eq!(sync.location().to_string(), "/clients");
        assert_eq!(store.get("page_state_clients").unwrap(), None);
    }
}

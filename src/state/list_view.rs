//! A paginated, searchable list bound to one route.
//!
//! Every event follows the same path: compute the next [`PageState`],
//! persist it through the [`PageStateSync`], then reload through the CRUD
//! client's `search`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::debug;

use super::location::{Location, RouteKey};
use super::page_state::{PageState, PagerEvent};
use super::sync::PageStateSync;
use crate::crud::{CrudClient, PaginatedList};
use crate::errors::ConfigError;
use crate::http::{Outcome, RequestOptions};

pub type ListOutcome<T> = Result<Outcome<PaginatedList<T>>, ConfigError>;

pub struct ListView<T> {
    route_key: RouteKey,
    sync: Arc<PageStateSync>,
    client: CrudClient,
    options: RequestOptions,
    data: watch::Sender<Option<PaginatedList<T>>>,
}

impl<T> ListView<T>
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    /// Bind to the route of the synchronizer's current location.
    pub fn new(sync: Arc<PageStateSync>, client: CrudClient) -> Self {
        let (data, _rx) = watch::channel(None);
        Self {
            route_key: sync.route_key(),
            sync,
            client,
            options: RequestOptions::new(),
            data,
        }
    }

    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn route_key(&self) -> &RouteKey {
        &self.route_key
    }

    pub fn location(&self) -> Location {
        self.sync.location()
    }

    pub fn state(&self) -> PageState {
        self.sync.get_state(&self.route_key)
    }

    pub fn client(&self) -> &CrudClient {
        &self.client
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<PaginatedList<T>>> {
        self.data.subscribe()
    }

    /// Latest successfully loaded page.
    pub fn current(&self) -> Option<PaginatedList<T>> {
        self.data.borrow().clone()
    }

    /// First load. A URL that carries state is mirrored into the cache so
    /// later visits without a query resume from it.
    pub async fn activate(&self) -> ListOutcome<T> {
        if !self.sync.location().query().is_empty() {
            let state = self.state();
            self.sync.save_state(&self.route_key, &state);
        }
        self.reload().await
    }

    pub async fn on_search(&self, text: Option<&str>) -> ListOutcome<T> {
        self.apply(self.state().with_search(text)).await
    }

    pub async fn on_status_filter(&self, status: Option<&str>) -> ListOutcome<T> {
        self.apply(self.state().with_status_filter(status)).await
    }

    pub async fn on_sort(&self, field: &str) -> ListOutcome<T> {
        self.apply(self.state().with_sort_click(field)).await
    }

    pub async fn on_page_change(&self, event: PagerEvent) -> ListOutcome<T> {
        self.apply(self.state().with_pager(event)).await
    }

    /// Drop URL and cached state, then reload from defaults.
    pub async fn reset(&self) -> ListOutcome<T> {
        self.sync.clear_state(&self.route_key);
        self.reload().await
    }

    /// Back/forward navigation. Returns `None` when the new URL describes
    /// the state already shown.
    pub async fn on_location_change(&self, location: Location) -> Result<Option<Outcome<PaginatedList<T>>>, ConfigError> {
        let current = self.state();
        let target = PageState::default().overlay(location.page_state());
        self.sync.navigate(location);
        if target == current {
            debug!(route = %self.route_key, "location change without state change");
            return Ok(None);
        }
        self.sync.save_state(&self.route_key, &target);
        self.reload().await.map(Some)
    }

    /// Load the page described by the current state.
    pub async fn reload(&self) -> ListOutcome<T> {
        let params = self.state().to_search_params();
        let outcome = self.client.search::<T>(&params, &self.options).await?;
        if let Outcome::Completed(list) = &outcome {
            self.data.send_replace(Some(list.clone()));
        }
        Ok(outcome)
    }

    /// Persist `next` as the list's state and reload. Callers that combine
    /// several transitions use this to issue a single request.
    pub async fn apply(&self, next: PageState) -> ListOutcome<T> {
        self.sync.save_state(&self.route_key, &next);
        self.reload().await
    }
}

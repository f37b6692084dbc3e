//! Page-state handling shared by `users list` and `clients list`.

use std::sync::Arc;

use anyhow::Result;
use serde::de::DeserializeOwned;

use adminhub::crud::{CrudClient, PaginatedList};
use adminhub::state::page_state::DEFAULT_SIZE;
use adminhub::state::{ListView, Location, PageState, PageStateSync, PagerEvent, RenderContext};

use super::{App, completed};
use crate::ListArgs;

/// One loaded page plus where it lives.
pub struct ListPage<T> {
    pub list: PaginatedList<T>,
    pub location: Location,
    pub state: PageState,
}

/// Load `default_path` (or `--at`) with the flags applied as list events.
pub async fn load_list<T>(
    app: &App,
    default_path: &str,
    crud: CrudClient,
    args: &ListArgs,
    what: &str,
) -> Result<ListPage<T>>
where
    T: DeserializeOwned + Clone + Send + Sync,
{
    let location = Location::parse(args.at.as_deref().unwrap_or(default_path));
    let sync = Arc::new(PageStateSync::new(
        RenderContext::Client,
        location,
        app.page_cache.clone(),
    ));
    let view = ListView::<T>::new(sync, crud);
    let spinner = app.spinner(&format!("Loading {}...", what));

    let outcome = if args.reset {
        view.reset().await?
    } else {
        match next_state(&view.state(), args, app.config.default_page_size()) {
            Some(next) => view.apply(next).await?,
            None => view.activate().await?,
        }
    };
    spinner.stop();

    let list = completed(outcome)?;
    Ok(ListPage {
        list,
        location: view.location(),
        state: view.state(),
    })
}

/// Fold the list flags into one state transition. `None` when no flag
/// changes anything.
pub fn next_state(current: &PageState, args: &ListArgs, default_rows: u32) -> Option<PageState> {
    let mut next = current.clone();

    if let Some(text) = &args.search {
        next = next.with_search(Some(text));
    }
    if let Some(status) = &args.status {
        next = next.with_status_filter(Some(status));
    }
    if let Some(field) = &args.sort {
        next = next.with_sort_click(field);
    }
    if args.page_index.is_some() || args.rows.is_some() {
        next = next.with_pager(PagerEvent {
            page_index: args
                .page_index
                .unwrap_or_else(|| next.page.saturating_sub(1)),
            rows: args.rows.or(Some(next.size)),
        });
    } else if next.size == DEFAULT_SIZE && default_rows != DEFAULT_SIZE {
        next.size = default_rows;
    }

    (next != *current).then_some(next)
}

/// Footer printed under every list.
pub fn print_footer<T>(page: &ListPage<T>) {
    let list = &page.list;
    println!();
    println!(
        "Page {} of {} ({} total)",
        list.page_number.max(page.state.page),
        list.total_pages.max(1),
        list.total_items
    );
    if let Some(search) = &page.state.search {
        println!("Search: {}", search);
    }
    if let Some(sort) = &page.state.sort {
        println!("Sorted by: {} ({:?})", sort.field, sort.direction);
    }
    println!("Location: {}", page.location);
}

//! Page-state synchronizer.
//!
//! | Module       | Purpose                                              |
//! |--------------|------------------------------------------------------|
//! | `page_state` | `PageState` and its event transitions                |
//! | `location`   | URL stand-in, route keys, lenient query parsing      |
//! | `storage`    | Session and durable key-value stores                 |
//! | `sync`       | URL + session cache persistence                      |
//! | `list_view`  | Event → persist → reload loop for one list           |

pub mod list_view;
pub mod location;
pub mod page_state;
pub mod storage;
pub mod sync;

pub use list_view::ListView;
pub use location::{Location, RouteKey};
pub use page_state::{PageState, PagerEvent, PartialPageState, Sort, SortDirection};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use sync::{PageStateSync, RenderContext};

pub mod icons;
pub mod progress;
pub mod table;

pub use progress::LoadingSpinner;
pub use table::Table;

//! Marketplace catalog module.
//!
//! Contains the category tree, ads and user engagement records.

mod ad;
mod category;
mod engagement;
mod events;
mod tree;

pub use ad::{Ad, AdType, NewAd};
pub use category::{Category, NewCategory, Status};
pub use engagement::{
    favorite_counts, Favorite, FavoriteToggle, Report, ReportCategory, UserCategoryFilter,
    MAX_REPORT_DESCRIPTION,
};
pub(crate) use engagement::pair_key;
pub use events::{CategoryVersion, TreeEvent, TreeListener};
pub use tree::CategoryTree;

/// Current Unix timestamp in seconds.
pub fn current_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

use serde::{Deserialize, Serialize};

use crate::content::ContentItem;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Sort by date, in descending order (newest to oldest).
    #[default]
    Date,
}

/// Sorts the given items, breaking ties by file path.
pub fn sort_items_by(sort_by: SortBy, items: &mut [ContentItem]) {
    items.sort_unstable_by(|a, b| {
        let ord = match sort_by {
            SortBy::Date => b.date.cmp(&a.date),
        };

        ord.then_with(|| a.file.path.cmp(&b.file.path))
    });
}

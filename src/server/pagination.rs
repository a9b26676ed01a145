use serde::Deserialize;

use super::deserializers::deserialize_page;

pub const QUESTIONS_PER_PAGE: usize = 10;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page", deserialize_with = "deserialize_page")]
    pub page: i64,
}

fn first_page() -> i64 {
    1
}

/// Returns the 1-based `page` of `items`. Pages outside the data, including
/// anything below 1, are empty rather than an error.
pub fn paginate<T>(items: Vec<T>, page: i64) -> Vec<T> {
    let Some(skipped_pages) = page.checked_sub(1).and_then(|p| usize::try_from(p).ok()) else {
        return Vec::new();
    };

    items
        .into_iter()
        .skip(skipped_pages.saturating_mul(QUESTIONS_PER_PAGE))
        .take(QUESTIONS_PER_PAGE)
        .collect()
}

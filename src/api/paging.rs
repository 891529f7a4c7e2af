//! Query parameters and response shape shared by paginated listings.
//!
//! A page is returned as a plain JSON array whose items each carry the
//! pagination metadata next to their own fields.

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::domain::PageRequest;
use crate::services::SearchPage;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// 1-based page, defaults to 1
    pub page_number: Option<i64>,
    /// Page size, defaults to the configured size
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn request(&self, default_page_size: i64) -> PageRequest {
        PageRequest::new(
            self.page_number.unwrap_or(1),
            self.limit.unwrap_or(default_page_size),
        )
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedItem<T> {
    #[serde(flatten)]
    pub item: T,
    pub total_pages: i64,
    pub count: u64,
    pub page_number: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories_found: Option<Vec<String>>,
}

/// Copies the page metadata onto every item.
pub fn spread<T>(page: SearchPage<T>) -> Vec<PagedItem<T>> {
    let SearchPage {
        items,
        total_pages,
        count,
        page,
        facets,
    } = page;

    items
        .into_iter()
        .map(|item| PagedItem {
            item,
            total_pages,
            count,
            page_number: page,
            categories_found: facets.clone(),
        })
        .collect()
}

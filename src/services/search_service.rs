//! Search Service - paginated catalog listings
//!
//! Every listing counts first, derives its page window from that count, and
//! only then fetches the window with the same predicate.

use serde::Serialize;

use crate::domain::{
    paginate, CollectionFilter, CollectionOrder, CollectionRepository, DomainError, PageRequest,
    VolumeFetch, VolumeRepository, VolumeView,
};
use crate::models::collection;

/// The supported collection searches
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCriteria {
    /// Title prefix, with category facets
    TitlePrefix(String),
    CategorySlug(String),
    /// Title prefix restricted to a set of category names
    TitleInCategories {
        title_prefix: String,
        category_names: Vec<String>,
    },
    /// Homepage carousel for one category
    CarouselCategory(String),
    /// Homepage carousel of the latest releases
    Newest,
}

impl SearchCriteria {
    /// Builds the combined search from a comma-separated list of category names.
    pub fn title_in_categories(title_prefix: impl Into<String>, raw_names: &str) -> Self {
        SearchCriteria::TitleInCategories {
            title_prefix: title_prefix.into(),
            category_names: split_category_names(raw_names),
        }
    }

    /// Carousels wrap out-of-range pages; searches do not.
    pub fn clamps(&self) -> bool {
        matches!(
            self,
            SearchCriteria::CarouselCategory(_) | SearchCriteria::Newest
        )
    }

    pub fn filter(&self) -> CollectionFilter {
        match self {
            SearchCriteria::TitlePrefix(title) => CollectionFilter {
                title_prefix: Some(title.clone()),
                ..Default::default()
            },
            SearchCriteria::CategorySlug(slug) | SearchCriteria::CarouselCategory(slug) => {
                CollectionFilter {
                    category_slug: Some(slug.clone()),
                    ..Default::default()
                }
            }
            SearchCriteria::TitleInCategories {
                title_prefix,
                category_names,
            } => CollectionFilter {
                title_prefix: Some(title_prefix.clone()),
                category_names: Some(category_names.clone()),
                ..Default::default()
            },
            SearchCriteria::Newest => CollectionFilter {
                order: CollectionOrder::NewestRelease,
                ..Default::default()
            },
        }
    }
}

/// Splits `"Shonen, Seinen,,Shonen"` into `["Shonen", "Seinen"]`.
pub fn split_category_names(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// One page of a listing with its pagination metadata
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage<T> {
    pub items: Vec<T>,
    pub total_pages: i64,
    pub count: u64,
    /// Page actually served
    pub page: i64,
    /// Distinct category names of the title matches, for title-only searches
    pub facets: Option<Vec<String>>,
}

pub async fn search_collections(
    repo: &dyn CollectionRepository,
    criteria: &SearchCriteria,
    request: PageRequest,
) -> Result<SearchPage<collection::Model>, DomainError> {
    let filter = criteria.filter();

    let count = repo.count(&filter).await?;
    let window = paginate(count, request.limit, request.page, criteria.clamps())?;
    let items = repo.find_window(&filter, &window).await?;

    let facets = match criteria {
        SearchCriteria::TitlePrefix(title) => Some(repo.category_names_for_title(title).await?),
        _ => None,
    };

    tracing::debug!(
        "Collection search {:?}: page {}/{} ({} matches)",
        criteria,
        window.page,
        window.total_pages,
        count
    );

    Ok(SearchPage {
        items,
        total_pages: window.total_pages,
        count,
        page: window.page,
        facets,
    })
}

/// Volumes of one edition by tome number, each with its edition, collection, author and editor.
pub async fn volumes_in_edition(
    repo: &dyn VolumeRepository,
    collection_slug: &str,
    edition_slug: &str,
    request: PageRequest,
) -> Result<SearchPage<VolumeView>, DomainError> {
    let count = repo.count_in_edition(collection_slug, edition_slug).await?;
    let window = paginate(count, request.limit, request.page, false)?;
    let volumes = repo
        .find_window_in_edition(collection_slug, edition_slug, &window)
        .await?;
    let items = repo.load_context(volumes, VolumeFetch::Contributors).await?;

    Ok(SearchPage {
        items,
        total_pages: window.total_pages,
        count,
        page: window.page,
        facets: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_category_names_trims_and_dedups() {
        assert_eq!(
            split_category_names(" Shonen, Seinen,,Shonen , "),
            vec!["Shonen".to_string(), "Seinen".to_string()]
        );
        assert!(split_category_names(" , ").is_empty());
    }

    #[test]
    fn test_only_carousels_clamp() {
        assert!(SearchCriteria::Newest.clamps());
        assert!(SearchCriteria::CarouselCategory("shonen".into()).clamps());
        assert!(!SearchCriteria::CategorySlug("shonen".into()).clamps());
        assert!(!SearchCriteria::TitlePrefix("Nar".into()).clamps());
    }

    #[test]
    fn test_combined_search_filter() {
        let filter = SearchCriteria::title_in_categories("One", "Shonen,Seinen").filter();
        assert_eq!(filter.title_prefix.as_deref(), Some("One"));
        assert_eq!(
            filter.category_names,
            Some(vec!["Shonen".to_string(), "Seinen".to_string()])
        );
        assert!(filter.category_slug.is_none());
    }

    #[test]
    fn test_newest_orders_by_release() {
        assert_eq!(
            SearchCriteria::Newest.filter().order,
            CollectionOrder::NewestRelease
        );
    }
}

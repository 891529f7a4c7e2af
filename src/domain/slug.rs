//! URL-safe identifiers derived from titles and names.
//!
//! Slugs are computed once when an entity is created. On update they are
//! recomputed only when the source field is present in the patch and differs
//! from the stored value. Uniqueness is left to the database.

/// Trims, lowercases, and collapses every whitespace run into one hyphen.
pub fn slugify(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Author slugs join the slugified name and surname with a hyphen.
pub fn author_slug(name: &str, surname: &str) -> String {
    format!("{}-{}", slugify(name), slugify(surname))
}

/// Slug to store after applying a patch whose source field is `incoming`.
pub fn resolve_slug(current_value: &str, current_slug: &str, incoming: Option<&str>) -> String {
    match incoming {
        Some(value) if value != current_value => slugify(value),
        _ => current_slug.to_string(),
    }
}

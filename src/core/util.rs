//! Generic utilities used across core modules.

/// Filter items by case-insensitive query matching on any of the fields returned by
/// `get_fields`. Returns all items when the query is blank.
pub fn filter_by_query<'a, T, F, const N: usize>(
    items: impl IntoIterator<Item = &'a T>,
    query: &str,
    get_fields: F,
) -> Vec<&'a T>
where
    T: 'a,
    F: Fn(&'a T) -> [&'a str; N],
{
    let q = query.trim().to_lowercase();
    items
        .into_iter()
        .filter(|item| q.is_empty() || get_fields(*item).iter().any(|f| contains_ci(f, &q)))
        .collect()
}

/// Case-insensitive substring test. `needle_lower` must already be lowercase.
pub fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

/// Collapse every whitespace run to a single space.
pub fn squash_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

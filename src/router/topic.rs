//! Topic matching
//!
//! Filters and topic names are compared level by level after splitting on
//! `/`. `+` stands in for exactly one level and `#` for every remaining
//! level, including none. A shared subscription filter
//! (`$share/<group>/<filter>`) is matched on its embedded `<filter>`.

const SHARE_PREFIX: &str = "$share/";

/// Returns true when a message published on `topic` is delivered to `filter`.
///
/// A literal comparison against the raw filter is tried first; only on a
/// miss are the levels compared.
pub fn matches(filter: &str, topic: &str) -> bool {
    filter == topic || route_includes_topic(filter, topic)
}

/// Level-by-level comparison with the share prefix already removed.
pub fn route_includes_topic(filter: &str, topic: &str) -> bool {
    let filter = split_filter(filter);
    let topic: Vec<&str> = topic.split('/').collect();
    match_levels(&filter, &topic)
}

/// Splits a filter into levels, dropping `$share/<group>` if present.
pub fn split_filter(filter: &str) -> Vec<&str> {
    match filter.strip_prefix(SHARE_PREFIX) {
        Some(shared) => match shared.split_once('/') {
            Some((_group, rest)) => rest.split('/').collect(),
            None => Vec::new(),
        },
        None => filter.split('/').collect(),
    }
}

fn match_levels(filter: &[&str], topic: &[&str]) -> bool {
    match (filter, topic) {
        ([], []) => true,
        ([], _) => false,
        (["#", ..], _) => true,
        (_, []) => false,
        ([f, filter_rest @ ..], [t, topic_rest @ ..]) if *f == "+" || f == t => {
            match_levels(filter_rest, topic_rest)
        }
        _ => false,
    }
}

//! Core type definitions for search requests

/// Which search filter a parameter value applies to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SearchKey {
    Genre,
    Limit,
    Query,
}

impl SearchKey {
    /// Query-string name the API expects for this key
    pub fn query_name(self) -> &'static str {
        match self {
            SearchKey::Genre => "genres",
            SearchKey::Limit => "limit",
            SearchKey::Query => "q",
        }
    }
}

/// Translate search parameters into query-string pairs, keeping their order.
pub fn to_query_pairs<I, V>(parameters: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (SearchKey, V)>,
    V: Into<String>,
{
    parameters
        .into_iter()
        .map(|(key, value)| (key.query_name().to_string(), value.into()))
        .collect()
}

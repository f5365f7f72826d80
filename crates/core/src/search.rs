use serde::{Deserialize, Serialize};

/// Ranked web-search output, tagged with the query that produced it so
/// extractors can recover the request subject.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub content: String,
}

impl SearchResponse {
    pub fn new(query: impl Into<String>, results: Vec<SearchHit>) -> Self {
        Self { query: query.into(), results }
    }

    /// Stand-in used when the search service failed for `query`.
    pub fn empty(query: impl Into<String>) -> Self {
        Self { query: query.into(), results: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Snippet text in the order the service ranked it.
    pub fn snippets(&self) -> impl Iterator<Item = &str> {
        self.results.iter().map(|hit| hit.content.as_str())
    }
}

impl SearchHit {
    pub fn new(title: impl Into<String>, url: impl Into<String>, content: impl Into<String>) -> Self {
        Self { title: title.into(), url: url.into(), content: content.into() }
    }

    pub fn snippet(content: impl Into<String>) -> Self {
        Self { content: content.into(), ..Self::default() }
    }
}

//! Latest article lists and the read-only queries over them

use crate::article::Article;

/// The two article lists kept by the client
///
/// Each list is replaced wholesale whenever a message carries it; nothing is
/// merged or deduplicated.
#[derive(Debug, Clone, Default)]
pub struct NewsCache {
    all: Vec<Article>,
    breaking: Vec<Article>,
}

impl NewsCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&mut self, articles: Vec<Article>) {
        self.all = articles;
    }

    pub fn replace_breaking(&mut self, articles: Vec<Article>) {
        self.breaking = articles;
    }

    pub fn all(&self) -> &[Article] {
        &self.all
    }

    pub fn breaking(&self) -> &[Article] {
        &self.breaking
    }
}

/// Articles whose category equals `category` exactly
pub fn by_category(articles: &[Article], category: &str) -> Vec<Article> {
    articles
        .iter()
        .filter(|article| article.category == category)
        .cloned()
        .collect()
}

/// Articles whose sentiment equals `sentiment` exactly
pub fn by_sentiment(articles: &[Article], sentiment: &str) -> Vec<Article> {
    articles
        .iter()
        .filter(|article| article.sentiment == sentiment)
        .cloned()
        .collect()
}

pub fn high_priority(articles: &[Article]) -> Vec<Article> {
    articles
        .iter()
        .filter(|article| article.is_high_priority())
        .cloned()
        .collect()
}

/// Case-insensitive substring search over title, description and source
///
/// An empty query matches every article.
pub fn search(articles: &[Article], query: &str) -> Vec<Article> {
    let needle = query.to_lowercase();
    articles
        .iter()
        .filter(|article| article.matches_lowercase(&needle))
        .cloned()
        .collect()
}

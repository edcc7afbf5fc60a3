//! News article as delivered by the live news feed

use serde::{Deserialize, Deserializer, Serialize};

/// Articles at or above this priority are considered high priority
pub const HIGH_PRIORITY_THRESHOLD: i64 = 3;

/// A single news article
///
/// Field names follow the feed's JSON, where a few keys are camelCase.
/// Missing or `null` fields decode to their defaults so one sloppy article
/// does not drop a whole batch.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Article {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    /// Publication time as sent by the server (not parsed)
    #[serde(rename = "publishedAt", default, deserialize_with = "null_as_default")]
    pub published_at: String,
    #[serde(rename = "urlToImage", default, skip_serializing_if = "Option::is_none")]
    pub url_to_image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sentiment: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub relevance_score: f64,
    #[serde(rename = "isBreaking", default, deserialize_with = "null_as_default")]
    pub is_breaking: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: i64,
}

impl Article {
    #[inline]
    pub fn is_high_priority(&self) -> bool {
        self.priority >= HIGH_PRIORITY_THRESHOLD
    }

    /// Substring match over title, description and source
    ///
    /// `needle` must already be lowercase.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        [&self.title, &self.description, &self.source]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

//! Trait definition and types for metadata providers.
//!
//! A [`MetadataProvider`] turns a movie title into a [`MovieRecord`]. Lookups
//! never fail outward: every fault inside a provider is logged and reported
//! to the caller as `None`.

use async_trait::async_trait;
use cinelog_db::NewMovie;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Normalized movie metadata as returned by a provider.
///
/// Ownership passes to the caller, which may store it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub title: String,
    pub year: i32,
    pub director: String,
    pub genre: String,
    pub poster_url: String,
    pub plot: String,
    /// Always finite and non-negative; 0.0 when no usable rating was found.
    pub rating: f64,
}

impl From<MovieRecord> for NewMovie {
    fn from(record: MovieRecord) -> Self {
        NewMovie {
            movie_name: record.title,
            year: record.year,
            director: record.director,
            genre: record.genre,
            poster_url: record.poster_url,
            plot: record.plot,
            imdb_rating: record.rating,
        }
    }
}

/// One entry of a payload's rating list, e.g. `{"Source": "Internet Movie
/// Database", "Value": "8.3/10"}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RatingEntry {
    #[serde(rename = "Source")]
    pub source: String,
    #[serde(rename = "Value")]
    pub value: String,
}

impl RatingEntry {
    pub fn new(source: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            value: value.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

/// A source of movie metadata looked up by title.
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Short, lowercase identifier for this provider (e.g. `"omdb"`).
    fn name(&self) -> &'static str;

    /// Returns `true` when a credential is configured. Lookups are still
    /// attempted without one; the remote service decides.
    fn is_available(&self) -> bool;

    /// Look a movie up by title.
    ///
    /// `None` covers every unsuccessful outcome (network fault, not found,
    /// unusable payload); the reason is only visible in the logs.
    async fn lookup_movie(&self, title: &str) -> Option<MovieRecord>;
}

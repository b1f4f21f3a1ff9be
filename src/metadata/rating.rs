//! Rating extraction from a payload's list of rating sources.

use tracing::debug;

use super::provider::RatingEntry;

/// Rating source whose score becomes [`MovieRecord::rating`](super::MovieRecord::rating).
pub const IMDB_SOURCE: &str = "Internet Movie Database";

/// Extract the IMDb score from `ratings`.
///
/// The first entry whose source is [`IMDB_SOURCE`] wins; its value
/// (`"<numerator>/<denominator>"`) is parsed up to the `/`. Anything unusable
/// (no IMDb entry, empty list, non-numeric score) yields `0.0`.
///
/// # Examples
///
/// ```
/// use cinelog::metadata::{extract_rating, RatingEntry};
///
/// let ratings = vec![
///     RatingEntry::new("Rotten Tomatoes", "91%"),
///     RatingEntry::new("Internet Movie Database", "9.3/10"),
/// ];
/// assert_eq!(extract_rating(&ratings), 9.3);
/// assert_eq!(extract_rating(&[]), 0.0);
/// ```
pub fn extract_rating(ratings: &[RatingEntry]) -> f64 {
    match ratings.iter().find(|r| r.source == IMDB_SOURCE) {
        Some(entry) => parse_rating_value(&entry.value).unwrap_or_else(|| {
            debug!(value = %entry.value, "Unparseable IMDb rating, using 0.0");
            0.0
        }),
        None => {
            debug!(sources = ratings.len(), "No IMDb rating found, using 0.0");
            0.0
        }
    }
}

/// Parse the numerator of a `"8.3/10"` style score.
fn parse_rating_value(value: &str) -> Option<f64> {
    let numerator = value.split('/').next()?.trim();
    numerator
        .parse::<f64>()
        .ok()
        .filter(|r| r.is_finite() && *r >= 0.0)
        // "-0/10" passes the filter; store it as a plain zero
        .map(|r| r + 0.0)
}

//! OMDb (The Open Movie Database) metadata provider.
//!
//! Looks movies up by title via `GET {base}/?t=<title>&apikey=<key>`.
//!
//! - 10-second timeout per attempt.
//! - HTTP 500 is retried with exponential backoff ([`RetryPolicy`]); every
//!   other failure ends the lookup immediately.
//! - Failures never escape: [`OmdbProvider::fetch_movie_info`] returns an
//!   empty map and [`OmdbProvider::get_new_movie_data`] returns `None`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::OmdbConfig;
use crate::metadata::provider::{MetadataProvider, MovieRecord, RatingEntry};
use crate::metadata::rating::extract_rating;
use crate::metadata::retry::RetryPolicy;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const OMDB_BASE_URL: &str = "https://www.omdbapi.com";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Environment variable consulted when no key is configured.
pub const API_KEY_ENV: &str = "OMDB_API_KEY";

/// Raw decoded payload.
pub type MovieInfo = Map<String, Value>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a single lookup produced no payload.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP 500; the only retried failure.
    #[error("server error (HTTP 500)")]
    ServerError,

    #[error("retries exhausted after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    #[error("name resolution failed: {0}")]
    NameResolution(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("malformed response body: {0}")]
    Decode(String),

    #[error("HTTP error status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Request(String),

    /// Valid payload carrying the API's "no result" marker.
    #[error("not found: {0}")]
    NotFound(String),
}

impl FetchError {
    fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout)
        } else if err.is_connect() {
            if is_name_resolution(&err) {
                Self::NameResolution(err.to_string())
            } else {
                Self::Connect(err.to_string())
            }
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

/// Whether a connect error was caused by DNS resolution.
fn is_name_resolution(err: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        let msg = e.to_string().to_ascii_lowercase();
        if msg.contains("dns error") || msg.contains("failed to lookup address") {
            return true;
        }
        source = e.source();
    }
    false
}

/// Why a payload could not become a [`MovieRecord`].
#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("field {field} has unexpected type, expected {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Year {0:?} is not an integer")]
    InvalidYear(String),
}

// ---------------------------------------------------------------------------
// Provider implementation
// ---------------------------------------------------------------------------

/// OMDb metadata provider.
///
/// # Examples
///
/// ```no_run
/// use cinelog::config::OmdbConfig;
/// use cinelog::metadata::providers::OmdbProvider;
///
/// # async fn run() {
/// let provider = OmdbProvider::new(&OmdbConfig::default());
/// if let Some(movie) = provider.get_new_movie_data("The Matrix").await {
///     println!("{} ({}) rated {}", movie.title, movie.year, movie.rating);
/// }
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct OmdbProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl OmdbProvider {
    pub fn new(config: &OmdbConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
            timeout: config.timeout(),
            retry: config.retry_policy(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Key used for the next request: configured value first, then the
    /// environment. Resolved per call so a key exported after start-up is
    /// picked up.
    fn api_key(&self) -> String {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .unwrap_or_default()
    }

    fn request_url(&self, movie_name: &str) -> String {
        format!(
            "{}/?t={}&apikey={}",
            self.base_url,
            urlencoded(movie_name),
            urlencoded(&self.api_key())
        )
    }

    /// Fetch the raw payload for `movie_name`.
    ///
    /// Returns an empty map on every failure; the cause is logged.
    pub async fn fetch_movie_info(&self, movie_name: &str) -> MovieInfo {
        match self.try_fetch(movie_name).await {
            Ok(info) => info,
            Err(FetchError::NotFound(reason)) => {
                info!(title = %movie_name, reason = %reason, "OMDb has no match");
                Map::new()
            }
            Err(e) => {
                warn!(title = %movie_name, error = %e, "OMDb lookup failed");
                Map::new()
            }
        }
    }

    /// Retry loop around [`Self::attempt`]; only [`FetchError::ServerError`]
    /// loops.
    async fn try_fetch(&self, movie_name: &str) -> Result<MovieInfo, FetchError> {
        let url = self.request_url(movie_name);
        let mut attempt = 1;
        loop {
            debug!(title = %movie_name, attempt, "Requesting OMDb");
            match self.attempt(&url).await {
                Err(FetchError::ServerError) if self.retry.allows_retry_after(attempt) => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        title = %movie_name,
                        attempt,
                        delay = ?delay,
                        "OMDb returned 500, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(FetchError::ServerError) => {
                    return Err(FetchError::RetriesExhausted { attempts: attempt })
                }
                other => return other,
            }
        }
    }

    async fn attempt(&self, url: &str) -> Result<MovieInfo, FetchError> {
        let resp = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout))?;

        let status = resp.status();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            return Err(FetchError::ServerError);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout))?;

        parse_payload(&body)
    }

    /// Look `movie_name` up and normalize the payload into a [`MovieRecord`].
    ///
    /// Spaces in the title are sent as `+`. Returns `None` when the lookup
    /// produced nothing or the payload could not be normalized.
    pub async fn get_new_movie_data(&self, movie_name: &str) -> Option<MovieRecord> {
        if movie_name.trim().is_empty() {
            warn!("Refusing OMDb lookup for an empty title");
            return None;
        }

        let query = query_title(movie_name);
        let info = self.fetch_movie_info(&query).await;
        if info.is_empty() {
            return None;
        }

        match normalize(&info) {
            Ok(record) => {
                debug!(title = %record.title, year = record.year, rating = record.rating, "OMDb record");
                Some(record)
            }
            Err(e) => {
                warn!(title = %movie_name, error = %e, "Discarding OMDb payload");
                None
            }
        }
    }
}

#[async_trait]
impl MetadataProvider for OmdbProvider {
    fn name(&self) -> &'static str {
        "omdb"
    }

    fn is_available(&self) -> bool {
        !self.api_key().is_empty()
    }

    async fn lookup_movie(&self, title: &str) -> Option<MovieRecord> {
        self.get_new_movie_data(title).await
    }
}

// ---------------------------------------------------------------------------
// Payload handling
// ---------------------------------------------------------------------------

/// Title as the API expects it: spaces become `+`.
pub fn query_title(movie_name: &str) -> String {
    movie_name.replace(' ', "+")
}

/// Percent-encoding for query values. `+` passes through because it already
/// stands for a space.
fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'+' => {
                out.push(b as char);
            }
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

const HEX: [u8; 16] = *b"0123456789ABCDEF";

/// Decode a 2xx body, separating the not-found marker from real payloads.
fn parse_payload(body: &str) -> Result<MovieInfo, FetchError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    let Value::Object(info) = value else {
        return Err(FetchError::Decode("expected a JSON object".into()));
    };

    if info.get("Response").and_then(Value::as_str) == Some("False") {
        let reason = info
            .get("Error")
            .and_then(Value::as_str)
            .unwrap_or("no reason given");
        return Err(FetchError::NotFound(reason.to_string()));
    }

    Ok(info)
}

/// Build a [`MovieRecord`] from a decoded payload.
///
/// `Title` and `Year` are required; `Year` must be an integer. The other
/// text fields default to empty strings.
pub fn normalize(info: &MovieInfo) -> Result<MovieRecord, NormalizeError> {
    let title = match info.get("Title") {
        None | Some(Value::Null) => return Err(NormalizeError::MissingField("Title")),
        Some(_) => text_field(info, "Title")?,
    };

    // Entries without string Source/Value keys are skipped.
    let ratings: Vec<RatingEntry> = match info.get("Ratings") {
        Some(Value::Array(entries)) => entries
            .iter()
            .filter_map(|e| serde_json::from_value::<RatingEntry>(e.clone()).ok())
            .collect(),
        _ => Vec::new(),
    };

    Ok(MovieRecord {
        title,
        year: year_field(info)?,
        director: text_field(info, "Director")?,
        genre: text_field(info, "Genre")?,
        poster_url: text_field(info, "Poster")?,
        plot: text_field(info, "Plot")?,
        rating: extract_rating(&ratings),
    })
}

fn text_field(info: &MovieInfo, field: &'static str) -> Result<String, NormalizeError> {
    match info.get(field) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(v.to_string()),
        Some(_) => Err(NormalizeError::WrongType {
            field,
            expected: "string",
        }),
    }
}

fn year_field(info: &MovieInfo) -> Result<i32, NormalizeError> {
    match info.get("Year") {
        None | Some(Value::Null) => Err(NormalizeError::MissingField("Year")),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i32>()
            .map_err(|_| NormalizeError::InvalidYear(s.clone())),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|y| i32::try_from(y).ok())
            .ok_or_else(|| NormalizeError::InvalidYear(n.to_string())),
        Some(_) => Err(NormalizeError::WrongType {
            field: "Year",
            expected: "integer",
        }),
    }
}

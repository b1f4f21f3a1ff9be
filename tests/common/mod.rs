//! Shared test harness for integration tests.
//!
//! [`TestHarness`] wires an in-memory database and an OMDb provider pointed
//! at a [`MockServer`] into a full [`AppContext`]. [`TestHarness::with_server`]
//! additionally starts Axum on a random port.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use cinelog::config::OmdbConfig;
use cinelog::metadata::OmdbProvider;
use cinelog::server::{create_router, AppContext};
use cinelog_common::UserId;
use cinelog_db::pool::init_memory_pool;
use cinelog_db::{DataManager, NewUser, SqliteDataManager};
use serde_json::{json, Value};
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_API_KEY: &str = "test-key";

/// OMDb settings for a mock server: fixed key, fast backoff.
pub fn omdb_config(base_url: &str) -> OmdbConfig {
    OmdbConfig {
        base_url: base_url.to_string(),
        api_key: Some(TEST_API_KEY.to_string()),
        initial_delay_secs: 0.05,
        timeout_secs: 2,
        ..OmdbConfig::default()
    }
}

/// A successful OMDb payload.
pub fn movie_payload(title: &str, year: &str, imdb_rating: &str) -> Value {
    json!({
        "Title": title,
        "Year": year,
        "Rated": "R",
        "Director": "Some Director",
        "Genre": "Drama",
        "Poster": format!("https://img.example/{}.jpg", title.replace(' ', "_")),
        "Plot": format!("The plot of {title}."),
        "Ratings": [
            {"Source": "Internet Movie Database", "Value": format!("{imdb_rating}/10")},
            {"Source": "Rotten Tomatoes", "Value": "91%"}
        ],
        "Response": "True"
    })
}

pub fn shawshank_payload() -> Value {
    json!({
        "Title": "The Shawshank Redemption",
        "Year": "1994",
        "Director": "Frank Darabont",
        "Genre": "Drama",
        "Poster": "https://m.media-amazon.com/images/M/shawshank.jpg",
        "Plot": "Two imprisoned men bond over a number of years.",
        "Ratings": [
            {"Source": "Internet Movie Database", "Value": "9.3/10"},
            {"Source": "Rotten Tomatoes", "Value": "89%"},
            {"Source": "Metacritic", "Value": "82/100"}
        ],
        "imdbRating": "9.3",
        "Response": "True"
    })
}

pub fn not_found_payload() -> Value {
    json!({"Response": "False", "Error": "Movie not found!"})
}

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database and a mocked OMDb.
pub struct TestHarness {
    pub ctx: AppContext,
    pub data: Arc<SqliteDataManager>,
    pub omdb: MockServer,
}

impl TestHarness {
    pub async fn new() -> Self {
        let omdb = MockServer::start().await;
        let pool = init_memory_pool().expect("failed to create in-memory pool");
        let data = Arc::new(SqliteDataManager::new(pool));
        let provider = OmdbProvider::new(&omdb_config(&omdb.uri()));

        let ctx = AppContext::new(data.clone(), Arc::new(provider));
        Self { ctx, data, omdb }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new().await;
        let app = create_router(harness.ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (harness, addr)
    }

    pub fn create_user(&self, name: &str) -> UserId {
        self.data
            .add_user(NewUser {
                user_name: name.to_string(),
                avatar_url: None,
            })
            .expect("failed to create user")
            .id
    }

    /// Answer lookups for `title` with `payload`.
    pub async fn mock_title(&self, title: &str, payload: Value) {
        Mock::given(method("GET"))
            .and(query_param("t", title))
            .respond_with(ResponseTemplate::new(200).set_body_json(payload))
            .mount(&self.omdb)
            .await;
    }
}

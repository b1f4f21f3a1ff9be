//! Integration tests for the OMDb fetch, retry and normalization path.

mod common;

use std::time::{Duration, Instant};

use cinelog::config::OmdbConfig;
use cinelog::metadata::providers::omdb::API_KEY_ENV;
use cinelog::metadata::{MetadataProvider, OmdbProvider};
use common::{movie_payload, not_found_payload, omdb_config, shawshank_payload, TEST_API_KEY};
use serial_test::serial;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> OmdbProvider {
    OmdbProvider::new(&omdb_config(&server.uri()))
}

#[tokio::test]
async fn shawshank_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("t", "The Shawshank Redemption"))
        .and(query_param("apikey", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(shawshank_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let record = provider_for(&server)
        .get_new_movie_data("The Shawshank Redemption")
        .await
        .expect("record");

    assert_eq!(record.title, "The Shawshank Redemption");
    assert_eq!(record.year, 1994);
    assert_eq!(record.director, "Frank Darabont");
    assert_eq!(record.genre, "Drama");
    assert_eq!(record.rating, 9.3);
}

#[tokio::test]
async fn title_spaces_sent_as_plus() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("t", "The Matrix"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movie_payload(
            "The Matrix",
            "1999",
            "8.7",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let record = provider_for(&server).get_new_movie_data("The Matrix").await;
    assert_eq!(record.map(|r| r.year), Some(1999));

    let requests = server.received_requests().await.unwrap();
    let query = requests[0].url.query().unwrap_or_default().to_string();
    assert!(query.contains("t=The+Matrix"), "query was {query}");
}

#[tokio::test]
async fn reserved_characters_are_percent_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("t", "Tom & Jerry"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movie_payload(
            "Tom & Jerry",
            "2021",
            "5.2",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let record = provider_for(&server).get_new_movie_data("Tom & Jerry").await;
    assert_eq!(record.map(|r| r.title), Some("Tom & Jerry".to_string()));
}

#[tokio::test]
async fn recovers_after_two_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movie_payload(
            "Alien", "1979", "8.5",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = OmdbConfig {
        initial_delay_secs: 0.2,
        ..omdb_config(&server.uri())
    };
    let provider = OmdbProvider::new(&config);

    let start = Instant::now();
    let info = provider.fetch_movie_info("Alien").await;
    let elapsed = start.elapsed();

    assert_eq!(info.get("Title").and_then(|v| v.as_str()), Some("Alien"));
    // 200ms after the first failure, 400ms after the second, nothing after the success
    assert!(elapsed >= Duration::from_millis(600), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(800), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    assert_eq!(provider.retry_policy().max_attempts, 3);

    let info = provider.fetch_movie_info("Alien").await;
    assert!(info.is_empty());
    assert!(provider.get_new_movie_data("Alien").await.is_none());
}

#[tokio::test]
async fn exhausted_retries_skip_final_delay() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let config = OmdbConfig {
        initial_delay_secs: 0.2,
        ..omdb_config(&server.uri())
    };

    let start = Instant::now();
    assert!(OmdbProvider::new(&config)
        .fetch_movie_info("Alien")
        .await
        .is_empty());
    let elapsed = start.elapsed();

    // 200ms + 400ms; a third sleep would add another 800ms
    assert!(elapsed >= Duration::from_millis(600), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_millis(800), "elapsed {elapsed:?}");
}

#[tokio::test]
async fn single_attempt_policy_does_not_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let config = OmdbConfig {
        max_retries: 1,
        ..omdb_config(&server.uri())
    };
    let start = Instant::now();
    assert!(OmdbProvider::new(&config)
        .fetch_movie_info("Alien")
        .await
        .is_empty());
    assert!(start.elapsed() < Duration::from_millis(50));
}

#[tokio::test]
async fn other_error_statuses_are_not_retried() {
    for status in [404, 503] {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&server)
            .await;

        let info = provider_for(&server).fetch_movie_info("Alien").await;
        assert!(info.is_empty(), "status {status}");
    }
}

#[tokio::test]
async fn malformed_body_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .expect(1)
        .mount(&server)
        .await;

    assert!(provider_for(&server)
        .fetch_movie_info("Alien")
        .await
        .is_empty());
}

#[tokio::test]
async fn not_found_marker_yields_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(not_found_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    assert!(provider.lookup_movie("Nonexistent Film 12345").await.is_none());
}

#[tokio::test]
async fn range_year_discards_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(movie_payload(
            "Friends",
            "1994–2004",
            "8.9",
        )))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    assert!(!provider.fetch_movie_info("Friends").await.is_empty());
    assert!(provider.get_new_movie_data("Friends").await.is_none());
}

#[tokio::test]
async fn missing_imdb_rating_is_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Title": "Obscure Short",
            "Year": "2003",
            "Ratings": [{"Source": "Rotten Tomatoes", "Value": "70%"}],
            "Response": "True"
        })))
        .mount(&server)
        .await;

    let record = provider_for(&server)
        .get_new_movie_data("Obscure Short")
        .await
        .expect("record");
    assert_eq!(record.rating, 0.0);
    assert_eq!(record.director, "");
    assert_eq!(record.plot, "");
}

#[tokio::test]
async fn slow_response_times_out_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(movie_payload("Alien", "1979", "8.5"))
                .set_delay(Duration::from_secs(3)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let config = OmdbConfig {
        timeout_secs: 1,
        ..omdb_config(&server.uri())
    };
    assert!(OmdbProvider::new(&config)
        .fetch_movie_info("Alien")
        .await
        .is_empty());
}

#[tokio::test]
async fn unresolvable_host_yields_nothing() {
    let config = omdb_config("http://cinelog-test.invalid");
    let provider = OmdbProvider::new(&config);
    assert!(provider.fetch_movie_info("Alien").await.is_empty());
}

#[tokio::test]
async fn empty_title_sends_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(shawshank_payload()))
        .expect(0)
        .mount(&server)
        .await;

    assert!(provider_for(&server).get_new_movie_data("   ").await.is_none());
}

#[tokio::test]
#[serial]
async fn api_key_falls_back_to_environment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("apikey", "env-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(shawshank_payload()))
        .expect(1)
        .mount(&server)
        .await;

    let config = OmdbConfig {
        api_key: None,
        ..omdb_config(&server.uri())
    };
    let provider = OmdbProvider::new(&config);

    std::env::set_var(API_KEY_ENV, "env-key");
    let record = provider.get_new_movie_data("The Shawshank Redemption").await;
    std::env::remove_var(API_KEY_ENV);

    assert!(record.is_some());
}

#[tokio::test]
#[serial]
async fn configured_api_key_wins_over_environment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("apikey", TEST_API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(shawshank_payload()))
        .expect(1)
        .mount(&server)
        .await;

    std::env::set_var(API_KEY_ENV, "env-key");
    let record = provider_for(&server)
        .get_new_movie_data("The Shawshank Redemption")
        .await;
    std::env::remove_var(API_KEY_ENV);

    assert!(record.is_some());
}

#[tokio::test]
#[serial]
async fn missing_key_is_sent_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("apikey", ""))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "Response": "False",
            "Error": "No API key provided."
        })))
        .expect(1)
        .mount(&server)
        .await;

    std::env::remove_var(API_KEY_ENV);
    let config = OmdbConfig {
        api_key: None,
        ..omdb_config(&server.uri())
    };
    let provider = OmdbProvider::new(&config);
    assert!(!provider.is_available());
    assert!(provider.lookup_movie("Alien").await.is_none());
}

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use holocron::api::SwapiClient;
use holocron::config::Config;
use holocron::error::FetchError;
use holocron::transport::{HttpTransport, Transport};
use holocron::types::Person;

fn transport() -> HttpTransport {
    HttpTransport::new("holocron-tests", Duration::from_secs(5)).unwrap()
}

fn client(server: &MockServer, retry_attempts: u32) -> SwapiClient {
    let config = Config {
        base_url: format!("{}/api", server.uri()),
        retry_attempts,
        retry_delay_ms: 0,
        ..Config::default()
    };
    SwapiClient::new(Arc::new(transport()), &config).unwrap()
}

#[tokio::test]
async fn success_body_is_parsed_as_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/people/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "Luke Skywalker" })))
        .mount(&server)
        .await;

    let url = Url::parse(&format!("{}/api/people/1", server.uri())).unwrap();
    let body = transport().get_json(&url).await.unwrap();
    assert_eq!(body["name"], "Luke Skywalker");
}

#[tokio::test]
async fn error_status_maps_to_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(500).set_body_string("boom")).mount(&server).await;

    let url = Url::parse(&format!("{}/api/films/", server.uri())).unwrap();
    let err = transport().get_json(&url).await.unwrap_err();
    assert_eq!(err, FetchError::Server { status: 500, message: "Internal Server Error".into() });
    assert_eq!(err.user_message(), "Server error: 500 - Internal Server Error");
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET")).respond_with(ResponseTemplate::new(200).set_body_string("<html>")).mount(&server).await;

    let url = Url::parse(&format!("{}/api/planets/", server.uri())).unwrap();
    let err = transport().get_json(&url).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode { .. }));
}

#[tokio::test]
async fn client_retries_until_the_budget_is_spent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/people/99"))
        .respond_with(ResponseTemplate::new(503))
        .expect(4)
        .mount(&server)
        .await;

    let err = client(&server, 3).fetch_by_id::<Person>(99).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    server.verify().await;
}

#[tokio::test]
async fn client_recovers_after_transient_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/people/1"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/people/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Luke Skywalker",
            "url": "https://swapi.info/api/people/1"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, 3);
    let luke = client.fetch_by_id::<Person>(1).await.unwrap();
    assert_eq!(luke.name, "Luke Skywalker");
    assert_eq!(luke.id, Some(1));

    // served from cache
    let again = client.fetch_by_id::<Person>(1).await.unwrap();
    assert_eq!(again, luke);
    server.verify().await;
}

#[tokio::test]
async fn list_endpoint_keeps_trailing_slash() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/people/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "name": "Leia Organa" }, { "name": "Han Solo" }])))
        .expect(1)
        .mount(&server)
        .await;

    let people = client(&server, 0).fetch_list::<Person>().await.unwrap();
    assert_eq!(people.len(), 2);
    server.verify().await;
}

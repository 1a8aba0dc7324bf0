use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

use holocron::config::Config;
use holocron::error::{FetchError, RegistryError};
use holocron::prelude::*;
use holocron::transport::MemoryTransport;

const BASE: &str = "https://swapi.test/api";

fn config() -> Config {
    Config {
        base_url: BASE.to_string(),
        image_base_url: "https://picsum.photos".to_string(),
        retry_delay_ms: 0,
        ..Config::default()
    }
}

fn app(transport: &Arc<MemoryTransport>) -> Holocron {
    Holocron::with_transport(config(), transport.clone()).unwrap()
}

fn film_json(id: u64) -> Value {
    json!({
        "title": format!("Film {id}"),
        "episode_id": id,
        "director": "George Lucas",
        "release_date": "1977-05-25",
        "url": format!("{BASE}/films/{id}"),
    })
}

fn luke_json() -> Value {
    json!({
        "name": "Luke Skywalker",
        "height": "172",
        "mass": "unknown",
        "gender": "male",
        "birth_year": "19BBY",
        "homeworld": format!("{BASE}/planets/1"),
        "films": (1..=7).map(|i| format!("{BASE}/films/{i}")).collect::<Vec<_>>(),
        "url": format!("{BASE}/people/1"),
    })
}

#[tokio::test]
async fn wrapped_list_response_is_paginated() {
    let transport = Arc::new(MemoryTransport::new());
    let people: Vec<Value> = (1..=30)
        .map(|i| json!({ "name": format!("Person {i}"), "url": format!("{BASE}/people/{i}") }))
        .collect();
    transport.respond(&format!("{BASE}/people/"), json!({ "results": people }));

    let snap = app(&transport).list(ResourceKey::People, 3).await.unwrap();
    assert_eq!(snap.phase, Phase::Ready);
    assert_eq!(snap.total_count, 30);
    assert_eq!(snap.total_pages, 3);
    assert_eq!(snap.cards.len(), 6);
    assert_eq!(snap.cards[0].title, "Person 25");
    assert_eq!(snap.cards[0].link.to_string(), "/people/25");
    assert_eq!(snap.cards[0].image_url, "https://picsum.photos/seed/person-25/600/400");
    assert_eq!(snap.title, "Personen");
}

#[tokio::test]
async fn films_list_is_sorted_by_episode() {
    let transport = Arc::new(MemoryTransport::new());
    transport.respond(&format!("{BASE}/films/"), json!([film_json(6), film_json(4), film_json(5), film_json(1)]));
    let snap = app(&transport).list(ResourceKey::Films, 1).await.unwrap();
    let episodes: Vec<String> = snap.cards.iter().map(|c| c.fields[0].value.clone()).collect();
    assert_eq!(episodes, vec!["1", "4", "5", "6"]);
    assert_eq!(snap.cards[0].fields[2].value, "25.5.1977");
}

#[tokio::test]
async fn unexpected_list_shape_shows_the_list_error() {
    let transport = Arc::new(MemoryTransport::new());
    transport.respond(&format!("{BASE}/planets/"), json!({ "count": 60, "next": null }));
    let snap = app(&transport).list(ResourceKey::Planets, 1).await.unwrap();
    assert_eq!(snap.phase, Phase::Error("Fehler beim Laden der Planete. Bitte versuchen Sie es später erneut.".into()));
    assert!(snap.cards.is_empty());
}

#[tokio::test]
async fn person_detail_resolves_homeworld_and_caps_films() {
    let transport = Arc::new(MemoryTransport::new());
    transport.respond(&format!("{BASE}/people/1"), luke_json());
    transport.respond(&format!("{BASE}/planets/1"), json!({ "name": "Tatooine", "url": format!("{BASE}/planets/1") }));
    for i in 1..=7 {
        transport.respond(&format!("{BASE}/films/{i}"), film_json(i));
    }

    let snap = app(&transport).show(ResourceKey::People, 1).await.unwrap();
    assert_eq!(snap.phase, Phase::Ready);
    assert_eq!(snap.title.as_deref(), Some("Luke Skywalker"));
    assert_eq!(snap.image_url.as_deref(), Some("https://picsum.photos/seed/person-1/600/400"));
    let fields: Vec<(&str, &str)> = snap.fields.iter().map(|f| (f.label.as_str(), f.value.as_str())).collect();
    assert!(fields.contains(&("Größe", "172 cm")));
    assert!(fields.contains(&("Gewicht", "unknown")));
    assert!(fields.contains(&("Geschlecht", "Männlich")));

    let Resolution::Single(Some(home)) = &snap.related[0].content else { panic!("homeworld not resolved") };
    assert_eq!(home.label, "Tatooine");
    assert_eq!(home.link.to_string(), "/planets/1");

    let Resolution::List(films) = &snap.related[1].content else { panic!("films not resolved") };
    assert_eq!(films.len(), 5);
    assert_eq!(films[0].subtitle.as_deref(), Some("Episode 1"));
    assert_eq!(films[0].image_url.as_deref(), Some("https://picsum.photos/seed/film-1/512/256"));

    let film_requests: Vec<String> = transport.requests().into_iter().filter(|u| u.contains("/films/")).collect();
    let expected: Vec<String> = (1..=5).map(|i| format!("{BASE}/films/{i}")).collect();
    assert_eq!(film_requests, expected);
}

#[tokio::test]
async fn failed_detail_skips_related_blocks() {
    let transport = Arc::new(MemoryTransport::new());
    let snap = app(&transport).show(ResourceKey::People, 404).await.unwrap();
    assert_eq!(snap.phase, Phase::Error("Fehler beim Laden der Details. Bitte versuchen Sie es später erneut.".into()));
    assert!(snap.related.is_empty());
    assert!(transport.requests().iter().all(|u| u == &format!("{BASE}/people/404")));
    assert_eq!(transport.request_count(&format!("{BASE}/people/404")), 4);
}

#[tokio::test]
async fn broken_related_block_does_not_fail_the_page() {
    let transport = Arc::new(MemoryTransport::new());
    transport.respond(&format!("{BASE}/people/1"), luke_json());
    transport.fail(&format!("{BASE}/planets/1"), FetchError::Network("connection reset".into()));
    transport.respond(&format!("{BASE}/films/1"), film_json(1));

    let snap = app(&transport).show(ResourceKey::People, 1).await.unwrap();
    assert_eq!(snap.phase, Phase::Ready);
    assert_eq!(snap.related[0].content, Resolution::Single(None));
    // films 2..5 are not routed, so the whole list block degrades to empty
    assert_eq!(snap.related[1].content, Resolution::List(Vec::new()));
}

#[tokio::test]
async fn shared_urls_are_fetched_once() {
    let transport = Arc::new(MemoryTransport::new());
    let film_url = format!("{BASE}/films/1");
    transport.respond_after(&film_url, film_json(1), Duration::from_millis(20));
    let app = app(&transport);

    let (a, b) = tokio::join!(app.client().fetch_by_url::<Film>(&film_url), app.client().fetch_by_url::<Film>(&film_url));
    assert_eq!(a.unwrap(), b.unwrap());
    let _again: Film = app.client().fetch_by_url(&film_url).await.unwrap();
    assert_eq!(transport.request_count(&film_url), 1);

    app.clear_cache();
    let _fresh: Film = app.client().fetch_by_url(&film_url).await.unwrap();
    assert_eq!(transport.request_count(&film_url), 2);
}

#[tokio::test]
async fn unknown_resource_keys_are_rejected() {
    let transport = Arc::new(MemoryTransport::new());
    let err = app(&transport).resource("vehicles").err().unwrap();
    assert_eq!(err, RegistryError::InvalidResourceKey("vehicles".into()));
    assert!(transport.requests().is_empty());
}

#[tokio::test]
async fn search_returns_links() {
    let transport = Arc::new(MemoryTransport::new());
    transport.respond(
        &format!("{BASE}/starships/"),
        json!({ "data": [
            { "name": "X-wing", "url": format!("{BASE}/starships/12") },
            { "name": "TIE Advanced x1", "url": format!("{BASE}/starships/13") },
            { "name": "Millennium Falcon", "url": format!("{BASE}/starships/10") },
        ] }),
    );
    let hits = app(&transport).search(ResourceKey::Starships, "x").await.unwrap();
    let links: Vec<String> = hits.iter().map(|h| h.link.to_string()).collect();
    assert_eq!(links, vec!["/starships/12", "/starships/13"]);
}

#[tokio::test]
async fn drafts_are_validated_but_not_sent() {
    let transport = Arc::new(MemoryTransport::new());
    let app = Holocron::with_transport(Config { draft_delay_ms: 0, ..config() }, transport.clone()).unwrap();
    let fields = vec![("title".to_string(), "Rogue One".to_string()), ("episode_id".to_string(), "3.5".to_string())];
    let receipt = app.submit_draft(ResourceKey::Films, &fields).await.unwrap();
    assert_eq!(receipt.payload["title"], "Rogue One");
    assert!(transport.requests().is_empty());
}

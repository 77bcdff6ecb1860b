use axum_test::TestServer;
use moviedb::routes::{api, RequestState};
use moviedb::*;
use reconbit::*;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn server() -> TestServer {
    let db = Arc::new(MovieDb::open(random_storage()).expect("Failed to open movie db"));
    let http = HttpSettings {
        enable: true,
        bind_address: "127.0.0.1:0".parse().unwrap(),
        save_attempts: 2,
        save_retry_delay_ms: Duration::ZERO,
    };
    TestServer::new(build_router(RequestState::new(db, &http), api(), None)).unwrap()
}

async fn post_person(server: &TestServer, firstname: &str, lastname: &str) -> u32 {
    let person: Person = server.post("/person").json(&json!({ "firstname": firstname, "lastname": lastname })).await.json();
    person.id.unwrap().0
}

#[tokio::test]
async fn movie_lifecycle_over_http() {
    let server = server();
    let keanu = post_person(&server, "Keanu", "Reeves").await;
    let laurence = post_person(&server, "Laurence", "Fishburne").await;

    let response = server
        .post("/movie")
        .json(&json!({
            "title": "The Matrix",
            "year": 1999,
            "cast_list": [
                { "person_id": keanu, "character": "Neo" },
                { "person_id": laurence, "character": "Morpheus" }
            ]
        }))
        .await;
    response.assert_status_ok();
    let saved: Movie = response.json();
    let movie_id = saved.id.unwrap().0;
    assert_eq!(saved.cast_list.as_ref().map(Vec::len), Some(2));

    let loaded: Movie = server.get(&format!("/movie/{}", movie_id)).await.json();
    let names: Vec<_> = loaded.cast_list.unwrap().into_iter().filter_map(|c| c.person_fullname).collect();
    assert_eq!(names, vec!["Keanu Reeves", "Laurence Fishburne"]);

    let listed: Vec<Movie> = server.get("/movie").await.json();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].cast_list.is_none());

    server.delete(&format!("/movie/{}", movie_id)).await.assert_status_ok();
    let missing = server.get(&format!("/movie/{}", movie_id)).await;
    missing.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(missing.json::<Value>()["code"], 404);
}

#[tokio::test]
async fn constraint_violation_maps_to_conflict() {
    let server = server();
    let keanu = post_person(&server, "Keanu", "Reeves").await;

    let response = server
        .post("/movie")
        .json(&json!({
            "title": "John Wick",
            "cast_list": [
                { "person_id": keanu, "character": "John Wick" },
                { "person_id": keanu, "character": "Baba Yaga" }
            ]
        }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let listed: Vec<Movie> = server.get("/movie").await.json();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn invalid_rows_and_bodies_are_rejected() {
    let server = server();
    let keanu = post_person(&server, "Keanu", "Reeves").await;

    let too_long = server
        .post("/movie")
        .json(&json!({ "title": "Speed", "cast_list": [{ "person_id": keanu, "character": "x".repeat(101) }] }))
        .await;
    too_long.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let no_title = server.post("/movie").json(&json!({ "year": 1994 })).await;
    assert!(no_title.status_code().is_client_error());
    assert!(no_title.json::<Value>()["message"].is_string());

    server.get("/person/42").await.assert_status(StatusCode::NOT_FOUND);
}

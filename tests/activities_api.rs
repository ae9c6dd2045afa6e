mod common;

use axum::http::{header, Method, StatusCode};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use common::{activity_body, spawn_app};

#[tokio::test]
async fn create_then_fetch_makes_caller_host() {
    let app = spawn_app().await;
    let bob = app.register("bob").await;

    let created = app.create_activity(&bob, "Run club", 7).await;
    let id = created["id"].as_str().unwrap();
    assert_eq!(created["hostUsername"], "bob");
    assert_eq!(created["isCancelled"], false);

    let response = app
        .send(Method::GET, &format!("/api/activities/{}", id), Some(&bob), None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["title"], "Run club");
    assert_eq!(body["category"], "travel");
    assert_eq!(body["attendees"].as_array().unwrap().len(), 1);
    assert_eq!(body["attendees"][0]["username"], "bob");
}

#[tokio::test]
async fn missing_description_is_a_field_error() {
    let app = spawn_app().await;
    let bob = app.register("bob").await;

    let response = app
        .send(
            Method::POST,
            "/api/activities",
            Some(&bob),
            Some(json!({ "title": "Run club", "category": "travel", "date": Utc::now(), "city": "Utrecht", "venue": "Park" })),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(
        body["errors"]["description"][0],
        "Activity description is required"
    );
    assert!(body["errors"].get("title").is_none());
}

#[tokio::test]
async fn whitespace_title_and_description_are_rejected() {
    let app = spawn_app().await;
    let bob = app.register("bob").await;

    let mut body = activity_body("   ", Utc::now() + Duration::days(3));
    body["description"] = json!("\t\n");

    let response = app
        .send(Method::POST, "/api/activities", Some(&bob), Some(body))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body = response.json();
    assert_eq!(body["errors"]["title"][0], "Activity title is required");
    assert_eq!(
        body["errors"]["description"][0],
        "Activity description is required"
    );

    let listing = app
        .send(Method::GET, "/api/activities", Some(&bob), None)
        .await;
    assert!(listing.json().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn client_supplied_id_is_kept_and_must_be_unique() {
    let app = spawn_app().await;
    let bob = app.register("bob").await;
    let id = uuid::Uuid::new_v4().to_string();

    let mut body = activity_body("Run club", Utc::now() + Duration::days(3));
    body["id"] = Value::String(id.clone());

    let first = app
        .send(Method::POST, "/api/activities", Some(&bob), Some(body.clone()))
        .await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.json()["id"], id.as_str());

    let second = app
        .send(Method::POST, "/api/activities", Some(&bob), Some(body))
        .await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
    assert!(second.json()["errors"].get("id").is_some());
}

#[tokio::test]
async fn unknown_and_malformed_ids() {
    let app = spawn_app().await;
    let bob = app.register("bob").await;

    let unknown = app
        .send(
            Method::GET,
            &format!("/api/activities/{}", uuid::Uuid::new_v4()),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);

    let update = app
        .send(
            Method::PUT,
            &format!("/api/activities/{}", uuid::Uuid::new_v4()),
            Some(&bob),
            Some(activity_body("Run club", Utc::now() + Duration::days(1))),
        )
        .await;
    assert_eq!(update.status, StatusCode::NOT_FOUND);

    let malformed = app
        .send(Method::GET, "/api/activities/not-a-uuid", Some(&bob), None)
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        malformed.json()["errors"]["id"][0],
        "The value 'not-a-uuid' is not valid."
    );
}

#[tokio::test]
async fn requests_without_token_are_rejected() {
    let app = spawn_app().await;

    let response = app.send(Method::GET, "/api/activities", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers.get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );

    let bad = app
        .send(Method::GET, "/api/activities", Some("not-a-jwt"), None)
        .await;
    assert_eq!(bad.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn only_the_host_edits_and_deletes() {
    let app = spawn_app().await;
    let bob = app.register("bob").await;
    let jane = app.register("jane").await;

    let created = app.create_activity(&bob, "Run club", 7).await;
    let uri = format!("/api/activities/{}", created["id"].as_str().unwrap());
    let mut edit = activity_body("Long run", Utc::now() + Duration::days(8));
    edit["category"] = json!("music");

    let forbidden = app
        .send(Method::PUT, &uri, Some(&jane), Some(edit.clone()))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    let forbidden = app.send(Method::DELETE, &uri, Some(&jane), None).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let edited = app.send(Method::PUT, &uri, Some(&bob), Some(edit)).await;
    assert_eq!(edited.status, StatusCode::OK);
    assert_eq!(edited.json()["title"], "Long run");
    assert_eq!(edited.json()["category"], "music");

    let deleted = app.send(Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    let gone = app.send(Method::GET, &uri, Some(&bob), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn attend_joins_leaves_and_cancels() {
    let app = spawn_app().await;
    let bob = app.register("bob").await;
    let jane = app.register("jane").await;

    let created = app.create_activity(&bob, "Run club", 7).await;
    let uri = format!("/api/activities/{}/attend", created["id"].as_str().unwrap());

    let joined = app.send(Method::POST, &uri, Some(&jane), None).await;
    assert_eq!(joined.status, StatusCode::OK);
    let attendees: Vec<String> = joined.json()["attendees"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["username"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(attendees, vec!["bob", "jane"]);

    let left = app.send(Method::POST, &uri, Some(&jane), None).await;
    assert_eq!(left.json()["attendees"].as_array().unwrap().len(), 1);

    let cancelled = app.send(Method::POST, &uri, Some(&bob), None).await;
    assert_eq!(cancelled.json()["isCancelled"], true);
    let restored = app.send(Method::POST, &uri, Some(&bob), None).await;
    assert_eq!(restored.json()["isCancelled"], false);
}

#[tokio::test]
async fn listing_is_paged_and_filtered() {
    let app = spawn_app().await;
    let bob = app.register("bob").await;
    let jane = app.register("jane").await;

    for (title, days) in [("A", 1), ("B", 2), ("C", 3)] {
        app.create_activity(&bob, title, days).await;
    }

    let page = app
        .send(
            Method::GET,
            "/api/activities?pageNumber=1&pageSize=2",
            Some(&jane),
            None,
        )
        .await;
    assert_eq!(page.status, StatusCode::OK);
    let titles: Vec<String> = page
        .json()
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["A", "B"]);

    let header: Value = serde_json::from_str(
        page.headers
            .get("pagination")
            .expect("pagination header")
            .to_str()
            .unwrap(),
    )
    .unwrap();
    assert_eq!(
        header,
        json!({ "currentPage": 1, "itemsPerPage": 2, "totalItems": 3, "totalPages": 2 })
    );

    let hosting = app
        .send(Method::GET, "/api/activities?isHost=true", Some(&jane), None)
        .await;
    assert!(hosting.json().as_array().unwrap().is_empty());

    let going = app
        .send(Method::GET, "/api/activities?isGoing=true", Some(&bob), None)
        .await;
    assert_eq!(going.json().as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn page_far_past_the_end_is_empty() {
    let app = spawn_app().await;
    let bob = app.register("bob").await;
    app.create_activity(&bob, "A", 1).await;

    let response = app
        .send(
            Method::GET,
            &format!("/api/activities?pageNumber={}&pageSize=10", i64::MAX),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    assert!(response.json().as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unknown_stored_category_is_a_server_error() {
    let app = spawn_app().await;
    let bob = app.register("bob").await;
    let id = uuid::Uuid::new_v4().to_string();

    sqlx::query(
        "INSERT INTO activities (id, title, date, description, category, city, venue) \
         VALUES (?1, 'Opera night', ?2, 'Arias', 'opera', 'Utrecht', 'Stadsschouwburg')",
    )
    .bind(&id)
    .bind(Utc::now() + Duration::days(2))
    .execute(&app.pool)
    .await
    .unwrap();
    sqlx::query(
        "INSERT INTO activity_attendees (activity_id, user_id, is_host) \
         SELECT ?1, id, 1 FROM users WHERE username = 'bob'",
    )
    .bind(&id)
    .execute(&app.pool)
    .await
    .unwrap();

    let response = app
        .send(Method::GET, &format!("/api/activities/{}", id), Some(&bob), None)
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
}

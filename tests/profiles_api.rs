mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};

use common::{multipart_photo, spawn_app, TestApp};

async fn upload(app: &TestApp, token: &str, file_name: &str) -> Value {
    let (content_type, body) = multipart_photo(file_name, b"\x89PNG fake image bytes");
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/photos")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap();
    let response = app.dispatch(request).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.text());
    response.json()
}

#[tokio::test]
async fn profile_shows_details_and_accepts_edits() {
    let app = spawn_app().await;
    let bob = app.register("bob").await;

    let edit = app
        .send(
            Method::PUT,
            "/api/profiles",
            Some(&bob),
            Some(json!({ "displayName": "Robert", "bio": "Runs a lot" })),
        )
        .await;
    assert_eq!(edit.status, StatusCode::OK);

    let profile = app.send(Method::GET, "/api/profiles/bob", Some(&bob), None).await;
    assert_eq!(profile.status, StatusCode::OK);
    let body = profile.json();
    assert_eq!(body["displayName"], "Robert");
    assert_eq!(body["bio"], "Runs a lot");
    assert_eq!(body["followersCount"], 0);

    let empty = app
        .send(Method::PUT, "/api/profiles", Some(&bob), Some(json!({ "displayName": "" })))
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.json()["errors"]["displayName"][0], "Display name is required");

    let blank = app
        .send(Method::PUT, "/api/profiles", Some(&bob), Some(json!({ "displayName": "   " })))
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);

    let missing = app.send(Method::GET, "/api/profiles/nobody", Some(&bob), None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn first_photo_is_main_and_cannot_be_deleted() {
    let app = spawn_app().await;
    let bob = app.register("bob").await;

    let first = upload(&app, &bob, "one.png").await;
    assert_eq!(first["isMain"], true);
    let second = upload(&app, &bob, "two.png").await;
    assert_eq!(second["isMain"], false);

    let file_name = first["url"].as_str().unwrap().rsplit('/').next().unwrap().to_string();
    assert!(app.uploads.path().join(&file_name).exists());

    let first_uri = format!("/api/photos/{}", first["id"].as_str().unwrap());
    let refused = app.send(Method::DELETE, &first_uri, Some(&bob), None).await;
    assert_eq!(refused.status, StatusCode::BAD_REQUEST);
    assert_eq!(refused.text(), "You cannot delete your main photo");

    let set_main = app
        .send(
            Method::POST,
            &format!("/api/photos/{}/setMain", second["id"].as_str().unwrap()),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(set_main.status, StatusCode::OK);

    let deleted = app.send(Method::DELETE, &first_uri, Some(&bob), None).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(!app.uploads.path().join(&file_name).exists());

    let profile = app.send(Method::GET, "/api/profiles/bob", Some(&bob), None).await.json();
    assert_eq!(profile["image"], second["url"]);
    assert_eq!(profile["photos"].as_array().unwrap().len(), 1);

    let account = app.send(Method::GET, "/api/account", Some(&bob), None).await.json();
    assert_eq!(account["image"], second["url"]);
}

#[tokio::test]
async fn photos_of_other_users_are_not_found() {
    let app = spawn_app().await;
    let bob = app.register("bob").await;
    let jane = app.register("jane").await;

    let photo = upload(&app, &bob, "one.png").await;
    let response = app
        .send(
            Method::POST,
            &format!("/api/photos/{}/setMain", photo["id"].as_str().unwrap()),
            Some(&jane),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn following_is_idempotent_and_listed() {
    let app = spawn_app().await;
    let bob = app.register("bob").await;
    let _jane = app.register("jane").await;

    for _ in 0..2 {
        let response = app.send(Method::POST, "/api/follow/jane", Some(&bob), None).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let jane_profile = app.send(Method::GET, "/api/profiles/jane", Some(&bob), None).await.json();
    assert_eq!(jane_profile["followersCount"], 1);
    assert_eq!(jane_profile["following"], true);

    let followers = app
        .send(Method::GET, "/api/follow/jane?predicate=followers", Some(&bob), None)
        .await
        .json();
    assert_eq!(followers.as_array().unwrap().len(), 1);
    assert_eq!(followers[0]["username"], "bob");

    let following = app
        .send(Method::GET, "/api/follow/bob?predicate=following", Some(&bob), None)
        .await
        .json();
    assert_eq!(following[0]["username"], "jane");

    let unfollow = app.send(Method::DELETE, "/api/follow/jane", Some(&bob), None).await;
    assert_eq!(unfollow.status, StatusCode::OK);
    let jane_profile = app.send(Method::GET, "/api/profiles/jane", Some(&bob), None).await.json();
    assert_eq!(jane_profile["followersCount"], 0);
    assert_eq!(jane_profile["following"], false);
}

#[tokio::test]
async fn follow_rejects_self_and_unknown_users() {
    let app = spawn_app().await;
    let bob = app.register("bob").await;

    let own = app.send(Method::POST, "/api/follow/bob", Some(&bob), None).await;
    assert_eq!(own.status, StatusCode::BAD_REQUEST);

    let unknown = app.send(Method::POST, "/api/follow/nobody", Some(&bob), None).await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn profile_activities_follow_predicate() {
    let app = spawn_app().await;
    let bob = app.register("bob").await;
    let jane = app.register("jane").await;

    let hosted = app.create_activity(&bob, "Bob hosts", 5).await;
    let joined = app.create_activity(&jane, "Jane hosts", 6).await;
    let attend = format!("/api/activities/{}/attend", joined["id"].as_str().unwrap());
    app.send(Method::POST, &attend, Some(&bob), None).await;

    let future = app
        .send(Method::GET, "/api/profiles/bob/activities?predicate=future", Some(&jane), None)
        .await
        .json();
    assert_eq!(future.as_array().unwrap().len(), 2);

    let hosting = app
        .send(Method::GET, "/api/profiles/bob/activities?predicate=hosting", Some(&jane), None)
        .await
        .json();
    assert_eq!(hosting.as_array().unwrap().len(), 1);
    assert_eq!(hosting[0]["id"], hosted["id"]);

    let past = app
        .send(Method::GET, "/api/profiles/bob/activities?predicate=past", Some(&jane), None)
        .await
        .json();
    assert!(past.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_first_uploads_agree_on_one_main_photo() {
    let app = spawn_app().await;
    let bob = app.register("bob").await;

    let (a, b) = tokio::join!(upload(&app, &bob, "a.png"), upload(&app, &bob, "b.png"));
    let mains = [&a, &b]
        .iter()
        .filter(|p| p["isMain"] == true)
        .count();
    assert_eq!(mains, 1);

    let profile = app.send(Method::GET, "/api/profiles/bob", Some(&bob), None).await;
    let body = profile.json();
    assert_eq!(body["photos"].as_array().unwrap().len(), 2);
    let main = if a["isMain"] == true { &a } else { &b };
    assert_eq!(body["image"], main["url"]);
}

//! End-to-end route tests against the in-memory store

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use platerate_server::db::{MemoryStore, NewRestaurant, ReactionKind, RestaurantStore, User};
use platerate_server::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

struct Fixture {
    store: Arc<MemoryStore>,
    user: User,
    admin: User,
    restaurants: Vec<i64>,
}

impl Fixture {
    async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let user = store.add_user("Diner", false).await;
        let admin = store.add_user("Boss", true).await;
        let noodles = store.add_category("Noodles").await;
        let cafe = store.add_category("Cafe").await;

        let mut restaurants = Vec::new();
        for i in 0..11 {
            let category = if i < 4 { noodles.id } else { cafe.id };
            let r = store
                .add_restaurant(
                    NewRestaurant::new(format!("Spot {i}"))
                        .description(format!("{i:02}").repeat(40))
                        .category(category),
                )
                .await;
            restaurants.push(r.id);
        }

        Self {
            store,
            user,
            admin,
            restaurants,
        }
    }

    fn app(&self) -> Router {
        let store: Arc<dyn RestaurantStore> = self.store.clone();
        build_router(AppState::new(store), false)
    }
}

async fn send(
    app: Router,
    method: &str,
    uri: &str,
    user: Option<&User>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.id.to_string());
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

#[tokio::test]
async fn root_redirects_to_restaurants() {
    let fx = Fixture::new().await;
    let response = fx
        .app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/restaurants");
}

#[tokio::test]
async fn listing_requires_a_user() {
    let fx = Fixture::new().await;
    let (status, body) = send(fx.app(), "GET", "/restaurants", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn unknown_principal_is_unauthorized() {
    let fx = Fixture::new().await;
    let ghost = User {
        id: 9_999,
        ..fx.user.clone()
    };
    let (status, _) = send(fx.app(), "GET", "/restaurants", Some(&ghost), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn listing_uses_defaults_for_garbage_params() {
    let fx = Fixture::new().await;
    let (status, body) = send(
        fx.app(),
        "GET",
        "/restaurants?categoryId=&page=abc&limit=-1",
        Some(&fx.user),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["restaurants"].as_array().unwrap().len(), 9);
    assert_eq!(body["total_count"], 11);
    assert_eq!(body["category_id"], Value::Null);
    assert_eq!(body["pagination"]["total_page"], 2);
    assert_eq!(body["pagination"]["pages"], json!([1, 2]));
    assert_eq!(body["categories"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn huge_page_number_is_an_empty_page() {
    let fx = Fixture::new().await;
    for page in ["4294967295", "99999999999"] {
        let uri = format!("/restaurants?page={page}");
        let (status, body) = send(fx.app(), "GET", &uri, Some(&fx.user), None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["restaurants"].as_array().unwrap().is_empty());
        assert_eq!(body["total_count"], 11);
        assert_eq!(body["pagination"]["current_page"], u32::MAX);
        assert_eq!(body["pagination"]["next"], 2);
        assert_eq!(body["pagination"]["prev"], u32::MAX - 1);
    }
}

#[tokio::test]
async fn listing_filters_and_flags() {
    let fx = Fixture::new().await;
    let first = fx.restaurants[0];
    fx.store
        .add_reaction(ReactionKind::Favorite, fx.user.id, first)
        .await
        .unwrap();
    let categories = fx.store.list_categories().await.unwrap();
    let noodles = categories[0].id;

    let uri = format!("/restaurants?categoryId={noodles}");
    let (status, body) = send(fx.app(), "GET", &uri, Some(&fx.user), None).await;

    assert_eq!(status, StatusCode::OK);
    let rows = body["restaurants"].as_array().unwrap();
    assert_eq!(rows.len(), 4);
    assert_eq!(body["category_id"], noodles);
    for row in rows {
        assert_eq!(row["description"].as_str().unwrap().chars().count(), 50);
        assert_eq!(row["is_favorited"], row["id"] == first);
        assert_eq!(row["is_liked"], false);
    }
}

#[tokio::test]
async fn detail_counts_views_and_missing_is_404() {
    let fx = Fixture::new().await;
    let id = fx.restaurants[5];

    let uri = format!("/restaurants/{id}");
    let (status, body) = send(fx.app(), "GET", &uri, Some(&fx.user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["restaurant"]["description"].as_str().unwrap().len(), 80);
    assert_eq!(body["is_favorited"], false);

    let (status, _) = send(fx.app(), "GET", &uri, Some(&fx.user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fx.store.view_count(id).await, Some(2));

    let (status, body) = send(fx.app(), "GET", "/restaurants/424242", Some(&fx.user), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn non_numeric_id_is_bad_request() {
    let fx = Fixture::new().await;
    let (status, body) = send(
        fx.app(),
        "GET",
        "/restaurants/abc/dashboard",
        Some(&fx.user),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn dashboard_leaves_views_alone() {
    let fx = Fixture::new().await;
    let id = fx.restaurants[0];
    let uri = format!("/restaurants/{id}/dashboard");

    let (status, body) = send(fx.app(), "GET", &uri, Some(&fx.user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comment_count"], 0);
    assert_eq!(body["category"]["name"], "Noodles");
    assert_eq!(fx.store.view_count(id).await, Some(0));
}

#[tokio::test]
async fn comment_flow_shows_up_in_feeds() {
    let fx = Fixture::new().await;
    let id = fx.restaurants[2];

    let (status, body) = send(
        fx.app(),
        "POST",
        "/comments",
        Some(&fx.user),
        Some(json!({ "restaurant_id": id, "text": "  Broth was great  " })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["text"], "Broth was great");

    let (status, body) = send(fx.app(), "GET", "/restaurants/feeds", Some(&fx.user), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["restaurants"].as_array().unwrap().len(), 10);
    assert_eq!(body["comments"][0]["user"]["name"], "Diner");
    assert_eq!(body["comments"][0]["restaurant"]["id"], id);
}

#[tokio::test]
async fn blank_comment_is_rejected() {
    let fx = Fixture::new().await;
    let (status, body) = send(
        fx.app(),
        "POST",
        "/comments",
        Some(&fx.user),
        Some(json!({ "restaurant_id": fx.restaurants[0], "text": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "text cannot be empty");
}

#[tokio::test]
async fn favorites_drive_the_top_list() {
    let fx = Fixture::new().await;
    let favored = fx.restaurants[6];
    let uri = format!("/favorite/{favored}");

    let (status, _) = send(fx.app(), "POST", &uri, Some(&fx.user), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(fx.app(), "POST", &uri, Some(&fx.admin), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(fx.app(), "GET", "/restaurants/top", Some(&fx.user), None).await;
    assert_eq!(status, StatusCode::OK);
    let top = body.as_array().unwrap();
    assert_eq!(top.len(), 10);
    assert_eq!(top[0]["id"], favored);
    assert_eq!(top[0]["favorited_count"], 2);
    assert_eq!(top[0]["is_favorited"], true);

    let (status, _) = send(fx.app(), "DELETE", &uri, Some(&fx.user), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let reactions = fx.store.user_reactions(fx.user.id).await.unwrap();
    assert!(reactions.favorited.is_empty());
}

#[tokio::test]
async fn like_on_missing_restaurant_is_404() {
    let fx = Fixture::new().await;
    let (status, _) = send(fx.app(), "POST", "/like/31337", Some(&fx.user), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_routes_are_gated() {
    let fx = Fixture::new().await;

    let (status, _) = send(fx.app(), "GET", "/admin/restaurants", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(fx.app(), "GET", "/admin/restaurants", Some(&fx.user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (status, body) = send(
        fx.app(),
        "GET",
        "/admin/restaurants?page=2",
        Some(&fx.admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["restaurants"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["current_page"], 2);
}

#[tokio::test]
async fn admin_manages_roles() {
    let fx = Fixture::new().await;
    let uri = format!("/admin/users/{}", fx.user.id);

    let (status, body) = send(
        fx.app(),
        "PATCH",
        &uri,
        Some(&fx.admin),
        Some(json!({ "is_admin": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_admin"], true);

    let (status, body) = send(fx.app(), "GET", "/admin/users", Some(&fx.admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_array().unwrap().iter().all(|u| u["is_admin"] == true));

    let self_uri = format!("/admin/users/{}", fx.admin.id);
    let (status, _) = send(
        fx.app(),
        "PATCH",
        &self_uri,
        Some(&fx.admin),
        Some(json!({ "is_admin": false })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        fx.app(),
        "PATCH",
        "/admin/users/8080",
        Some(&fx.admin),
        Some(json!({ "is_admin": true })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn database_outage_is_opaque_500() {
    let fx = Fixture::new().await;
    let app = fx.app();
    fx.store.set_unavailable(true);

    let (status, body) = send(app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "down");

    let (status, body) = send(fx.app(), "GET", "/restaurants", Some(&fx.user), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "an internal error occurred");
}

mod hotels;
mod hotels_write;
mod reviews;
mod roles;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use jogjastay_core::AppConfig;
use jogjastay_store::{PointsError, Store, StoreError};

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<AppConfig>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    store: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn clamp_limit(limit: Option<usize>, default: usize) -> usize {
    limit.unwrap_or(default).clamp(1, 50)
}

pub(super) fn map_store_error(request_id: String, error: &StoreError) -> ApiError {
    match error {
        StoreError::NotFound(path) => {
            ApiError::new(request_id, "not_found", format!("no document at {path}"))
        }
        other => {
            tracing::error!(error = %other, "store operation failed");
            ApiError::new(request_id, "internal_error", "store operation failed")
        }
    }
}

pub(super) fn map_points_error(request_id: String, error: &PointsError) -> ApiError {
    match error {
        PointsError::Validation(message) => {
            ApiError::new(request_id, "validation_error", message.clone())
        }
        PointsError::Store(store_error) => map_store_error(request_id, store_error),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn admin_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/admin/hotels",
            axum::routing::post(hotels_write::create),
        )
        .route(
            "/api/v1/admin/hotels/{id}",
            axum::routing::patch(hotels_write::update).delete(hotels_write::delete),
        )
        .route("/api/v1/admin/users/{uid}/role", put(roles::assign))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/hotels", get(hotels::list))
        .route("/api/v1/hotels/watch", get(hotels::watch))
        .route("/api/v1/hotels/{id}", get(hotels::detail))
        .route(
            "/api/v1/hotels/{id}/reviews",
            get(reviews::list).post(reviews::create),
        )
        .route("/api/v1/reviews/recent", get(reviews::recent));

    Router::new()
        .merge(public_routes)
        .merge(admin_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            data: HealthData {
                status: "ok",
                store: "ok",
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use jogjastay_core::Environment;
    use serde_json::json;
    use tower::ServiceExt;

    fn test_config() -> Arc<AppConfig> {
        Arc::new(AppConfig {
            env: Environment::Test,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "info".to_string(),
            hotels_path: "./config/hotels.yaml".into(),
            store_path: None,
            bootstrap_admin_email: None,
            search_radius_km: 5.0,
            review_feed_limit: 8,
        })
    }

    fn test_app(store: Store) -> Router {
        build_app(
            AppState {
                store,
                config: test_config(),
            },
            AuthState::with_keys(["test-key"]),
            default_rate_limit_state(),
        )
    }

    async fn send(app: Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(req).await.expect("response");
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).expect("json parse")
        };
        (status, json)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    fn admin_req(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", "Bearer test-key")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn seed_hotel(store: &Store, name: &str, coordinates: &str, stars: u8) -> String {
        store
            .push(
                "points",
                json!({"name": name, "coordinates": coordinates, "bintang": stars}),
            )
            .await
            .expect("seed hotel")
    }

    #[tokio::test]
    async fn health_returns_ok_with_request_id() {
        let response = test_app(Store::in_memory())
            .oneshot(get_req("/api/v1/health"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn list_on_empty_store_is_grouped_and_empty() {
        let (status, json) = send(test_app(Store::in_memory()), get_req("/api/v1/hotels")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["kind"], "grouped");
        assert_eq!(json["data"]["buckets"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn list_groups_by_star_section() {
        let store = Store::in_memory();
        seed_hotel(&store, "Tentrem", "-7.77,110.36", 5).await;
        seed_hotel(&store, "Grand Zuri", "-7.78,110.36", 4).await;
        seed_hotel(&store, "Losmen Murah", "-7.79,110.36", 1).await;

        let (status, json) = send(test_app(store), get_req("/api/v1/hotels")).await;
        assert_eq!(status, StatusCode::OK);
        let buckets = json["data"]["buckets"].as_array().expect("buckets");
        assert_eq!(buckets.len(), 2, "1-star hotel must not create a section");
        assert_eq!(buckets[0]["stars"], 5);
        assert_eq!(buckets[1]["stars"], 4);
    }

    #[tokio::test]
    async fn list_rejects_unknown_filter() {
        let (status, json) = send(
            test_app(Store::in_memory()),
            get_req("/api/v1/hotels?filter=cheapest"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn near_filter_without_origin_is_empty_flat_list() {
        let store = Store::in_memory();
        seed_hotel(&store, "Tentrem", "-7.77,110.36", 5).await;
        let (status, json) = send(test_app(store), get_req("/api/v1/hotels?filter=near")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["kind"], "flat");
        assert_eq!(json["data"]["hotels"].as_array().map(Vec::len), Some(0));
    }

    #[tokio::test]
    async fn near_filter_sorts_by_distance_within_radius() {
        let store = Store::in_memory();
        seed_hotel(&store, "Dekat", "-7.796,110.370", 3).await;
        seed_hotel(&store, "Agak Jauh", "-7.78,110.40", 4).await;
        seed_hotel(&store, "Jauh Sekali", "-7.5,110.0", 5).await;

        let (status, json) = send(
            test_app(store),
            get_req("/api/v1/hotels?filter=near&lat=-7.797&lng=110.370"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let hotels = json["data"]["hotels"].as_array().expect("hotels");
        assert_eq!(hotels.len(), 2);
        assert_eq!(hotels[0]["name"], "Dekat");
        assert_eq!(hotels[1]["name"], "Agak Jauh");
        assert!(hotels[0]["distance_km"].as_f64().unwrap() < 1.0);
    }

    #[tokio::test]
    async fn search_narrows_grouped_listing() {
        let store = Store::in_memory();
        seed_hotel(&store, "Grand Zuri Malioboro", "-7.78,110.36", 4).await;
        seed_hotel(&store, "Tentrem", "-7.77,110.36", 5).await;

        let (status, json) = send(test_app(store), get_req("/api/v1/hotels?q=zuri")).await;
        assert_eq!(status, StatusCode::OK);
        let buckets = json["data"]["buckets"].as_array().expect("buckets");
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0]["hotels"][0]["name"], "Grand Zuri Malioboro");
    }

    #[tokio::test]
    async fn detail_includes_maps_links() {
        let store = Store::in_memory();
        let id = seed_hotel(&store, "Tentrem", "-7.7738,110.3687", 5).await;

        let (status, json) = send(test_app(store), get_req(&format!("/api/v1/hotels/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["name"], "Tentrem");
        let links = &json["data"]["maps_links"];
        assert!(links["ios"].as_str().unwrap().starts_with("maps://?daddr="));
        assert!(links["android"].as_str().unwrap().starts_with("geo:"));
        assert!(links["web"]
            .as_str()
            .unwrap()
            .starts_with("https://www.google.com/maps/search/"));
    }

    #[tokio::test]
    async fn detail_of_unknown_hotel_is_404() {
        let (status, json) = send(
            test_app(Store::in_memory()),
            get_req("/api/v1/hotels/ghost"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn admin_create_requires_bearer_token() {
        let body = json!({"name": "Hotel Baru", "coordinates": "-7.79,110.36", "bintang": 4});
        let req = Request::builder()
            .method("POST")
            .uri("/api/v1/admin/hotels")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request");
        let (status, _) = send(test_app(Store::in_memory()), req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_create_then_detail_round_trips() {
        let store = Store::in_memory();
        let body = json!({"name": "Hotel Baru", "coordinates": "-7.79,110.36", "bintang": 4});
        let (status, json) = send(
            test_app(store.clone()),
            admin_req("POST", "/api/v1/admin/hotels", body),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = json["data"]["id"].as_str().expect("id").to_owned();

        let (status, json) = send(
            test_app(store),
            get_req(&format!("/api/v1/hotels/{id}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["name"], "Hotel Baru");
    }

    #[tokio::test]
    async fn admin_create_rejects_invalid_payload() {
        let body = json!({"name": "Hotel Enam", "coordinates": "-7.79,110.36", "bintang": 6});
        let (status, json) = send(
            test_app(Store::in_memory()),
            admin_req("POST", "/api/v1/admin/hotels", body),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn admin_update_merges_fields() {
        let store = Store::in_memory();
        let id = seed_hotel(&store, "Tentrem", "-7.77,110.36", 4).await;
        let (status, _) = send(
            test_app(store.clone()),
            admin_req("PATCH", &format!("/api/v1/admin/hotels/{id}"), json!({"bintang": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, json) = send(test_app(store), get_req(&format!("/api/v1/hotels/{id}"))).await;
        assert_eq!(json["data"]["name"], "Tentrem");
        assert_eq!(json["data"]["star_rating"], 5);
    }

    #[tokio::test]
    async fn admin_delete_removes_hotel() {
        let store = Store::in_memory();
        let id = seed_hotel(&store, "Tentrem", "-7.77,110.36", 4).await;
        let (status, _) = send(
            test_app(store.clone()),
            admin_req("DELETE", &format!("/api/v1/admin/hotels/{id}"), json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(test_app(store), get_req(&format!("/api/v1/hotels/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn review_create_validates_and_stamps() {
        let store = Store::in_memory();
        let id = seed_hotel(&store, "Tentrem", "-7.77,110.36", 5).await;

        let req = Request::builder()
            .method("POST")
            .uri(format!("/api/v1/hotels/{id}/reviews"))
            .header("content-type", "application/json")
            .body(Body::from(json!({"rating": 5, "comment": "Nyaman."}).to_string()))
            .expect("request");
        let (status, json) = send(test_app(store.clone()), req).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(json["data"]["id"].is_string());

        let (status, json) = send(
            test_app(store),
            get_req(&format!("/api/v1/hotels/{id}/reviews")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let reviews = json["data"].as_array().expect("reviews");
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0]["userName"], "Anonim");
        assert!(reviews[0]["createdAt"].is_string());
    }

    #[tokio::test]
    async fn review_create_rejects_blank_comment() {
        let store = Store::in_memory();
        let id = seed_hotel(&store, "Tentrem", "-7.77,110.36", 5).await;
        let req = Request::builder()
            .method("POST")
            .uri(format!("/api/v1/hotels/{id}/reviews"))
            .header("content-type", "application/json")
            .body(Body::from(json!({"rating": 5, "comment": "  "}).to_string()))
            .expect("request");
        let (status, json) = send(test_app(store), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn recent_reviews_returns_flattened_feed() {
        let store = Store::in_memory();
        let id = seed_hotel(&store, "Tentrem", "-7.77,110.36", 5).await;
        store
            .set(
                &format!("points/{id}/reviews/r1"),
                json!({"userName": "Budi", "rating": 5, "comment": "Bagus.",
                       "createdAt": "2025-06-01T00:00:00Z"}),
            )
            .await
            .unwrap();

        let (status, json) = send(test_app(store), get_req("/api/v1/reviews/recent")).await;
        assert_eq!(status, StatusCode::OK);
        let feed = json["data"].as_array().expect("feed");
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0]["hotelName"], "Tentrem");
        assert_eq!(feed[0]["userName"], "Budi");
    }

    #[tokio::test]
    async fn admin_assigns_role_explicitly() {
        let store = Store::in_memory();
        let (status, _) = send(
            test_app(store.clone()),
            admin_req("PUT", "/api/v1/admin/users/u1/role", json!({"role": "admin"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            jogjastay_store::role_of(&store, "u1").await,
            Some(jogjastay_store::Role::Admin)
        );
    }

    #[tokio::test]
    async fn role_assignment_rejects_unknown_role() {
        let (status, json) = send(
            test_app(Store::in_memory()),
            admin_req("PUT", "/api/v1/admin/users/u1/role", json!({"role": "owner"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[test]
    fn clamp_limit_applies_default_and_bounds() {
        assert_eq!(clamp_limit(None, 8), 8);
        assert_eq!(clamp_limit(Some(0), 8), 1);
        assert_eq!(clamp_limit(Some(1_000), 8), 50);
        assert_eq!(clamp_limit(Some(25), 8), 25);
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use jogjastay_store::{points, NewReview, RecentReview};

use crate::middleware::RequestId;

use super::{clamp_limit, map_points_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ReviewItem {
    pub id: String,
    pub user_name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: Option<DateTime<Utc>>,
}

pub(super) async fn list(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Vec<ReviewItem>>>, ApiError> {
    if state.store.get(&format!("points/{id}")).await.is_none() {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("no hotel with id {id}"),
        ));
    }

    let data = points::list_reviews(&state.store, &id)
        .await
        .into_iter()
        .map(|(review_id, review)| ReviewItem {
            id: review_id,
            user_name: review.user_name,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Serialize)]
pub(super) struct ReviewRef {
    pub id: String,
}

pub(super) async fn create(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(payload): Json<NewReview>,
) -> Result<(StatusCode, Json<ApiResponse<ReviewRef>>), ApiError> {
    let review_id = points::add_review(&state.store, &id, payload)
        .await
        .map_err(|e| map_points_error(req_id.0.clone(), &e))?;
    tracing::info!(hotel_id = %id, review_id = %review_id, "review created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: ReviewRef { id: review_id },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub(super) struct RecentQuery {
    limit: Option<usize>,
}

pub(super) async fn recent(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<RecentQuery>,
) -> Json<ApiResponse<Vec<RecentReview>>> {
    let limit = clamp_limit(params.limit, state.config.review_feed_limit);
    let data = points::recent_reviews(&state.store, limit).await;

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}

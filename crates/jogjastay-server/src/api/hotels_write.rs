use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Serialize;

use jogjastay_store::{points, NewHotel, UpdateHotel};

use crate::middleware::RequestId;

use super::{map_points_error, map_store_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct HotelRef {
    pub id: String,
}

pub(super) async fn create(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(payload): Json<NewHotel>,
) -> Result<(StatusCode, Json<ApiResponse<HotelRef>>), ApiError> {
    let id = points::create_hotel(&state.store, payload)
        .await
        .map_err(|e| map_points_error(req_id.0.clone(), &e))?;
    tracing::info!(id = %id, "hotel created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: HotelRef { id },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateHotel>,
) -> Result<Json<ApiResponse<HotelRef>>, ApiError> {
    points::update_hotel(&state.store, &id, payload)
        .await
        .map_err(|e| map_points_error(req_id.0.clone(), &e))?;
    tracing::info!(id = %id, "hotel updated");

    Ok(Json(ApiResponse {
        data: HotelRef { id },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn delete(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<HotelRef>>, ApiError> {
    points::delete_hotel(&state.store, &id)
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;
    tracing::info!(id = %id, "hotel deleted");

    Ok(Json(ApiResponse {
        data: HotelRef { id },
        meta: ResponseMeta::new(req_id.0),
    }))
}

use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Extension, Json,
};
use futures::Stream;
use serde::{Deserialize, Serialize};

use jogjastay_core::filter::{self, Listing, ViewFilter, ViewQuery};
use jogjastay_core::geo::LatLng;
use jogjastay_core::hotel::Hotel;
use jogjastay_core::links::{maps_link, MapsPlatform};
use jogjastay_store::points;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ListQuery {
    filter: Option<String>,
    q: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    radius_km: Option<f64>,
}

pub(super) async fn list(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ListQuery>,
) -> Result<Json<ApiResponse<Listing>>, ApiError> {
    let filter = match params.filter.as_deref() {
        None => ViewFilter::All,
        Some(raw) => raw
            .parse()
            .map_err(|e: filter::ParseFilterError| {
                ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
            })?,
    };
    let origin = params.lat.zip(params.lng).map(|(lat, lng)| LatLng::new(lat, lng));

    let hotels = points::list_hotels(&state.store, origin).await;
    let listing = filter::select(
        &hotels,
        &ViewQuery {
            filter,
            search: params.q.unwrap_or_default(),
            origin,
            radius_km: params.radius_km.unwrap_or(state.config.search_radius_km),
        },
    );

    Ok(Json(ApiResponse {
        data: listing,
        meta: ResponseMeta::new(req_id.0),
    }))
}

#[derive(Debug, Deserialize)]
pub(super) struct DetailQuery {
    lat: Option<f64>,
    lng: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(super) struct MapsLinks {
    ios: String,
    android: String,
    web: String,
}

#[derive(Debug, Serialize)]
pub(super) struct HotelDetail {
    #[serde(flatten)]
    hotel: Hotel,
    maps_links: MapsLinks,
}

pub(super) async fn detail(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    Query(params): Query<DetailQuery>,
) -> Result<Json<ApiResponse<HotelDetail>>, ApiError> {
    let origin = params.lat.zip(params.lng).map(|(lat, lng)| LatLng::new(lat, lng));
    let Some(hotel) = points::get_hotel(&state.store, &id, origin).await else {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("no hotel with id {id}"),
        ));
    };

    let maps_links = MapsLinks {
        ios: maps_link(MapsPlatform::Ios, hotel.position, &hotel.name),
        android: maps_link(MapsPlatform::Android, hotel.position, &hotel.name),
        web: maps_link(MapsPlatform::Web, hotel.position, &hotel.name),
    };

    Ok(Json(ApiResponse {
        data: HotelDetail { hotel, maps_links },
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Server-sent events stream of the hotel collection. Emits the current
/// snapshot on connect, then a fresh snapshot after every overlapping write.
pub(super) async fn watch(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let store = state.store.clone();
    let mut subscription = store.subscribe(points::POINTS_PATH);

    let stream = async_stream::stream! {
        let hotels = points::list_hotels(&store, None).await;
        if let Ok(event) = Event::default().event("hotels").json_data(&hotels) {
            yield Ok(event);
        }
        while subscription.next_snapshot().await.is_some() {
            let hotels = points::list_hotels(&store, None).await;
            if let Ok(event) = Event::default().event("hotels").json_data(&hotels) {
                yield Ok(event);
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

//! Typed repository over the `points/` subtree of the store.
//!
//! Reads tolerate whatever shape individual documents are in: records that do
//! not normalize (bad or missing coordinates) are silently excluded from list
//! views rather than failing the whole read. Writes validate before touching
//! the store.

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use jogjastay_core::geo::LatLng;
use jogjastay_core::hotel::{self, Hotel, RawPoint, Review};

use crate::store::Store;
use crate::StoreError;

/// Root of the hotel records subtree.
pub const POINTS_PATH: &str = "points";

#[derive(Debug, Error)]
pub enum PointsError {
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// List every hotel record that normalizes, annotated with distance when an
/// origin is known. A missing or empty `points/` subtree yields an empty list.
pub async fn list_hotels(store: &Store, origin: Option<LatLng>) -> Vec<Hotel> {
    let Some(Value::Object(points)) = store.get(POINTS_PATH).await else {
        return Vec::new();
    };
    points
        .iter()
        .filter_map(|(id, raw)| hotel::normalize(id, raw, origin))
        .collect()
}

/// Names of every raw record under `points/`, including records that do not
/// normalize. Seeding dedupes against this so a record with broken
/// coordinates still blocks a same-named seed entry.
pub(crate) async fn list_raw_names(store: &Store) -> Vec<String> {
    let Some(Value::Object(points)) = store.get(POINTS_PATH).await else {
        return Vec::new();
    };
    points
        .values()
        .filter_map(|raw| raw.get("name")?.as_str().map(str::to_owned))
        .collect()
}

/// Fetch and normalize a single hotel. `None` when the record is absent or
/// does not normalize.
pub async fn get_hotel(store: &Store, id: &str, origin: Option<LatLng>) -> Option<Hotel> {
    let raw = store.get(&format!("{POINTS_PATH}/{id}")).await?;
    hotel::normalize(id, &raw, origin)
}

/// Fields accepted when creating a hotel record.
#[derive(Debug, Clone, Deserialize)]
pub struct NewHotel {
    pub name: String,
    /// Stored verbatim; only required to be non-empty. Records whose
    /// coordinates later fail to parse are excluded from geographic views.
    pub coordinates: String,
    pub bintang: u8,
    #[serde(default)]
    pub accuration: Option<String>,
    #[serde(default)]
    pub alamat: Option<String>,
    #[serde(default)]
    pub deskripsi: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateHotel {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub coordinates: Option<String>,
    #[serde(default)]
    pub bintang: Option<u8>,
    #[serde(default)]
    pub accuration: Option<String>,
    #[serde(default)]
    pub alamat: Option<String>,
    #[serde(default)]
    pub deskripsi: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

/// Create a hotel record, returning its generated id.
///
/// # Errors
///
/// Validation failure when name or coordinates are blank or bintang is out of
/// range, otherwise a store error.
pub async fn create_hotel(store: &Store, hotel: NewHotel) -> Result<String, PointsError> {
    if hotel.name.trim().is_empty() {
        return Err(PointsError::Validation("name must be non-empty".into()));
    }
    if hotel.coordinates.trim().is_empty() {
        return Err(PointsError::Validation(
            "coordinates must be non-empty".into(),
        ));
    }
    validate_stars(hotel.bintang)?;

    let doc = json!({
        "name": hotel.name,
        "coordinates": hotel.coordinates,
        "bintang": hotel.bintang,
        "accuration": hotel.accuration,
        "alamat": hotel.alamat,
        "deskripsi": hotel.deskripsi,
        "website": hotel.website,
    });
    let id = store.push(POINTS_PATH, doc).await.map_err(PointsError::Store)?;
    Ok(id)
}

/// Merge the provided fields into an existing hotel record.
///
/// # Errors
///
/// Validation failure on blank name/coordinates or out-of-range bintang;
/// [`StoreError::NotFound`] when the record does not exist.
pub async fn update_hotel(store: &Store, id: &str, update: UpdateHotel) -> Result<(), PointsError> {
    let mut fields = Map::new();
    if let Some(name) = update.name {
        if name.trim().is_empty() {
            return Err(PointsError::Validation("name must be non-empty".into()));
        }
        fields.insert("name".into(), json!(name));
    }
    if let Some(coordinates) = update.coordinates {
        if coordinates.trim().is_empty() {
            return Err(PointsError::Validation(
                "coordinates must be non-empty".into(),
            ));
        }
        fields.insert("coordinates".into(), json!(coordinates));
    }
    if let Some(stars) = update.bintang {
        validate_stars(stars)?;
        fields.insert("bintang".into(), json!(stars));
    }
    if let Some(accuration) = update.accuration {
        fields.insert("accuration".into(), json!(accuration));
    }
    if let Some(alamat) = update.alamat {
        fields.insert("alamat".into(), json!(alamat));
    }
    if let Some(deskripsi) = update.deskripsi {
        fields.insert("deskripsi".into(), json!(deskripsi));
    }
    if let Some(website) = update.website {
        fields.insert("website".into(), json!(website));
    }

    store
        .merge(&format!("{POINTS_PATH}/{id}"), fields)
        .await
        .map_err(PointsError::Store)
}

/// Delete a hotel record and everything nested under it, reviews included.
///
/// # Errors
///
/// [`StoreError::NotFound`] when the record does not exist.
pub async fn delete_hotel(store: &Store, id: &str) -> Result<(), StoreError> {
    store.remove(&format!("{POINTS_PATH}/{id}")).await
}

/// Incoming review; the server stamps the timestamp and fills the author
/// default, never the client.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    #[serde(default, rename = "userName")]
    pub user_name: Option<String>,
    pub rating: u8,
    pub comment: String,
}

/// Append a review under `points/{id}/reviews`, returning the review key.
///
/// # Errors
///
/// Validation failure on a blank comment or rating outside 1..=5;
/// [`StoreError::NotFound`] when the hotel does not exist.
pub async fn add_review(store: &Store, id: &str, review: NewReview) -> Result<String, PointsError> {
    if review.comment.trim().is_empty() {
        return Err(PointsError::Validation("comment must be non-empty".into()));
    }
    if !(1..=5).contains(&review.rating) {
        return Err(PointsError::Validation(format!(
            "rating must be 1-5, got {}",
            review.rating
        )));
    }

    let hotel_path = format!("{POINTS_PATH}/{id}");
    if store.get(&hotel_path).await.is_none() {
        return Err(PointsError::Store(StoreError::NotFound(hotel_path)));
    }

    let user_name = review
        .user_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| "Anonim".to_owned());
    let doc = json!({
        "userName": user_name,
        "rating": review.rating,
        "comment": review.comment,
        "createdAt": Utc::now().to_rfc3339(),
    });
    let key = store
        .push(&format!("{hotel_path}/reviews"), doc)
        .await
        .map_err(PointsError::Store)?;
    Ok(key)
}

/// Reviews of one hotel, keyed by review id. Unparseable entries are skipped.
pub async fn list_reviews(store: &Store, id: &str) -> Vec<(String, Review)> {
    let Some(Value::Object(reviews)) = store.get(&format!("{POINTS_PATH}/{id}/reviews")).await
    else {
        return Vec::new();
    };
    reviews
        .into_iter()
        .filter_map(|(key, raw)| {
            let review: Review = serde_json::from_value(raw).ok()?;
            Some((key, review))
        })
        .collect()
}

/// One entry of the cross-hotel recent review feed.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentReview {
    pub id: String,
    pub hotel_id: String,
    pub hotel_name: String,
    pub user_name: String,
    pub rating: u8,
    pub comment: String,
    pub created_at: Option<chrono::DateTime<Utc>>,
}

/// Flatten reviews across every hotel, newest first (undated entries last),
/// capped at `limit`.
pub async fn recent_reviews(store: &Store, limit: usize) -> Vec<RecentReview> {
    let Some(Value::Object(points)) = store.get(POINTS_PATH).await else {
        return Vec::new();
    };

    let mut feed: Vec<RecentReview> = Vec::new();
    for (hotel_id, raw) in points {
        let Ok(point) = serde_json::from_value::<RawPoint>(raw) else {
            continue;
        };
        let hotel_name = point.name.unwrap_or_default();
        for (review_id, review) in point.reviews.unwrap_or_default() {
            feed.push(RecentReview {
                id: review_id,
                hotel_id: hotel_id.clone(),
                hotel_name: hotel_name.clone(),
                user_name: review.user_name,
                rating: review.rating,
                comment: review.comment,
                created_at: review.created_at,
            });
        }
    }

    feed.sort_by(|a, b| match (a.created_at, b.created_at) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    feed.truncate(limit);
    feed
}

fn validate_stars(stars: u8) -> Result<(), PointsError> {
    if (1..=5).contains(&stars) {
        Ok(())
    } else {
        Err(PointsError::Validation(format!(
            "bintang must be 1-5, got {stars}"
        )))
    }
}

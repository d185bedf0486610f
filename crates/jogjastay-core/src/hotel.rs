use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::geo::{self, LatLng};

/// Free-form supplemental content block on a hotel record. Reviews are
/// projected into this same shape for uniform display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One `points/{id}` document exactly as stored, with every field optional and
/// coordinates left untyped for the tolerant parse in [`normalize`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPoint {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub coordinates: Value,
    #[serde(default)]
    pub accuration: Option<String>,
    #[serde(default)]
    pub bintang: Option<f64>,
    #[serde(default)]
    pub alamat: Option<String>,
    #[serde(default)]
    pub deskripsi: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub sections: Option<Vec<Section>>,
    #[serde(default)]
    pub reviews: Option<BTreeMap<String, Review>>,
}

/// Canonical in-memory shape consumed by the filter engine and the API.
#[derive(Debug, Clone, Serialize)]
pub struct Hotel {
    pub id: String,
    pub name: String,
    pub position: LatLng,
    pub star_rating: u8,
    pub accuration: Option<String>,
    pub address: String,
    pub description: String,
    pub website: Option<String>,
    pub sections: Vec<Section>,
    pub reviews: Vec<Review>,
    pub distance_km: Option<f64>,
}

/// Convert one raw `points/{id}` document into the canonical [`Hotel`] shape.
///
/// Returns `None` when the coordinates are absent or unparseable; such records
/// stay in the store but are excluded from every geographic view. Reviews are
/// merged into `sections` as synthetic entries so detail screens render one
/// uniform list. When `origin` is known, `distance_km` is annotated.
#[must_use]
pub fn normalize(id: &str, raw: &Value, origin: Option<LatLng>) -> Option<Hotel> {
    let point: RawPoint = serde_json::from_value(raw.clone()).ok()?;
    let position = geo::parse_value(&point.coordinates)?;

    let reviews: Vec<Review> = point.reviews.unwrap_or_default().into_values().collect();
    let mut sections = point.sections.unwrap_or_default();
    sections.extend(reviews.iter().map(review_section));

    Some(Hotel {
        id: id.to_owned(),
        name: point.name.unwrap_or_default(),
        position,
        star_rating: floor_stars(point.bintang),
        accuration: point.accuration,
        address: point.alamat.unwrap_or_default(),
        description: point.deskripsi.unwrap_or_default(),
        website: point.website,
        sections,
        reviews,
        distance_km: origin.map(|o| geo::haversine_km(o, position)),
    })
}

/// Star levels floor to an integer before any bucketing; absent, non-finite,
/// or sub-1 values count as 0 (unrated).
#[must_use]
pub fn floor_stars(raw: Option<f64>) -> u8 {
    match raw {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(v) if v.is_finite() && v >= 1.0 => v.floor().min(255.0) as u8,
        _ => 0,
    }
}

fn review_section(review: &Review) -> Section {
    let author = if review.user_name.trim().is_empty() {
        "Anon"
    } else {
        review.user_name.as_str()
    };
    let rating = if review.rating == 0 {
        String::new()
    } else {
        review.rating.to_string()
    };
    Section {
        title: format!("Ulasan: {author} \u{2022} {rating}\u{2b50}"),
        content: review.comment.clone(),
        source: review.created_at.map(|t| t.to_rfc3339()),
    }
}

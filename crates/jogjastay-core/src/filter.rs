//! Listing selection: text search, star bucketing, and proximity filtering
//! over the already-normalized in-memory collection.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::geo::LatLng;
use crate::hotel::Hotel;

/// Default proximity-search radius in kilometers.
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewFilter {
    #[default]
    All,
    Stars(u8),
    Near,
}

#[derive(Debug, Error)]
#[error("unknown filter '{0}'; expected all, 3, 4, 5, or near")]
pub struct ParseFilterError(String);

impl FromStr for ViewFilter {
    type Err = ParseFilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "3" => Ok(Self::Stars(3)),
            "4" => Ok(Self::Stars(4)),
            "5" => Ok(Self::Stars(5)),
            "near" => Ok(Self::Near),
            other => Err(ParseFilterError(other.to_owned())),
        }
    }
}

/// View state driving one listing render.
#[derive(Debug, Clone)]
pub struct ViewQuery {
    pub filter: ViewFilter,
    pub search: String,
    pub origin: Option<LatLng>,
    pub radius_km: f64,
}

impl Default for ViewQuery {
    fn default() -> Self {
        Self {
            filter: ViewFilter::All,
            search: String::new(),
            origin: None,
            radius_km: DEFAULT_RADIUS_KM,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StarBucket {
    pub stars: u8,
    pub hotels: Vec<Hotel>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Listing {
    Flat { hotels: Vec<Hotel> },
    Grouped { buckets: Vec<StarBucket> },
}

/// Apply the full view pipeline: the text filter first, then the active tab.
#[must_use]
pub fn select(hotels: &[Hotel], query: &ViewQuery) -> Listing {
    let matched = search(hotels, &query.search);
    match query.filter {
        ViewFilter::All => Listing::Grouped {
            buckets: star_buckets(&matched),
        },
        ViewFilter::Stars(stars) => Listing::Flat {
            hotels: with_stars(&matched, stars),
        },
        ViewFilter::Near => Listing::Flat {
            hotels: nearest(&matched, query.origin, query.radius_km),
        },
    }
}

/// Case-insensitive substring match against the hotel name; an empty query
/// matches everything.
#[must_use]
pub fn search(hotels: &[Hotel], text: &str) -> Vec<Hotel> {
    let needle = text.trim().to_lowercase();
    hotels
        .iter()
        .filter(|h| needle.is_empty() || h.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Partition the rating >= 3 subset into 5/4/3 sections. Ratings 1 and 2 are
/// accepted by the write forms but never shown in the grouped view; empty
/// sections are dropped.
#[must_use]
pub fn star_buckets(hotels: &[Hotel]) -> Vec<StarBucket> {
    [5_u8, 4, 3]
        .into_iter()
        .filter_map(|stars| {
            let bucket = with_stars(hotels, stars);
            (!bucket.is_empty()).then_some(StarBucket {
                stars,
                hotels: bucket,
            })
        })
        .collect()
}

/// Hotels whose floored star rating equals `stars`, alphabetical by name.
#[must_use]
pub fn with_stars(hotels: &[Hotel], stars: u8) -> Vec<Hotel> {
    let mut matched: Vec<Hotel> = hotels
        .iter()
        .filter(|h| h.star_rating == stars)
        .cloned()
        .collect();
    matched.sort_by(|a, b| a.name.cmp(&b.name));
    matched
}

/// Hotels with a known distance within `radius_km` of the origin, nearest
/// first, ties broken alphabetically. Without a known origin the result is
/// empty and the caller is expected to prompt for location rather than render
/// "no results".
#[must_use]
pub fn nearest(hotels: &[Hotel], origin: Option<LatLng>, radius_km: f64) -> Vec<Hotel> {
    if origin.is_none() {
        return Vec::new();
    }
    let mut matched: Vec<Hotel> = hotels
        .iter()
        .filter(|h| h.distance_km.is_some_and(|d| d <= radius_km))
        .cloned()
        .collect();
    matched.sort_by(|a, b| {
        let da = a.distance_km.unwrap_or(f64::MAX);
        let db = b.distance_km.unwrap_or(f64::MAX);
        da.partial_cmp(&db)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    matched
}

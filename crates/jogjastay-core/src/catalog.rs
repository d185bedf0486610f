//! Seed catalog: the fixed table of hotels copied into the store by the
//! one-time migration, loaded from `config/hotels.yaml`.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::geo::{self, LatLng};
use crate::hotel::Section;
use crate::CatalogError;

/// Record count at or above which the seeding routine does nothing.
pub const SEED_MIN_COUNT: usize = 17;

/// Star rating applied to seed entries that carry none.
pub const DEFAULT_STARS: u8 = 3;

/// Accuracy label applied to seed entries that carry none.
pub const DEFAULT_ACCURATION: &str = "100 m";

/// Coordinate shapes tolerated in the catalog file, mirroring what the record
/// normalizer tolerates in stored documents.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CoordinateSpec {
    Text(String),
    Pair([f64; 2]),
    Named { latitude: f64, longitude: f64 },
}

impl CoordinateSpec {
    /// Resolve to a concrete position; `None` when the text form does not
    /// parse as two finite numbers.
    #[must_use]
    pub fn resolve(&self) -> Option<LatLng> {
        match self {
            Self::Text(raw) => geo::parse_wire(raw),
            Self::Pair([lat, lng]) => Some(LatLng::new(*lat, *lng)),
            Self::Named {
                latitude,
                longitude,
            } => Some(LatLng::new(*latitude, *longitude)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HotelSeed {
    pub name: String,
    #[serde(default)]
    pub koordinat: Option<CoordinateSpec>,
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
    #[serde(default)]
    pub sections: Option<Vec<Section>>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub hotels: Vec<HotelSeed>,
}

/// Load and validate the hotel catalog from a YAML file.
///
/// # Errors
///
/// Returns `CatalogError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_catalog(path: &Path) -> Result<CatalogFile, CatalogError> {
    let content = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
        path: path.display().to_string(),
        source: e,
    })?;

    let catalog: CatalogFile = serde_yaml::from_str(&content)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

fn validate_catalog(catalog: &CatalogFile) -> Result<(), CatalogError> {
    let mut seen_names = HashSet::new();

    for entry in &catalog.hotels {
        if entry.name.trim().is_empty() {
            return Err(CatalogError::Validation(
                "hotel name must be non-empty".to_string(),
            ));
        }

        if let Some(stars) = entry.bintang {
            if !(1..=5).contains(&stars) {
                return Err(CatalogError::Validation(format!(
                    "hotel '{}' has invalid bintang {stars}; must be 1-5",
                    entry.name
                )));
            }
        }

        if !seen_names.insert(entry.name.to_lowercase()) {
            return Err(CatalogError::Validation(format!(
                "duplicate hotel name: '{}'",
                entry.name
            )));
        }
    }

    Ok(())
}

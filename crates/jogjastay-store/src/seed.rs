//! One-time catalog migration into the `points/` subtree.

use serde_json::json;
use tracing::{info, warn};

use jogjastay_core::catalog::{HotelSeed, DEFAULT_ACCURATION, DEFAULT_STARS, SEED_MIN_COUNT};
use jogjastay_core::geo::DEFAULT_CENTER;

use crate::points::POINTS_PATH;
use crate::store::Store;
use crate::StoreError;

/// Flag recorded after a completed seeding pass. Informational only: whether a
/// fresh run seeds again is decided by the record count, not this flag.
pub const MIGRATED_FLAG_PATH: &str = "app_metadata/hotels_migrated";

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Copy the seed catalog into `points/` unless the store already holds at
/// least [`SEED_MIN_COUNT`] records. Entries whose name already exists
/// (case-insensitively) are skipped; entries with unusable coordinates fall
/// back to the city-center position. After a pass, the migrated flag is set
/// whether or not any entry failed.
///
/// # Errors
///
/// Returns `StoreError` only for store-level failures; individual bad catalog
/// entries are counted in the report and logged, never fatal.
pub async fn run_migration(store: &Store, seeds: &[HotelSeed]) -> Result<SeedReport, StoreError> {
    let existing = crate::points::list_raw_names(store).await;
    if existing.len() >= SEED_MIN_COUNT {
        info!(
            count = existing.len(),
            "store already seeded, skipping migration"
        );
        return Ok(SeedReport {
            skipped: seeds.len(),
            ..SeedReport::default()
        });
    }

    let mut existing_names: std::collections::HashSet<String> =
        existing.iter().map(|n| n.to_lowercase()).collect();
    let mut report = SeedReport::default();

    for seed in seeds {
        if seed.name.trim().is_empty() {
            warn!("skipping seed entry with empty name");
            report.failed += 1;
            continue;
        }
        if !existing_names.insert(seed.name.to_lowercase()) {
            report.skipped += 1;
            continue;
        }

        let position = match seed.koordinat.as_ref().and_then(|k| k.resolve()) {
            Some(p) => p,
            None => {
                warn!(name = %seed.name, "seed entry has unusable coordinates, using city center");
                DEFAULT_CENTER
            }
        };

        let doc = json!({
            "name": seed.name.clone(),
            "coordinates": position.to_wire(),
            "bintang": seed.bintang.unwrap_or(DEFAULT_STARS),
            "accuration": seed.accuration.clone().unwrap_or_else(|| DEFAULT_ACCURATION.to_owned()),
            "alamat": seed.alamat.clone(),
            "deskripsi": seed.deskripsi.clone(),
            "website": seed.website.clone(),
            "sections": seed.sections.clone(),
        });

        match store.push(POINTS_PATH, doc).await {
            Ok(_) => report.created += 1,
            Err(e) => {
                warn!(name = %seed.name, error = %e, "failed to seed entry");
                report.failed += 1;
            }
        }
    }

    store.set(MIGRATED_FLAG_PATH, json!(true)).await?;
    info!(
        created = report.created,
        skipped = report.skipped,
        failed = report.failed,
        "seeding pass complete"
    );
    Ok(report)
}

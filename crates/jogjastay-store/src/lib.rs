//! Document store boundary for the hotel service.
//!
//! [`store::Store`] is the generic path-addressed JSON tree; [`points`] is the
//! typed repository for `points/{id}` hotel records layered on top of it;
//! [`seed`] runs the one-time catalog migration and [`roles`] manages the
//! `users/{uid}` role records.

pub mod points;
pub mod roles;
pub mod seed;
pub mod store;

use thiserror::Error;

pub use points::{NewHotel, NewReview, PointsError, RecentReview, UpdateHotel};
pub use roles::{assign_role, bootstrap_admin, role_of, Role};
pub use seed::{run_migration, SeedReport, MIGRATED_FLAG_PATH};
pub use store::{ChangeEvent, Store, Subscription};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no document at {0}")]
    NotFound(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

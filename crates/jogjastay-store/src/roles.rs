//! Role records under `users/{uid}`.
//!
//! Roles are granted explicitly and every grant leaves an audit log line.
//! The only implicit path is [`bootstrap_admin`], which promotes the
//! configured operator account once, and only when it holds no role yet.

use std::fmt;
use std::str::FromStr;

use serde_json::{json, Value};
use tracing::info;

use crate::store::Store;
use crate::StoreError;

pub const USERS_PATH: &str = "users";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::User => write!(f, "user"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            other => Err(format!("unknown role '{other}', expected admin or user")),
        }
    }
}

/// Current role of a user, `None` when the user record or role field is
/// absent.
pub async fn role_of(store: &Store, uid: &str) -> Option<Role> {
    let value = store.get(&format!("{USERS_PATH}/{uid}/role")).await?;
    value.as_str()?.parse().ok()
}

/// Grant `role` to `uid`, creating the user record when needed. The grant is
/// written to the audit log with the acting principal.
///
/// # Errors
///
/// Returns `StoreError` when persisting fails.
pub async fn assign_role(
    store: &Store,
    uid: &str,
    role: Role,
    granted_by: &str,
) -> Result<(), StoreError> {
    store
        .set(&format!("{USERS_PATH}/{uid}/role"), json!(role.to_string()))
        .await?;
    info!(uid, role = %role, granted_by, "role granted");
    Ok(())
}

/// Promote the user whose email matches `email` to admin, provided that user
/// exists and holds no role yet. Returns the promoted uid, or `None` when no
/// promotion happened.
///
/// # Errors
///
/// Returns `StoreError` when persisting fails.
pub async fn bootstrap_admin(store: &Store, email: &str) -> Result<Option<String>, StoreError> {
    let Some(Value::Object(users)) = store.get(USERS_PATH).await else {
        return Ok(None);
    };

    let matched = users.iter().find_map(|(uid, doc)| {
        let doc_email = doc.get("email")?.as_str()?;
        (doc_email.eq_ignore_ascii_case(email) && doc.get("role").is_none())
            .then(|| uid.clone())
    });

    let Some(uid) = matched else {
        return Ok(None);
    };
    store
        .set(&format!("{USERS_PATH}/{uid}/role"), json!("admin"))
        .await?;
    info!(uid = %uid, email, "bootstrap admin promoted");
    Ok(Some(uid))
}

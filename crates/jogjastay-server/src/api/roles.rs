use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use jogjastay_store::{roles, Role};

use crate::middleware::RequestId;

use super::{map_store_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct AssignRoleBody {
    role: String,
}

#[derive(Debug, Serialize)]
pub(super) struct AssignedRole {
    pub uid: String,
    pub role: String,
}

pub(super) async fn assign(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(uid): Path<String>,
    Json(payload): Json<AssignRoleBody>,
) -> Result<Json<ApiResponse<AssignedRole>>, ApiError> {
    let role: Role = payload
        .role
        .parse()
        .map_err(|e: String| ApiError::new(req_id.0.clone(), "validation_error", e))?;

    roles::assign_role(&state.store, &uid, role, "api")
        .await
        .map_err(|e| map_store_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: AssignedRole {
            uid,
            role: role.to_string(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

//! Host package purchase endpoints

use axum::Json;
use axum::extract::{Extension, Path, State};
use shared::error::ApiResponse;

use crate::auth::Identity;
use crate::error::ServiceError;
use crate::payment;
use crate::state::AppState;

/// Create a hosted checkout link for a package purchase. The caller is the
/// purchasing host.
pub async fn checkout(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(package_id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ServiceError> {
    let url = payment::create_package_checkout(&state, identity.user_id, package_id).await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "checkoutUrl": url }),
    )))
}

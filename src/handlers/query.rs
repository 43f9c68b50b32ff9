// handlers/query.rs - POST /api/v1/query handler

use axum::{body::Bytes, extract::State, response::Json, Extension};

use crate::app::AppState;
use crate::auth::RequestIdentity;
use crate::error::ApiError;
use crate::graph::{QueryRequest, QueryResponse, RequestContext};

/// Run one batch of root fields. Field failures are reported in the response body;
/// only an unreadable request body fails the whole request.
pub async fn query(
    State(state): State<AppState>,
    Extension(identity): Extension<RequestIdentity>,
    body: Bytes,
) -> Result<Json<QueryResponse>, ApiError> {
    let request: QueryRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::invalid_json(format!("Invalid query body: {}", e)))?;

    if request.fields.is_empty() {
        return Err(ApiError::bad_request("Query must select at least one field"));
    }

    tracing::debug!(
        "Executing {:?} with {} field(s), anonymous={}",
        request.kind,
        request.fields.len(),
        identity.is_anonymous()
    );

    let ctx = RequestContext::new(identity);
    Ok(Json(state.schema.execute(&ctx, request).await))
}

//! # DELETE /files
//!
//! 複数オブジェクトの一括削除。

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use upload_gateway_types::{DeleteOutcome, DeleteRequest};

use crate::config::GatewayState;
use crate::error::GatewayError;

/// DELETE /files — キーを指定して一括削除する。
///
/// 一部のキーの削除に失敗しても200を返し、結果にキーごとの失敗を含める。
pub async fn handle_delete(
    State(state): State<Arc<GatewayState>>,
    Json(body): Json<DeleteRequest>,
) -> Result<Json<DeleteOutcome>, GatewayError> {
    let outcome = state.storage.delete_many(&body.keys).await?;
    Ok(Json(outcome))
}

//! # 未定義ルート

use axum::http::StatusCode;
use axum::Json;
use upload_gateway_types::MessageResponse;

/// 定義されていないルートへのリクエストを拒否する。
pub async fn handle_unknown_route() -> (StatusCode, Json<MessageResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(MessageResponse::new("Invalid/Incorrect route")),
    )
}

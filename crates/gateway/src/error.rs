//! # Gateway エラー型
//!
//! ストレージ層のエラーは変換されずに呼び出し側へ伝播する。
//! HTTP応答ではバックエンドの詳細を返さず、ログにのみ記録する。

use axum::http::StatusCode;
use axum::Json;
use upload_gateway_types::MessageResponse;

/// Gatewayエラー型。
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// ストレージクライアントを構築できない（不正なエンドポイント・認証情報）
    #[error("ストレージクライアントの構築に失敗: {0}")]
    Configuration(String),
    /// バケット作成またはポリシー設定に失敗（既に自分が所有している場合を除く）
    #[error("バケットの準備に失敗: {0}")]
    Provisioning(String),
    /// 単一オブジェクトの書き込みに失敗
    #[error("オブジェクトの書き込みに失敗 (key: {key}): {reason}")]
    Write { key: String, reason: String },
    /// 一括削除の呼び出し自体が失敗（何も削除されていない）
    #[error("一括削除に失敗: {0}")]
    BulkDelete(String),
    /// 複数ファイルのアップロードのうち一部または全部が失敗
    #[error("アップロードに失敗したファイルがあります: {}", .0.join(", "))]
    UploadFailed(Vec<String>),
    /// 不正なリクエスト（ファイル未添付等）。ストレージ操作の前に拒否する。
    #[error("{0}")]
    BadRequest(String),
    /// リクエストボディがサイズ上限を超えた
    #[error("{0}")]
    PayloadTooLarge(String),
}

impl axum::response::IntoResponse for GatewayError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            GatewayError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            GatewayError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg.clone()),
            GatewayError::UploadFailed(files) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to upload file(s): {}", files.join(", ")),
            ),
            GatewayError::Write { .. } | GatewayError::BulkDelete(_) => (
                StatusCode::BAD_GATEWAY,
                "Storage backend request failed".to_string(),
            ),
            GatewayError::Configuration(_) | GatewayError::Provisioning(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "リクエストの処理に失敗しました");
        }

        (status, Json(MessageResponse::new(message))).into_response()
    }
}

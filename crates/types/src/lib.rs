//! # Upload Gateway 共有型定義
//!
//! アップロードGatewayのHTTP層とストレージ層で共有するリクエスト・レスポンス型。
//!
//! ## エンコーディング規則
//! - すべてJSON（snake_case）
//! - オブジェクトキーはバケット内のパス文字列をそのまま使用する（エスケープなし）

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// /upload
// ---------------------------------------------------------------------------

/// /upload レスポンス。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    /// 結果メッセージ
    pub message: String,
    /// 保存された各オブジェクトの公開URL（アップロードされたファイルの順序）
    pub data: Vec<String>,
}

/// メッセージのみのレスポンス。エラー応答や未定義ルートで使用する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    /// 結果メッセージ
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// /files (一括削除)
// ---------------------------------------------------------------------------

/// DELETE /files リクエスト。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    /// 削除対象のオブジェクトキー（重複可）
    pub keys: Vec<String>,
}

/// 一括削除の結果。
///
/// バックエンドが返したキーごとの結果をそのまま保持する。
/// 一部のキーが失敗しても呼び出し自体はエラーにならない。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    /// 削除されたキー
    pub deleted: Vec<String>,
    /// 削除に失敗したキー
    pub failed: Vec<DeleteFailure>,
}

impl DeleteOutcome {
    /// すべてのキーが削除されたか。
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 一括削除で失敗した1キー分の情報。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteFailure {
    /// 対象のオブジェクトキー
    pub key: String,
    /// バックエンドのエラーコード（例: "NoSuchKey", "AccessDenied"）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// バックエンドのエラーメッセージ
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

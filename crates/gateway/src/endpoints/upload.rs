//! # POST /upload
//!
//! multipartで受け取ったファイルをバケットへ保存し、公開URLを返す。
//!
//! ## オブジェクトキー
//! `{category}/{uuid}/{file_name}`。ファイルごとに一意なディレクトリを割り当てるため、
//! 同名ファイルの同時アップロードでも上書きは起きない。

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use futures::future::join_all;
use upload_gateway_types::UploadResponse;

use crate::config::GatewayState;
use crate::error::GatewayError;
use crate::storage::address::object_key;
use crate::storage::UploadMetadata;

/// ファイルを受け付けるフォームフィールド名
pub const FILES_FIELD: &str = "files";

/// フォームから取り出した1ファイル分のデータ。
struct FormFile {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

/// クライアントが送ったファイル名をキーに使える形にする。
///
/// パス部分を除去し、`[A-Za-z0-9._-]` 以外の文字を `-` に置き換える。
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let sanitized: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        "file".to_string()
    } else {
        sanitized
    }
}

/// multipartの読み取りエラーを変換する。サイズ超過は413として返す。
fn multipart_error(context: &str, e: MultipartError) -> GatewayError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        GatewayError::PayloadTooLarge(e.body_text())
    } else {
        GatewayError::BadRequest(format!("{context}: {e}"))
    }
}

/// POST /upload — ファイルのアップロード。
///
/// 各ファイルは独立に並行して書き込まれ、1つが失敗しても他の書き込みは中断しない。
/// 失敗したファイルが1つでもあれば、失敗したファイル名を含むエラーを返す。
pub async fn handle_upload(
    State(state): State<Arc<GatewayState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, GatewayError> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart body", e))?
    {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read file", e))?;

        files.push(FormFile {
            file_name,
            content_type,
            data,
        });
    }

    if files.is_empty() {
        return Err(GatewayError::BadRequest(
            "Attach at least one file to upload".to_string(),
        ));
    }

    tracing::info!(files = files.len(), "アップロードを受け付けました");

    let storage = &state.storage;
    let uploads = files.iter().map(|file| {
        let path = format!("{}/{}", state.upload_category, uuid::Uuid::new_v4());
        let key = object_key(&path, &sanitize_file_name(&file.file_name));
        let metadata = UploadMetadata {
            content_type: file.content_type.clone(),
            content_encoding: None,
        };
        let data = file.data.clone();
        async move { storage.upload(&key, data, metadata).await }
    });
    let results = join_all(uploads).await;

    let mut urls = Vec::with_capacity(results.len());
    let mut failed = Vec::new();
    for (file, result) in files.iter().zip(results) {
        match result {
            Ok(url) => urls.push(url),
            Err(e) => {
                tracing::error!(file_name = %file.file_name, error = %e, "ファイルの保存に失敗しました");
                failed.push(file.file_name.clone());
            }
        }
    }

    if !failed.is_empty() {
        return Err(GatewayError::UploadFailed(failed));
    }

    Ok(Json(UploadResponse {
        message: "File(s) successfully uploaded".to_string(),
        data: urls,
    }))
}

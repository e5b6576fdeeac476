//! # オブジェクトの書き込み・一括削除

use std::sync::Arc;

use bytes::Bytes;
use upload_gateway_types::DeleteOutcome;

use crate::config::StorageConfig;
use crate::error::GatewayError;

use super::address::resolve_url;
use super::{StorageClientFactory, StorageConnector, UploadMetadata};

/// 1回の一括削除で指定できるキーの上限（S3 DeleteObjectsの制限）。
pub const MAX_DELETE_KEYS: usize = 1000;

/// オブジェクトストレージへの書き込みと一括削除。
pub struct StorageService {
    config: Arc<StorageConfig>,
    factory: StorageClientFactory,
}

impl StorageService {
    pub fn new(config: Arc<StorageConfig>, connector: Box<dyn StorageConnector>) -> Self {
        let factory = StorageClientFactory::new(config.clone(), connector);
        Self { config, factory }
    }

    /// `key` にペイロードを書き込み、公開URLを返す。
    ///
    /// 同じキーのオブジェクトが既にあれば上書きする。
    pub async fn upload(
        &self,
        key: &str,
        payload: Bytes,
        metadata: UploadMetadata,
    ) -> Result<String, GatewayError> {
        if key.is_empty() {
            return Err(GatewayError::BadRequest(
                "Object key must not be empty".to_string(),
            ));
        }

        let client = self.factory.get_client().await?;
        let size = payload.len();

        client
            .put_object(&self.config.bucket, key, payload, &metadata)
            .await?;

        let url = resolve_url(&self.config, key);
        tracing::info!(
            bucket = %self.config.bucket,
            key = %key,
            size,
            content_type = ?metadata.content_type,
            "オブジェクトを書き込みました"
        );
        Ok(url)
    }

    /// 複数のオブジェクトを1回のリクエストで削除する。
    ///
    /// キーごとの失敗は結果に含めて返し、エラーにはしない。
    /// 呼び出し自体の失敗のみエラーとなる。
    pub async fn delete_many(&self, keys: &[String]) -> Result<DeleteOutcome, GatewayError> {
        if keys.is_empty() {
            return Err(GatewayError::BadRequest(
                "At least one key is required".to_string(),
            ));
        }
        if keys.len() > MAX_DELETE_KEYS {
            return Err(GatewayError::BadRequest(format!(
                "At most {MAX_DELETE_KEYS} keys can be deleted at once"
            )));
        }

        let client = self.factory.get_client().await?;
        let outcome = client.delete_objects(&self.config.bucket, keys).await?;

        if outcome.is_complete() {
            tracing::info!(
                bucket = %self.config.bucket,
                deleted = outcome.deleted.len(),
                "オブジェクトを一括削除しました"
            );
        } else {
            tracing::warn!(
                bucket = %self.config.bucket,
                deleted = outcome.deleted.len(),
                failed = outcome.failed.len(),
                failed_keys = ?outcome.failed.iter().map(|f| f.key.as_str()).collect::<Vec<_>>(),
                "一部のオブジェクトを削除できませんでした"
            );
        }

        Ok(outcome)
    }
}

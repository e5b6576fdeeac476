//! # ストレージクライアントの共有
//!
//! クライアントはプロセス内で一度だけ構築される。同時に取得を試みた呼び出しは
//! すべて同じハンドルを受け取る。開発・テスト環境ではバケットの準備も
//! 同じ初期化の中で一度だけ行う。

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::config::StorageConfig;
use crate::error::GatewayError;

use super::{provision, ObjectStorage, StorageConnector};

/// クライアントハンドルを遅延構築して共有する。
pub struct StorageClientFactory {
    config: Arc<StorageConfig>,
    connector: Box<dyn StorageConnector>,
    client: OnceCell<Arc<dyn ObjectStorage>>,
}

impl StorageClientFactory {
    pub fn new(config: Arc<StorageConfig>, connector: Box<dyn StorageConnector>) -> Self {
        Self {
            config,
            connector,
            client: OnceCell::new(),
        }
    }

    /// クライアントハンドルを取得する。
    ///
    /// 初回のみ構築する。構築またはバケット準備に失敗した場合はエラーを返し、
    /// 次回の呼び出しで再度構築を試みる。
    pub async fn get_client(&self) -> Result<Arc<dyn ObjectStorage>, GatewayError> {
        let client = self
            .client
            .get_or_try_init(|| async {
                let client = self.connector.connect(&self.config).await?;
                tracing::info!(
                    environment = %self.config.environment.as_str(),
                    region = %self.config.region,
                    local = self.config.backend.is_local(),
                    "ストレージクライアントを構築しました"
                );

                if self.config.backend.is_local() {
                    provision::ensure_bucket(&self.config.bucket, &self.config.region, client.as_ref())
                        .await?;
                }

                Ok::<_, GatewayError>(client)
            })
            .await?;

        Ok(Arc::clone(client))
    }
}

//! # オブジェクトストレージ
//!
//! アップロードされたファイルをS3互換バケットへ保存し、公開URLを返す。
//!
//! ## 構成
//! - [`client::StorageClientFactory`]: クライアントを一度だけ構築して共有する
//! - [`provision`]: 開発・テスト環境でのバケット作成と公開読み取りポリシー設定
//! - [`address`]: オブジェクトキーと公開URLの導出（I/Oなし）
//! - [`service::StorageService`]: 書き込みと一括削除
//! - [`s3`]: AWS SDKによる実装

pub mod address;
pub mod client;
pub mod provision;
pub mod s3;
pub mod service;

#[cfg(test)]
pub(crate) mod mock;

use std::sync::Arc;

use bytes::Bytes;
use upload_gateway_types::DeleteOutcome;

use crate::config::StorageConfig;
use crate::error::GatewayError;

pub use client::StorageClientFactory;
pub use s3::S3Connector;
pub use service::StorageService;

/// 書き込み時に付与するメタデータ。未指定の値は設定されずにそのまま渡る。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadMetadata {
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
}

/// バケット作成の結果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketCreation {
    /// 新規に作成した
    Created,
    /// 既に自分が所有している（前回の起動等で作成済み）
    AlreadyOwned,
}

/// オブジェクトストレージのクライアントハンドル。
///
/// 1つのバックエンド（ローカルまたはクラウド）と1つのリージョンに束縛される。
/// 構築後に設定が変わることはない。
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// バケットを作成する。既に自分が所有している場合は [`BucketCreation::AlreadyOwned`]。
    async fn create_bucket(&self, bucket: &str, region: &str)
        -> Result<BucketCreation, GatewayError>;

    /// バケットポリシー（JSON文書）を設定する。
    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), GatewayError>;

    /// 公開読み取り可能なオブジェクトとして書き込む。
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        payload: Bytes,
        metadata: &UploadMetadata,
    ) -> Result<(), GatewayError>;

    /// 1回のリクエストで複数オブジェクトを削除し、キーごとの結果を返す。
    async fn delete_objects(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<DeleteOutcome, GatewayError>;
}

/// 設定に応じたクライアントハンドルを構築する。
#[async_trait::async_trait]
pub trait StorageConnector: Send + Sync {
    async fn connect(&self, config: &StorageConfig) -> Result<Arc<dyn ObjectStorage>, GatewayError>;
}

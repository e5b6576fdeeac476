//! # S3互換ストレージ実装
//!
//! AWS S3, MinIO 等のS3互換APIをAWS SDKで使用する実装。
//!
//! - ローカル: 明示的なエンドポイント、パススタイル、静的な認証情報
//! - クラウド: SDKのデフォルト認証チェーン（環境変数、プロファイル、IAMロール等）

use std::sync::Arc;

use aws_config::ConfigLoader;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, ProvideCredentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, Delete, ObjectCannedAcl,
    ObjectIdentifier,
};
use bytes::Bytes;
use upload_gateway_types::{DeleteFailure, DeleteOutcome};

use crate::config::{Backend, LocalEndpoint, StorageConfig};
use crate::error::GatewayError;

use super::{BucketCreation, ObjectStorage, StorageConnector, UploadMetadata};

/// ロケーション制約を送ってはならないリージョン。
const DEFAULT_S3_REGION: &str = "us-east-1";

/// 静的認証情報のプロバイダ名。
const CREDENTIALS_PROVIDER_NAME: &str = "upload-gateway-local";

/// 設定に応じたS3クライアントを構築する。
pub struct S3Connector;

impl S3Connector {
    fn local_client(local: &LocalEndpoint, region: &str) -> Result<aws_sdk_s3::Client, GatewayError> {
        if !(local.base_url.starts_with("http://") || local.base_url.starts_with("https://")) {
            return Err(GatewayError::Configuration(format!(
                "ローカルエンドポイントのURLが不正です: {}",
                local.base_url
            )));
        }

        let credentials = Credentials::new(
            local.access_key.clone(),
            local.secret_key.clone(),
            None,
            None,
            CREDENTIALS_PROVIDER_NAME,
        );

        let config = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .endpoint_url(&local.base_url)
            .force_path_style(true)
            .credentials_provider(credentials)
            .build();

        Ok(aws_sdk_s3::Client::from_conf(config))
    }

    /// デフォルト認証チェーンでクライアントを構築する。
    ///
    /// 認証情報は構築時に一度解決し、取得できなければ構築失敗とする。
    async fn cloud_client(loader: ConfigLoader) -> Result<aws_sdk_s3::Client, GatewayError> {
        let sdk_config = loader.load().await;

        let provider = sdk_config.credentials_provider().ok_or_else(|| {
            GatewayError::Configuration("AWS認証情報のプロバイダが見つかりません".to_string())
        })?;
        provider.provide_credentials().await.map_err(|e| {
            GatewayError::Configuration(format!(
                "AWS認証情報を取得できません: {}",
                DisplayErrorContext(&e)
            ))
        })?;

        Ok(aws_sdk_s3::Client::new(&sdk_config))
    }
}

#[async_trait::async_trait]
impl StorageConnector for S3Connector {
    async fn connect(&self, config: &StorageConfig) -> Result<Arc<dyn ObjectStorage>, GatewayError> {
        let client = match &config.backend {
            Backend::Local(local) => {
                tracing::info!(endpoint = %local.base_url, "ローカルS3互換ストレージに接続します");
                Self::local_client(local, &config.region)?
            }
            Backend::Cloud => {
                tracing::info!(region = %config.region, "AWS S3に接続します");
                let loader = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(config.region.clone()));
                Self::cloud_client(loader).await?
            }
        };

        Ok(Arc::new(S3ObjectStorage::new(client)))
    }
}

/// バケット作成の失敗が「既に自分が所有している」ことを示すか。
fn is_bucket_already_owned(err: &SdkError<CreateBucketError>) -> bool {
    err.as_service_error()
        .is_some_and(|e| e.is_bucket_already_owned_by_you())
}

/// AWS SDKのS3クライアントによる [`ObjectStorage`] 実装。
pub struct S3ObjectStorage {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStorage {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn create_bucket(
        &self,
        bucket: &str,
        region: &str,
    ) -> Result<BucketCreation, GatewayError> {
        let configuration = (region != DEFAULT_S3_REGION).then(|| {
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region))
                .build()
        });

        match self
            .client
            .create_bucket()
            .bucket(bucket)
            .set_create_bucket_configuration(configuration)
            .send()
            .await
        {
            Ok(_) => Ok(BucketCreation::Created),
            Err(e) if is_bucket_already_owned(&e) => Ok(BucketCreation::AlreadyOwned),
            Err(e) => Err(GatewayError::Provisioning(format!(
                "バケット作成失敗 ({bucket}): {}",
                DisplayErrorContext(&e)
            ))),
        }
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), GatewayError> {
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await
            .map_err(|e| {
                GatewayError::Provisioning(format!(
                    "バケットポリシー設定失敗 ({bucket}): {}",
                    DisplayErrorContext(&e)
                ))
            })?;
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        payload: Bytes,
        metadata: &UploadMetadata,
    ) -> Result<(), GatewayError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(payload))
            .acl(ObjectCannedAcl::PublicRead)
            .set_content_type(metadata.content_type.clone())
            .set_content_encoding(metadata.content_encoding.clone())
            .send()
            .await
            .map_err(|e| GatewayError::Write {
                key: key.to_string(),
                reason: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }

    async fn delete_objects(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<DeleteOutcome, GatewayError> {
        let objects = keys
            .iter()
            .map(|key| ObjectIdentifier::builder().key(key).build())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| GatewayError::BulkDelete(format!("削除対象の構築に失敗: {e}")))?;

        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(false)
            .build()
            .map_err(|e| GatewayError::BulkDelete(format!("削除リクエストの構築に失敗: {e}")))?;

        let output = self
            .client
            .delete_objects()
            .bucket(bucket)
            .delete(delete)
            .send()
            .await
            .map_err(|e| GatewayError::BulkDelete(DisplayErrorContext(&e).to_string()))?;

        let deleted = output
            .deleted()
            .iter()
            .filter_map(|d| d.key().map(str::to_string))
            .collect();

        let failed = output
            .errors()
            .iter()
            .map(|e| DeleteFailure {
                key: e.key().unwrap_or_default().to_string(),
                code: e.code().map(str::to_string),
                message: e.message().map(str::to_string),
            })
            .collect();

        Ok(DeleteOutcome { deleted, failed })
    }
}

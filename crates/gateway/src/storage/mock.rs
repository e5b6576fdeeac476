//! # テスト用モックストレージ
//!
//! S3への接続なしでバケット・オブジェクトをメモリ上に保持する。

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use upload_gateway_types::{DeleteFailure, DeleteOutcome};

use crate::config::StorageConfig;
use crate::error::GatewayError;

use super::{BucketCreation, ObjectStorage, StorageConnector, UploadMetadata};

/// テスト用のローカル（test環境）設定。
pub fn local_config(bucket: &str) -> StorageConfig {
    let bucket = bucket.to_string();
    StorageConfig::from_vars(move |name| match name {
        "APP_ENV" => Some("test".to_string()),
        "BUCKET_NAME" => Some(bucket.clone()),
        _ => None,
    })
}

/// テスト用の本番設定。
pub fn cloud_config(bucket: &str, region: &str) -> StorageConfig {
    let bucket = bucket.to_string();
    let region = region.to_string();
    StorageConfig::from_vars(move |name| match name {
        "APP_ENV" => Some("production".to_string()),
        "BUCKET_NAME" => Some(bucket.clone()),
        "AWS_REGION" => Some(region.clone()),
        _ => None,
    })
}

/// 保存されたオブジェクト。
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: Option<String>,
    pub content_encoding: Option<String>,
    pub public_read: bool,
}

/// メモリ上のオブジェクトストレージ。
#[derive(Default)]
pub struct MockObjectStorage {
    buckets: Mutex<HashSet<String>>,
    policies: Mutex<HashMap<String, String>>,
    objects: Mutex<HashMap<(String, String), StoredObject>>,
    failing_suffixes: Mutex<Vec<String>>,
    pub create_calls: AtomicUsize,
    pub policy_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub fail_policy: AtomicBool,
    pub fail_delete: AtomicBool,
}

impl MockObjectStorage {
    pub fn has_bucket(&self, bucket: &str) -> bool {
        self.buckets.lock().unwrap().contains(bucket)
    }

    pub fn policy(&self, bucket: &str) -> Option<String> {
        self.policies.lock().unwrap().get(bucket).cloned()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn object_keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .lock()
            .unwrap()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys
    }

    /// 末尾が `suffix` のキーへの書き込みを失敗させる。
    pub fn fail_writes_ending_with(&self, suffix: &str) {
        self.failing_suffixes
            .lock()
            .unwrap()
            .push(suffix.to_string());
    }
}

#[async_trait::async_trait]
impl ObjectStorage for MockObjectStorage {
    async fn create_bucket(
        &self,
        bucket: &str,
        _region: &str,
    ) -> Result<BucketCreation, GatewayError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if self.buckets.lock().unwrap().insert(bucket.to_string()) {
            Ok(BucketCreation::Created)
        } else {
            Ok(BucketCreation::AlreadyOwned)
        }
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), GatewayError> {
        self.policy_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_policy.load(Ordering::SeqCst) {
            return Err(GatewayError::Provisioning("AccessDenied".to_string()));
        }
        self.policies
            .lock()
            .unwrap()
            .insert(bucket.to_string(), policy.to_string());
        Ok(())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        payload: Bytes,
        metadata: &UploadMetadata,
    ) -> Result<(), GatewayError> {
        let failing = self
            .failing_suffixes
            .lock()
            .unwrap()
            .iter()
            .any(|suffix| key.ends_with(suffix.as_str()));
        if failing {
            return Err(GatewayError::Write {
                key: key.to_string(),
                reason: "InternalError".to_string(),
            });
        }

        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                data: payload,
                content_type: metadata.content_type.clone(),
                content_encoding: metadata.content_encoding.clone(),
                public_read: true,
            },
        );
        Ok(())
    }

    async fn delete_objects(
        &self,
        bucket: &str,
        keys: &[String],
    ) -> Result<DeleteOutcome, GatewayError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(GatewayError::BulkDelete("AccessDenied".to_string()));
        }

        let mut objects = self.objects.lock().unwrap();
        let mut removed = HashSet::new();
        let mut outcome = DeleteOutcome::default();

        for key in keys {
            let present = objects
                .remove(&(bucket.to_string(), key.clone()))
                .is_some();
            if present || removed.contains(key) {
                removed.insert(key.clone());
                outcome.deleted.push(key.clone());
            } else {
                outcome.failed.push(DeleteFailure {
                    key: key.clone(),
                    code: Some("NoSuchKey".to_string()),
                    message: Some("The specified key does not exist.".to_string()),
                });
            }
        }

        Ok(outcome)
    }
}

/// 接続回数を数えるモックコネクタ。
pub struct MockConnector {
    /// Noneの場合は接続ごとに新しいストレージを生成する
    storage: Option<Arc<MockObjectStorage>>,
    delay: Duration,
    failures_left: AtomicUsize,
    pub connects: Arc<AtomicUsize>,
}

impl MockConnector {
    /// 接続ごとに新しいインスタンスを返す。
    pub fn fresh() -> Self {
        Self {
            storage: None,
            delay: Duration::ZERO,
            failures_left: AtomicUsize::new(0),
            connects: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 常に同じストレージを返す。
    pub fn shared(storage: Arc<MockObjectStorage>) -> Self {
        Self {
            storage: Some(storage),
            ..Self::fresh()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// 最初の `n` 回の接続を失敗させる。
    pub fn failing_first(self, n: usize) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }
}

#[async_trait::async_trait]
impl StorageConnector for MockConnector {
    async fn connect(
        &self,
        _config: &StorageConfig,
    ) -> Result<Arc<dyn ObjectStorage>, GatewayError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let should_fail = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(GatewayError::Configuration(
                "エンドポイントに接続できません".to_string(),
            ));
        }

        let storage: Arc<dyn ObjectStorage> = match &self.storage {
            Some(storage) => storage.clone(),
            None => Arc::new(MockObjectStorage::default()),
        };
        Ok(storage)
    }
}

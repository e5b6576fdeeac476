//! # バケットの自動作成
//!
//! 開発・テスト環境でのみ使用する。本番のバケットは別途用意される。

use crate::error::GatewayError;

use super::{BucketCreation, ObjectStorage};

/// バケット配下の全オブジェクトに匿名の読み取りを許可するポリシー文書。
pub fn public_read_policy(bucket: &str) -> serde_json::Value {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [
            {
                "Sid": "PublicRead",
                "Effect": "Allow",
                "Principal": "*",
                "Action": ["s3:GetObject", "s3:GetObjectVersion"],
                "Resource": [format!("arn:aws:s3:::{bucket}/*")],
            }
        ],
    })
}

/// バケットが存在し公開読み取りポリシーを持つことを保証する。
///
/// 既に自分が所有しているバケットであれば何もせず成功とする（ポリシーも再設定しない）。
/// それ以外の作成・ポリシー設定の失敗はそのまま返す。
pub async fn ensure_bucket(
    bucket: &str,
    region: &str,
    storage: &dyn ObjectStorage,
) -> Result<(), GatewayError> {
    match storage.create_bucket(bucket, region).await? {
        BucketCreation::AlreadyOwned => {
            tracing::debug!(bucket = %bucket, "バケットは作成済みです");
            return Ok(());
        }
        BucketCreation::Created => {
            tracing::info!(bucket = %bucket, region = %region, "バケットを作成しました");
        }
    }

    let policy = public_read_policy(bucket).to_string();
    storage.put_bucket_policy(bucket, &policy).await?;
    tracing::info!(bucket = %bucket, "公開読み取りポリシーを設定しました");

    Ok(())
}

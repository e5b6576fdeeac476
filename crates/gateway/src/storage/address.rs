//! # オブジェクトアドレス
//!
//! オブジェクトキーと外部から取得可能なURLを導出する。I/Oは行わない。
//! キーのエスケープは行わないため、URLとして安全なキーを渡すのは呼び出し側の責任。

use crate::config::{Backend, StorageConfig};

/// 論理パス（カテゴリ）とファイル名からオブジェクトキーを導出する。
pub fn object_key(path: &str, file_name: &str) -> String {
    format!("{path}/{file_name}")
}

/// オブジェクトキーの公開URLを導出する。
///
/// - ローカル: `{base_url}/{bucket}/{key}`
/// - クラウド: `https://s3.{region}.amazonaws.com/{bucket}/{key}`
pub fn resolve_url(config: &StorageConfig, key: &str) -> String {
    match &config.backend {
        Backend::Local(local) => format!("{}/{}/{}", local.base_url, config.bucket, key),
        Backend::Cloud => format!(
            "https://s3.{}.amazonaws.com/{}/{}",
            config.region, config.bucket, key
        ),
    }
}

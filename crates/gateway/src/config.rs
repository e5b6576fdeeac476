//! # Gateway設定・共有状態
//!
//! 環境変数からの設定読み込みとGatewayの共有状態の定義。
//!
//! 環境モード（production / development / test）は起動時に一度だけ
//! [`Backend`] に解決され、以降はすべてのコンポーネントがこの値で分岐する。

use crate::error::GatewayError;
use crate::storage::StorageService;

const DEFAULT_BUCKET_NAME: &str = "test-bucket-name";
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_REGION: &str = "eu-west-2";
const DEFAULT_LOCAL_BASE_URL: &str = "http://localhost:9000";
const DEFAULT_LOCAL_USERNAME: &str = "admin";
const DEFAULT_LOCAL_PASSWORD: &str = "Password1234";
const DEFAULT_PORT: u16 = 8000;
/// 50 MiB
const DEFAULT_MAX_UPLOAD_SIZE: usize = 50 * 1024 * 1024;
const DEFAULT_UPLOAD_CATEGORY: &str = "images";

/// 実行環境モード。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Production,
    Development,
    Test,
}

impl Environment {
    /// 環境モード文字列を解釈する。
    ///
    /// `development` / `test` 以外はすべて本番扱いとなる。
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" => Environment::Development,
            "test" => Environment::Test,
            "production" => Environment::Production,
            other => {
                tracing::warn!(
                    environment = %other,
                    "未知の環境モードです。productionとして扱います"
                );
                Environment::Production
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::Development => "development",
            Environment::Test => "test",
        }
    }

    /// ローカルバックエンド（MinIO等）を使う環境か。
    pub fn is_development_or_test(&self) -> bool {
        matches!(self, Environment::Development | Environment::Test)
    }
}

/// ローカル開発用のS3互換エンドポイント。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalEndpoint {
    /// ベースURL（末尾の`/`は除去済み）
    pub base_url: String,
    /// アクセスキー（MinIOのユーザー名）
    pub access_key: String,
    /// シークレットキー（MinIOのパスワード）
    pub secret_key: String,
}

/// 接続先バックエンド。環境モードから起動時に一度だけ解決される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// ローカルのS3互換ストレージ。パススタイル＋明示的な認証情報で接続する。
    Local(LocalEndpoint),
    /// クラウドのS3。認証情報はSDKのデフォルトチェーンから取得する。
    Cloud,
}

impl Backend {
    pub fn is_local(&self) -> bool {
        matches!(self, Backend::Local(_))
    }
}

/// ストレージ設定。起動時に一度読み込まれ、以降は不変。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// 全操作の対象バケット
    pub bucket: String,
    /// 環境モード
    pub environment: Environment,
    /// クラウドリージョン（URL構築とバケット作成にも使用）
    pub region: String,
    /// 解決済みの接続先
    pub backend: Backend,
}

impl StorageConfig {
    /// 環境変数から構築する。
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// 任意の変数ルックアップから構築する。未設定の値はすべてデフォルトになる。
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let environment_raw = lookup("APP_ENV")
            .or_else(|| lookup("NODE_ENV"))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string());
        let environment = Environment::parse(&environment_raw);

        let backend = if environment.is_development_or_test() {
            Backend::Local(LocalEndpoint {
                base_url: var("MINIO_BASE_URL", DEFAULT_LOCAL_BASE_URL)
                    .trim_end_matches('/')
                    .to_string(),
                access_key: var("MINIO_USERNAME", DEFAULT_LOCAL_USERNAME),
                secret_key: var("MINIO_PASSWORD", DEFAULT_LOCAL_PASSWORD),
            })
        } else {
            Backend::Cloud
        };

        Self {
            bucket: var("BUCKET_NAME", DEFAULT_BUCKET_NAME),
            environment,
            region: var("AWS_REGION", DEFAULT_REGION),
            backend,
        }
    }
}

/// Gateway全体の設定。
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub storage: StorageConfig,
    /// 待ち受けポート
    pub port: u16,
    /// リクエストボディの最大サイズ（バイト）
    pub max_upload_size: usize,
    /// アップロードされたファイルを格納する論理パス（例: images, videos, pdf）
    pub upload_category: String,
}

impl GatewayConfig {
    /// 環境変数から構築する。
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, GatewayError> {
        let port = match lookup("PORT").filter(|v| !v.is_empty()) {
            Some(v) => v
                .parse::<u16>()
                .map_err(|e| GatewayError::Configuration(format!("PORTが不正です ({v}): {e}")))?,
            None => DEFAULT_PORT,
        };

        let max_upload_size = match lookup("MAX_UPLOAD_SIZE").filter(|v| !v.is_empty()) {
            Some(v) => v.parse::<usize>().map_err(|e| {
                GatewayError::Configuration(format!("MAX_UPLOAD_SIZEが不正です ({v}): {e}"))
            })?,
            None => DEFAULT_MAX_UPLOAD_SIZE,
        };

        let upload_category = lookup("UPLOAD_CATEGORY")
            .map(|v| v.trim_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_UPLOAD_CATEGORY.to_string());

        Ok(Self {
            storage: StorageConfig::from_vars(&lookup),
            port,
            max_upload_size,
            upload_category,
        })
    }
}

/// Gatewayの共有状態。
pub struct GatewayState {
    /// オブジェクトストレージ（書き込み・一括削除）
    pub storage: StorageService,
    /// アップロード先の論理パス
    pub upload_category: String,
}

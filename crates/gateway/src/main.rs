//! # Upload Gateway
//!
//! クライアントからアップロードされたファイルをS3互換バケットへ保存し、
//! 保存された各オブジェクトの公開URLを返すGateway。
//!
//! ## 役割
//! - multipartで受け取ったファイルのバケットへの保存
//! - 保存済みオブジェクトの一括削除
//! - 開発・テスト環境でのバケット自動作成（MinIO等）
//!
//! ## API エンドポイント
//! - `POST /upload` — ファイルのアップロード（フィールド名 `files`、複数可）
//! - `DELETE /files` — オブジェクトの一括削除

mod config;
mod endpoints;
mod error;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, Method};
use tower_http::cors::{Any, CorsLayer};

use config::{GatewayConfig, GatewayState};
use storage::{S3Connector, StorageService};

/// ルーターを構築する。
fn router(state: Arc<GatewayState>, max_upload_size: usize) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::PUT,
            Method::POST,
            Method::DELETE,
            Method::PATCH,
        ])
        .allow_headers([
            header::ORIGIN,
            header::ACCEPT,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
        ]);

    axum::Router::new()
        .route("/upload", axum::routing::post(endpoints::handle_upload))
        .route("/files", axum::routing::delete(endpoints::handle_delete))
        .fallback(endpoints::handle_unknown_route)
        .layer(DefaultBodyLimit::max(max_upload_size))
        .layer(cors)
        .with_state(state)
}

/// Ctrl+C または SIGTERM を待つ。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+Cハンドラの登録に失敗しました");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "SIGTERMハンドラの登録に失敗しました");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Ctrl+Cを受信しました。シャットダウンします"),
        _ = terminate => tracing::info!("SIGTERMを受信しました。シャットダウンします"),
    }
}

// ---------------------------------------------------------------------------
// エントリポイント
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = GatewayConfig::from_env()?;
    tracing::info!(
        bucket = %config.storage.bucket,
        environment = %config.storage.environment.as_str(),
        region = %config.storage.region,
        max_upload_size = config.max_upload_size,
        "設定を読み込みました"
    );

    // クライアントは最初のリクエスト時に構築される
    let storage = StorageService::new(Arc::new(config.storage), Box::new(S3Connector));

    let state = Arc::new(GatewayState {
        storage,
        upload_category: config.upload_category,
    });

    let app = router(state, config.max_upload_size);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Gatewayを {} で起動します", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Gatewayを停止しました");
    Ok(())
}

// ---------------------------------------------------------------------------
// テスト
// ---------------------------------------------------------------------------

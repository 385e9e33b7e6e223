//! # PostgreSQL データベース接続管理
//!
//! データベース接続プールの作成、マイグレーション、疎通確認を行う。
//!
//! ## 本番環境での推奨設定
//!
//! ```rust,ignore
//! PgPoolOptions::new()
//!     .max_connections(20)           // 最大接続数（CPU コア数 × 2〜4）
//!     .min_connections(5)            // 最小接続数（起動時に確保）
//!     .acquire_timeout(Duration::from_secs(5))  // 接続取得タイムアウト
//!     .idle_timeout(Duration::from_secs(600))   // アイドル接続のタイムアウト
//! ```

use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::error::InfraError;

/// データベースマイグレーションを実行する
///
/// `sqlx::migrate!()` マクロで埋め込まれたマイグレーションファイルを
/// 順番に適用する。適用済みのマイグレーションはスキップされる。
///
/// sqlx が PostgreSQL の advisory lock を使用するため、
/// 複数プロセスから同時に呼び出しても安全。
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// PostgreSQL 接続プールを作成する
///
/// アプリケーション起動時に一度だけ呼び出し、作成したプールを
/// アプリケーション全体で共有する。
///
/// # 設定値
///
/// - `max_connections(10)`: 最大接続数。本番環境では負荷に応じて調整
/// - `acquire_timeout(5秒)`: 接続取得のタイムアウト。超過時はエラー
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

/// データベースへの疎通を確認する
///
/// Readiness Check から呼び出される。
#[tracing::instrument(skip_all, level = "debug")]
pub async fn check_connection(pool: &PgPool) -> Result<(), InfraError> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

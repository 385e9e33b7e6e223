//! # Bookstore インフラ層
//!
//! PostgreSQL との接続と、書籍の永続化を担当するインフラストラクチャ層。
//!
//! ## 責務
//!
//! - **データベース接続**: PostgreSQL への接続プール管理とマイグレーション
//! - **リポジトリ実装**: 書籍の検索・作成・更新・削除（[`repository::BookRepository`]）
//! - **エラー変換**: 行が存在しない・一意制約違反をエラー種別として区別する
//!
//! ## モジュール構成
//!
//! - [`db`] - PostgreSQL データベース接続管理
//! - [`error`] - インフラ層エラー定義
//! - [`repository`] - リポジトリ実装
//! - `mock` - インメモリリポジトリ（`test-utils` feature）
//!
//! ## 使用例
//!
//! ```rust,ignore
//! use bookstore_infra::{db, repository::PostgresBookRepository};
//!
//! let pool = db::create_pool("postgres://localhost/bookstore").await?;
//! db::run_migrations(&pool).await?;
//! let repository = PostgresBookRepository::new(pool);
//! ```

pub mod db;
pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod repository;

pub use error::{InfraError, InfraErrorKind};

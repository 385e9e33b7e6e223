//! # リポジトリ実装
//!
//! 書籍エンティティの永続化を担当するリポジトリを提供する。
//!
//! - **トレイト経由のアクセス**: ハンドラは `Arc<dyn BookRepository>` のみに依存する
//! - **存在しない行の区別**: 検索・更新・削除で行が見つからない場合は
//!   `InfraErrorKind::NotFound` を返し、呼び出し側が 404 に変換できるようにする

pub mod book_repository;

pub use book_repository::{BookRepository, PostgresBookRepository};

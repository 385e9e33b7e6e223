//! # Book Service ライブラリ
//!
//! 書籍 API のハンドラ、エラー、ルーター構築を公開する。
//! 統合テストからルーターを組み立てるために使う。

pub mod app_builder;
pub mod config;
pub mod error;
pub mod handler;

//! # Bookstore 共有ユーティリティ
//!
//! 書籍 API とそのテストで共通利用するユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - axum には依存しない（HTTP レスポンス変換は各アプリの責務）
//! - tower / tracing-subscriber への依存は `observability` feature に閉じ込める

#[cfg(feature = "observability")]
pub mod canonical_log;
pub mod error_response;
pub mod health;
pub mod observability;

pub use error_response::ErrorResponse;
pub use health::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};

//! # Bookstore ドメイン層
//!
//! 書籍リソースのドメインモデルと、書き込みペイロードの検証ルールを定義する。
//!
//! ## 依存関係の方向
//!
//! ```text
//! app → infra → domain
//!   ↘
//!     shared
//! ```
//!
//! ドメイン層は DB や HTTP に一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`book`] - 書籍エンティティ、ISBN、一覧フィルタ
//! - [`book_schema`] - 作成・更新用 JSON Schema とバリデータ
//! - [`error`] - ドメイン層で発生するエラーの定義
//!
//! ## 使用例
//!
//! ```rust
//! use bookstore_domain::book_schema::{BookSchemas, validate};
//! use serde_json::json;
//!
//! let schemas = BookSchemas::embedded().unwrap();
//! let result = validate(&json!({ "invalid": "data" }), &schemas.create);
//! assert!(!result.valid);
//! ```

pub mod book;
pub mod book_schema;
pub mod error;

pub use error::DomainError;

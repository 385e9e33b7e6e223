//! # ドメイン層エラー定義
//!
//! ビジネスルール違反を表現するエラー型。
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | 入力値の検証失敗 |
//!
//! 存在しない書籍の参照（404）は永続化層で検出されるため、
//! インフラ層のエラー種別として扱う。

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// スキーマ検証を通過した後でも、値オブジェクトの生成時に
    /// 不変条件を満たさない場合に使用する（例: 空白のみの ISBN）。
    #[error("バリデーションエラー: {0}")]
    Validation(String),
}

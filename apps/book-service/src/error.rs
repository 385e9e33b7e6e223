//! # Book Service エラー定義
//!
//! 書籍 API 固有のエラーと、HTTP レスポンスへの変換を定義する。
//!
//! `IntoResponse` の実装がプロセス全体の最終境界になる。
//! 想定外のエラーはここでログに残し、汎用的な 500 を返す。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bookstore_domain::DomainError;
use bookstore_infra::InfraError;
use bookstore_shared::ErrorResponse;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// スキーマ検証エラーのレスポンスボディ
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationErrorResponse {
    pub errors: Vec<String>,
}

/// Book Service で発生するエラー
#[derive(Debug, Error)]
pub enum BookServiceError {
    /// ペイロードがスキーマに適合しない
    #[error("バリデーションエラー: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// 書籍が見つからない
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 同じ ISBN の書籍が既に存在する
    #[error("競合が発生しました: {0}")]
    Conflict(String),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(InfraError),
}

impl From<InfraError> for BookServiceError {
    fn from(err: InfraError) -> Self {
        if err.as_not_found().is_some() {
            return Self::NotFound(err.to_string());
        }
        if err.as_conflict().is_some() {
            return Self::Conflict(err.to_string());
        }
        Self::Database(err)
    }
}

impl From<DomainError> for BookServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => Self::Validation(vec![msg]),
        }
    }
}

impl IntoResponse for BookServiceError {
    fn into_response(self) -> Response {
        match self {
            BookServiceError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorResponse { errors }),
            )
                .into_response(),
            BookServiceError::NotFound(msg) => {
                (StatusCode::NOT_FOUND, Json(ErrorResponse::not_found(msg))).into_response()
            }
            BookServiceError::Conflict(msg) => {
                (StatusCode::CONFLICT, Json(ErrorResponse::conflict(msg))).into_response()
            }
            BookServiceError::Database(e) => {
                tracing::error!(
                    error.kind = "database",
                    error.message = %e,
                    span_trace = %e.span_trace(),
                    "データベースエラー"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse::internal_error()),
                )
                    .into_response()
            }
        }
    }
}

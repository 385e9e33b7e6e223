//! # 書籍ハンドラ
//!
//! 書籍リソースの CRUD API を提供する。
//!
//! ## エンドポイント
//!
//! - `GET /books` - 書籍一覧（`author` / `title` / `publisher` / `language` / `year` で絞り込み）
//! - `GET /books/{isbn}` - 書籍取得
//! - `POST /books` - 書籍作成
//! - `PUT /books/{isbn}` - 書籍更新（全フィールド上書き）
//! - `DELETE /books/{isbn}` - 書籍削除
//!
//! 書き込み系はスキーマ検証を通過したペイロードだけをリポジトリに渡す。

use std::{collections::HashMap, sync::Arc};

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use bookstore_domain::{
    book::{Book, BookFilter, Isbn, NewBook},
    book_schema::{BookSchema, BookSchemas, validate},
};
use bookstore_infra::repository::BookRepository;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value as JsonValue;

use crate::error::BookServiceError;

/// 書籍 API の共有状態
pub struct BookState {
    pub repository: Arc<dyn BookRepository>,
    pub schemas:    Arc<BookSchemas>,
}

// --- リクエスト/レスポンス型 ---

/// 書籍作成リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateBookRequest {
    pub isbn:       String,
    pub amazon_url: String,
    pub author:     String,
    pub language:   String,
    pub pages:      i32,
    pub publisher:  String,
    pub title:      String,
    pub year:       i32,
}

/// 書籍更新リクエスト
///
/// ISBN はパスで指定する。ボディに `isbn` が含まれていても無視する。
#[derive(Debug, Deserialize)]
pub struct UpdateBookRequest {
    pub amazon_url: String,
    pub author:     String,
    pub language:   String,
    pub pages:      i32,
    pub publisher:  String,
    pub title:      String,
    pub year:       i32,
}

/// 書籍 DTO
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookDto {
    pub isbn:       String,
    pub amazon_url: String,
    pub author:     String,
    pub language:   String,
    pub pages:      i32,
    pub publisher:  String,
    pub title:      String,
    pub year:       i32,
}

impl From<&Book> for BookDto {
    fn from(book: &Book) -> Self {
        Self {
            isbn:       book.isbn().to_string(),
            amazon_url: book.amazon_url().to_string(),
            author:     book.author().to_string(),
            language:   book.language().to_string(),
            pages:      book.pages(),
            publisher:  book.publisher().to_string(),
            title:      book.title().to_string(),
            year:       book.year(),
        }
    }
}

/// 単一書籍のレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub book: BookDto,
}

/// 書籍一覧のレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BookListResponse {
    pub books: Vec<BookDto>,
}

/// メッセージのみのレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// --- ヘルパー ---

/// ボディを JSON として取り出し、スキーマ検証を通過したら型付きで返す
///
/// JSON として解釈できないボディもスキーマ違反と同じ 400 で返す。
fn validated<T: DeserializeOwned>(
    payload: Result<Json<JsonValue>, JsonRejection>,
    schema: &BookSchema,
) -> Result<T, BookServiceError> {
    let Json(payload) = payload.map_err(|rejection| {
        BookServiceError::Validation(vec![rejection.body_text()])
    })?;

    let result = validate(&payload, schema);
    if !result.valid {
        return Err(BookServiceError::Validation(result.errors));
    }

    // i32 の範囲はスキーマで制約済み
    serde_json::from_value(payload).map_err(|e| BookServiceError::Validation(vec![e.to_string()]))
}

/// パスの ISBN を解釈する
///
/// 形式が不正な ISBN は保存され得ないため、存在しない書籍として扱う。
fn path_isbn(raw: String) -> Result<Isbn, BookServiceError> {
    Isbn::new(raw.as_str())
        .map_err(|_| BookServiceError::NotFound(format!("Book が見つかりません: {raw}")))
}

// --- ハンドラ ---

/// GET /books
///
/// 条件に一致する書籍をタイトル順で返す。未知のクエリパラメータは無視する。
#[tracing::instrument(skip_all)]
pub async fn list_books(
    State(state): State<Arc<BookState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, BookServiceError> {
    let filter = BookFilter::from_query(&query);

    let books = state.repository.find_all(&filter).await?;
    tracing::debug!(
        filtered = !filter.is_empty(),
        count = books.len(),
        "書籍一覧を取得しました"
    );

    let response = BookListResponse {
        books: books.iter().map(BookDto::from).collect(),
    };
    Ok((StatusCode::OK, Json(response)))
}

/// GET /books/{isbn}
#[tracing::instrument(skip_all, fields(%isbn))]
pub async fn get_book(
    State(state): State<Arc<BookState>>,
    Path(isbn): Path<String>,
) -> Result<impl IntoResponse, BookServiceError> {
    let isbn = path_isbn(isbn)?;

    let book = state.repository.find_one(&isbn).await?;

    Ok((
        StatusCode::OK,
        Json(BookResponse {
            book: BookDto::from(&book),
        }),
    ))
}

/// POST /books
///
/// ## レスポンス
///
/// - `201 Created`: 作成された書籍
/// - `400 Bad Request`: スキーマ違反（`{ "errors": [...] }`）
/// - `409 Conflict`: 同じ ISBN の書籍が既に存在する
#[tracing::instrument(skip_all)]
pub async fn create_book(
    State(state): State<Arc<BookState>>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Result<impl IntoResponse, BookServiceError> {
    let req: CreateBookRequest = validated(payload, &state.schemas.create)?;

    let book = Book::new(NewBook {
        isbn:       Isbn::new(req.isbn)?,
        amazon_url: req.amazon_url,
        author:     req.author,
        language:   req.language,
        pages:      req.pages,
        publisher:  req.publisher,
        title:      req.title,
        year:       req.year,
    })?;

    let created = state.repository.create(&book).await?;
    tracing::info!(isbn = %created.isbn(), "書籍を作成しました");

    Ok((
        StatusCode::CREATED,
        Json(BookResponse {
            book: BookDto::from(&created),
        }),
    ))
}

/// PUT /books/{isbn}
///
/// パスの ISBN の書籍を、ボディの内容で全フィールド上書きする。
///
/// ## レスポンス
///
/// - `200 OK`: 更新後の書籍
/// - `400 Bad Request`: スキーマ違反（`{ "errors": [...] }`）
/// - `404 Not Found`: 書籍が存在しない
#[tracing::instrument(skip_all, fields(%isbn))]
pub async fn update_book(
    State(state): State<Arc<BookState>>,
    Path(isbn): Path<String>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Result<impl IntoResponse, BookServiceError> {
    let req: UpdateBookRequest = validated(payload, &state.schemas.update)?;
    let isbn = path_isbn(isbn)?;

    let book = Book::new(NewBook {
        isbn,
        amazon_url: req.amazon_url,
        author: req.author,
        language: req.language,
        pages: req.pages,
        publisher: req.publisher,
        title: req.title,
        year: req.year,
    })?;

    let updated = state.repository.update(&book).await?;
    tracing::info!(isbn = %updated.isbn(), "書籍を更新しました");

    Ok((
        StatusCode::OK,
        Json(BookResponse {
            book: BookDto::from(&updated),
        }),
    ))
}

/// DELETE /books/{isbn}
#[tracing::instrument(skip_all, fields(%isbn))]
pub async fn delete_book(
    State(state): State<Arc<BookState>>,
    Path(isbn): Path<String>,
) -> Result<impl IntoResponse, BookServiceError> {
    let isbn = path_isbn(isbn)?;

    state.repository.remove(&isbn).await?;
    tracing::info!(%isbn, "書籍を削除しました");

    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "Book deleted".to_string(),
        }),
    ))
}

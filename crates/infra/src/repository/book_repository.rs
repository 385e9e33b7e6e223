//! # BookRepository
//!
//! 書籍の永続化を担当するリポジトリ。
//!
//! ## 設計方針
//!
//! - **存在しない行はエラー**: `find_one` / `update` / `remove` は一致する行がない場合に
//!   `InfraErrorKind::NotFound` を返す。一覧取得は結果が空でもエラーにしない
//! - **重複はエラー**: 同じ ISBN の作成は一意制約違反を `InfraErrorKind::Conflict` に変換する
//! - **同時実行制御は DB に委譲**: アプリケーション側でロックは取らない

use async_trait::async_trait;
use bookstore_domain::book::{Book, BookFilter, Isbn, NewBook};
use sqlx::PgPool;

use crate::error::InfraError;

/// エラーメッセージに使うエンティティ名
const ENTITY: &str = "Book";

/// 書籍リポジトリトレイト
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// 条件に一致する書籍をタイトル順で取得する
    ///
    /// 一致する書籍がない場合は空の Vec を返す。
    async fn find_all(&self, filter: &BookFilter) -> Result<Vec<Book>, InfraError>;

    /// ISBN で書籍を取得する
    async fn find_one(&self, isbn: &Isbn) -> Result<Book, InfraError>;

    /// 書籍を作成し、永続化された表現を返す
    async fn create(&self, book: &Book) -> Result<Book, InfraError>;

    /// 同じ ISBN の書籍の全フィールドを上書きし、更新後の表現を返す
    async fn update(&self, book: &Book) -> Result<Book, InfraError>;

    /// 書籍を削除する
    async fn remove(&self, isbn: &Isbn) -> Result<(), InfraError>;
}

/// books テーブルの行
#[derive(Debug, sqlx::FromRow)]
struct BookRow {
    isbn:       String,
    amazon_url: String,
    author:     String,
    language:   String,
    pages:      i32,
    publisher:  String,
    title:      String,
    year:       i32,
}

impl TryFrom<BookRow> for Book {
    type Error = InfraError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let isbn = Isbn::new(row.isbn)
            .map_err(|e| InfraError::unexpected(format!("DB の ISBN が不正です: {e}")))?;

        Ok(Book::from_db(NewBook {
            isbn,
            amazon_url: row.amazon_url,
            author: row.author,
            language: row.language,
            pages: row.pages,
            publisher: row.publisher,
            title: row.title,
            year: row.year,
        }))
    }
}

/// ILIKE 用の部分一致パターンを作る
///
/// ワイルドカード文字はエスケープし、リテラルとして照合させる。
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// PostgreSQL 実装の BookRepository
#[derive(Debug, Clone)]
pub struct PostgresBookRepository {
    pool: PgPool,
}

impl PostgresBookRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for PostgresBookRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(?filter))]
    async fn find_all(&self, filter: &BookFilter) -> Result<Vec<Book>, InfraError> {
        let rows = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT isbn, amazon_url, author, language, pages, publisher, title, year
            FROM books
            WHERE ($1::text IS NULL OR author ILIKE $1 ESCAPE '\')
              AND ($2::text IS NULL OR title ILIKE $2 ESCAPE '\')
              AND ($3::text IS NULL OR publisher ILIKE $3 ESCAPE '\')
              AND ($4::text IS NULL OR language ILIKE $4 ESCAPE '\')
              AND ($5::text IS NULL OR year::text = $5)
            ORDER BY title ASC, isbn ASC
            "#,
        )
        .bind(filter.author.as_deref().map(like_pattern))
        .bind(filter.title.as_deref().map(like_pattern))
        .bind(filter.publisher.as_deref().map(like_pattern))
        .bind(filter.language.as_deref().map(like_pattern))
        .bind(filter.year.as_deref())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Book::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%isbn))]
    async fn find_one(&self, isbn: &Isbn) -> Result<Book, InfraError> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            SELECT isbn, amazon_url, author, language, pages, publisher, title, year
            FROM books
            WHERE isbn = $1
            "#,
        )
        .bind(isbn.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(InfraError::not_found(ENTITY, isbn.as_str()));
        };

        Book::try_from(row)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(isbn = %book.isbn()))]
    async fn create(&self, book: &Book) -> Result<Book, InfraError> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            INSERT INTO books (isbn, amazon_url, author, language, pages, publisher, title, year)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING isbn, amazon_url, author, language, pages, publisher, title, year
            "#,
        )
        .bind(book.isbn().as_str())
        .bind(book.amazon_url())
        .bind(book.author())
        .bind(book.language())
        .bind(book.pages())
        .bind(book.publisher())
        .bind(book.title())
        .bind(book.year())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            // 主キー（isbn）の一意制約違反
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                InfraError::conflict(ENTITY, book.isbn().as_str())
            }
            other => InfraError::from(other),
        })?;

        Book::try_from(row)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(isbn = %book.isbn()))]
    async fn update(&self, book: &Book) -> Result<Book, InfraError> {
        let row = sqlx::query_as::<_, BookRow>(
            r#"
            UPDATE books
            SET amazon_url = $2,
                author = $3,
                language = $4,
                pages = $5,
                publisher = $6,
                title = $7,
                year = $8
            WHERE isbn = $1
            RETURNING isbn, amazon_url, author, language, pages, publisher, title, year
            "#,
        )
        .bind(book.isbn().as_str())
        .bind(book.amazon_url())
        .bind(book.author())
        .bind(book.language())
        .bind(book.pages())
        .bind(book.publisher())
        .bind(book.title())
        .bind(book.year())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Err(InfraError::not_found(ENTITY, book.isbn().as_str()));
        };

        Book::try_from(row)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(%isbn))]
    async fn remove(&self, isbn: &Isbn) -> Result<(), InfraError> {
        let result = sqlx::query(
            r#"
            DELETE FROM books
            WHERE isbn = $1
            "#,
        )
        .bind(isbn.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(InfraError::not_found(ENTITY, isbn.as_str()));
        }

        Ok(())
    }
}

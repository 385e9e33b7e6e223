//! # テスト用モックリポジトリ
//!
//! ハンドラテストで使用するインメモリモックリポジトリ。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! bookstore-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use bookstore_domain::book::{Book, BookFilter, Isbn};

use crate::{error::InfraError, repository::BookRepository};

const ENTITY: &str = "Book";

// ===== InMemoryBookRepository =====

/// ISBN をキーに書籍を保持するインメモリリポジトリ
///
/// PostgreSQL 実装と同じく、一覧はタイトル順、存在しない行は NotFound、
/// 重複作成は Conflict を返す。
#[derive(Clone, Default)]
pub struct InMemoryBookRepository {
    books: Arc<Mutex<BTreeMap<Isbn, Book>>>,
}

impl InMemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 初期データ付きで作成する
    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        let repo = Self::new();
        {
            let mut stored = repo.books.lock().unwrap();
            for book in books {
                stored.insert(book.isbn().clone(), book);
            }
        }
        repo
    }

    /// 保持している書籍を ISBN 順で返す
    pub fn snapshot(&self) -> Vec<Book> {
        self.books.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn find_all(&self, filter: &BookFilter) -> Result<Vec<Book>, InfraError> {
        let mut books: Vec<Book> = self
            .books
            .lock()
            .unwrap()
            .values()
            .filter(|book| filter.matches(book))
            .cloned()
            .collect();
        books.sort_by(|a, b| a.title().cmp(b.title()).then_with(|| a.isbn().cmp(b.isbn())));
        Ok(books)
    }

    async fn find_one(&self, isbn: &Isbn) -> Result<Book, InfraError> {
        self.books
            .lock()
            .unwrap()
            .get(isbn)
            .cloned()
            .ok_or_else(|| InfraError::not_found(ENTITY, isbn.as_str()))
    }

    async fn create(&self, book: &Book) -> Result<Book, InfraError> {
        let mut books = self.books.lock().unwrap();
        if books.contains_key(book.isbn()) {
            return Err(InfraError::conflict(ENTITY, book.isbn().as_str()));
        }
        books.insert(book.isbn().clone(), book.clone());
        Ok(book.clone())
    }

    async fn update(&self, book: &Book) -> Result<Book, InfraError> {
        let mut books = self.books.lock().unwrap();
        let Some(stored) = books.get_mut(book.isbn()) else {
            return Err(InfraError::not_found(ENTITY, book.isbn().as_str()));
        };
        *stored = book.clone();
        Ok(book.clone())
    }

    async fn remove(&self, isbn: &Isbn) -> Result<(), InfraError> {
        self.books
            .lock()
            .unwrap()
            .remove(isbn)
            .map(|_| ())
            .ok_or_else(|| InfraError::not_found(ENTITY, isbn.as_str()))
    }
}

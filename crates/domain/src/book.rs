//! # 書籍
//!
//! 書籍エンティティ、識別子である ISBN、一覧取得時のフィルタを定義する。
//!
//! ## 不変条件
//!
//! - ISBN は空白以外の文字を含む 32 文字以内の文字列で、受け取った値をそのまま保持する
//! - ISBN は作成後に変更されない（更新時はパスの ISBN で行を特定する）
//! - ページ数は 1 以上

use std::collections::HashMap;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::DomainError;

/// ISBN の最大文字数
const ISBN_MAX_LENGTH: usize = 32;

// =========================================================================
// Isbn
// =========================================================================

/// ISBN（値オブジェクト）
///
/// 書籍を一意に識別する。ハイフンの有無やチェックディジットは検証しない。
///
/// ```rust
/// use bookstore_domain::book::Isbn;
///
/// let isbn = Isbn::new(" 0691161518 ").unwrap();
/// assert_eq!(isbn.as_str(), " 0691161518 ");
/// assert!(Isbn::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct Isbn(String);

impl Isbn {
    /// 文字列から ISBN を作成する
    ///
    /// 値は加工せずに保持する。拒否するのは空白のみの値と長すぎる値で、
    /// スキーマ（`maxLength` / `pattern`）を通過した値は必ず受け入れる。
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();

        if value.trim().is_empty() {
            return Err(DomainError::Validation("ISBN は必須です".to_string()));
        }

        if value.chars().count() > ISBN_MAX_LENGTH {
            return Err(DomainError::Validation(format!(
                "ISBN は {ISBN_MAX_LENGTH} 文字以内である必要があります"
            )));
        }

        Ok(Self(value))
    }

    /// 文字列参照を取得する
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// =========================================================================
// Book
// =========================================================================

/// 書籍の生成・復元に使う属性一式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub isbn:       Isbn,
    pub amazon_url: String,
    pub author:     String,
    pub language:   String,
    pub pages:      i32,
    pub publisher:  String,
    pub title:      String,
    pub year:       i32,
}

/// 書籍エンティティ
///
/// サーバー側で生成するフィールドはなく、永続化された表現は入力とほぼ同一になる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    isbn:       Isbn,
    amazon_url: String,
    author:     String,
    language:   String,
    pages:      i32,
    publisher:  String,
    title:      String,
    year:       i32,
}

impl Book {
    /// 新しい書籍を作成する
    ///
    /// ページ数が 1 未満の場合は `DomainError::Validation` を返す。
    pub fn new(input: NewBook) -> Result<Self, DomainError> {
        if input.pages < 1 {
            return Err(DomainError::Validation(
                "ページ数は 1 以上である必要があります".to_string(),
            ));
        }

        Ok(Self::from_db(input))
    }

    /// DB の行から復元する
    ///
    /// DB の CHECK 制約で不変条件が担保されているため検証しない。
    pub fn from_db(record: NewBook) -> Self {
        Self {
            isbn:       record.isbn,
            amazon_url: record.amazon_url,
            author:     record.author,
            language:   record.language,
            pages:      record.pages,
            publisher:  record.publisher,
            title:      record.title,
            year:       record.year,
        }
    }

    pub fn isbn(&self) -> &Isbn {
        &self.isbn
    }

    pub fn amazon_url(&self) -> &str {
        &self.amazon_url
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn pages(&self) -> i32 {
        self.pages
    }

    pub fn publisher(&self) -> &str {
        &self.publisher
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn year(&self) -> i32 {
        self.year
    }
}

// =========================================================================
// BookFilter
// =========================================================================

/// 書籍一覧の絞り込み条件
///
/// クエリパラメータをそのまま受け取り、既知のキーだけを拾う。
///
/// | キー | 照合方法 |
/// |------|----------|
/// | `author`, `title`, `publisher`, `language` | 大文字小文字を区別しない部分一致 |
/// | `year` | 年の文字列表現との完全一致（数値でない値は何にも一致しない） |
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub author:    Option<String>,
    pub title:     Option<String>,
    pub publisher: Option<String>,
    pub language:  Option<String>,
    pub year:      Option<String>,
}

impl BookFilter {
    /// クエリパラメータからフィルタを組み立てる
    ///
    /// 未知のキーは無視し、空白のみの値は指定なしとして扱う。
    pub fn from_query(query: &HashMap<String, String>) -> Self {
        let pick = |key: &str| {
            query
                .get(key)
                .map(|value| value.trim())
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        Self {
            author:    pick("author"),
            title:     pick("title"),
            publisher: pick("publisher"),
            language:  pick("language"),
            year:      pick("year"),
        }
    }

    /// 条件が 1 つも指定されていないか
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// 書籍がすべての条件を満たすか
    pub fn matches(&self, book: &Book) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            needle
                .as_ref()
                .is_none_or(|n| haystack.to_lowercase().contains(&n.to_lowercase()))
        }

        contains(book.author(), &self.author)
            && contains(book.title(), &self.title)
            && contains(book.publisher(), &self.publisher)
            && contains(book.language(), &self.language)
            && self
                .year
                .as_ref()
                .is_none_or(|year| book.year().to_string() == *year)
    }
}

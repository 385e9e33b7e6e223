//! # Book Service 設定
//!
//! 環境変数から書籍 API サーバーの設定を読み込む。

use std::{env, path::PathBuf};

use thiserror::Error;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("{0} が設定されていません（.env.example を参照してください）")]
    Missing(&'static str),

    /// 値の形式が不正
    #[error("{name} の値が不正です: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Book Service サーバーの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookConfig {
    /// バインドアドレス
    pub host:         String,
    /// ポート番号
    pub port:         u16,
    /// データベース接続 URL
    pub database_url: String,
    /// JSON Schema を読み込むディレクトリ（未設定なら埋め込みスキーマを使う）
    pub schema_dir:   Option<PathBuf>,
}

impl BookConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// 空文字の値は未設定として扱う。
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let port: u16 = match get("BOOK_PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "BOOK_PORT",
                value,
            })?,
            None => 3000,
        };

        Ok(Self {
            host: get("BOOK_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url: get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            schema_dir: get("BOOK_SCHEMA_DIR").map(PathBuf::from),
        })
    }
}

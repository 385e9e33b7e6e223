//! # 書籍ペイロードのスキーマ検証
//!
//! 作成用・更新用の 2 つの JSON Schema ドキュメントを起動時にコンパイルし、
//! リクエストボディを永続化の前に検証する。
//!
//! ## 設計方針
//!
//! - **スキーマはデータ**: `schemas/*.schema.json` をそのまま契約として扱い、
//!   バイナリに埋め込む。`BOOK_SCHEMA_DIR` でディレクトリから差し替えも可能
//! - **グローバル状態なし**: [`BookSchemas`] は明示的に構築して呼び出し側に渡す。
//!   コンパイル済みスキーマは不変で、[`validate`] は純粋関数
//! - **全エラー収集**: 最初の違反で止めず、検出したすべての違反を返す
//!
//! ## エラーメッセージ形式
//!
//! `instance<パス>: <メッセージ>` の形式で、パスは JSON Pointer をドット区切りにしたもの。
//!
//! ```text
//! instance: "isbn" is a required property
//! instance.pages: "many" is not of type "integer"
//! ```

use std::{fmt, fs, path::Path};

use jsonschema::Validator;
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;

/// 作成用スキーマのファイル名
pub const CREATE_SCHEMA_FILE: &str = "book_create.schema.json";
/// 更新用スキーマのファイル名
pub const UPDATE_SCHEMA_FILE: &str = "book_update.schema.json";

const EMBEDDED_CREATE_SCHEMA: &str = include_str!("../schemas/book_create.schema.json");
const EMBEDDED_UPDATE_SCHEMA: &str = include_str!("../schemas/book_update.schema.json");

/// スキーマの読み込み・コンパイルで発生するエラー
///
/// いずれも起動時にのみ発生し、サービスは起動を中止する。
#[derive(Debug, Error)]
pub enum SchemaError {
    /// スキーマファイルを読み込めない
    #[error("スキーマファイルを読み込めません: {path}")]
    Io {
        path:   String,
        #[source]
        source: std::io::Error,
    },

    /// スキーマが JSON として不正
    #[error("スキーマが JSON として不正です: {name}")]
    Parse {
        name:   String,
        #[source]
        source: serde_json::Error,
    },

    /// JSON Schema としてコンパイルできない
    #[error("スキーマをコンパイルできません: {name}: {message}")]
    Compile { name: String, message: String },
}

/// コンパイル済みの JSON Schema
pub struct BookSchema {
    name:      String,
    validator: Validator,
}

impl BookSchema {
    /// JSON ドキュメントからスキーマをコンパイルする
    ///
    /// `$schema` キーワードからドラフトを判定する。
    pub fn compile(name: impl Into<String>, document: &JsonValue) -> Result<Self, SchemaError> {
        let name = name.into();
        let validator = jsonschema::validator_for(document).map_err(|e| SchemaError::Compile {
            name:    name.clone(),
            message: e.to_string(),
        })?;

        Ok(Self { name, validator })
    }

    /// JSON 文字列からスキーマをコンパイルする
    pub fn parse(name: impl Into<String>, source: &str) -> Result<Self, SchemaError> {
        let name = name.into();
        let document: JsonValue =
            serde_json::from_str(source).map_err(|source| SchemaError::Parse {
                name: name.clone(),
                source,
            })?;

        Self::compile(name, &document)
    }

    /// スキーマ名（ファイル名）を取得する
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for BookSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookSchema")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// 書籍リソースの作成用・更新用スキーマ
#[derive(Debug)]
pub struct BookSchemas {
    /// POST /books 用（全フィールド必須）
    pub create: BookSchema,
    /// PUT /books/{isbn} 用（isbn 以外のフィールド必須）
    pub update: BookSchema,
}

impl BookSchemas {
    /// バイナリに埋め込まれたスキーマをコンパイルする
    pub fn embedded() -> Result<Self, SchemaError> {
        Ok(Self {
            create: BookSchema::parse(CREATE_SCHEMA_FILE, EMBEDDED_CREATE_SCHEMA)?,
            update: BookSchema::parse(UPDATE_SCHEMA_FILE, EMBEDDED_UPDATE_SCHEMA)?,
        })
    }

    /// ディレクトリ内の 2 つのスキーマファイルを読み込んでコンパイルする
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let dir = dir.as_ref();
        let load = |file_name: &str| {
            let path = dir.join(file_name);
            let source = fs::read_to_string(&path).map_err(|source| SchemaError::Io {
                path: path.display().to_string(),
                source,
            })?;
            BookSchema::parse(file_name, &source)
        };

        Ok(Self {
            create: load(CREATE_SCHEMA_FILE)?,
            update: load(UPDATE_SCHEMA_FILE)?,
        })
    }
}

/// 検証結果
///
/// `valid == false` のとき `errors` は空でない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid:  bool,
    pub errors: Vec<String>,
}

/// ペイロードをスキーマで検証する
///
/// 副作用はなく、同じ入力に対して常に同じ結果を返す。
/// スキーマが禁止していない追加プロパティは許容する。
pub fn validate(payload: &JsonValue, schema: &BookSchema) -> ValidationResult {
    let errors: Vec<String> = schema
        .validator
        .iter_errors(payload)
        .map(|error| format_error(&error.instance_path.to_string(), &error.to_string()))
        .collect();

    ValidationResult {
        valid: errors.is_empty(),
        errors,
    }
}

/// JSON Pointer 形式のパスを `instance.a.b` 形式に変換してメッセージを組み立てる
fn format_error(pointer: &str, message: &str) -> String {
    let path: String = pointer
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| format!(".{}", segment.replace("~1", "/").replace("~0", "~")))
        .collect();

    format!("instance{path}: {message}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn valid_book() -> JsonValue {
        json!({
            "isbn": "0691161518",
            "amazon_url": "http://a.co/eobPtX2",
            "author": "Matthew Lane",
            "language": "english",
            "pages": 264,
            "publisher": "Princeton University Press",
            "title": "Power-Up: Unlocking the Hidden Mathematics in Video Games",
            "year": 2017
        })
    }

    fn schemas() -> BookSchemas {
        BookSchemas::embedded().expect("埋め込みスキーマはコンパイルできること")
    }

    // ===== format_error =====

    #[rstest]
    #[case("", "instance: msg")]
    #[case("/pages", "instance.pages: msg")]
    #[case("/a/0/b", "instance.a.0.b: msg")]
    #[case("/a~1b/c~0d", "instance.a/b.c~d: msg")]
    fn test_format_errorはポインタをドット区切りに変換する(
        #[case] pointer: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(format_error(pointer, "msg"), expected);
    }

    // ===== 作成用スキーマ =====

    #[test]
    fn test_作成用スキーマは完全なペイロードを受け付ける() {
        let result = validate(&valid_book(), &schemas().create);

        assert_eq!(
            result,
            ValidationResult {
                valid:  true,
                errors: vec![],
            }
        );
    }

    #[rstest]
    #[case("isbn")]
    #[case("amazon_url")]
    #[case("author")]
    #[case("language")]
    #[case("pages")]
    #[case("publisher")]
    #[case("title")]
    #[case("year")]
    fn test_作成用スキーマは必須フィールドの欠落を拒否する(#[case] field: &str) {
        let mut payload = valid_book();
        payload.as_object_mut().unwrap().remove(field);

        let result = validate(&payload, &schemas().create);

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(
            result.errors[0].contains(field),
            "エラーメッセージにフィールド名が含まれること: {:?}",
            result.errors
        );
    }

    #[test]
    fn test_作成用スキーマはすべての違反を返す() {
        let result = validate(&json!({ "invalid": "data" }), &schemas().create);

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 8, "必須フィールド 8 件すべてが報告されること");
        assert!(result.errors.iter().all(|e| e.starts_with("instance: ")));
    }

    #[rstest]
    #[case(json!({ "pages": "264" }), "instance.pages")]
    #[case(json!({ "pages": 0 }), "instance.pages")]
    #[case(json!({ "pages": 12.5 }), "instance.pages")]
    #[case(json!({ "year": "2017" }), "instance.year")]
    #[case(json!({ "title": 42 }), "instance.title")]
    #[case(json!({ "isbn": "" }), "instance.isbn")]
    #[case(json!({ "isbn": "   " }), "instance.isbn")]
    #[case(json!({ "isbn": "0".repeat(33) }), "instance.isbn")]
    #[case(json!({ "pages": 2_147_483_648_i64 }), "instance.pages")]
    #[case(json!({ "year": -2_147_483_649_i64 }), "instance.year")]
    #[case(json!({ "year": 10_000_000_000_i64 }), "instance.year")]
    fn test_作成用スキーマは型と制約の違反をパス付きで報告する(
        #[case] overrides: JsonValue,
        #[case] expected_path: &str,
    ) {
        let mut payload = valid_book();
        for (key, value) in overrides.as_object().unwrap() {
            payload[key] = value.clone();
        }

        let result = validate(&payload, &schemas().create);

        assert!(!result.valid);
        assert!(
            result
                .errors
                .iter()
                .any(|e| e.starts_with(&format!("{expected_path}: "))),
            "{expected_path} の違反が報告されること: {:?}",
            result.errors
        );
    }

    #[rstest]
    #[case(json!({ "isbn": " 0691161518 " }))]
    #[case(json!({ "isbn": "0".repeat(32) }))]
    #[case(json!({ "pages": 2_147_483_647 }))]
    #[case(json!({ "year": -2_147_483_648_i64 }))]
    fn test_作成用スキーマは境界値を受け付ける(#[case] overrides: JsonValue) {
        let mut payload = valid_book();
        for (key, value) in overrides.as_object().unwrap() {
            payload[key] = value.clone();
        }

        assert!(validate(&payload, &schemas().create).valid);
    }

    #[test]
    fn test_作成用スキーマは追加プロパティを許容する() {
        let mut payload = valid_book();
        payload["edition"] = json!("first");

        assert!(validate(&payload, &schemas().create).valid);
    }

    #[test]
    fn test_オブジェクト以外のペイロードは拒否される() {
        let result = validate(&json!([1, 2, 3]), &schemas().create);

        assert!(!result.valid);
        assert!(!result.errors.is_empty());
    }

    // ===== 更新用スキーマ =====

    #[test]
    fn test_更新用スキーマはisbnなしのペイロードを受け付ける() {
        let mut payload = valid_book();
        payload.as_object_mut().unwrap().remove("isbn");

        assert!(validate(&payload, &schemas().update).valid);
    }

    #[test]
    fn test_更新用スキーマはisbn以外の必須フィールドの欠落を拒否する() {
        let mut payload = valid_book();
        payload.as_object_mut().unwrap().remove("title");

        let result = validate(&payload, &schemas().update);

        assert!(!result.valid);
        assert!(result.errors[0].contains("title"));
    }

    #[test]
    fn test_更新用スキーマは不正なボディを拒否する() {
        let result = validate(&json!({ "invalid": "data" }), &schemas().update);

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 7);
    }

    // ===== 読み込み =====

    #[test]
    fn test_from_dirはディレクトリのスキーマを読み込む() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CREATE_SCHEMA_FILE), EMBEDDED_CREATE_SCHEMA).unwrap();
        fs::write(
            dir.path().join(UPDATE_SCHEMA_FILE),
            r#"{ "type": "object", "required": ["title"] }"#,
        )
        .unwrap();

        let schemas = BookSchemas::from_dir(dir.path()).unwrap();

        assert_eq!(schemas.create.name(), CREATE_SCHEMA_FILE);
        assert!(validate(&json!({ "title": "x" }), &schemas.update).valid);
        assert!(!validate(&json!({}), &schemas.update).valid);
    }

    #[test]
    fn test_from_dirはファイルがない場合にioエラーを返す() {
        let dir = tempfile::tempdir().unwrap();

        let result = BookSchemas::from_dir(dir.path());

        assert!(matches!(result, Err(SchemaError::Io { .. })));
    }

    #[test]
    fn test_parseは不正なjsonでparseエラーを返す() {
        let result = BookSchema::parse("broken.schema.json", "{ not json");

        assert!(matches!(result, Err(SchemaError::Parse { name, .. }) if name == "broken.schema.json"));
    }

    #[test]
    fn test_compileは不正なスキーマでcompileエラーを返す() {
        let result = BookSchema::compile("bad", &json!({ "type": 12 }));

        assert!(matches!(result, Err(SchemaError::Compile { .. })));
    }
}

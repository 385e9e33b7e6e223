//! # ルーター構築
//!
//! 書籍ルート、ヘルスチェックルート、共通ミドルウェアを組み立てる。
//! `main.rs` と統合テストの両方から使う。

use std::sync::Arc;

use axum::{Router, routing::get};
use bookstore_shared::{
    canonical_log::CanonicalLogLineLayer,
    observability::{MakeRequestUuidV7, make_request_span},
};
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::handler::{
    BookState,
    ReadinessState,
    create_book,
    delete_book,
    get_book,
    health_check,
    list_books,
    readiness_check,
    update_book,
};

/// 書籍 CRUD のルート
pub fn book_routes(state: Arc<BookState>) -> Router {
    Router::new()
        .route("/books", get(list_books).post(create_book))
        .route(
            "/books/{isbn}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(state)
}

/// リクエスト ID・トレース・Canonical Log Line のレイヤーを付与する
pub fn with_middleware(router: Router) -> Router {
    // レイヤー順序: 下に書いたものが外側
    // 1. SetRequestIdLayer（最外）: UUID v7 を生成（またはクライアント提供値を使用）
    // 2. TraceLayer: request_id を含むスパンを作成
    // 3. PropagateRequestIdLayer: レスポンスヘッダーに X-Request-Id をコピー
    // 4. CanonicalLogLineLayer: スパン内でリクエスト完了サマリを出力
    router
        .layer(CanonicalLogLineLayer)
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
}

/// アプリケーション全体のルーターを構築する
pub fn build_app(book_state: Arc<BookState>, readiness_state: Arc<ReadinessState>) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .merge(
            Router::new()
                .route("/health/ready", get(readiness_check))
                .with_state(readiness_state),
        )
        .merge(book_routes(book_state));

    with_middleware(router)
}

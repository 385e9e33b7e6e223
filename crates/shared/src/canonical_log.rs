//! # リクエストサマリログ
//!
//! 1 リクエストにつき 1 行、`log.type = "canonical"` のサマリを出す tower Layer。
//! 集計や検索はこの行だけを見ればよいようにする。
//!
//! | フィールド | 内容 |
//! |------------|------|
//! | `http.method` / `http.path` | リクエスト行 |
//! | `http.status_code` | レスポンスのステータス（Service エラー時はなし） |
//! | `http.outcome` | `success` / `client_error` / `server_error` / `failed` |
//! | `http.latency_ms` | ハンドラ到達から完了までのミリ秒 |
//!
//! レベルは結果で決まる。2xx/3xx は INFO、4xx は WARN、5xx と Service エラーは ERROR。
//! `/health` 配下は出さない。
//!
//! request_id は `make_request_span` のスパンから引き継ぐので、
//! このレイヤーは `TraceLayer` の内側に置く。

use std::{
    fmt::Display,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
    time::Instant,
};

use http::{Method, Request, Response, StatusCode};
use tower::{Layer, Service};

/// リクエストの結果分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    ClientError,
    ServerError,
    /// レスポンスを返せなかった（内側の Service がエラーを返した）
    Failed,
}

impl Outcome {
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_server_error() {
            Self::ServerError
        } else if status.is_client_error() {
            Self::ClientError
        } else {
            Self::Success
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::ClientError => "client_error",
            Self::ServerError => "server_error",
            Self::Failed => "failed",
        }
    }
}

/// サマリ対象外のパスか
fn is_excluded(path: &str) -> bool {
    path == "/health" || path.starts_with("/health/")
}

/// 完了前のリクエストの記録
struct RequestSummary {
    method:  Method,
    path:    String,
    started: Instant,
}

impl RequestSummary {
    fn start<B>(req: &Request<B>) -> Self {
        Self {
            method:  req.method().clone(),
            path:    req.uri().path().to_owned(),
            started: Instant::now(),
        }
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn responded(self, status: StatusCode) {
        let outcome = Outcome::from_status(status);
        let latency_ms = self.elapsed_ms();

        macro_rules! emit {
            ($level:expr) => {
                tracing::event!(
                    $level,
                    log.r#type = "canonical",
                    http.method = %self.method,
                    http.path = %self.path,
                    http.status_code = status.as_u16(),
                    http.outcome = outcome.as_str(),
                    http.latency_ms = latency_ms,
                    "{} {} -> {}",
                    self.method,
                    self.path,
                    status.as_u16()
                )
            };
        }

        match outcome {
            Outcome::Success => emit!(tracing::Level::INFO),
            Outcome::ClientError => emit!(tracing::Level::WARN),
            Outcome::ServerError | Outcome::Failed => emit!(tracing::Level::ERROR),
        }
    }

    fn failed(self, error: &dyn Display) {
        tracing::error!(
            log.r#type = "canonical",
            http.method = %self.method,
            http.path = %self.path,
            http.outcome = Outcome::Failed.as_str(),
            http.latency_ms = self.elapsed_ms(),
            error.message = %error,
            "{} {} -> failed",
            self.method,
            self.path
        );
    }
}

/// リクエストサマリを出力する Layer
///
/// ```text
/// SetRequestIdLayer → TraceLayer → CanonicalLogLineLayer → handler
/// ```
#[derive(Clone, Debug, Default)]
pub struct CanonicalLogLineLayer;

impl<S> Layer<S> for CanonicalLogLineLayer {
    type Service = CanonicalLogLineService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CanonicalLogLineService { inner }
    }
}

#[derive(Clone, Debug)]
pub struct CanonicalLogLineService<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for CanonicalLogLineService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Display + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;
    type Response = S::Response;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // ready になったのは self.inner なので、そちらを使い手元には clone を残す
        let clone = self.inner.clone();
        let ready = std::mem::replace(&mut self.inner, clone);
        let summary = (!is_excluded(req.uri().path())).then(|| RequestSummary::start(&req));

        Box::pin(call_and_summarize(ready, req, summary))
    }
}

async fn call_and_summarize<S, ReqBody, ResBody>(
    mut inner: S,
    req: Request<ReqBody>,
    summary: Option<RequestSummary>,
) -> Result<Response<ResBody>, S::Error>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Error: Display,
{
    let result = inner.call(req).await;

    if let Some(summary) = summary {
        match &result {
            Ok(response) => summary.responded(response.status()),
            Err(err) => summary.failed(err),
        }
    }

    result
}

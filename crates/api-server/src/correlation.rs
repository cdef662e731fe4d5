use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const CORRELATION_HEADER: &str = "x-correlation-id";

const MAX_CORRELATION_LEN: usize = 128;

/// Per-request correlation token, readable by handlers as an `Extension`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorrelationId(pub String);

impl CorrelationId {
    /// Caller-supplied token when it is short printable ASCII, otherwise a fresh UUID.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let supplied = headers
            .get(CORRELATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty() && s.len() <= MAX_CORRELATION_LEN)
            .filter(|s| s.bytes().all(|b| b.is_ascii_graphic()));

        match supplied {
            Some(token) => Self(token.to_string()),
            None => Self(Uuid::new_v4().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub async fn tag_correlation(mut request: Request, next: Next) -> Response {
    let correlation = CorrelationId::from_headers(request.headers());
    tracing::Span::current().record("correlation_id", correlation.as_str());

    let header = HeaderValue::from_str(correlation.as_str()).ok();
    request.extensions_mut().insert(correlation);

    let mut response = next.run(request).await;
    if let Some(header) = header {
        response.headers_mut().insert(CORRELATION_HEADER, header);
    }
    response
}

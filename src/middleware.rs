//! Request correlation.

use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;

/// Correlation id for one request, readable from `Request::extensions()`.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// Tag every request with a correlation id: reuse the caller's
/// `x-request-id` when it carries one, mint a `gw-` id otherwise. The
/// response always carries the id back, so gateway logs and caller logs can
/// be matched up after the fact.
pub async fn inject_request_id(mut request: Request, next: Next) -> Response {
    let request_id = match request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
    {
        Some(id) => id.to_string(),
        None => fresh_id(),
    };

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}

fn fresh_id() -> String {
    use rand::Rng;
    format!("gw-{:016x}", rand::thread_rng().gen::<u64>())
}

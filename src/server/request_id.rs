use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use log::info;
use std::time::Instant;
use uuid::Uuid;

use crate::logutil::{escape_log, short_id};
use crate::metrics;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Tag the request with a fresh id and log one line when it completes.
pub async fn request_id(req: Request, next: Next) -> Response {
    let id = Uuid::new_v4();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let started = Instant::now();
    let mut response = next.run(req).await;
    metrics::observe_request(started);

    info!(
        "[{}] {} {} -> {} ({} ms)",
        short_id(&id),
        method,
        escape_log(&path),
        response.status().as_u16(),
        started.elapsed().as_millis()
    );
    if let Ok(value) = HeaderValue::from_str(&id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

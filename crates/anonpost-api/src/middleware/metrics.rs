//! # Prometheus Metrics
//!
//! Request counters and latency histograms recorded through the `metrics`
//! facade. The exporter installed at startup renders them at `/metrics`;
//! without an installed recorder every call is a no-op.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

/// Middleware that records request count, error count, and latency.
pub async fn metrics_middleware(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    let status = response.status();
    metrics::counter!(
        "anonpost_http_requests_total",
        "method" => method.clone(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);
    metrics::histogram!("anonpost_http_request_duration_seconds", "method" => method)
        .record(started.elapsed().as_secs_f64());
    if status.is_server_error() || status.is_client_error() {
        metrics::counter!("anonpost_http_errors_total").increment(1);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use axum::middleware::from_fn;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    #[tokio::test]
    async fn middleware_passes_responses_through() {
        let app = Router::new()
            .route("/ok", get(|| async { "fine" }))
            .layer(from_fn(metrics_middleware));

        let ok = app
            .clone()
            .oneshot(axum::http::Request::builder().uri("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(ok.status(), StatusCode::OK);

        let missing = app
            .oneshot(axum::http::Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}

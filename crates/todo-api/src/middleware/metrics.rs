//! HTTP 요청 metrics middleware.
//!
//! 모든 HTTP 요청에 대해 메서드, 정규화된 경로, 상태 코드별 메트릭을 수집합니다.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

use crate::metrics::{
    normalize_path, record_http_duration, record_http_request, record_http_response,
};

/// 메트릭 수집에서 제외할 경로 (Prometheus 스크레이프 자체)
const SKIPPED_PATHS: &[&str] = &["/metrics"];

/// HTTP 메트릭을 수집하는 미들웨어 레이어.
///
/// 각 요청에 대해 다음 메트릭을 기록합니다:
/// - `http_requests_total`: 총 요청 수 (method, path 라벨)
/// - `http_responses_total`: 총 응답 수 (method, path, status 라벨)
/// - `http_request_duration_seconds`: 요청 처리 시간 히스토그램
///
/// 경로 라벨의 숫자 식별자는 `:id`로 치환되어 카디널리티가 제한됩니다.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    if SKIPPED_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let start = Instant::now();
    let method = request.method().to_string();
    let path = normalize_path(request.uri().path());

    record_http_request(&method, &path);

    let response = next.run(request).await;

    record_http_response(&method, &path, response.status().as_u16());
    record_http_duration(&method, &path, start.elapsed().as_secs_f64());

    response
}

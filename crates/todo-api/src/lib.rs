//! 다중 사용자 할 일 서비스 REST API.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API
//! - PBKDF2 자격 증명과 JWT 인증
//! - 목록/아이템 소유권 검사
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: 비밀번호, 토큰, 소유권 검사
//! - [`repository`]: PostgreSQL / 인메모리 저장소
//! - [`response`]: 응답 봉투
//! - [`extract`]: 실패 봉투를 반환하는 요청 추출기
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod response;
pub mod routes;
pub mod state;

pub use auth::{hash_password, verify_password, Claims, JwtAuth, JwtAuthError, TokenIssuer};
pub use error::{ApiError, ApiResult};
pub use extract::{ApiJson, ApiPath, ApiQuery};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use repository::{InMemoryTodoRepository, PgTodoRepository};
pub use response::{ApiResponse, PagedResponse};
pub use routes::*;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;

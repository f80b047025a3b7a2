//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 저장소 상태 포함 헬스 체크 (readiness)
//! - `/users` - 가입, 로그인, 사용자 조회
//! - `/lists` - 할 일 목록 (작성자 전용)
//! - `/items` - 할 일 아이템 (상위 목록 작성자 전용)

pub mod health;
pub mod items;
pub mod lists;
pub mod users;

pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use items::{items_router, CreateItemRequest, UpdateItemRequest};
pub use lists::{lists_router, CreateListRequest, ItemDto, ListDto, NewItemRequest};
pub use users::{users_router, LoginRequest, LoginResponse, RegisterRequest, UserDto};

use axum::Router;
use serde::Deserialize;
use std::sync::Arc;
use todo_core::PageRequest;
use utoipa::IntoParams;

use crate::state::AppState;

/// 페이지 쿼리 파라미터.
///
/// 값은 [`PageRequest::normalize`]로 보정되며 범위를 벗어나도 거부하지 않습니다.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// 페이지 번호 (기본 1)
    pub page_number: Option<i64>,
    /// 페이지 크기 (기본 10, 최대 10)
    pub page_size: Option<i64>,
}

impl PageQuery {
    pub fn normalize(&self) -> PageRequest {
        PageRequest::normalize(self.page_number, self.page_size)
    }
}

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/users", users_router())
        .nest("/lists", lists_router())
        .nest("/items", items_router())
}

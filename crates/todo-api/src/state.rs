//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 Arc로 래핑되어 여러 요청 간에 안전하게 공유됩니다.
//! 요청 간 공유 자원은 저장소 하나뿐이며, 토큰 발급기와 링크 생성기는 불변입니다.

use std::sync::Arc;

use todo_core::{PageLinkBuilder, TodoRepository};

use crate::auth::TokenIssuer;

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 영속성 저장소 (PostgreSQL 또는 인메모리)
    pub repository: Arc<dyn TodoRepository>,

    /// Access Token 발급/검증기
    pub tokens: Arc<TokenIssuer>,

    /// 페이지 링크 생성기 (공개 기본 URL 기준)
    pub page_links: PageLinkBuilder,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    ///
    /// # 인자
    /// * `repository` - 저장소 구현체
    /// * `tokens` - 토큰 발급기
    /// * `page_links` - 페이지 링크 생성기
    pub fn new(
        repository: Arc<dyn TodoRepository>,
        tokens: TokenIssuer,
        page_links: PageLinkBuilder,
    ) -> Self {
        Self {
            repository,
            tokens: Arc::new(tokens),
            page_links,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }

    /// 저장소 연결 상태 확인.
    pub async fn is_store_healthy(&self) -> bool {
        self.repository.ping().await.is_ok()
    }
}

/// 테스트용 JWT 서명 키
#[cfg(any(test, feature = "test-utils"))]
pub const TEST_JWT_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

/// 테스트용 AppState 생성 헬퍼.
///
/// 인메모리 저장소와 고정 서명 키를 사용하므로 DB 연결 없이 테스트할 수 있습니다.
/// 페이지 링크 기본 URL은 `http://localhost:3000`입니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use crate::repository::InMemoryTodoRepository;

    let tokens = TokenIssuer::new(
        TEST_JWT_SECRET.as_bytes(),
        "todo-service",
        "todo-clients",
        chrono::Duration::minutes(60),
    );
    let page_links =
        PageLinkBuilder::new("http://localhost:3000").expect("test base URL must be valid");

    AppState::new(Arc::new(InMemoryTodoRepository::new()), tokens, page_links)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_test_state() {
        let state = create_test_state();

        assert_eq!(state.repository.backend_name(), "memory");
        assert!(state.is_store_healthy().await);
        assert!(state.uptime_secs() >= 0);
        assert_eq!(state.version, env!("CARGO_PKG_VERSION"));
    }
}

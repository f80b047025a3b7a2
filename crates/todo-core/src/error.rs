//! 할 일 서비스의 에러 타입.
//!
//! 이 모듈은 서비스 전반에서 사용되는 에러 타입을 정의합니다.
//! 저장소 계층의 실패는 [`StoreError`], 요청 처리 중의 도메인 실패는
//! [`TodoError`]로 표현합니다.

use thiserror::Error;

/// 저장소(persistence) 에러.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 저장소에 연결할 수 없음
    #[error("저장소 사용 불가: {0}")]
    Unavailable(String),

    /// 유일성 제약 위반 (예: 중복 이메일)
    #[error("유일성 제약 위반: {0}")]
    Conflict(String),

    /// 기타 내부 에러
    #[error("저장소 내부 에러: {0}")]
    Internal(String),
}

impl StoreError {
    /// 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// 요청 처리 중 발생하는 도메인 에러.
///
/// 모든 변형은 경계에서 응답 봉투(`succeeded = false`)로 변환되며,
/// 프로세스를 중단시키지 않습니다.
#[derive(Debug, Error)]
pub enum TodoError {
    /// 이미 등록된 이메일로 가입 시도
    #[error("{0}")]
    Conflict(String),

    /// 로그인 실패. 어느 필드가 틀렸는지 드러내지 않습니다.
    #[error("Invalid username or password.")]
    InvalidCredentials,

    /// 토큰은 유효하지만 subject에 해당하는 사용자가 없음
    #[error("인증 불일치: 토큰 subject '{subject}'에 해당하는 사용자가 없습니다")]
    AuthInconsistency {
        /// 토큰의 subject (이메일)
        subject: String,
    },

    /// 리소스를 찾을 수 없음
    #[error("{0}")]
    NotFound(String),

    /// 잘못된 입력 (본문/쿼리/경로 바인딩 실패)
    #[error("{0}")]
    Validation(String),

    /// 저장소 에러
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TodoError {
    /// 목록을 찾을 수 없음.
    pub fn list_not_found() -> Self {
        TodoError::NotFound("List not found.".to_string())
    }

    /// 아이템을 찾을 수 없음.
    pub fn item_not_found() -> Self {
        TodoError::NotFound("Item not found.".to_string())
    }

    /// 사용자를 찾을 수 없음.
    pub fn user_not_found() -> Self {
        TodoError::NotFound("User not found.".to_string())
    }

    /// 서버 측 결함인지 확인합니다.
    ///
    /// 서버 측 결함은 로그에만 상세를 남기고 클라이언트에는 일반 메시지를 반환합니다.
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self,
            TodoError::AuthInconsistency { .. } | TodoError::Store(_)
        )
    }
}

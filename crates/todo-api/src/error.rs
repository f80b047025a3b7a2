//! API 에러 응답.
//!
//! 도메인/인증/저장소 에러를 HTTP 상태 코드와 실패 봉투
//! (`{data: null, succeeded: false, message}`)로 변환합니다.
//! 서버 측 결함(저장소 장애, 인증 불일치)은 로그에만 상세 정보를 남기고
//! 클라이언트에는 일반 메시지를 반환합니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use todo_core::{StoreError, TodoError};
use tracing::error;
use validator::{ValidationErrors, ValidationErrorsKind};

use crate::auth::{GuardError, JwtAuthError, JwtError, PasswordError};
use crate::response::ApiResponse;

/// 서버 결함 시 클라이언트에 노출하는 메시지
pub const INTERNAL_ERROR_MESSAGE: &str = "An unexpected error occurred.";

/// 권한 없음 메시지
pub const FORBIDDEN_MESSAGE: &str = "You do not have permission to access this resource.";

/// HTTP 상태 코드와 메시지를 가진 API 에러.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden() -> Self {
        Self::new(StatusCode::FORBIDDEN, FORBIDDEN_MESSAGE)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// 500 응답. 상세 내용은 호출 측에서 로그로 남깁니다.
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.status.as_u16(), self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::failure(self.message))).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        error!(error = %err, retryable = err.is_retryable(), "Store operation failed");
        ApiError::internal()
    }
}

impl From<TodoError> for ApiError {
    fn from(err: TodoError) -> Self {
        match err {
            TodoError::Conflict(message) => ApiError::conflict(message),
            TodoError::InvalidCredentials => {
                ApiError::unauthorized(TodoError::InvalidCredentials.to_string())
            }
            TodoError::NotFound(message) => ApiError::not_found(message),
            TodoError::Validation(message) => ApiError::bad_request(message),
            TodoError::AuthInconsistency { subject } => {
                error!(subject = %subject, "Authentication inconsistency");
                ApiError::internal()
            }
            TodoError::Store(store) => store.into(),
        }
    }
}

impl From<GuardError> for ApiError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::Inconsistency { subject } => {
                TodoError::AuthInconsistency { subject }.into()
            }
            GuardError::ListNotFound => TodoError::list_not_found().into(),
            GuardError::ItemNotFound => TodoError::item_not_found().into(),
            GuardError::Forbidden => ApiError::forbidden(),
            GuardError::Store(store) => store.into(),
        }
    }
}

impl From<JwtAuthError> for ApiError {
    fn from(err: JwtAuthError) -> Self {
        ApiError::unauthorized(err.to_string())
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        error!(error = %err, "Token issuance failed");
        ApiError::internal()
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        error!(error = %err, "Password hashing failed");
        ApiError::internal()
    }
}

/// 중첩 구조(목록의 초기 아이템 등)까지 포함해 검증 메시지 수집.
fn collect_validation_messages(errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                out.extend(field_errors.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{}: invalid value", field))
                }));
            }
            ValidationErrorsKind::Struct(nested) => collect_validation_messages(nested, out),
            ValidationErrorsKind::List(entries) => {
                for nested in entries.values() {
                    collect_validation_messages(nested, out);
                }
            }
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages = Vec::new();
        collect_validation_messages(&errors, &mut messages);
        messages.sort();
        messages.dedup();
        ApiError::bad_request(messages.join("; "))
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_todo_error_mapping() {
        let cases = vec![
            (TodoError::Conflict("This email is already registered.".into()), StatusCode::CONFLICT),
            (TodoError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (TodoError::list_not_found(), StatusCode::NOT_FOUND),
            (TodoError::Validation("Name is required.".into()), StatusCode::BAD_REQUEST),
            (
                TodoError::AuthInconsistency { subject: "ghost@example.com".into() },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                TodoError::Store(StoreError::Unavailable("pool".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::from(err).status, expected);
        }
    }

    #[test]
    fn test_guard_error_mapping() {
        assert_eq!(
            ApiError::from(GuardError::ItemNotFound),
            ApiError::not_found("Item not found.")
        );
        assert_eq!(
            ApiError::from(GuardError::ListNotFound),
            ApiError::not_found("List not found.")
        );
        assert_eq!(ApiError::from(GuardError::Forbidden), ApiError::forbidden());
    }

    #[tokio::test]
    async fn test_server_fault_hides_details() {
        let err = ApiError::from(StoreError::Internal("relation \"users\" does not exist".into()));
        let (status, json) = body_json(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["message"], INTERNAL_ERROR_MESSAGE);
        assert_eq!(json["succeeded"], false);
        assert!(json["data"].is_null());
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let (status, json) = body_json(TodoError::user_not_found().into()).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "User not found.");
    }
}

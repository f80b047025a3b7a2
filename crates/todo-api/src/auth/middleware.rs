//! Axum용 JWT 인증 추출기.
//!
//! `Authorization: Bearer <token>` 헤더를 [`AppState`]의 토큰 발급기로 검증합니다.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use tracing::debug;

use super::{Claims, JwtError};
use crate::error::ApiError;
use crate::state::AppState;

/// JWT 인증 추출기.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn protected_handler(
///     JwtAuth(claims): JwtAuth,
/// ) -> impl IntoResponse {
///     format!("Authenticated user: {}", claims.sub)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JwtAuth(pub Claims);

/// JWT 인증 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtAuthError {
    #[error("Authorization token is required.")]
    MissingToken,
    #[error("Authorization header must use the Bearer scheme.")]
    InvalidAuthHeader,
    #[error("Token has expired.")]
    TokenExpired,
    #[error("Token is not valid yet.")]
    TokenNotYetValid,
    #[error("Invalid token.")]
    InvalidToken,
}

impl From<JwtError> for JwtAuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => JwtAuthError::TokenExpired,
            JwtError::NotYetValid => JwtAuthError::TokenNotYetValid,
            JwtError::Invalid | JwtError::Encoding(_) => JwtAuthError::InvalidToken,
        }
    }
}

impl IntoResponse for JwtAuthError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}

impl FromRequestParts<Arc<AppState>> for JwtAuth {
    type Rejection = JwtAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Authorization 헤더에서 토큰 추출
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or(JwtAuthError::MissingToken)?;

        // Bearer 토큰 형식 확인
        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(JwtAuthError::InvalidAuthHeader)?;

        let claims = state.tokens.validate(token, Utc::now()).map_err(|e| {
            debug!(error = %e, "Bearer token rejected");
            JwtAuthError::from(e)
        })?;

        Ok(JwtAuth(claims))
    }
}

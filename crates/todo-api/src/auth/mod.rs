//! 인증 및 권한 부여.
//!
//! 비밀번호 해싱, JWT 발급/검증, 소유권 검사를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`hash_password`], [`verify_password`]: PBKDF2 자격 증명
//! - [`TokenIssuer`]: Access Token 발급 및 검증
//! - [`JwtAuth`]: Axum 핸들러용 Bearer 토큰 추출기
//! - [`guard`]: 목록/아이템 소유권 및 역할 검사
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn protected_handler(
//!     State(state): State<Arc<AppState>>,
//!     JwtAuth(claims): JwtAuth,
//! ) -> ApiResult<impl IntoResponse> {
//!     let user = guard::resolve_user(state.repository.as_ref(), &claims).await?;
//!     // ...
//! }
//! ```

pub mod guard;
mod jwt;
mod middleware;
mod password;

pub use guard::{Authorized, GuardError};
pub use jwt::{Claims, IssuedToken, JwtError, TokenIssuer};
pub use middleware::{JwtAuth, JwtAuthError};
pub use password::{
    dummy_credential, hash_new_password, hash_new_password_blocking, hash_password, new_salt,
    verify_password, verify_password_blocking, HashedPassword, PasswordError,
};

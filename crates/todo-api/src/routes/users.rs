//! 사용자 계정 endpoint.
//!
//! 가입, 로그인, 사용자 조회를 제공합니다.
//!
//! # 엔드포인트
//!
//! - `GET /users` - 전체 사용자 목록 (Admin 전용, 페이지)
//! - `GET /users/{id}` - 사용자 조회
//! - `GET /users/me` - 호출자 본인 조회
//! - `POST /users/login` - Access Token 발급
//! - `POST /users/register` - 가입

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use todo_core::{NewUser, Role, StoreError, TodoError, User};
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use validator::Validate;

use super::PageQuery;
use crate::auth::{
    dummy_credential, guard, hash_new_password_blocking, verify_password_blocking, JwtAuth,
};
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::metrics::{record_login, record_registration};
use crate::response::{ApiResponse, PagedResponse};
use crate::state::AppState;

/// 중복 이메일 가입 메시지
pub const DUPLICATE_EMAIL_MESSAGE: &str = "This email is already registered.";

// ================================================================================================
// Types
// ================================================================================================

/// 사용자 응답 (해시와 솔트는 노출하지 않음).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// "Admin" | "User"
    pub role: String,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role.to_string(),
        }
    }
}

/// 가입 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

/// 로그인 요청.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 로그인 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    pub expires: DateTime<Utc>,
}

// ================================================================================================
// Handlers
// ================================================================================================

/// 전체 사용자 목록 (Admin 전용).
#[utoipa::path(
    get,
    path = "/users",
    params(PageQuery),
    responses(
        (status = 200, description = "사용자 목록", body = PagedResponse<UserDto>),
        (status = 401, description = "인증 필요"),
        (status = 403, description = "Admin 권한 필요")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let repo = state.repository.as_ref();
    let caller = guard::resolve_user(repo, &claims).await?;
    guard::require_admin(&caller)?;

    let request = query.normalize();
    let total = repo.count_users().await?;
    let users = repo.list_users(request.offset(), request.size()).await?;
    debug!(
        page = request.page(),
        size = request.size(),
        total,
        "GET /users"
    );

    let links = state.page_links.build_links(request, total, "/users");
    let data = users.into_iter().map(UserDto::from).collect();
    Ok(Json(PagedResponse::new(data, request, total, links)))
}

/// 사용자 조회.
#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = i64, Path, description = "사용자 ID")),
    responses(
        (status = 200, description = "사용자", body = ApiResponse<UserDto>),
        (status = 401, description = "인증 필요"),
        (status = 404, description = "사용자 없음")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    JwtAuth(_claims): JwtAuth,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<impl IntoResponse> {
    debug!(user_id = id, "GET /users/{{id}}");

    let user = state
        .repository
        .find_user_by_id(id)
        .await?
        .ok_or_else(TodoError::user_not_found)?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// 호출자 본인 조회.
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "호출자", body = ApiResponse<UserDto>),
        (status = 401, description = "인증 필요")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
) -> ApiResult<impl IntoResponse> {
    let user = guard::resolve_user(state.repository.as_ref(), &claims).await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// 로그인.
///
/// 이메일이 없거나 비밀번호가 다르면 동일한 401 응답을 반환합니다.
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "토큰 발급", body = ApiResponse<LoginResponse>),
        (status = 401, description = "자격 증명 불일치")
    ),
    tag = "users"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let email = request.email.trim();
    let found = state.repository.find_user_by_email(email).await?;

    // 계정이 없어도 같은 비용의 검증을 수행
    let (digest, salt) = match &found {
        Some(user) => (user.password_hash.clone(), user.salt.clone()),
        None => {
            let dummy = dummy_credential();
            (dummy.digest.clone(), dummy.salt.clone())
        }
    };
    let verified = verify_password_blocking(request.password, digest, salt).await?;

    let user = match found {
        Some(user) if verified => user,
        Some(user) => {
            warn!(user_id = user.id, "Login failed: password mismatch");
            record_login("failure");
            return Err(TodoError::InvalidCredentials.into());
        }
        None => {
            warn!("Login failed: unknown email");
            record_login("failure");
            return Err(TodoError::InvalidCredentials.into());
        }
    };

    let token = state.tokens.issue(&user.email, user.role, Utc::now())?;
    record_login("success");
    info!(user_id = user.id, role = %user.role, "User logged in");

    Ok(Json(ApiResponse::success(LoginResponse {
        access_token: token.access_token,
        expires: token.expires,
    })))
}

/// 가입.
///
/// 가입 시 역할은 항상 `User`입니다. 중복 이메일은 해싱 전에 거부됩니다.
#[utoipa::path(
    post,
    path = "/users/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "가입 완료", body = ApiResponse<UserDto>),
        (status = 400, description = "입력 오류"),
        (status = 409, description = "이미 등록된 이메일")
    ),
    tag = "users"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(mut request): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    request.name = request.name.trim().to_string();
    request.email = request.email.trim().to_string();

    if let Err(errors) = request.validate() {
        record_registration("invalid");
        return Err(errors.into());
    }

    let repo = state.repository.as_ref();
    if repo.find_user_by_email(&request.email).await?.is_some() {
        record_registration("conflict");
        return Err(TodoError::Conflict(DUPLICATE_EMAIL_MESSAGE.to_string()).into());
    }

    let hashed = hash_new_password_blocking(request.password).await?;

    let user = repo
        .insert_user(NewUser {
            name: request.name,
            email: request.email,
            password_hash: hashed.digest,
            salt: hashed.salt,
            role: Role::User,
        })
        .await
        .map_err(|e| match e {
            // 동시 가입 경합
            StoreError::Conflict(_) => {
                record_registration("conflict");
                ApiError::from(TodoError::Conflict(DUPLICATE_EMAIL_MESSAGE.to_string()))
            }
            other => other.into(),
        })?;

    record_registration("created");
    info!(user_id = user.id, "User registered");

    let location = format!("/users/{}", user.id);
    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(ApiResponse::success(UserDto::from(user))),
    ))
}

// ================================================================================================
// Router
// ================================================================================================

/// 사용자 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_users))
        .route("/me", get(get_me))
        .route("/{id}", get(get_user))
        .route("/login", post(login))
        .route("/register", post(register))
}

//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가
//!
//! 응답 봉투(`ApiResponse<T>`, `PagedResponse<T>`)는 제네릭이므로 각 경로에서
//! 인라인으로 생성됩니다.

use axum::Router;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::routes::{
    ComponentHealth, ComponentStatus, CreateItemRequest, CreateListRequest, HealthResponse,
    ItemDto, ListDto, LoginRequest, LoginResponse, NewItemRequest, RegisterRequest,
    UpdateItemRequest, UserDto,
};

// ==================== OpenAPI 문서 정의 ====================

/// Todo Service API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Todo Service API",
        description = r#"
# 다중 사용자 할 일 서비스 REST API

## 주요 기능

- **사용자**: 가입, 로그인 (Access Token 발급), 사용자 조회
- **목록**: 작성자 전용 할 일 목록
- **아이템**: 목록 작성자만 추가/수정/삭제 가능

## 인증

`/users/login`, `/users/register`, `/health`를 제외한 모든 엔드포인트는
`Authorization: Bearer <token>` 헤더가 필요합니다.

## 응답 형식

모든 응답은 `{data, succeeded, message}` 봉투를 사용합니다.
페이지 응답에는 `pageNumber`, `pageSize`, `totalPages`, `totalRecords`와
`firstPage`/`lastPage`/`nextPage`/`previousPage` 링크가 추가됩니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "http://localhost:3000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "users", description = "사용자 - 가입, 로그인, 조회"),
        (name = "lists", description = "목록 - 할 일 목록 CRUD"),
        (name = "items", description = "아이템 - 할 일 아이템 추가/수정/삭제")
    ),
    modifiers(&BearerSecurity),
    // ==================== 스키마 등록 ====================
    components(
        schemas(
            // ===== Health =====
            HealthResponse,
            ComponentHealth,
            ComponentStatus,

            // ===== Users =====
            UserDto,
            RegisterRequest,
            LoginRequest,
            LoginResponse,

            // ===== Lists / Items =====
            ListDto,
            ItemDto,
            CreateListRequest,
            NewItemRequest,
            CreateItemRequest,
            UpdateItemRequest,
        )
    ),
    // ==================== 경로 등록 ====================
    paths(
        // ===== Health =====
        crate::routes::health::health_check,
        crate::routes::health::health_ready,

        // ===== Users =====
        crate::routes::users::list_users,
        crate::routes::users::get_user,
        crate::routes::users::get_me,
        crate::routes::users::login,
        crate::routes::users::register,

        // ===== Lists =====
        crate::routes::lists::list_lists,
        crate::routes::lists::create_list,
        crate::routes::lists::get_list,
        crate::routes::lists::delete_list,

        // ===== Items =====
        crate::routes::items::create_item,
        crate::routes::items::update_item,
        crate::routes::items::delete_item,
    )
)]
pub struct ApiDoc;

/// `bearer_auth` 보안 스킴 등록.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

// ==================== Swagger UI 라우터 ====================

/// Swagger UI 라우터 생성.
///
/// 다음 경로에 문서 UI를 마운트합니다:
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

// ==================== 테스트 ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_valid() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&spec).unwrap();

        assert!(json.contains("Todo Service API"));

        for tag in ["health", "users", "lists", "items"] {
            assert!(json.contains(tag), "missing tag {}", tag);
        }

        for path in ["/health/ready", "/users/login", "/users/register", "/lists/{id}", "/items/{id}"] {
            assert!(spec.paths.paths.contains_key(path), "missing path {}", path);
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let spec = ApiDoc::openapi();
        let components = spec.components.expect("components");

        assert!(components.security_schemes.contains_key("bearer_auth"));
    }

    #[test]
    fn test_swagger_ui_router_creates() {
        let _router: Router<()> = swagger_ui_router();
    }

    #[test]
    fn test_openapi_contains_schemas() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string(&spec).unwrap();

        assert!(json.contains("HealthResponse"));
        assert!(json.contains("UserDto"));
        assert!(json.contains("CreateListRequest"));
        assert!(!json.contains("password_hash"));
    }
}

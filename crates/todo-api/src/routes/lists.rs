//! 할 일 목록 endpoint.
//!
//! 목록은 작성자만 조회/삭제할 수 있습니다. 응답에는 목록에 속한 아이템이
//! 함께 포함됩니다.
//!
//! # 엔드포인트
//!
//! - `GET /lists` - 호출자의 목록 (페이지)
//! - `POST /lists` - 목록 생성 (초기 아이템 포함 가능)
//! - `GET /lists/{id}` - 목록 조회
//! - `DELETE /lists/{id}` - 목록 삭제 (아이템도 함께 삭제)

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header::LOCATION, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use todo_core::{Item, ItemList, ListWithItems, NewItemList, TodoRepository};
use tracing::{debug, info};
use utoipa::ToSchema;
use validator::Validate;

use super::PageQuery;
use crate::auth::{guard, JwtAuth};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::response::{ApiResponse, PagedResponse};
use crate::state::AppState;

/// 목록 삭제 완료 메시지
pub const LIST_REMOVED_MESSAGE: &str = "List removed successfully.";

// ================================================================================================
// Types
// ================================================================================================

/// 아이템 응답.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ItemDto {
    pub id: i64,
    pub name: String,
    pub is_complete: bool,
}

impl From<Item> for ItemDto {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            name: item.name,
            is_complete: item.is_complete,
        }
    }
}

/// 목록 응답 (아이템 포함).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListDto {
    pub id: i64,
    pub name: String,
    pub items: Vec<ItemDto>,
}

impl From<ListWithItems> for ListDto {
    fn from(value: ListWithItems) -> Self {
        Self {
            id: value.list.id,
            name: value.list.name,
            items: value.items.into_iter().map(ItemDto::from).collect(),
        }
    }
}

/// 목록 생성 시 초기 아이템.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NewItemRequest {
    #[validate(length(min = 1, message = "Item name is required."))]
    pub name: String,
}

/// 목록 생성 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateListRequest {
    #[validate(length(min = 1, message = "List name is required."))]
    pub name: String,
    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<NewItemRequest>,
}

impl CreateListRequest {
    /// 목록/아이템 이름 앞뒤 공백 제거.
    fn trim(&mut self) {
        self.name = self.name.trim().to_string();
        for item in &mut self.items {
            item.name = item.name.trim().to_string();
        }
    }
}

// ================================================================================================
// Handlers
// ================================================================================================

async fn load_items(
    repo: &dyn TodoRepository,
    list: ItemList,
) -> ApiResult<ListWithItems> {
    let items = repo.items_by_list(list.id).await?;
    Ok(ListWithItems { list, items })
}

/// 호출자의 목록 조회.
#[utoipa::path(
    get,
    path = "/lists",
    params(PageQuery),
    responses(
        (status = 200, description = "호출자의 목록", body = PagedResponse<ListDto>),
        (status = 401, description = "인증 필요")
    ),
    security(("bearer_auth" = [])),
    tag = "lists"
)]
pub async fn list_lists(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<impl IntoResponse> {
    let repo = state.repository.as_ref();
    let user = guard::resolve_user(repo, &claims).await?;

    let request = query.normalize();
    let total = repo.count_lists_by_author(user.id).await?;
    let lists = repo
        .lists_by_author(user.id, request.offset(), request.size())
        .await?;
    debug!(user_id = user.id, page = request.page(), total, "GET /lists");

    let mut data = Vec::with_capacity(lists.len());
    for list in lists {
        data.push(ListDto::from(load_items(repo, list).await?));
    }

    let links = state.page_links.build_links(request, total, "/lists");
    Ok(Json(PagedResponse::new(data, request, total, links)))
}

/// 목록 생성.
///
/// 목록과 초기 아이템은 함께 생성되며, 일부만 저장되는 경우는 없습니다.
#[utoipa::path(
    post,
    path = "/lists",
    request_body = CreateListRequest,
    responses(
        (status = 201, description = "목록 생성", body = ApiResponse<ListDto>),
        (status = 400, description = "입력 오류"),
        (status = 401, description = "인증 필요")
    ),
    security(("bearer_auth" = [])),
    tag = "lists"
)]
pub async fn create_list(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
    ApiJson(mut request): ApiJson<CreateListRequest>,
) -> ApiResult<impl IntoResponse> {
    request.trim();
    request.validate()?;

    let repo = state.repository.as_ref();
    let user = guard::resolve_user(repo, &claims).await?;

    let created = repo
        .insert_list_with_items(NewItemList {
            name: request.name,
            author_id: user.id,
            items: request.items.into_iter().map(|i| i.name).collect(),
        })
        .await?;

    info!(
        user_id = user.id,
        list_id = created.list.id,
        items = created.items.len(),
        "List created"
    );

    let location = format!("/lists/{}", created.list.id);
    Ok((
        StatusCode::CREATED,
        [(LOCATION, location)],
        Json(ApiResponse::success(ListDto::from(created))),
    ))
}

/// 목록 조회.
#[utoipa::path(
    get,
    path = "/lists/{id}",
    params(("id" = i64, Path, description = "목록 ID")),
    responses(
        (status = 200, description = "목록", body = ApiResponse<ListDto>),
        (status = 401, description = "인증 필요"),
        (status = 403, description = "소유자 아님"),
        (status = 404, description = "목록 없음")
    ),
    security(("bearer_auth" = [])),
    tag = "lists"
)]
pub async fn get_list(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<impl IntoResponse> {
    let repo = state.repository.as_ref();
    let user = guard::resolve_user(repo, &claims).await?;
    let authorized = guard::authorize_list(repo, user, id).await?;
    debug!(user_id = authorized.user.id, list_id = id, "GET /lists/{{id}}");

    let list = load_items(repo, authorized.resource).await?;
    Ok(Json(ApiResponse::success(ListDto::from(list))))
}

/// 목록 삭제.
#[utoipa::path(
    delete,
    path = "/lists/{id}",
    params(("id" = i64, Path, description = "목록 ID")),
    responses(
        (status = 200, description = "삭제 완료", body = ApiResponse<i64>),
        (status = 401, description = "인증 필요"),
        (status = 403, description = "소유자 아님"),
        (status = 404, description = "목록 없음")
    ),
    security(("bearer_auth" = [])),
    tag = "lists"
)]
pub async fn delete_list(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<impl IntoResponse> {
    let repo = state.repository.as_ref();
    let user = guard::resolve_user(repo, &claims).await?;
    let authorized = guard::authorize_list(repo, user, id).await?;

    if !repo.delete_list(id).await? {
        // 검사와 삭제 사이에 다른 요청이 먼저 삭제함
        return Err(guard::GuardError::ListNotFound.into());
    }

    info!(user_id = authorized.user.id, list_id = id, "List deleted");
    Ok(Json(ApiResponse::with_message(id, LIST_REMOVED_MESSAGE)))
}

// ================================================================================================
// Router
// ================================================================================================

/// 목록 라우터 생성.
pub fn lists_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_lists).post(create_list))
        .route("/{id}", get(get_list).delete(delete_list))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header::AUTHORIZATION, Request};
    use chrono::Utc;
    use todo_core::{NewUser, Role, User};
    use tower::ServiceExt;

    use crate::state::create_test_state;

    fn app(state: Arc<AppState>) -> Router {
        Router::new()
            .nest("/lists", lists_router())
            .with_state(state)
    }

    async fn call(
        state: &Arc<AppState>,
        method: &str,
        uri: &str,
        token: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {}", token));
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app(state.clone())
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (
            status,
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null),
        )
    }

    async fn seed(state: &AppState, email: &str) -> (User, String) {
        let user = state
            .repository
            .insert_user(NewUser {
                name: email.to_string(),
                email: email.to_string(),
                password_hash: "digest".to_string(),
                salt: "salt".to_string(),
                role: Role::User,
            })
            .await
            .unwrap();
        let token = state
            .tokens
            .issue(&user.email, user.role, Utc::now())
            .unwrap()
            .access_token;
        (user, token)
    }

    #[tokio::test]
    async fn test_create_and_get_list() {
        let state = Arc::new(create_test_state());
        let (_, token) = seed(&state, "alice@example.com").await;

        let (status, json) = call(
            &state,
            "POST",
            "/lists",
            &token,
            Some(serde_json::json!({
                "name": "Groceries",
                "items": [{"name": "Milk"}, {"name": "Eggs"}]
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["data"]["name"], "Groceries");
        assert_eq!(json["data"]["items"].as_array().unwrap().len(), 2);
        assert_eq!(json["data"]["items"][0]["isComplete"], false);

        let id = json["data"]["id"].as_i64().unwrap();
        let (status, json) = call(&state, "GET", &format!("/lists/{}", id), &token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["items"][1]["name"], "Eggs");
    }

    #[tokio::test]
    async fn test_create_list_without_items() {
        let state = Arc::new(create_test_state());
        let (_, token) = seed(&state, "alice@example.com").await;

        let (status, json) = call(
            &state,
            "POST",
            "/lists",
            &token,
            Some(serde_json::json!({"name": "Empty"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(json["data"]["items"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_list_rejects_blank_name() {
        let state = Arc::new(create_test_state());
        let (user, token) = seed(&state, "alice@example.com").await;

        let (status, json) = call(
            &state,
            "POST",
            "/lists",
            &token,
            Some(serde_json::json!({"name": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "List name is required.");
        assert_eq!(state.repository.count_lists_by_author(user.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_other_user_is_forbidden() {
        let state = Arc::new(create_test_state());
        let (_, alice) = seed(&state, "alice@example.com").await;
        let (_, bob) = seed(&state, "bob@example.com").await;

        let (_, json) = call(
            &state,
            "POST",
            "/lists",
            &alice,
            Some(serde_json::json!({"name": "Private", "items": [{"name": "x"}]})),
        )
        .await;
        let uri = format!("/lists/{}", json["data"]["id"]);

        let (status, json) = call(&state, "GET", &uri, &bob, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["succeeded"], false);
        assert!(json["data"].is_null());

        let (status, _) = call(&state, "DELETE", &uri, &bob, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = call(&state, "GET", &uri, &alice, None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_list_is_not_found() {
        let state = Arc::new(create_test_state());
        let (_, token) = seed(&state, "alice@example.com").await;

        let (status, json) = call(&state, "GET", "/lists/404", &token, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "List not found.");
    }

    #[tokio::test]
    async fn test_delete_list_removes_items() {
        let state = Arc::new(create_test_state());
        let (_, token) = seed(&state, "alice@example.com").await;

        let (_, json) = call(
            &state,
            "POST",
            "/lists",
            &token,
            Some(serde_json::json!({"name": "Chores", "items": [{"name": "Dishes"}]})),
        )
        .await;
        let id = json["data"]["id"].as_i64().unwrap();
        let item_id = json["data"]["items"][0]["id"].as_i64().unwrap();

        let (status, json) = call(&state, "DELETE", &format!("/lists/{}", id), &token, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], LIST_REMOVED_MESSAGE);
        assert!(state.repository.find_item(item_id).await.unwrap().is_none());

        let (status, _) = call(&state, "GET", &format!("/lists/{}", id), &token, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_lists_is_owner_scoped_and_paged() {
        let state = Arc::new(create_test_state());
        let (_, alice) = seed(&state, "alice@example.com").await;
        let (_, bob) = seed(&state, "bob@example.com").await;

        for i in 0..3 {
            call(
                &state,
                "POST",
                "/lists",
                &alice,
                Some(serde_json::json!({"name": format!("A{}", i)})),
            )
            .await;
        }
        call(
            &state,
            "POST",
            "/lists",
            &bob,
            Some(serde_json::json!({"name": "B0"})),
        )
        .await;

        let (status, json) = call(&state, "GET", "/lists?pageNumber=2&pageSize=2", &alice, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["totalRecords"], 3);
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["data"].as_array().unwrap().len(), 1);
        assert_eq!(json["data"][0]["name"], "A2");
        assert!(json["nextPage"].is_null());
        assert_eq!(
            json["previousPage"],
            "http://localhost:3000/lists?pageNumber=1&pageSize=2"
        );

        let (_, json) = call(&state, "GET", "/lists?pageSize=50", &bob, None).await;
        assert_eq!(json["pageSize"], 10);
        assert_eq!(json["totalRecords"], 1);
        assert_eq!(json["data"][0]["name"], "B0");
    }

    #[tokio::test]
    async fn test_create_list_trims_names() {
        let state = Arc::new(create_test_state());
        let (user, token) = seed(&state, "alice@example.com").await;

        let (status, json) = call(
            &state,
            "POST",
            "/lists",
            &token,
            Some(serde_json::json!({"name": "   "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "List name is required.");

        let (status, json) = call(
            &state,
            "POST",
            "/lists",
            &token,
            Some(serde_json::json!({"name": "Chores", "items": [{"name": "  "}]})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Item name is required.");
        assert_eq!(state.repository.count_lists_by_author(user.id).await.unwrap(), 0);

        let (status, json) = call(
            &state,
            "POST",
            "/lists",
            &token,
            Some(serde_json::json!({"name": " Groceries ", "items": [{"name": " Milk"}]})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(json["data"]["name"], "Groceries");
        assert_eq!(json["data"]["items"][0]["name"], "Milk");
    }

    #[tokio::test]
    async fn test_malformed_requests_use_envelope() {
        let state = Arc::new(create_test_state());
        let (_, token) = seed(&state, "alice@example.com").await;

        for uri in ["/lists?pageNumber=abc", "/lists/abc"] {
            let (status, json) = call(&state, "GET", uri, &token, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(json["succeeded"], false);
            assert!(json["data"].is_null());
        }

        let request = Request::builder()
            .method("POST")
            .uri("/lists")
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app(state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["succeeded"], false);
    }
}

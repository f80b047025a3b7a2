//! 할 일 아이템 endpoint.
//!
//! 아이템 접근은 상위 목록의 작성자만 허용됩니다.
//!
//! # 엔드포인트
//!
//! - `POST /items` - 목록에 아이템 추가
//! - `PATCH /items/{id}` - 이름/완료 여부 부분 수정
//! - `DELETE /items/{id}` - 아이템 삭제

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{patch, post},
    Json, Router,
};
use serde::Deserialize;
use todo_core::ItemPatch;
use tracing::info;
use utoipa::ToSchema;
use validator::Validate;

use super::lists::ItemDto;
use crate::auth::{guard, GuardError, JwtAuth};
use crate::error::ApiResult;
use crate::extract::{ApiJson, ApiPath};
use crate::response::ApiResponse;
use crate::state::AppState;

/// 아이템 수정 완료 메시지
pub const ITEM_UPDATED_MESSAGE: &str = "Item updated successfully.";

/// 아이템 삭제 완료 메시지
pub const ITEM_REMOVED_MESSAGE: &str = "Item removed successfully.";

/// 아이템 추가 요청.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateItemRequest {
    #[validate(length(min = 1, message = "Item name is required."))]
    pub name: String,
    pub list_id: i64,
}

/// 아이템 수정 요청.
///
/// 보낸 필드만 변경됩니다.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    #[validate(length(min = 1, message = "Item name must not be empty."))]
    pub name: Option<String>,
    pub is_complete: Option<bool>,
}

impl From<UpdateItemRequest> for ItemPatch {
    fn from(request: UpdateItemRequest) -> Self {
        ItemPatch {
            name: request.name,
            is_complete: request.is_complete,
        }
    }
}

/// 목록에 아이템 추가.
#[utoipa::path(
    post,
    path = "/items",
    request_body = CreateItemRequest,
    responses(
        (status = 202, description = "아이템 추가", body = ApiResponse<ItemDto>),
        (status = 400, description = "입력 오류"),
        (status = 401, description = "인증 필요"),
        (status = 403, description = "목록 소유자 아님"),
        (status = 404, description = "목록 없음")
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
    ApiJson(mut request): ApiJson<CreateItemRequest>,
) -> ApiResult<impl IntoResponse> {
    request.name = request.name.trim().to_string();
    request.validate()?;

    let repo = state.repository.as_ref();
    let user = guard::resolve_user(repo, &claims).await?;
    let authorized = guard::authorize_list(repo, user, request.list_id).await?;
    let list = authorized.resource;

    let item = repo.insert_item(list.id, &request.name).await?;
    info!(
        user_id = authorized.user.id,
        list_id = list.id,
        item_id = item.id,
        "Item added"
    );

    let message = format!("Item added to list '{}' successfully.", list.name);
    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::with_message(ItemDto::from(item), message)),
    ))
}

/// 아이템 부분 수정.
#[utoipa::path(
    patch,
    path = "/items/{id}",
    params(("id" = i64, Path, description = "아이템 ID")),
    request_body = UpdateItemRequest,
    responses(
        (status = 202, description = "수정 완료", body = ApiResponse<ItemDto>),
        (status = 400, description = "입력 오류"),
        (status = 401, description = "인증 필요"),
        (status = 403, description = "목록 소유자 아님"),
        (status = 404, description = "아이템 없음")
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
    ApiPath(id): ApiPath<i64>,
    ApiJson(mut request): ApiJson<UpdateItemRequest>,
) -> ApiResult<impl IntoResponse> {
    if let Some(name) = request.name.as_mut() {
        *name = name.trim().to_string();
    }
    request.validate()?;

    let repo = state.repository.as_ref();
    let user = guard::resolve_user(repo, &claims).await?;
    let authorized = guard::authorize_item(repo, user, id).await?;

    let patch = ItemPatch::from(request);
    let item = if patch.is_empty() {
        authorized.resource.0.clone()
    } else {
        repo.update_item(id, patch)
            .await?
            .ok_or(GuardError::ItemNotFound)?
    };
    info!(
        user_id = authorized.user.id,
        item_id = id,
        is_complete = item.is_complete,
        "Item updated"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::with_message(
            ItemDto::from(item),
            ITEM_UPDATED_MESSAGE,
        )),
    ))
}

/// 아이템 삭제.
#[utoipa::path(
    delete,
    path = "/items/{id}",
    params(("id" = i64, Path, description = "아이템 ID")),
    responses(
        (status = 200, description = "삭제 완료", body = ApiResponse<i64>),
        (status = 401, description = "인증 필요"),
        (status = 403, description = "목록 소유자 아님"),
        (status = 404, description = "아이템 없음")
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    JwtAuth(claims): JwtAuth,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<impl IntoResponse> {
    let repo = state.repository.as_ref();
    let user = guard::resolve_user(repo, &claims).await?;
    let authorized = guard::authorize_item(repo, user, id).await?;

    if !repo.delete_item(id).await? {
        return Err(GuardError::ItemNotFound.into());
    }

    info!(user_id = authorized.user.id, item_id = id, "Item deleted");
    Ok(Json(ApiResponse::with_message(id, ITEM_REMOVED_MESSAGE)))
}

/// 아이템 라우터 생성.
pub fn items_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_item))
        .route("/{id}", patch(update_item).delete(delete_item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header::AUTHORIZATION, Request};
    use chrono::Utc;
    use todo_core::{Item, NewItemList, NewUser, Role};
    use tower::ServiceExt;

    use crate::state::create_test_state;

    struct Fixture {
        state: Arc<AppState>,
        owner: String,
        stranger: String,
        list_id: i64,
        item: Item,
    }

    async fn token(state: &AppState, email: &str) -> (i64, String) {
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
        (user.id, token)
    }

    async fn fixture() -> Fixture {
        let state = Arc::new(create_test_state());
        let (owner_id, owner) = token(&state, "owner@example.com").await;
        let (_, stranger) = token(&state, "stranger@example.com").await;

        let created = state
            .repository
            .insert_list_with_items(NewItemList {
                name: "Groceries".to_string(),
                author_id: owner_id,
                items: vec!["Milk".to_string()],
            })
            .await
            .unwrap();

        Fixture {
            state,
            owner,
            stranger,
            list_id: created.list.id,
            item: created.items[0].clone(),
        }
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

        let app = Router::new()
            .nest("/items", items_router())
            .with_state(state.clone());
        let response = app.oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (
            status,
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null),
        )
    }

    #[tokio::test]
    async fn test_create_item_accepted() {
        let f = fixture().await;

        let (status, json) = call(
            &f.state,
            "POST",
            "/items",
            &f.owner,
            Some(serde_json::json!({"name": "Bread", "listId": f.list_id})),
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(json["message"], "Item added to list 'Groceries' successfully.");
        assert_eq!(json["data"]["name"], "Bread");
        assert_eq!(json["data"]["isComplete"], false);
        assert_eq!(
            f.state.repository.items_by_list(f.list_id).await.unwrap().len(),
            2
        );
    }

    #[tokio::test]
    async fn test_create_item_checks_list() {
        let f = fixture().await;

        let (status, json) = call(
            &f.state,
            "POST",
            "/items",
            &f.owner,
            Some(serde_json::json!({"name": "Bread", "listId": 999})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "List not found.");

        let (status, _) = call(
            &f.state,
            "POST",
            "/items",
            &f.stranger,
            Some(serde_json::json!({"name": "Bread", "listId": f.list_id})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            f.state.repository.items_by_list(f.list_id).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_patch_completion_keeps_name() {
        let f = fixture().await;
        let uri = format!("/items/{}", f.item.id);

        let (status, json) = call(
            &f.state,
            "PATCH",
            &uri,
            &f.owner,
            Some(serde_json::json!({"isComplete": true})),
        )
        .await;

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(json["message"], ITEM_UPDATED_MESSAGE);
        assert_eq!(json["data"]["name"], "Milk");
        assert_eq!(json["data"]["isComplete"], true);

        let (_, json) = call(
            &f.state,
            "PATCH",
            &uri,
            &f.owner,
            Some(serde_json::json!({"name": "Oat milk"})),
        )
        .await;
        assert_eq!(json["data"]["name"], "Oat milk");
        assert_eq!(json["data"]["isComplete"], true);
    }

    #[tokio::test]
    async fn test_patch_by_stranger_is_forbidden() {
        let f = fixture().await;

        let (status, _) = call(
            &f.state,
            "PATCH",
            &format!("/items/{}", f.item.id),
            &f.stranger,
            Some(serde_json::json!({"isComplete": true})),
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        let stored = f.state.repository.find_item(f.item.id).await.unwrap().unwrap();
        assert!(!stored.is_complete);
    }

    #[tokio::test]
    async fn test_missing_item_is_not_found() {
        let f = fixture().await;

        let (status, json) = call(
            &f.state,
            "PATCH",
            "/items/999",
            &f.owner,
            Some(serde_json::json!({"isComplete": true})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Item not found.");

        let (status, json) = call(&f.state, "DELETE", "/items/999", &f.owner, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["message"], "Item not found.");
    }

    #[tokio::test]
    async fn test_delete_item() {
        let f = fixture().await;
        let uri = format!("/items/{}", f.item.id);

        let (status, _) = call(&f.state, "DELETE", &uri, &f.stranger, None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, json) = call(&f.state, "DELETE", &uri, &f.owner, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], ITEM_REMOVED_MESSAGE);
        assert!(f.state.repository.find_item(f.item.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_blank_names_are_rejected() {
        let f = fixture().await;

        let (status, json) = call(
            &f.state,
            "POST",
            "/items",
            &f.owner,
            Some(serde_json::json!({"name": "   ", "listId": f.list_id})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Item name is required.");

        let (status, json) = call(
            &f.state,
            "PATCH",
            &format!("/items/{}", f.item.id),
            &f.owner,
            Some(serde_json::json!({"name": "  "})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Item name must not be empty.");

        let stored = f.state.repository.find_item(f.item.id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Milk");
        assert_eq!(
            f.state.repository.items_by_list(f.list_id).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_wrong_field_type_uses_envelope() {
        let f = fixture().await;

        let (status, json) = call(
            &f.state,
            "POST",
            "/items",
            &f.owner,
            Some(serde_json::json!({"name": "Bread", "listId": "one"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["succeeded"], false);
        assert!(json["data"].is_null());

        let (status, json) = call(&f.state, "DELETE", "/items/abc", &f.owner, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["succeeded"], false);
    }
}

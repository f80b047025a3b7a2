//! 소유권 검사.
//!
//! 검증된 토큰 클레임에서 호출자를 확인하고 목록/아이템 접근을 허가합니다.
//! 아이템 소유권은 항상 상위 목록의 작성자를 통해 판단하며, 클라이언트가 보낸
//! 식별자를 신뢰하지 않습니다.
//!
//! # 검사 순서
//!
//! 1. 클레임 subject(이메일)로 사용자 조회. 없으면 [`GuardError::Inconsistency`]
//! 2. 목록 조회. 없으면 `NotFound`, 작성자가 다르면 `Forbidden`
//! 3. 아이템은 아이템 → 상위 목록 → 2단계 순서로 확인

use todo_core::{Item, ItemList, StoreError, TodoRepository, User};
use tracing::{error, warn};

use super::Claims;
use crate::metrics::record_authorization_denial;

/// 소유권 검사 실패.
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// 토큰은 유효하지만 subject에 해당하는 사용자가 없음
    #[error("no user for token subject '{subject}'")]
    Inconsistency { subject: String },
    #[error("List not found.")]
    ListNotFound,
    #[error("Item not found.")]
    ItemNotFound,
    #[error("You do not have permission to access this resource.")]
    Forbidden,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// 검사를 통과한 호출자와 자원.
#[derive(Debug, Clone)]
pub struct Authorized<T> {
    pub user: User,
    pub resource: T,
}

/// 클레임 subject로 호출자 확인.
pub async fn resolve_user(repo: &dyn TodoRepository, claims: &Claims) -> Result<User, GuardError> {
    match repo.find_user_by_email(&claims.sub).await? {
        Some(user) => Ok(user),
        None => {
            error!(subject = %claims.sub, "Token subject has no matching user");
            Err(GuardError::Inconsistency {
                subject: claims.sub.clone(),
            })
        }
    }
}

/// 목록 접근 허가.
pub async fn authorize_list(
    repo: &dyn TodoRepository,
    user: User,
    list_id: i64,
) -> Result<Authorized<ItemList>, GuardError> {
    let list = repo.find_list(list_id).await?.ok_or(GuardError::ListNotFound)?;

    if !list.is_owned_by(user.id) {
        warn!(user_id = user.id, list_id, "List access denied");
        record_authorization_denial("list_owner");
        return Err(GuardError::Forbidden);
    }

    Ok(Authorized { user, resource: list })
}

/// 아이템 접근 허가.
///
/// 허가되면 아이템과 상위 목록을 함께 반환합니다.
pub async fn authorize_item(
    repo: &dyn TodoRepository,
    user: User,
    item_id: i64,
) -> Result<Authorized<(Item, ItemList)>, GuardError> {
    let item = repo.find_item(item_id).await?.ok_or(GuardError::ItemNotFound)?;
    let list = repo
        .find_list(item.list_id)
        .await?
        .ok_or(GuardError::ListNotFound)?;

    if !list.is_owned_by(user.id) {
        warn!(user_id = user.id, item_id, list_id = list.id, "Item access denied");
        record_authorization_denial("item_owner");
        return Err(GuardError::Forbidden);
    }

    Ok(Authorized {
        user,
        resource: (item, list),
    })
}

/// 관리자 역할 요구.
pub fn require_admin(user: &User) -> Result<(), GuardError> {
    if user.role.is_admin() {
        Ok(())
    } else {
        warn!(user_id = user.id, role = %user.role, "Admin role required");
        record_authorization_denial("admin_role");
        Err(GuardError::Forbidden)
    }
}

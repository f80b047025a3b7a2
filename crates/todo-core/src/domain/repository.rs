//! 영속성 저장소 포트.
//!
//! 사용자, 목록, 아이템 세 가지 레코드에 대한 조회/삽입/수정/삭제를
//! 추상화합니다. HTTP 계층은 이 트레이트에만 의존하며, 구현체는
//! PostgreSQL 또는 인메모리 저장소가 될 수 있습니다.
//!
//! # 구현 요구사항
//!
//! - 단일 행 읽기/쓰기는 원자적이어야 합니다.
//! - [`TodoRepository::insert_list_with_items`]는 목록과 초기 아이템을
//!   하나의 트랜잭션으로 생성해야 합니다 (고아 목록 방지).
//! - 목록 조회는 id 오름차순으로 정렬합니다.

use async_trait::async_trait;

use super::{Item, ItemList, ItemPatch, ListWithItems, NewItemList, NewUser, User};
use crate::error::StoreError;

/// 할 일 서비스 저장소.
///
/// # 구현 예시
///
/// ```ignore
/// use async_trait::async_trait;
/// use todo_core::{TodoRepository, StoreError, User};
///
/// pub struct PgTodoRepository {
///     pool: PgPool,
/// }
///
/// #[async_trait]
/// impl TodoRepository for PgTodoRepository {
///     async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
///         // SELECT ... WHERE email = $1
///     }
///
///     // ... 나머지 메서드 구현
/// }
/// ```
#[async_trait]
pub trait TodoRepository: Send + Sync {
    // ===== Users =====

    /// id로 사용자 조회.
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError>;

    /// 이메일로 사용자 조회 (정확히 일치).
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// 사용자 생성.
    ///
    /// # Errors
    ///
    /// - `StoreError::Conflict`: 이메일이 이미 존재
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// 사용자 페이지 조회 (id 오름차순).
    async fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<User>, StoreError>;

    /// 전체 사용자 수.
    async fn count_users(&self) -> Result<i64, StoreError>;

    // ===== Lists =====

    /// id로 목록 조회.
    async fn find_list(&self, id: i64) -> Result<Option<ItemList>, StoreError>;

    /// 작성자의 목록 페이지 조회 (id 오름차순).
    async fn lists_by_author(
        &self,
        author_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ItemList>, StoreError>;

    /// 작성자의 전체 목록 수.
    async fn count_lists_by_author(&self, author_id: i64) -> Result<i64, StoreError>;

    /// 목록과 초기 아이템을 원자적으로 생성.
    async fn insert_list_with_items(&self, list: NewItemList)
        -> Result<ListWithItems, StoreError>;

    /// 목록 삭제 (소속 아이템 포함).
    ///
    /// # Returns
    ///
    /// 삭제된 행이 있으면 `true`
    async fn delete_list(&self, id: i64) -> Result<bool, StoreError>;

    // ===== Items =====

    /// 목록에 속한 아이템 조회 (id 오름차순).
    async fn items_by_list(&self, list_id: i64) -> Result<Vec<Item>, StoreError>;

    /// id로 아이템 조회.
    async fn find_item(&self, id: i64) -> Result<Option<Item>, StoreError>;

    /// 아이템 생성 (`is_complete = false`).
    async fn insert_item(&self, list_id: i64, name: &str) -> Result<Item, StoreError>;

    /// 아이템 부분 수정.
    ///
    /// # Returns
    ///
    /// 수정된 아이템. 아이템이 없으면 `None`
    async fn update_item(&self, id: i64, patch: ItemPatch) -> Result<Option<Item>, StoreError>;

    /// 아이템 삭제.
    async fn delete_item(&self, id: i64) -> Result<bool, StoreError>;

    // ===== Health =====

    /// 저장소 연결 상태 확인.
    async fn ping(&self) -> Result<(), StoreError>;

    /// 저장소 이름 (로깅/헬스 체크용).
    fn backend_name(&self) -> &str;
}

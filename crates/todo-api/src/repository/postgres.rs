//! PostgreSQL 저장소.
//!
//! 사용자, 목록, 아이템 테이블에 대한 [`TodoRepository`] 구현.
//! 테이블 정의는 `sql/schema.sql`을 참고하세요. 서비스는 마이그레이션을 실행하지 않습니다.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use todo_core::{
    Item, ItemList, ItemPatch, ListWithItems, NewItemList, NewUser, Role, StoreError,
    TodoRepository, User,
};
use tracing::debug;

// ================================================================================================
// Row Types
// ================================================================================================

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    salt: String,
    role: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role).ok_or_else(|| {
            StoreError::Internal(format!("unknown role '{}' for user {}", row.role, row.id))
        })?;
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            salt: row.salt,
            role,
        })
    }
}

#[derive(Debug, FromRow)]
struct ListRow {
    id: i64,
    name: String,
    author_id: i64,
}

impl From<ListRow> for ItemList {
    fn from(row: ListRow) -> Self {
        ItemList {
            id: row.id,
            name: row.name,
            author_id: row.author_id,
        }
    }
}

#[derive(Debug, FromRow)]
struct ItemRow {
    id: i64,
    name: String,
    is_complete: bool,
    list_id: i64,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            id: row.id,
            name: row.name,
            is_complete: row.is_complete,
            list_id: row.list_id,
        }
    }
}

/// sqlx 에러를 저장소 에러로 분류.
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Unavailable(err.to_string())
        }
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Conflict(db_err.constraint().unwrap_or("unique").to_string())
        }
        _ => StoreError::Internal(err.to_string()),
    }
}

// ================================================================================================
// Repository
// ================================================================================================

/// PostgreSQL 기반 저장소.
#[derive(Debug, Clone)]
pub struct PgTodoRepository {
    pool: PgPool,
}

impl PgTodoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, salt, role";

#[async_trait]
impl TodoRepository for PgTodoRepository {
    // ============================================================================================
    // Users
    // ============================================================================================

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(User::try_from).transpose()
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, salt, role)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.salt)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        debug!(user_id = row.id, "User row inserted");
        User::try_from(row)
    }

    async fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(count)
    }

    // ============================================================================================
    // Lists
    // ============================================================================================

    async fn find_list(&self, id: i64) -> Result<Option<ItemList>, StoreError> {
        let row = sqlx::query_as::<_, ListRow>(
            "SELECT id, name, author_id FROM item_lists WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ItemList::from))
    }

    async fn lists_by_author(
        &self,
        author_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ItemList>, StoreError> {
        let rows = sqlx::query_as::<_, ListRow>(
            r#"
            SELECT id, name, author_id
            FROM item_lists
            WHERE author_id = $1
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ItemList::from).collect())
    }

    async fn count_lists_by_author(&self, author_id: i64) -> Result<i64, StoreError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM item_lists WHERE author_id = $1")
                .bind(author_id)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        Ok(count)
    }

    async fn insert_list_with_items(&self, list: NewItemList) -> Result<ListWithItems, StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let list_row = sqlx::query_as::<_, ListRow>(
            r#"
            INSERT INTO item_lists (name, author_id)
            VALUES ($1, $2)
            RETURNING id, name, author_id
            "#,
        )
        .bind(&list.name)
        .bind(list.author_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let mut items = Vec::with_capacity(list.items.len());
        for name in &list.items {
            let item_row = sqlx::query_as::<_, ItemRow>(
                r#"
                INSERT INTO items (name, is_complete, list_id)
                VALUES ($1, FALSE, $2)
                RETURNING id, name, is_complete, list_id
                "#,
            )
            .bind(name)
            .bind(list_row.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
            items.push(Item::from(item_row));
        }

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(ListWithItems {
            list: list_row.into(),
            items,
        })
    }

    async fn delete_list(&self, id: i64) -> Result<bool, StoreError> {
        // items.list_id는 ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM item_lists WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================================================================
    // Items
    // ============================================================================================

    async fn items_by_list(&self, list_id: i64) -> Result<Vec<Item>, StoreError> {
        let rows = sqlx::query_as::<_, ItemRow>(
            "SELECT id, name, is_complete, list_id FROM items WHERE list_id = $1 ORDER BY id",
        )
        .bind(list_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(Item::from).collect())
    }

    async fn find_item(&self, id: i64) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query_as::<_, ItemRow>(
            "SELECT id, name, is_complete, list_id FROM items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Item::from))
    }

    async fn insert_item(&self, list_id: i64, name: &str) -> Result<Item, StoreError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            INSERT INTO items (name, is_complete, list_id)
            VALUES ($1, FALSE, $2)
            RETURNING id, name, is_complete, list_id
            "#,
        )
        .bind(name)
        .bind(list_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_item(&self, id: i64, patch: ItemPatch) -> Result<Option<Item>, StoreError> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            UPDATE items SET
                name = COALESCE($2, name),
                is_complete = COALESCE($3, is_complete)
            WHERE id = $1
            RETURNING id, name, is_complete, list_id
            "#,
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.is_complete)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(Item::from))
    }

    async fn delete_item(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() > 0)
    }

    // ============================================================================================
    // Health
    // ============================================================================================

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "postgres"
    }
}

//! 인메모리 저장소.
//!
//! 데이터베이스 URL이 설정되지 않은 개발 환경과 테스트에서 사용합니다.
//! 모든 상태는 하나의 `RwLock` 뒤에 있으므로 목록과 초기 아이템 생성은
//! 단일 쓰기 잠금 안에서 원자적으로 처리됩니다.

use std::collections::BTreeMap;

use async_trait::async_trait;
use todo_core::{
    Item, ItemList, ItemPatch, ListWithItems, NewItemList, NewUser, StoreError, TodoRepository,
    User,
};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    lists: BTreeMap<i64, ItemList>,
    items: BTreeMap<i64, Item>,
    next_user_id: i64,
    next_list_id: i64,
    next_item_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn push_item(&mut self, list_id: i64, name: &str) -> Item {
        let item = Item {
            id: Self::next_id(&mut self.next_item_id),
            name: name.to_string(),
            is_complete: false,
            list_id,
        };
        self.items.insert(item.id, item.clone());
        item
    }
}

/// 인메모리 저장소.
///
/// 식별자는 1부터 생성 순서대로 증가하며 조회 결과는 id 오름차순입니다.
#[derive(Debug, Default)]
pub struct InMemoryTodoRepository {
    tables: RwLock<Tables>,
}

impl InMemoryTodoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page<T>(values: impl Iterator<Item = T>, offset: i64, limit: i64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit).unwrap_or(0);
    values.skip(offset).take(limit).collect()
}

#[async_trait]
impl TodoRepository for InMemoryTodoRepository {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("users_email_key".to_string()));
        }

        let user = User {
            id: Tables::next_id(&mut tables.next_user_id),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            salt: user.salt,
            role: user.role,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_users(&self, offset: i64, limit: i64) -> Result<Vec<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(page(tables.users.values().cloned(), offset, limit))
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        Ok(self.tables.read().await.users.len() as i64)
    }

    async fn find_list(&self, id: i64) -> Result<Option<ItemList>, StoreError> {
        Ok(self.tables.read().await.lists.get(&id).cloned())
    }

    async fn lists_by_author(
        &self,
        author_id: i64,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ItemList>, StoreError> {
        let tables = self.tables.read().await;
        let owned = tables
            .lists
            .values()
            .filter(|l| l.author_id == author_id)
            .cloned();
        Ok(page(owned, offset, limit))
    }

    async fn count_lists_by_author(&self, author_id: i64) -> Result<i64, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.lists.values().filter(|l| l.author_id == author_id).count() as i64)
    }

    async fn insert_list_with_items(&self, list: NewItemList) -> Result<ListWithItems, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&list.author_id) {
            return Err(StoreError::Internal(format!(
                "author {} does not exist",
                list.author_id
            )));
        }

        let created = ItemList {
            id: Tables::next_id(&mut tables.next_list_id),
            name: list.name,
            author_id: list.author_id,
        };
        tables.lists.insert(created.id, created.clone());

        let items = list
            .items
            .iter()
            .map(|name| tables.push_item(created.id, name))
            .collect();

        Ok(ListWithItems {
            list: created,
            items,
        })
    }

    async fn delete_list(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.lists.remove(&id).is_none() {
            return Ok(false);
        }
        tables.items.retain(|_, item| item.list_id != id);
        Ok(true)
    }

    async fn items_by_list(&self, list_id: i64) -> Result<Vec<Item>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .values()
            .filter(|i| i.list_id == list_id)
            .cloned()
            .collect())
    }

    async fn find_item(&self, id: i64) -> Result<Option<Item>, StoreError> {
        Ok(self.tables.read().await.items.get(&id).cloned())
    }

    async fn insert_item(&self, list_id: i64, name: &str) -> Result<Item, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.lists.contains_key(&list_id) {
            return Err(StoreError::Internal(format!("list {} does not exist", list_id)));
        }
        Ok(tables.push_item(list_id, name))
    }

    async fn update_item(&self, id: i64, patch: ItemPatch) -> Result<Option<Item>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.items.get_mut(&id).map(|item| {
            patch.apply_to(item);
            item.clone()
        }))
    }

    async fn delete_item(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.items.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_core::Role;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Test".to_string(),
            email: email.to_string(),
            password_hash: "digest".to_string(),
            salt: "salt".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_insert_user_assigns_ascending_ids() {
        let repo = InMemoryTodoRepository::new();
        let a = repo.insert_user(new_user("a@example.com")).await.unwrap();
        let b = repo.insert_user(new_user("b@example.com")).await.unwrap();

        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(repo.count_users().await.unwrap(), 2);
        assert_eq!(
            repo.find_user_by_email("b@example.com").await.unwrap(),
            Some(b)
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = InMemoryTodoRepository::new();
        repo.insert_user(new_user("a@example.com")).await.unwrap();

        let err = repo.insert_user(new_user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(repo.count_users().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_users_paging() {
        let repo = InMemoryTodoRepository::new();
        for i in 0..5 {
            repo.insert_user(new_user(&format!("u{}@example.com", i)))
                .await
                .unwrap();
        }

        let page2 = repo.list_users(2, 2).await.unwrap();
        assert_eq!(page2.iter().map(|u| u.id).collect::<Vec<_>>(), vec![3, 4]);
        assert!(repo.list_users(10, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_with_items_and_cascade_delete() {
        let repo = InMemoryTodoRepository::new();
        let user = repo.insert_user(new_user("a@example.com")).await.unwrap();

        let created = repo
            .insert_list_with_items(NewItemList {
                name: "Groceries".to_string(),
                author_id: user.id,
                items: vec!["Milk".to_string(), "Eggs".to_string()],
            })
            .await
            .unwrap();

        assert_eq!(created.items.len(), 2);
        assert!(created.items.iter().all(|i| !i.is_complete && i.list_id == created.list.id));
        assert_eq!(repo.count_lists_by_author(user.id).await.unwrap(), 1);

        assert!(repo.delete_list(created.list.id).await.unwrap());
        assert!(repo.items_by_list(created.list.id).await.unwrap().is_empty());
        assert!(repo.find_item(created.items[0].id).await.unwrap().is_none());
        assert!(!repo.delete_list(created.list.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_creation_requires_author() {
        let repo = InMemoryTodoRepository::new();
        let result = repo
            .insert_list_with_items(NewItemList {
                name: "Orphan".to_string(),
                author_id: 42,
                items: vec!["x".to_string()],
            })
            .await;

        assert!(result.is_err());
        assert_eq!(repo.count_lists_by_author(42).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_item_partial() {
        let repo = InMemoryTodoRepository::new();
        let user = repo.insert_user(new_user("a@example.com")).await.unwrap();
        let list = repo
            .insert_list_with_items(NewItemList {
                name: "Chores".to_string(),
                author_id: user.id,
                items: vec![],
            })
            .await
            .unwrap();
        let item = repo.insert_item(list.list.id, "Laundry").await.unwrap();

        let updated = repo
            .update_item(
                item.id,
                ItemPatch {
                    name: None,
                    is_complete: Some(true),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "Laundry");
        assert!(updated.is_complete);
        assert!(repo.update_item(999, ItemPatch::default()).await.unwrap().is_none());
    }
}

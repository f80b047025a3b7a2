//! 할 일 목록과 아이템.

/// 할 일 목록.
///
/// 작성자(`author_id`)가 유일한 소유자입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemList {
    pub id: i64,
    pub name: String,
    pub author_id: i64,
}

impl ItemList {
    /// 주어진 사용자가 이 목록의 소유자인지 확인.
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.author_id == user_id
    }
}

/// 할 일 아이템.
///
/// 소유권은 상위 목록의 작성자를 통해 결정됩니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub is_complete: bool,
    pub list_id: i64,
}

/// 목록과 그에 속한 아이템.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListWithItems {
    pub list: ItemList,
    pub items: Vec<Item>,
}

/// 새 목록 입력 (초기 아이템 포함).
///
/// 목록과 초기 아이템은 하나의 원자적 단위로 생성됩니다.
#[derive(Debug, Clone)]
pub struct NewItemList {
    pub name: String,
    pub author_id: i64,
    /// 초기 아이템 이름 목록
    pub items: Vec<String>,
}

/// 아이템 부분 수정.
///
/// `None`인 필드는 변경하지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub is_complete: Option<bool>,
}

impl ItemPatch {
    /// 변경할 필드가 없는지 확인.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.is_complete.is_none()
    }

    /// 패치를 아이템에 적용.
    pub fn apply_to(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(is_complete) = self.is_complete {
            item.is_complete = is_complete;
        }
    }
}

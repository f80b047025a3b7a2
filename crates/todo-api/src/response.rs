//! 응답 봉투 타입.
//!
//! 모든 엔드포인트는 `{data, succeeded, message}` 형식으로 응답합니다.
//! 페이지 응답은 여기에 페이지 번호와 탐색 링크가 추가됩니다.
//!
//! # 예시
//!
//! ```json
//! {
//!   "data": [{"id": 1, "name": "Groceries", "items": []}],
//!   "succeeded": true,
//!   "message": null,
//!   "pageNumber": 1,
//!   "pageSize": 10,
//!   "totalPages": 1,
//!   "totalRecords": 1,
//!   "firstPage": "http://localhost:3000/lists?pageNumber=1&pageSize=10",
//!   "lastPage": "http://localhost:3000/lists?pageNumber=1&pageSize=10",
//!   "nextPage": null,
//!   "previousPage": null
//! }
//! ```

use serde::{Deserialize, Serialize};
use todo_core::{PageLinks, PageRequest};
use utoipa::ToSchema;

/// 단일 응답 봉투.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    pub succeeded: bool,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// 성공 응답.
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            succeeded: true,
            message: None,
        }
    }

    /// 메시지가 포함된 성공 응답.
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            succeeded: true,
            message: Some(message.into()),
        }
    }

    /// 실패 응답 (`data`는 항상 null).
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            data: None,
            succeeded: false,
            message: Some(message.into()),
        }
    }
}

/// 페이지 응답 봉투.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponse<T> {
    pub data: Vec<T>,
    pub succeeded: bool,
    pub message: Option<String>,
    pub page_number: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub total_records: i64,
    pub first_page: String,
    pub last_page: Option<String>,
    pub next_page: Option<String>,
    pub previous_page: Option<String>,
}

impl<T> PagedResponse<T> {
    /// 페이지 데이터와 계산된 링크로 응답 생성.
    pub fn new(data: Vec<T>, request: PageRequest, total_records: i64, links: PageLinks) -> Self {
        Self {
            data,
            succeeded: true,
            message: None,
            page_number: request.page(),
            page_size: request.size(),
            total_pages: links.total_pages,
            total_records,
            first_page: links.first,
            last_page: links.last,
            next_page: links.next,
            previous_page: links.previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_core::PageLinkBuilder;

    #[test]
    fn test_failure_envelope_shape() {
        let json = serde_json::to_value(ApiResponse::<()>::failure("List not found.")).unwrap();

        assert_eq!(json["succeeded"], false);
        assert!(json["data"].is_null());
        assert_eq!(json["message"], "List not found.");
    }

    #[test]
    fn test_paged_envelope_is_camel_case() {
        let builder = PageLinkBuilder::new("http://localhost:3000").unwrap();
        let request = PageRequest::normalize(Some(2), Some(10));
        let links = builder.build_links(request, 25, "/lists");
        let json = serde_json::to_value(PagedResponse::new(vec![1, 2, 3], request, 25, links)).unwrap();

        assert_eq!(json["pageNumber"], 2);
        assert_eq!(json["pageSize"], 10);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["totalRecords"], 25);
        assert_eq!(
            json["nextPage"],
            "http://localhost:3000/lists?pageNumber=3&pageSize=10"
        );
        assert_eq!(
            json["previousPage"],
            "http://localhost:3000/lists?pageNumber=1&pageSize=10"
        );
        assert!(json.get("page_number").is_none());
    }
}

//! 페이지네이션 정책.
//!
//! 요청된 페이지 파라미터를 보정하고, 응답 탐색용 페이지 링크
//! (first/last/next/previous)를 계산합니다.
//!
//! # 보정 규칙
//!
//! - 페이지 번호가 1 미만이면 1로 올림 (에러 없음)
//! - 페이지 크기가 [`MAX_PAGE_SIZE`]를 넘으면 최대값으로 내림 (에러 없음)
//! - 페이지 크기가 1 미만이면 [`DEFAULT_PAGE_SIZE`] 사용
//!
//! 전체 페이지 수를 넘는 페이지 번호도 거부하지 않습니다. 데이터는 비어 있지만
//! 링크는 실제 전체 레코드 수 기준으로 계산됩니다.

use thiserror::Error;
use url::Url;

/// 허용되는 최대 페이지 크기
pub const MAX_PAGE_SIZE: i64 = 10;

/// 기본 페이지 크기
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// 페이지네이션 설정 에러.
#[derive(Debug, Error)]
pub enum PaginationError {
    #[error("잘못된 기본 URL: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("기본 URL로 사용할 수 없는 형식: {0}")]
    CannotBeABase(String),
}

/// 보정된 페이지 요청.
///
/// `page >= 1`, `1 <= size <= MAX_PAGE_SIZE`가 항상 성립합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// 요청 파라미터 보정.
    ///
    /// 값이 없으면 기본값(1페이지, 크기 10)을 사용합니다.
    pub fn normalize(requested_page: Option<i64>, requested_size: Option<i64>) -> Self {
        let page = requested_page.unwrap_or(1).max(1);
        let size = match requested_size {
            Some(size) if size >= 1 => size.min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        };
        Self { page, size }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    /// 저장소 조회 오프셋 `(page - 1) * size`.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.size)
    }

    /// 전체 페이지 수 `ceil(total_records / size)`.
    pub fn total_pages(&self, total_records: i64) -> i64 {
        let total_records = total_records.max(0);
        (total_records + self.size - 1) / self.size
    }
}

/// 계산된 페이지 링크 집합.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLinks {
    pub first: String,
    /// 레코드가 하나도 없으면 `None` (0페이지 링크를 만들지 않음)
    pub last: Option<String>,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub total_pages: i64,
}

/// 페이지 링크 생성기.
///
/// 공개 기본 URL(scheme + host + 선택적 경로 접두사)에 라우트 경로와
/// `pageNumber`, `pageSize` 쿼리 파라미터를 붙여 링크를 만듭니다.
#[derive(Debug, Clone)]
pub struct PageLinkBuilder {
    base: Url,
}

impl PageLinkBuilder {
    /// 기본 URL로 생성기 생성.
    ///
    /// # Errors
    ///
    /// URL 파싱 실패 또는 경로를 가질 수 없는 URL (`mailto:` 등)
    pub fn new(base_url: &str) -> Result<Self, PaginationError> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(PaginationError::CannotBeABase(base_url.to_string()));
        }
        Ok(Self { base })
    }

    /// 특정 페이지의 링크.
    pub fn page_uri(&self, route: &str, page: i64, size: i64) -> String {
        let mut url = self.base.clone();
        let prefix = self.base.path().trim_end_matches('/');
        let route = route.trim_start_matches('/');
        url.set_path(&format!("{}/{}", prefix, route));
        url.set_query(None);
        url.query_pairs_mut()
            .append_pair("pageNumber", &page.to_string())
            .append_pair("pageSize", &size.to_string());
        url.into()
    }

    /// 링크 집합 계산.
    ///
    /// - `first`: 항상 1페이지
    /// - `last`: `total_pages` 페이지, 레코드가 없으면 없음
    /// - `next`: `1 <= page < total_pages`일 때만
    /// - `previous`: `1 < page <= total_pages`일 때만
    pub fn build_links(&self, request: PageRequest, total_records: i64, route: &str) -> PageLinks {
        let page = request.page();
        let size = request.size();
        let total_pages = request.total_pages(total_records);

        let next = (page >= 1 && page < total_pages)
            .then(|| self.page_uri(route, page + 1, size));
        let previous = (page > 1 && page <= total_pages)
            .then(|| self.page_uri(route, page - 1, size));
        let last = (total_pages > 0).then(|| self.page_uri(route, total_pages, size));

        PageLinks {
            first: self.page_uri(route, 1, size),
            last,
            next,
            previous,
            total_pages,
        }
    }
}

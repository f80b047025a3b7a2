//! # Todo Core
//!
//! 할 일 서비스의 핵심 도메인 모델 및 정책을 제공합니다.
//!
//! 이 크레이트는 HTTP 계층과 무관한 기본 타입을 제공합니다:
//! - 사용자, 목록, 아이템 도메인 모델
//! - 영속성 저장소 포트 ([`TodoRepository`])
//! - 페이지네이션 정책 및 페이지 링크 생성
//! - 에러 분류 체계
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod pagination;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use pagination::*;

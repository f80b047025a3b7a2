//! 할 일 서비스의 도메인 모델.

mod list;
mod repository;
mod user;

pub use list::*;
pub use repository::*;
pub use user::*;

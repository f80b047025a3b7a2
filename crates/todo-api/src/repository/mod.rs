//! Repository pattern for database operations.
//!
//! [`todo_core::TodoRepository`] 포트의 구현체를 제공합니다.
//! - [`PgTodoRepository`]: PostgreSQL (운영)
//! - [`InMemoryTodoRepository`]: 프로세스 메모리 (개발/테스트)

mod memory;
mod postgres;

pub use memory::InMemoryTodoRepository;
pub use postgres::PgTodoRepository;

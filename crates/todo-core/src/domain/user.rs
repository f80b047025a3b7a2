//! 사용자 및 역할.

use serde::{Deserialize, Serialize};

/// 사용자 역할.
///
/// 가입 시에는 항상 [`Role::User`]가 부여되며,
/// [`Role::Admin`]만 전체 사용자 목록을 조회할 수 있습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// 관리자
    Admin,
    /// 일반 사용자
    User,
}

impl Role {
    /// 문자열에서 역할 파싱 (대소문자 무시).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    /// 토큰 클레임 및 저장소에 기록되는 표기.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::User => "User",
        }
    }

    /// 관리자 여부.
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 저장된 사용자 레코드.
///
/// 가입 이후에는 변경되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub name: String,
    /// 유일한 이메일 (토큰 subject)
    pub email: String,
    /// base64 인코딩된 PBKDF2 다이제스트
    pub password_hash: String,
    /// base64 인코딩된 솔트
    pub salt: String,
    pub role: Role,
}

/// 새 사용자 입력.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub role: Role,
}

//! 비밀번호 해싱 유틸리티.
//!
//! PBKDF2-HMAC-SHA-512 기반 비밀번호 해싱 및 검증.
//! 다이제스트와 솔트는 표준 base64로 인코딩되어 사용자 레코드에 따로 저장됩니다.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use pbkdf2::pbkdf2_hmac;
use rand::{rngs::OsRng, RngCore};
use sha2::Sha512;

/// PBKDF2 반복 횟수
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// 다이제스트 길이 (바이트)
pub const DIGEST_LEN: usize = 64;

/// 솔트 길이 (바이트)
pub const SALT_LEN: usize = 32;

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("해싱 작업 실패: {0}")]
    TaskFailed(String),
}

/// 해싱된 자격 증명 (base64 다이제스트 + base64 솔트).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedPassword {
    pub digest: String,
    pub salt: String,
}

/// 새 솔트 생성.
///
/// OS 난수 생성기에서 32바이트를 읽어 base64로 인코딩합니다.
pub fn new_salt() -> String {
    STANDARD.encode(random_salt())
}

fn random_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// 비밀번호 해싱.
///
/// 같은 입력에는 항상 같은 다이제스트를 반환합니다.
///
/// # Arguments
///
/// * `password` - 평문 비밀번호
/// * `salt` - 솔트 원본 바이트
///
/// # Returns
///
/// base64 인코딩된 64바이트 다이제스트
pub fn hash_password(password: &str, salt: &[u8]) -> String {
    let mut digest = [0u8; DIGEST_LEN];
    pbkdf2_hmac::<Sha512>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut digest);
    STANDARD.encode(digest)
}

/// 새 솔트로 비밀번호 해싱.
pub fn hash_new_password(password: &str) -> HashedPassword {
    let salt = random_salt();
    HashedPassword {
        digest: hash_password(password, &salt),
        salt: STANDARD.encode(salt),
    }
}

/// 등록되지 않은 이메일의 로그인 검증에 사용하는 자격 증명.
///
/// 계정 유무와 관계없이 로그인 실패는 같은 해싱 비용을 치릅니다.
static DUMMY_CREDENTIAL: Lazy<HashedPassword> =
    Lazy::new(|| hash_new_password("no-such-account"));

/// 계정이 없을 때 대신 검증할 자격 증명.
///
/// 최초 호출 시 한 번 해싱합니다. 서버 시작 시 미리 호출해 두면 첫 요청의 지연을 피할 수 있습니다.
pub fn dummy_credential() -> &'static HashedPassword {
    &DUMMY_CREDENTIAL
}

/// 비밀번호 검증.
///
/// 저장된 솔트로 다이제스트를 다시 계산해 상수 시간으로 비교합니다.
/// 솔트가 base64가 아니면 `false`를 반환합니다.
pub fn verify_password(password: &str, stored_digest: &str, stored_salt: &str) -> bool {
    let Ok(salt) = STANDARD.decode(stored_salt) else {
        return false;
    };
    let computed = hash_password(password, &salt);
    constant_time_eq(computed.as_bytes(), stored_digest.as_bytes())
}

/// 상수 시간 바이트 비교
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// 블로킹 스레드 풀에서 새 비밀번호 해싱.
///
/// PBKDF2 10만 회 반복은 CPU를 오래 점유하므로 async 런타임 밖에서 실행합니다.
pub async fn hash_new_password_blocking(password: String) -> Result<HashedPassword, PasswordError> {
    tokio::task::spawn_blocking(move || hash_new_password(&password))
        .await
        .map_err(|e| PasswordError::TaskFailed(e.to_string()))
}

/// 블로킹 스레드 풀에서 비밀번호 검증.
pub async fn verify_password_blocking(
    password: String,
    stored_digest: String,
    stored_salt: String,
) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored_digest, &stored_salt))
        .await
        .map_err(|e| PasswordError::TaskFailed(e.to_string()))
}

//! JWT 토큰 처리.
//!
//! Access Token 발급 및 검증 로직. 서비스는 세션을 보관하지 않으며
//! 토큰 클레임이 유일한 신원 정보입니다.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use todo_core::{JwtConfig, Role, MAX_TOKEN_LIFETIME_MINUTES};

/// JWT Access Token 페이로드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 사용자 이메일
    pub sub: String,
    /// 사용자 역할 ("Admin" | "User")
    pub role: Role,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued At (Unix timestamp)
    pub iat: i64,
    /// Not Before (Unix timestamp)
    pub nbf: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
    /// JWT ID - 토큰 고유 식별자
    pub jti: String,
}

/// 발급된 Access Token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires: DateTime<Utc>,
}

/// JWT 토큰 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 인코딩 실패: {0}")]
    Encoding(#[from] jsonwebtoken::errors::Error),
    #[error("토큰이 만료되었습니다")]
    Expired,
    #[error("토큰이 아직 유효하지 않습니다")]
    NotYetValid,
    #[error("유효하지 않은 토큰")]
    Invalid,
}

/// 토큰 발급기.
///
/// HS256 대칭 키, 발급자, 대상, 유효 기간을 보관합니다.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// 새 발급기 생성.
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        audience: impl Into<String>,
        lifetime: Duration,
    ) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            issuer: issuer.into(),
            audience: audience.into(),
            lifetime,
        }
    }

    /// `[jwt]` 설정 섹션에서 생성.
    ///
    /// 유효 기간은 `1..=MAX_TOKEN_LIFETIME_MINUTES`분으로 제한됩니다.
    /// 범위 밖의 값은 [`AppConfig::validate`](todo_core::AppConfig::validate)가 로드 시점에 거부합니다.
    pub fn from_config(config: &JwtConfig) -> Self {
        let minutes = config.lifetime_minutes.clamp(1, MAX_TOKEN_LIFETIME_MINUTES);
        Self::new(
            config.key.expose_secret().as_bytes(),
            config.issuer.clone(),
            config.audience.clone(),
            Duration::minutes(minutes),
        )
    }

    /// 토큰 유효 기간.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Access Token 발급.
    ///
    /// # Arguments
    ///
    /// * `email` - subject로 사용할 사용자 이메일
    /// * `role` - 사용자 역할
    /// * `now` - 발급 시각 (`iat`, `nbf`)
    pub fn issue(&self, email: &str, role: Role, now: DateTime<Utc>) -> Result<IssuedToken, JwtError> {
        let expires = now + self.lifetime;
        let claims = Claims {
            sub: email.to_string(),
            role,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        Ok(IssuedToken {
            access_token,
            expires,
        })
    }

    /// 토큰 검증.
    ///
    /// 서명, 발급자, 대상을 확인한 뒤 `nbf <= now <= exp`를 `now` 기준으로 검사합니다.
    pub fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_audience(&[self.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "nbf", "iss", "aud", "sub"]);
        // 시간 창은 주입된 now로 직접 검사
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| JwtError::Invalid)?
            .claims;

        let now = now.timestamp();
        if now < claims.nbf {
            return Err(JwtError::NotYetValid);
        }
        if now > claims.exp {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }
}

//! JWT 签发与校验（HS256）

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::infrastructure::config::JwtConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: String,
    pub username: String,
    pub role: String,
    pub token_type: TokenType,
    /// 保证同一秒内签发的令牌也互不相同
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
}

/// 令牌主体
pub struct Subject<'a> {
    pub user_id: &'a str,
    pub username: &'a str,
    pub role: &'a str,
}

pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtManager {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            access_ttl: Duration::seconds(config.access_token_ttl_seconds),
            refresh_ttl: Duration::seconds(config.refresh_token_ttl_seconds),
        }
    }

    pub fn generate_access_token(
        &self,
        subject: &Subject<'_>,
    ) -> jsonwebtoken::errors::Result<String> {
        self.sign(&self.claims_for(subject, TokenType::Access, self.access_ttl))
    }

    pub fn generate_refresh_token(
        &self,
        subject: &Subject<'_>,
    ) -> jsonwebtoken::errors::Result<String> {
        self.sign(&self.claims_for(subject, TokenType::Refresh, self.refresh_ttl))
    }

    /// 校验签名、`exp` 与 `nbf`，不检查令牌类型
    pub fn verify(&self, token: &str) -> jsonwebtoken::errors::Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
    }

    pub(crate) fn sign(&self, claims: &Claims) -> jsonwebtoken::errors::Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
    }

    fn claims_for(&self, subject: &Subject<'_>, token_type: TokenType, ttl: Duration) -> Claims {
        let now = Utc::now();
        Claims {
            sub: subject.user_id.to_string(),
            user_id: subject.user_id.to_string(),
            username: subject.username.to_string(),
            role: subject.role.to_string(),
            token_type,
            jti: Uuid::new_v4().to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager(secret: &str) -> JwtManager {
        JwtManager::new(&JwtConfig {
            secret: secret.to_string(),
            ..JwtConfig::default()
        })
    }

    fn subject() -> Subject<'static> {
        Subject {
            user_id: "user_1",
            username: "alice",
            role: "user",
        }
    }

    #[test]
    fn access_token_round_trips_claims() {
        let jwt = manager("secret");
        let token = jwt.generate_access_token(&subject()).unwrap();
        let claims = jwt.verify(&token).unwrap();

        assert_eq!(claims.user_id, "user_1");
        assert_eq!(claims.sub, "user_1");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.token_type, TokenType::Access);
        assert_eq!(claims.exp - claims.iat, 2 * 60 * 60);
    }

    #[test]
    fn tokens_are_unique_and_typed() {
        let jwt = manager("secret");
        let a = jwt.generate_refresh_token(&subject()).unwrap();
        let b = jwt.generate_refresh_token(&subject()).unwrap();
        assert_ne!(a, b);
        assert_eq!(jwt.verify(&a).unwrap().token_type, TokenType::Refresh);
    }

    #[test]
    fn rejects_foreign_signature() {
        let token = manager("one").generate_access_token(&subject()).unwrap();
        assert!(manager("two").verify(&token).is_err());
    }

    #[test]
    fn rejects_expired_token() {
        let jwt = manager("secret");
        let mut claims = jwt.claims_for(&subject(), TokenType::Access, Duration::hours(1));
        claims.exp = Utc::now().timestamp() - 10;
        let token = jwt.sign(&claims).unwrap();
        assert!(jwt.verify(&token).is_err());
    }
}

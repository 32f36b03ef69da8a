use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::AppError;

pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// 签发和校验无状态令牌，同时持有启动时加载的管理员凭据
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
    admin_username: String,
    admin_password: String,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry: Duration::hours(config.token_expiry_hours as i64),
            admin_username: config.admin_username.clone(),
            admin_password: config.admin_password.clone(),
        }
    }

    /// 用户名或密码任一不符都返回同一个错误
    pub fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        if username.as_bytes() != self.admin_username.as_bytes()
            || password.as_bytes() != self.admin_password.as_bytes()
        {
            tracing::warn!(%username, "login rejected");
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let token = self.issue(username, ADMIN_ROLE)?;
        tracing::info!(%username, "admin logged in");
        Ok(token)
    }

    pub fn issue(&self, username: &str, role: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            username: username.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + self.expiry).timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                AppError::Unauthorized("Invalid or expired JWT token".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_config(secret: &str, expiry_hours: u64) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            token_expiry_hours: expiry_hours,
            admin_username: "admin".to_string(),
            admin_password: "hunter2".to_string(),
        }
    }

    #[test]
    fn test_login_issues_admin_token() {
        let service = TokenService::new(&auth_config("test_secret", 1));
        let token = service.login("admin", "hunter2").unwrap();

        let claims = service.validate(&token).unwrap();
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.role, ADMIN_ROLE);
        assert!(claims.is_admin());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_login_rejects_wrong_password_and_unknown_user_alike() {
        let service = TokenService::new(&auth_config("test_secret", 1));

        let wrong_password = service.login("admin", "nope").unwrap_err();
        let unknown_user = service.login("root", "hunter2").unwrap_err();

        assert!(matches!(wrong_password, AppError::Unauthorized(_)));
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let issuer = TokenService::new(&auth_config("secret_a", 1));
        let verifier = TokenService::new(&auth_config("secret_b", 1));

        let token = issuer.issue("admin", ADMIN_ROLE).unwrap();
        assert!(matches!(verifier.validate(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = TokenService::new(&auth_config("test_secret", 0));
        let token = service.issue("admin", ADMIN_ROLE).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(1100));
        assert!(matches!(service.validate(&token), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let service = TokenService::new(&auth_config("test_secret", 1));
        assert!(service.validate("not.a.jwt").is_err());
    }

    #[test]
    fn test_non_admin_role_preserved() {
        let service = TokenService::new(&auth_config("test_secret", 1));
        let token = service.issue("viewer", "viewer").unwrap();
        let claims = service.validate(&token).unwrap();
        assert!(!claims.is_admin());
    }
}

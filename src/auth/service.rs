//! 认证业务服务

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use super::blacklist::TokenBlacklist;
use super::jwt::{Claims, JwtManager, Subject, TokenType};
use super::model::{
    AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, TokenPair, User,
    DEFAULT_ROLE, STATUS_ACTIVE,
};
use crate::core::{error::CoreError, id::new_id};
use crate::infrastructure::config::AuthConfig;
use crate::rbac::{model::ADMIN_ROLE, service::RbacService};
use crate::store::{PlatformStore, StoreError};

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn PlatformStore>,
    jwt: Arc<JwtManager>,
    blacklist: TokenBlacklist,
    rbac: RbacService,
    bcrypt_cost: u32,
    admin_usernames: Arc<Vec<String>>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn PlatformStore>,
        jwt: Arc<JwtManager>,
        blacklist: TokenBlacklist,
        rbac: RbacService,
        config: &AuthConfig,
    ) -> Self {
        Self {
            store,
            jwt,
            blacklist,
            rbac,
            bcrypt_cost: config.bcrypt_cost,
            admin_usernames: Arc::new(config.admin_usernames.clone()),
        }
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<User, CoreError> {
        let username = req.username.trim().to_string();
        let email = req.email.trim().to_string();
        if self.store.user_exists(&username, &email).await? {
            return Err(CoreError::conflict("user already exists"));
        }

        let password_hash = self.hash_password(req.password).await?;

        let now = Utc::now();
        let user = User {
            id: new_id("user"),
            username,
            email,
            phone: req.phone,
            password_hash,
            real_name: req.real_name,
            role: DEFAULT_ROLE.to_string(),
            status: STATUS_ACTIVE.to_string(),
            created_at: now,
            updated_at: now,
        };
        match self.store.insert_user(&user).await {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => return Err(CoreError::conflict("user already exists")),
            Err(err) => return Err(err.into()),
        }

        // 账号已创建，授权失败只记录日志，之后可经 RBAC 接口补授
        if let Err(err) = self.rbac.grant_role(&user.id, &user.role).await {
            warn!(user_id = %user.id, role = %user.role, error = %err, "注册时授予角色失败");
        }
        if self.admin_usernames.iter().any(|name| name == &user.username) {
            if let Err(err) = self.rbac.grant_role(&user.id, ADMIN_ROLE).await {
                warn!(user_id = %user.id, role = ADMIN_ROLE, error = %err, "注册时授予角色失败");
            }
        }

        info!(user_id = %user.id, username = %user.username, "用户注册成功");
        Ok(user)
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse, CoreError> {
        let invalid = || CoreError::unauthorized("invalid username or password");
        let user = self
            .store
            .find_user_by_username(req.username.trim())
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(req.password, user.password_hash.clone()).await? {
            warn!(username = %user.username, "登录失败：密码错误");
            return Err(invalid());
        }
        if !user.is_active() {
            return Err(CoreError::forbidden("user is not active"));
        }

        let tokens = self.issue_tokens(&user)?;
        info!(user_id = %user.id, "用户登录成功");
        Ok(AuthResponse {
            user,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        })
    }

    pub async fn get_user_info(&self, user_id: &str) -> Result<User, CoreError> {
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("user not found"))
    }

    /// 旧密码不匹配返回 401，已签发的令牌不受影响
    pub async fn change_password(
        &self,
        user_id: &str,
        req: ChangePasswordRequest,
    ) -> Result<(), CoreError> {
        let user = self.get_user_info(user_id).await?;
        if !verify_password(req.old_password, user.password_hash).await? {
            warn!(user_id, "修改密码失败：旧密码错误");
            return Err(CoreError::unauthorized("invalid old password"));
        }

        let password_hash = self.hash_password(req.new_password).await?;
        self.store
            .update_password_hash(user_id, &password_hash, Utc::now())
            .await?;
        info!(user_id, "用户密码已修改");
        Ok(())
    }

    /// 令牌加入黑名单直到其自然过期
    pub async fn logout(&self, token: &str) -> Result<(), CoreError> {
        let claims = self
            .jwt
            .verify(token)
            .map_err(|_| CoreError::unauthorized("invalid token"))?;
        self.blacklist.revoke(token, claims.exp).await;
        info!(user_id = %claims.user_id, "用户已登出");
        Ok(())
    }

    /// 轮换令牌对，旧的刷新令牌随即失效
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, CoreError> {
        if self.blacklist.is_revoked(refresh_token).await {
            return Err(CoreError::unauthorized("token is invalid"));
        }
        let claims = self
            .jwt
            .verify(refresh_token)
            .map_err(|_| CoreError::unauthorized("invalid refresh token"))?;
        if claims.token_type != TokenType::Refresh {
            return Err(CoreError::unauthorized("invalid refresh token"));
        }

        let user = self
            .store
            .get_user(&claims.user_id)
            .await?
            .ok_or_else(|| CoreError::unauthorized("user not found"))?;
        if !user.is_active() {
            return Err(CoreError::forbidden("user is not active"));
        }

        let tokens = self.issue_tokens(&user)?;
        self.blacklist.revoke(refresh_token, claims.exp).await;
        Ok(tokens)
    }

    /// 校验访问令牌，供认证中间件使用
    pub async fn authenticate(&self, token: &str) -> Result<Claims, CoreError> {
        if self.blacklist.is_revoked(token).await {
            return Err(CoreError::unauthorized("token is invalid"));
        }
        match self.jwt.verify(token) {
            Ok(claims) if claims.token_type == TokenType::Access => Ok(claims),
            _ => Err(CoreError::unauthorized("invalid token")),
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, CoreError> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| CoreError::internal("failed to hash password", e))?
            .map_err(|e| CoreError::internal("failed to hash password", e))
    }

    fn issue_tokens(&self, user: &User) -> Result<TokenPair, CoreError> {
        let subject = Subject {
            user_id: &user.id,
            username: &user.username,
            role: &user.role,
        };
        let access_token = self
            .jwt
            .generate_access_token(&subject)
            .map_err(|e| CoreError::internal("failed to generate access token", e))?;
        let refresh_token = self
            .jwt
            .generate_refresh_token(&subject)
            .map_err(|e| CoreError::internal("failed to generate refresh token", e))?;
        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}

/// 哈希格式无法解析时按不匹配处理
async fn verify_password(password: String, hash: String) -> Result<bool, CoreError> {
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| CoreError::internal("failed to verify password", e))?
        .unwrap_or(false);
    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::config::JwtConfig;
    use crate::store::memory::InMemoryStore;

    async fn service(admins: &[&str]) -> (AuthService, RbacService) {
        let store: Arc<dyn PlatformStore> = Arc::new(InMemoryStore::new());
        let rbac = RbacService::new(store.clone());
        rbac.ensure_defaults().await.unwrap();
        let auth = AuthService::new(
            store,
            Arc::new(JwtManager::new(&JwtConfig::default())),
            TokenBlacklist::new(),
            rbac.clone(),
            &AuthConfig {
                bcrypt_cost: 4,
                admin_usernames: admins.iter().map(|s| s.to_string()).collect(),
            },
        );
        (auth, rbac)
    }

    fn register_req(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: "secret123".to_string(),
            phone: String::new(),
            real_name: String::new(),
        }
    }

    fn login_req(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn register_rejects_duplicates() {
        let (auth, _) = service(&[]).await;
        let user = auth
            .register(register_req("alice", "alice@example.com"))
            .await
            .unwrap();
        assert_eq!(user.role, "user");
        assert_eq!(user.status, "active");
        assert_ne!(user.password_hash, "secret123");

        let dup_name = auth.register(register_req("alice", "other@example.com")).await;
        assert!(matches!(dup_name, Err(CoreError::Conflict(_))));
        let dup_email = auth.register(register_req("bob", "alice@example.com")).await;
        assert!(matches!(dup_email, Err(CoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn configured_admins_receive_admin_role() {
        let (auth, rbac) = service(&["root"]).await;
        let root = auth
            .register(register_req("root", "root@example.com"))
            .await
            .unwrap();
        let plain = auth
            .register(register_req("carol", "carol@example.com"))
            .await
            .unwrap();

        assert!(rbac.check_permission(&root.id, "rbac", "manage").await.unwrap());
        assert!(!rbac.check_permission(&plain.id, "rbac", "manage").await.unwrap());
    }

    #[tokio::test]
    async fn login_checks_password() {
        let (auth, _) = service(&[]).await;
        auth.register(register_req("alice", "alice@example.com"))
            .await
            .unwrap();

        let resp = auth.login(login_req("alice", "secret123")).await.unwrap();
        let claims = auth.authenticate(&resp.access_token).await.unwrap();
        assert_eq!(claims.username, "alice");

        assert!(matches!(
            auth.login(login_req("alice", "wrong-pass")).await,
            Err(CoreError::Unauthorized(_))
        ));
        assert!(matches!(
            auth.login(login_req("nobody", "secret123")).await,
            Err(CoreError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn logout_blacklists_token() {
        let (auth, _) = service(&[]).await;
        auth.register(register_req("alice", "alice@example.com"))
            .await
            .unwrap();
        let resp = auth.login(login_req("alice", "secret123")).await.unwrap();

        auth.logout(&resp.access_token).await.unwrap();
        match auth.authenticate(&resp.access_token).await {
            Err(CoreError::Unauthorized(msg)) => assert_eq!(msg, "token is invalid"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            auth.logout("garbage").await,
            Err(CoreError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn refresh_rotates_and_rejects_access_tokens() {
        let (auth, _) = service(&[]).await;
        auth.register(register_req("alice", "alice@example.com"))
            .await
            .unwrap();
        let resp = auth.login(login_req("alice", "secret123")).await.unwrap();

        assert!(auth.refresh(&resp.access_token).await.is_err());
        assert!(auth.authenticate(&resp.refresh_token).await.is_err());

        let pair = auth.refresh(&resp.refresh_token).await.unwrap();
        let claims = auth.authenticate(&pair.access_token).await.unwrap();
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, "user");

        assert!(auth.refresh(&resp.refresh_token).await.is_err());
        assert!(auth.refresh(&pair.refresh_token).await.is_ok());
    }

    #[tokio::test]
    async fn change_password_requires_old_password() {
        let (auth, _) = service(&[]).await;
        let user = auth
            .register(register_req("alice", "alice@example.com"))
            .await
            .unwrap();
        let change = |old: &str, new: &str| ChangePasswordRequest {
            old_password: old.to_string(),
            new_password: new.to_string(),
        };

        match auth.change_password(&user.id, change("wrong-pass", "fresh-pass")).await {
            Err(CoreError::Unauthorized(msg)) => assert_eq!(msg, "invalid old password"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(auth.login(login_req("alice", "secret123")).await.is_ok());

        auth.change_password(&user.id, change("secret123", "fresh-pass"))
            .await
            .unwrap();
        assert!(matches!(
            auth.login(login_req("alice", "secret123")).await,
            Err(CoreError::Unauthorized(_))
        ));
        let resp = auth.login(login_req("alice", "fresh-pass")).await.unwrap();
        assert_eq!(resp.user.id, user.id);

        assert!(matches!(
            auth.change_password("user_missing", change("x", "fresh-pass")).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn register_keeps_account_when_role_grant_fails() {
        let store = Arc::new(InMemoryStore::new());
        let rbac = RbacService::new(store.clone());
        let auth = AuthService::new(
            store.clone(),
            Arc::new(JwtManager::new(&JwtConfig::default())),
            TokenBlacklist::new(),
            rbac.clone(),
            &AuthConfig {
                bcrypt_cost: 4,
                admin_usernames: vec!["root".to_string()],
            },
        );
        store.reject_user_roles().await;

        let user = auth
            .register(register_req("root", "root@example.com"))
            .await
            .unwrap();
        assert!(rbac.get_user_roles(&user.id).await.unwrap().is_empty());
        assert!(auth.login(login_req("root", "secret123")).await.is_ok());
    }
}

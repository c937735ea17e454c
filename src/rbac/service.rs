//! RBAC 业务服务

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use super::model::{
    CreatePermissionRequest, CreateRoleRequest, Permission, Role, RolePermission, UserRole,
    ADMIN_ROLE, RBAC_MANAGE, RBAC_RESOURCE,
};
use crate::auth::jwt::Claims;
use crate::auth::model::DEFAULT_ROLE;
use crate::core::{error::CoreError, id::new_id};
use crate::store::{PlatformStore, StoreError};

#[derive(Clone)]
pub struct RbacService {
    store: Arc<dyn PlatformStore>,
}

impl RbacService {
    pub fn new(store: Arc<dyn PlatformStore>) -> Self {
        Self { store }
    }

    pub async fn create_permission(
        &self,
        req: CreatePermissionRequest,
    ) -> Result<Permission, CoreError> {
        let permission = Permission {
            id: new_id("perm"),
            name: req.name.trim().to_string(),
            resource: req.resource.trim().to_string(),
            action: req.action.trim().to_string(),
            description: req.description,
            created_at: Utc::now(),
        };
        match self.store.insert_rbac_permission(&permission).await {
            Ok(()) => Ok(permission),
            Err(StoreError::Conflict(_)) => Err(CoreError::conflict("permission already exists")),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get_permission_by_name(&self, name: &str) -> Result<Permission, CoreError> {
        self.store
            .find_rbac_permission_by_name(name)
            .await?
            .ok_or_else(|| CoreError::not_found("permission not found"))
    }

    pub async fn create_role(&self, req: CreateRoleRequest) -> Result<Role, CoreError> {
        let role = Role {
            id: new_id("role"),
            name: req.name.trim().to_string(),
            description: req.description,
            created_at: Utc::now(),
        };
        match self.store.insert_role(&role).await {
            Ok(()) => Ok(role),
            Err(StoreError::Conflict(_)) => Err(CoreError::conflict("role already exists")),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get_role_by_name(&self, name: &str) -> Result<Role, CoreError> {
        self.store
            .find_role_by_name(name)
            .await?
            .ok_or_else(|| CoreError::not_found("role not found"))
    }

    /// 重复授权直接返回已有记录
    pub async fn assign_permission_to_role(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> Result<RolePermission, CoreError> {
        self.store
            .get_role(role_id)
            .await?
            .ok_or_else(|| CoreError::not_found("role not found"))?;
        self.store
            .get_rbac_permission(permission_id)
            .await?
            .ok_or_else(|| CoreError::not_found("permission not found"))?;

        if let Some(existing) = self.store.find_role_permission(role_id, permission_id).await? {
            return Ok(existing);
        }

        let link = RolePermission {
            id: new_id("rp"),
            role_id: role_id.to_string(),
            permission_id: permission_id.to_string(),
            created_at: Utc::now(),
        };
        self.store.insert_role_permission(&link).await?;
        info!(role_id, permission_id, "权限已授予角色");
        Ok(link)
    }

    pub async fn assign_role_to_user(
        &self,
        user_id: &str,
        role_id: &str,
    ) -> Result<UserRole, CoreError> {
        let role = self
            .store
            .get_role(role_id)
            .await?
            .ok_or_else(|| CoreError::not_found("role not found"))?;
        self.store
            .get_user(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("user not found"))?;
        self.grant_role(user_id, &role.name).await
    }

    /// 按角色名授予，已存在时返回原记录
    pub(crate) async fn grant_role(
        &self,
        user_id: &str,
        role_name: &str,
    ) -> Result<UserRole, CoreError> {
        let roles = self.store.list_user_roles(user_id).await?;
        if let Some(existing) = roles.into_iter().find(|r| r.role == role_name) {
            return Ok(existing);
        }
        let user_role = UserRole {
            id: new_id("ur"),
            user_id: user_id.to_string(),
            role: role_name.to_string(),
            created_at: Utc::now(),
        };
        self.store.insert_user_role(&user_role).await?;
        info!(user_id, role = role_name, "角色已授予用户");
        Ok(user_role)
    }

    /// 角色名解析为角色记录，已删除的角色直接跳过
    pub async fn get_user_roles(&self, user_id: &str) -> Result<Vec<Role>, CoreError> {
        let names: Vec<String> = self
            .store
            .list_user_roles(user_id)
            .await?
            .into_iter()
            .map(|r| r.role)
            .collect();
        if names.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.roles_by_names(&names).await?)
    }

    /// 用户 → 角色名 → 角色 ID → 角色权限关联 → 权限 ID → 按资源与动作匹配
    pub async fn check_permission(
        &self,
        user_id: &str,
        resource: &str,
        action: &str,
    ) -> Result<bool, CoreError> {
        let role_names: Vec<String> = self
            .store
            .list_user_roles(user_id)
            .await?
            .into_iter()
            .map(|r| r.role)
            .collect();
        if role_names.is_empty() {
            return Ok(false);
        }

        let role_ids: Vec<String> = self
            .store
            .roles_by_names(&role_names)
            .await?
            .into_iter()
            .map(|r| r.id)
            .collect();
        if role_ids.is_empty() {
            return Ok(false);
        }

        let permission_ids = self.store.role_permission_ids(&role_ids).await?;
        if permission_ids.is_empty() {
            return Ok(false);
        }

        let allowed = self
            .store
            .rbac_permissions_by_ids(&permission_ids)
            .await?
            .iter()
            .any(|p| p.resource == resource && p.action == action);
        debug!(user_id, resource, action, allowed, "RBAC 检查");
        Ok(allowed)
    }

    /// 未认证返回 401，权限不足返回 403
    pub async fn authorize(
        &self,
        claims: Option<&Claims>,
        resource: &str,
        action: &str,
    ) -> Result<(), CoreError> {
        let claims = claims.ok_or_else(|| CoreError::unauthorized("user not authenticated"))?;
        if self
            .check_permission(&claims.user_id, resource, action)
            .await?
        {
            Ok(())
        } else {
            Err(CoreError::forbidden("insufficient permissions"))
        }
    }

    /// 确保内置角色和 `rbac.manage` 权限存在，可重复执行
    pub async fn ensure_defaults(&self) -> Result<(), CoreError> {
        let admin = self.ensure_role(ADMIN_ROLE, "platform administrator").await?;
        self.ensure_role(DEFAULT_ROLE, "regular user").await?;

        let manage = match self.store.find_rbac_permission_by_name("rbac.manage").await? {
            Some(permission) => permission,
            None => {
                self.create_permission(CreatePermissionRequest {
                    name: "rbac.manage".to_string(),
                    resource: RBAC_RESOURCE.to_string(),
                    action: RBAC_MANAGE.to_string(),
                    description: "manage roles and permissions".to_string(),
                })
                .await?
            }
        };
        self.assign_permission_to_role(&admin.id, &manage.id).await?;
        Ok(())
    }

    async fn ensure_role(&self, name: &str, description: &str) -> Result<Role, CoreError> {
        if let Some(role) = self.store.find_role_by_name(name).await? {
            return Ok(role);
        }
        self.create_role(CreateRoleRequest {
            name: name.to_string(),
            description: description.to_string(),
        })
        .await
    }
}

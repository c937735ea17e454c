//! 应用内权限业务服务：权限定义、用户授权和权限检查

use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use super::model::{
    is_valid_permission, AppPermission, AppUserPermission, AssignPermissionRequest,
    CheckPermissionRequest, CreateAppPermissionRequest, RevokePermissionRequest,
    UpdateAppPermissionRequest,
};
use crate::app::{apply, require_application};
use crate::core::{
    error::CoreError,
    id::{actor_or, new_id},
    pagination::Pagination,
    response::PageResponse,
};
use crate::store::{PlatformStore, StoreError};

const DUPLICATE_NAME: &str = "permission with this name already exists in the application";

fn validate_value(permission: &str) -> Result<(), CoreError> {
    if is_valid_permission(permission) {
        Ok(())
    } else {
        Err(CoreError::bad_request("invalid permission"))
    }
}

fn conflict_as_duplicate(err: StoreError) -> CoreError {
    match err {
        StoreError::Conflict(_) => CoreError::conflict(DUPLICATE_NAME),
        other => other.into(),
    }
}

/// 写入冲突后仍读不到记录，说明授权已被并发收回
fn concurrent_grant(
    existing: Option<AppUserPermission>,
) -> Result<AppUserPermission, CoreError> {
    existing.ok_or_else(|| CoreError::conflict("permission assignment changed concurrently"))
}

#[derive(Clone)]
pub struct AppPermissionService {
    store: Arc<dyn PlatformStore>,
}

impl AppPermissionService {
    pub fn new(store: Arc<dyn PlatformStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        req: CreateAppPermissionRequest,
        actor: &str,
    ) -> Result<AppPermission, CoreError> {
        validate_value(&req.permission)?;
        require_application(self.store.as_ref(), &req.app_id).await?;
        if self
            .store
            .find_app_permission_by_name(&req.app_id, &req.name)
            .await?
            .is_some()
        {
            return Err(CoreError::conflict(DUPLICATE_NAME));
        }

        let now = Utc::now();
        let permission = AppPermission {
            id: new_id("aperm"),
            app_id: req.app_id,
            name: req.name,
            description: req.description,
            permission: req.permission,
            created_by: actor_or(req.created_by, actor),
            created_at: now,
            updated_at: now,
        };
        self.store
            .insert_app_permission(&permission)
            .await
            .map_err(conflict_as_duplicate)?;
        info!(permission_id = %permission.id, app_id = %permission.app_id, "应用权限已创建");
        Ok(permission)
    }

    pub async fn get(&self, id: &str) -> Result<AppPermission, CoreError> {
        self.store
            .get_app_permission(id)
            .await?
            .ok_or_else(|| CoreError::not_found("application permission not found"))
    }

    pub async fn update(
        &self,
        id: &str,
        req: UpdateAppPermissionRequest,
    ) -> Result<AppPermission, CoreError> {
        let mut permission = self.get(id).await?;
        if let Some(value) = req.permission.as_deref().filter(|v| !v.is_empty()) {
            validate_value(value)?;
        }

        apply(&mut permission.name, req.name);
        apply(&mut permission.description, req.description);
        apply(&mut permission.permission, req.permission);
        permission.updated_at = Utc::now();

        self.store
            .update_app_permission(&permission)
            .await
            .map_err(conflict_as_duplicate)?;
        Ok(permission)
    }

    /// 同时收回该权限的全部用户授权
    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.get(id).await?;
        self.store.delete_app_permission(id).await?;
        info!(permission_id = %id, "应用权限已删除");
        Ok(())
    }

    pub async fn list(
        &self,
        app_id: &str,
        pagination: Pagination,
    ) -> Result<PageResponse<AppPermission>, CoreError> {
        let (items, total) = self.store.list_app_permissions(app_id, pagination).await?;
        Ok(PageResponse::new(items, total, pagination))
    }

    /// 给用户授予应用权限，重复授予直接返回已有记录
    pub async fn assign(
        &self,
        req: AssignPermissionRequest,
        actor: &str,
    ) -> Result<AppUserPermission, CoreError> {
        let permission = self.get(&req.permission_id).await?;
        if permission.app_id != req.app_id {
            return Err(CoreError::bad_request(
                "application permission does not belong to the specified application",
            ));
        }

        if let Some(existing) = self
            .store
            .find_user_permission(&req.app_id, &req.user_id, &req.permission_id)
            .await?
        {
            return Ok(existing);
        }

        let grant = AppUserPermission {
            id: new_id("aup"),
            app_id: req.app_id,
            user_id: req.user_id,
            permission_id: req.permission_id,
            assigned_by: actor_or(req.assigned_by, actor),
            created_at: Utc::now(),
        };
        match self.store.insert_user_permission(&grant).await {
            Ok(()) => {}
            // 并发授予时以先写入的记录为准
            Err(StoreError::Conflict(_)) => {
                let existing = self
                    .store
                    .find_user_permission(&grant.app_id, &grant.user_id, &grant.permission_id)
                    .await?;
                return concurrent_grant(existing);
            }
            Err(err) => return Err(err.into()),
        }
        info!(
            app_id = %grant.app_id,
            user_id = %grant.user_id,
            permission_id = %grant.permission_id,
            "应用权限已授予"
        );
        Ok(grant)
    }

    /// 不存在的授权视为已收回
    pub async fn revoke(&self, req: RevokePermissionRequest) -> Result<(), CoreError> {
        let Some(grant) = self
            .store
            .find_user_permission(&req.app_id, &req.user_id, &req.permission_id)
            .await?
        else {
            debug!(app_id = %req.app_id, user_id = %req.user_id, "授权不存在，无需收回");
            return Ok(());
        };

        match self.store.delete_user_permission(&grant.id).await {
            Ok(()) | Err(StoreError::NotFound(_)) => {}
            Err(err) => return Err(err.into()),
        }
        info!(app_id = %req.app_id, user_id = %req.user_id, permission_id = %req.permission_id, "应用权限已收回");
        Ok(())
    }

    pub async fn list_user_permissions(
        &self,
        app_id: &str,
        user_id: &str,
    ) -> Result<Vec<AppPermission>, CoreError> {
        let grants = self.store.list_user_permissions(app_id, user_id).await?;
        if grants.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = grants.into_iter().map(|g| g.permission_id).collect();
        Ok(self.store.app_permissions_by_ids(&ids).await?)
    }

    pub async fn check(&self, req: CheckPermissionRequest) -> Result<bool, CoreError> {
        validate_value(&req.permission)?;

        let grants = self
            .store
            .list_user_permissions(&req.app_id, &req.user_id)
            .await?;
        if grants.is_empty() {
            return Ok(false);
        }

        let candidates = self
            .store
            .find_app_permissions_by_value(&req.app_id, &req.permission)
            .await?;
        if candidates.is_empty() {
            return Ok(false);
        }

        let granted: HashSet<&str> = grants.iter().map(|g| g.permission_id.as_str()).collect();
        Ok(candidates.iter().any(|p| granted.contains(p.id.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::application::model::Application;
    use crate::store::{memory::InMemoryStore, ApplicationStore};

    async fn service() -> AppPermissionService {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        for id in ["app_1", "app_2"] {
            store
                .insert_application(&Application {
                    id: id.into(),
                    team_id: "team_1".into(),
                    name: id.into(),
                    description: String::new(),
                    app_type: "form".into(),
                    config: String::new(),
                    is_active: true,
                    created_by: "user_1".into(),
                    created_at: now,
                    updated_at: now,
                })
                .await
                .unwrap();
        }
        AppPermissionService::new(store)
    }

    fn create_req(app_id: &str, name: &str, permission: &str) -> CreateAppPermissionRequest {
        CreateAppPermissionRequest {
            app_id: app_id.into(),
            name: name.into(),
            description: String::new(),
            permission: permission.into(),
            created_by: None,
        }
    }

    fn assign_req(app_id: &str, user_id: &str, permission_id: &str) -> AssignPermissionRequest {
        AssignPermissionRequest {
            app_id: app_id.into(),
            user_id: user_id.into(),
            permission_id: permission_id.into(),
            assigned_by: None,
        }
    }

    fn check_req(user_id: &str, permission: &str) -> CheckPermissionRequest {
        CheckPermissionRequest {
            app_id: "app_1".into(),
            user_id: user_id.into(),
            permission: permission.into(),
        }
    }

    #[tokio::test]
    async fn create_validates_value_and_name() {
        let perms = service().await;
        match perms.create(create_req("app_1", "editors", "own"), "u").await {
            Err(CoreError::BadRequest(msg)) => assert_eq!(msg, "invalid permission"),
            other => panic!("unexpected: {other:?}"),
        }

        perms
            .create(create_req("app_1", "editors", "write"), "u")
            .await
            .unwrap();
        match perms.create(create_req("app_1", "editors", "read"), "u").await {
            Err(CoreError::Conflict(msg)) => assert_eq!(msg, DUPLICATE_NAME),
            other => panic!("unexpected: {other:?}"),
        }
        // 名称只在应用内唯一
        perms
            .create(create_req("app_2", "editors", "write"), "u")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn assign_is_idempotent_and_scoped_to_app() {
        let perms = service().await;
        let write = perms
            .create(create_req("app_1", "editors", "write"), "u")
            .await
            .unwrap();

        let first = perms
            .assign(assign_req("app_1", "user_7", &write.id), "admin_1")
            .await
            .unwrap();
        assert_eq!(first.assigned_by, "admin_1");
        let second = perms
            .assign(assign_req("app_1", "user_7", &write.id), "admin_2")
            .await
            .unwrap();
        assert_eq!(first.id, second.id);

        assert!(matches!(
            perms.assign(assign_req("app_2", "user_7", &write.id), "u").await,
            Err(CoreError::BadRequest(_))
        ));
        assert!(matches!(
            perms.assign(assign_req("app_1", "user_7", "ap_missing"), "u").await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn check_follows_assignments() {
        let perms = service().await;
        let write = perms
            .create(create_req("app_1", "editors", "write"), "u")
            .await
            .unwrap();
        perms
            .create(create_req("app_1", "readers", "read"), "u")
            .await
            .unwrap();

        assert!(!perms.check(check_req("user_7", "write")).await.unwrap());

        perms
            .assign(assign_req("app_1", "user_7", &write.id), "u")
            .await
            .unwrap();
        assert!(perms.check(check_req("user_7", "write")).await.unwrap());
        assert!(!perms.check(check_req("user_7", "read")).await.unwrap());
        assert!(!perms.check(check_req("user_7", "delete")).await.unwrap());
        assert!(matches!(
            perms.check(check_req("user_7", "own")).await,
            Err(CoreError::BadRequest(_))
        ));

        let listed = perms.list_user_permissions("app_1", "user_7").await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, write.id);

        let revoke = || RevokePermissionRequest {
            app_id: "app_1".into(),
            user_id: "user_7".into(),
            permission_id: write.id.clone(),
        };
        perms.revoke(revoke()).await.unwrap();
        perms.revoke(revoke()).await.unwrap();
        assert!(!perms.check(check_req("user_7", "write")).await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_grants() {
        let perms = service().await;
        let write = perms
            .create(create_req("app_1", "editors", "write"), "u")
            .await
            .unwrap();
        perms
            .assign(assign_req("app_1", "user_7", &write.id), "u")
            .await
            .unwrap();

        perms.delete(&write.id).await.unwrap();
        assert!(perms
            .list_user_permissions("app_1", "user_7")
            .await
            .unwrap()
            .is_empty());
        assert!(matches!(perms.get(&write.id).await, Err(CoreError::NotFound(_))));
    }

    #[test]
    fn conflicting_grant_without_record_is_not_reported_as_success() {
        match concurrent_grant(None) {
            Err(CoreError::Conflict(msg)) => {
                assert_eq!(msg, "permission assignment changed concurrently")
            }
            other => panic!("unexpected: {other:?}"),
        }

        let grant = AppUserPermission {
            id: "aup_1".into(),
            app_id: "app_1".into(),
            user_id: "user_7".into(),
            permission_id: "aperm_1".into(),
            assigned_by: "admin_1".into(),
            created_at: Utc::now(),
        };
        assert_eq!(concurrent_grant(Some(grant.clone())).unwrap().id, grant.id);
    }
}

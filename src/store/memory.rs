//! 内存存储实现
//!
//! 所有表放在同一个 `tokio::sync::RwLock` 后面，写操作串行、读操作并发。
//! 数据不持久化，进程重启即丢失。唯一约束与 Postgres 表结构保持一致，
//! 便于测试覆盖冲突路径。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{
    AppPermissionStore, ApplicationStore, BatchQrCodeStore, DataCollectionStore, FormDesignStore,
    FormStore, HealthCheck, Page, QrCodeStore, RbacStore, StoreError, StoreResult, UserStore,
};
use crate::app::app_permission::model::{AppPermission, AppUserPermission};
use crate::app::application::model::Application;
use crate::app::batch_qrcode::model::{BatchQrCode, BatchStatus};
use crate::app::data_collection::model::{DataCollection, DataEntry};
use crate::app::form::model::{Form, FormDataEntry};
use crate::app::form_design::model::FormDesign;
use crate::app::qrcode::model::QrCode;
use crate::auth::model::User;
use crate::core::pagination::Pagination;
use crate::rbac::model::{Permission, Role, RolePermission, UserRole};

/// 内存表中的行
trait Row: Clone {
    fn id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
}

macro_rules! impl_row {
    ($($ty:ty),* $(,)?) => {
        $(impl Row for $ty {
            fn id(&self) -> &str {
                &self.id
            }

            fn created_at(&self) -> DateTime<Utc> {
                self.created_at
            }
        })*
    };
}

impl_row!(
    Application,
    QrCode,
    BatchQrCode,
    Form,
    FormDataEntry,
    FormDesign,
    DataCollection,
    DataEntry,
    AppPermission,
    AppUserPermission,
    User,
    Role,
    Permission,
    RolePermission,
    UserRole,
);

fn find<T: Row>(rows: &[T], id: &str) -> Option<T> {
    rows.iter().find(|row| row.id() == id).cloned()
}

fn replace<T: Row>(rows: &mut [T], row: &T, what: &str) -> StoreResult<()> {
    match rows.iter_mut().find(|existing| existing.id() == row.id()) {
        Some(existing) => {
            *existing = row.clone();
            Ok(())
        }
        None => Err(StoreError::NotFound(what.to_string())),
    }
}

fn remove<T: Row>(rows: &mut Vec<T>, id: &str, what: &str) -> StoreResult<()> {
    let before = rows.len();
    rows.retain(|row| row.id() != id);
    if rows.len() == before {
        return Err(StoreError::NotFound(what.to_string()));
    }
    Ok(())
}

/// 按创建时间倒序分页，时间相同的后插入者在前
fn newest_first<'a, T: Row + 'a>(
    rows: impl DoubleEndedIterator<Item = &'a T>,
    page: Pagination,
) -> Page<T> {
    let mut rows: Vec<T> = rows.rev().cloned().collect();
    rows.sort_by_key(|row| std::cmp::Reverse(row.created_at()));
    let total = rows.len() as i64;
    (page.slice(&rows), total)
}

#[derive(Default)]
struct Tables {
    applications: Vec<Application>,
    qrcodes: Vec<QrCode>,
    batches: Vec<BatchQrCode>,
    forms: Vec<Form>,
    form_entries: Vec<FormDataEntry>,
    form_designs: Vec<FormDesign>,
    collections: Vec<DataCollection>,
    data_entries: Vec<DataEntry>,
    app_permissions: Vec<AppPermission>,
    user_permissions: Vec<AppUserPermission>,
    users: Vec<User>,
    roles: Vec<Role>,
    permissions: Vec<Permission>,
    role_permissions: Vec<RolePermission>,
    user_roles: Vec<UserRole>,
    #[cfg(test)]
    reject_user_roles: bool,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 之后的用户角色写入全部失败
    #[cfg(test)]
    pub(crate) async fn reject_user_roles(&self) {
        self.tables.write().await.reject_user_roles = true;
    }
}

#[async_trait]
impl ApplicationStore for InMemoryStore {
    async fn insert_application(&self, app: &Application) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .applications
            .iter()
            .any(|a| a.team_id == app.team_id && a.name == app.name)
        {
            return Err(StoreError::Conflict("application name".into()));
        }
        tables.applications.push(app.clone());
        Ok(())
    }

    async fn get_application(&self, id: &str) -> StoreResult<Option<Application>> {
        Ok(find(&self.tables.read().await.applications, id))
    }

    async fn find_application_by_name(
        &self,
        team_id: &str,
        name: &str,
    ) -> StoreResult<Option<Application>> {
        let tables = self.tables.read().await;
        Ok(tables
            .applications
            .iter()
            .find(|a| a.team_id == team_id && a.name == name)
            .cloned())
    }

    async fn update_application(&self, app: &Application) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .applications
            .iter()
            .any(|a| a.id != app.id && a.team_id == app.team_id && a.name == app.name)
        {
            return Err(StoreError::Conflict("application name".into()));
        }
        replace(&mut tables.applications, app, "application")
    }

    async fn delete_application(&self, id: &str) -> StoreResult<()> {
        remove(&mut self.tables.write().await.applications, id, "application")
    }

    async fn list_applications(
        &self,
        team_id: &str,
        page: Pagination,
    ) -> StoreResult<Page<Application>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.applications.iter().filter(|a| a.team_id == team_id),
            page,
        ))
    }
}

#[async_trait]
impl QrCodeStore for InMemoryStore {
    async fn insert_qrcode(&self, code: &QrCode) -> StoreResult<()> {
        self.tables.write().await.qrcodes.push(code.clone());
        Ok(())
    }

    async fn insert_qrcodes(&self, codes: &[QrCode]) -> StoreResult<()> {
        self.tables.write().await.qrcodes.extend_from_slice(codes);
        Ok(())
    }

    async fn get_qrcode(&self, id: &str) -> StoreResult<Option<QrCode>> {
        Ok(find(&self.tables.read().await.qrcodes, id))
    }

    async fn update_qrcode(&self, code: &QrCode) -> StoreResult<()> {
        replace(&mut self.tables.write().await.qrcodes, code, "qr code")
    }

    async fn set_qrcode_image_path(&self, id: &str, image_path: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let code = tables
            .qrcodes
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| StoreError::NotFound("qr code".into()))?;
        code.image_path = image_path.to_string();
        code.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_qrcode(&self, id: &str) -> StoreResult<()> {
        remove(&mut self.tables.write().await.qrcodes, id, "qr code")
    }

    async fn list_qrcodes(&self, app_id: &str, page: Pagination) -> StoreResult<Page<QrCode>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.qrcodes.iter().filter(|c| c.app_id == app_id),
            page,
        ))
    }
}

#[async_trait]
impl BatchQrCodeStore for InMemoryStore {
    async fn insert_batch(&self, batch: &BatchQrCode) -> StoreResult<()> {
        self.tables.write().await.batches.push(batch.clone());
        Ok(())
    }

    async fn get_batch(&self, id: &str) -> StoreResult<Option<BatchQrCode>> {
        Ok(find(&self.tables.read().await.batches, id))
    }

    async fn update_batch(&self, batch: &BatchQrCode) -> StoreResult<()> {
        replace(&mut self.tables.write().await.batches, batch, "batch qr code")
    }

    async fn set_batch_status(&self, id: &str, status: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let batch = tables
            .batches
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| StoreError::NotFound("batch qr code".into()))?;
        batch.status = status.to_string();
        batch.updated_at = Utc::now();
        Ok(())
    }

    async fn start_batch_generation(&self, id: &str) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let batch = tables
            .batches
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| StoreError::NotFound("batch qr code".into()))?;
        if batch.is(BatchStatus::Generating) {
            return Ok(false);
        }
        batch.status = BatchStatus::Generating.as_str().to_string();
        batch.updated_at = Utc::now();
        Ok(true)
    }

    async fn delete_batch(&self, id: &str) -> StoreResult<()> {
        remove(&mut self.tables.write().await.batches, id, "batch qr code")
    }

    async fn list_batches(&self, app_id: &str, page: Pagination) -> StoreResult<Page<BatchQrCode>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.batches.iter().filter(|b| b.app_id == app_id),
            page,
        ))
    }
}

#[async_trait]
impl FormStore for InMemoryStore {
    async fn insert_form(&self, form: &Form) -> StoreResult<()> {
        self.tables.write().await.forms.push(form.clone());
        Ok(())
    }

    async fn get_form(&self, id: &str) -> StoreResult<Option<Form>> {
        Ok(find(&self.tables.read().await.forms, id))
    }

    async fn update_form(&self, form: &Form) -> StoreResult<()> {
        replace(&mut self.tables.write().await.forms, form, "form")
    }

    async fn delete_form(&self, id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        remove(&mut tables.forms, id, "form")?;
        tables.form_entries.retain(|e| e.form_id != id);
        Ok(())
    }

    async fn list_forms(&self, app_id: &str, page: Pagination) -> StoreResult<Page<Form>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.forms.iter().filter(|f| f.app_id == app_id),
            page,
        ))
    }

    async fn insert_form_entry(&self, entry: &FormDataEntry) -> StoreResult<()> {
        self.tables.write().await.form_entries.push(entry.clone());
        Ok(())
    }

    async fn list_form_entries(
        &self,
        form_id: &str,
        page: Pagination,
    ) -> StoreResult<Page<FormDataEntry>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.form_entries.iter().filter(|e| e.form_id == form_id),
            page,
        ))
    }
}

#[async_trait]
impl FormDesignStore for InMemoryStore {
    async fn insert_form_design(&self, design: &FormDesign) -> StoreResult<()> {
        self.tables.write().await.form_designs.push(design.clone());
        Ok(())
    }

    async fn get_form_design(&self, id: &str) -> StoreResult<Option<FormDesign>> {
        Ok(find(&self.tables.read().await.form_designs, id))
    }

    async fn update_form_design(&self, design: &FormDesign) -> StoreResult<()> {
        replace(&mut self.tables.write().await.form_designs, design, "form design")
    }

    async fn delete_form_design(&self, id: &str) -> StoreResult<()> {
        remove(&mut self.tables.write().await.form_designs, id, "form design")
    }

    async fn list_form_designs(
        &self,
        app_id: &str,
        page: Pagination,
    ) -> StoreResult<Page<FormDesign>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.form_designs.iter().filter(|d| d.app_id == app_id),
            page,
        ))
    }
}

#[async_trait]
impl DataCollectionStore for InMemoryStore {
    async fn insert_collection(&self, collection: &DataCollection) -> StoreResult<()> {
        self.tables.write().await.collections.push(collection.clone());
        Ok(())
    }

    async fn get_collection(&self, id: &str) -> StoreResult<Option<DataCollection>> {
        Ok(find(&self.tables.read().await.collections, id))
    }

    async fn update_collection(&self, collection: &DataCollection) -> StoreResult<()> {
        replace(
            &mut self.tables.write().await.collections,
            collection,
            "data collection",
        )
    }

    async fn delete_collection(&self, id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        remove(&mut tables.collections, id, "data collection")?;
        tables.data_entries.retain(|e| e.collection_id != id);
        Ok(())
    }

    async fn list_collections(
        &self,
        app_id: &str,
        page: Pagination,
    ) -> StoreResult<Page<DataCollection>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.collections.iter().filter(|c| c.app_id == app_id),
            page,
        ))
    }

    async fn insert_data_entry(&self, entry: &DataEntry) -> StoreResult<()> {
        self.tables.write().await.data_entries.push(entry.clone());
        Ok(())
    }

    async fn list_data_entries(
        &self,
        collection_id: &str,
        page: Pagination,
    ) -> StoreResult<Page<DataEntry>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables
                .data_entries
                .iter()
                .filter(|e| e.collection_id == collection_id),
            page,
        ))
    }

    async fn all_data_entries(&self, collection_id: &str) -> StoreResult<Vec<DataEntry>> {
        let tables = self.tables.read().await;
        let mut entries: Vec<DataEntry> = tables
            .data_entries
            .iter()
            .filter(|e| e.collection_id == collection_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.created_at);
        Ok(entries)
    }
}

#[async_trait]
impl AppPermissionStore for InMemoryStore {
    async fn insert_app_permission(&self, permission: &AppPermission) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .app_permissions
            .iter()
            .any(|p| p.app_id == permission.app_id && p.name == permission.name)
        {
            return Err(StoreError::Conflict("application permission name".into()));
        }
        tables.app_permissions.push(permission.clone());
        Ok(())
    }

    async fn get_app_permission(&self, id: &str) -> StoreResult<Option<AppPermission>> {
        Ok(find(&self.tables.read().await.app_permissions, id))
    }

    async fn find_app_permission_by_name(
        &self,
        app_id: &str,
        name: &str,
    ) -> StoreResult<Option<AppPermission>> {
        let tables = self.tables.read().await;
        Ok(tables
            .app_permissions
            .iter()
            .find(|p| p.app_id == app_id && p.name == name)
            .cloned())
    }

    async fn find_app_permissions_by_value(
        &self,
        app_id: &str,
        permission: &str,
    ) -> StoreResult<Vec<AppPermission>> {
        let tables = self.tables.read().await;
        Ok(tables
            .app_permissions
            .iter()
            .filter(|p| p.app_id == app_id && p.permission == permission)
            .cloned()
            .collect())
    }

    async fn update_app_permission(&self, permission: &AppPermission) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.app_permissions.iter().any(|p| {
            p.id != permission.id && p.app_id == permission.app_id && p.name == permission.name
        }) {
            return Err(StoreError::Conflict("application permission name".into()));
        }
        replace(
            &mut tables.app_permissions,
            permission,
            "application permission",
        )
    }

    async fn delete_app_permission(&self, id: &str) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        remove(&mut tables.app_permissions, id, "application permission")?;
        tables.user_permissions.retain(|g| g.permission_id != id);
        Ok(())
    }

    async fn list_app_permissions(
        &self,
        app_id: &str,
        page: Pagination,
    ) -> StoreResult<Page<AppPermission>> {
        let tables = self.tables.read().await;
        Ok(newest_first(
            tables.app_permissions.iter().filter(|p| p.app_id == app_id),
            page,
        ))
    }

    async fn find_user_permission(
        &self,
        app_id: &str,
        user_id: &str,
        permission_id: &str,
    ) -> StoreResult<Option<AppUserPermission>> {
        let tables = self.tables.read().await;
        Ok(tables
            .user_permissions
            .iter()
            .find(|g| g.app_id == app_id && g.user_id == user_id && g.permission_id == permission_id)
            .cloned())
    }

    async fn insert_user_permission(&self, grant: &AppUserPermission) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.user_permissions.iter().any(|g| {
            g.app_id == grant.app_id
                && g.user_id == grant.user_id
                && g.permission_id == grant.permission_id
        }) {
            return Err(StoreError::Conflict("user permission".into()));
        }
        tables.user_permissions.push(grant.clone());
        Ok(())
    }

    async fn delete_user_permission(&self, id: &str) -> StoreResult<()> {
        remove(&mut self.tables.write().await.user_permissions, id, "user permission")
    }

    async fn list_user_permissions(
        &self,
        app_id: &str,
        user_id: &str,
    ) -> StoreResult<Vec<AppUserPermission>> {
        let tables = self.tables.read().await;
        Ok(tables
            .user_permissions
            .iter()
            .filter(|g| g.app_id == app_id && g.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn app_permissions_by_ids(&self, ids: &[String]) -> StoreResult<Vec<AppPermission>> {
        let tables = self.tables.read().await;
        Ok(tables
            .app_permissions
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(StoreError::Conflict("user".into()));
        }
        tables.users.push(user.clone());
        Ok(())
    }

    async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(find(&self.tables.read().await.users, id))
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn user_exists(&self, username: &str, email: &str) -> StoreResult<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .any(|u| u.username == username || u.email == email))
    }

    async fn update_password_hash(
        &self,
        user_id: &str,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| StoreError::NotFound("user".into()))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = updated_at;
        Ok(())
    }
}

#[async_trait]
impl RbacStore for InMemoryStore {
    async fn insert_role(&self, role: &Role) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.roles.iter().any(|r| r.name == role.name) {
            return Err(StoreError::Conflict("role".into()));
        }
        tables.roles.push(role.clone());
        Ok(())
    }

    async fn get_role(&self, id: &str) -> StoreResult<Option<Role>> {
        Ok(find(&self.tables.read().await.roles, id))
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let tables = self.tables.read().await;
        Ok(tables.roles.iter().find(|r| r.name == name).cloned())
    }

    async fn roles_by_names(&self, names: &[String]) -> StoreResult<Vec<Role>> {
        let tables = self.tables.read().await;
        Ok(tables
            .roles
            .iter()
            .filter(|r| names.contains(&r.name))
            .cloned()
            .collect())
    }

    async fn insert_rbac_permission(&self, permission: &Permission) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables.permissions.iter().any(|p| p.name == permission.name) {
            return Err(StoreError::Conflict("permission".into()));
        }
        tables.permissions.push(permission.clone());
        Ok(())
    }

    async fn get_rbac_permission(&self, id: &str) -> StoreResult<Option<Permission>> {
        Ok(find(&self.tables.read().await.permissions, id))
    }

    async fn find_rbac_permission_by_name(&self, name: &str) -> StoreResult<Option<Permission>> {
        let tables = self.tables.read().await;
        Ok(tables.permissions.iter().find(|p| p.name == name).cloned())
    }

    async fn rbac_permissions_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Permission>> {
        let tables = self.tables.read().await;
        Ok(tables
            .permissions
            .iter()
            .filter(|p| ids.contains(&p.id))
            .cloned()
            .collect())
    }

    async fn find_role_permission(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> StoreResult<Option<RolePermission>> {
        let tables = self.tables.read().await;
        Ok(tables
            .role_permissions
            .iter()
            .find(|l| l.role_id == role_id && l.permission_id == permission_id)
            .cloned())
    }

    async fn insert_role_permission(&self, link: &RolePermission) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if tables
            .role_permissions
            .iter()
            .any(|l| l.role_id == link.role_id && l.permission_id == link.permission_id)
        {
            return Err(StoreError::Conflict("role permission".into()));
        }
        tables.role_permissions.push(link.clone());
        Ok(())
    }

    async fn role_permission_ids(&self, role_ids: &[String]) -> StoreResult<Vec<String>> {
        let tables = self.tables.read().await;
        Ok(tables
            .role_permissions
            .iter()
            .filter(|l| role_ids.contains(&l.role_id))
            .map(|l| l.permission_id.clone())
            .collect())
    }

    async fn insert_user_role(&self, user_role: &UserRole) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        #[cfg(test)]
        if tables.reject_user_roles {
            return Err(anyhow::anyhow!("user role writes disabled").into());
        }
        if tables
            .user_roles
            .iter()
            .any(|ur| ur.user_id == user_role.user_id && ur.role == user_role.role)
        {
            return Err(StoreError::Conflict("user role".into()));
        }
        tables.user_roles.push(user_role.clone());
        Ok(())
    }

    async fn list_user_roles(&self, user_id: &str) -> StoreResult<Vec<UserRole>> {
        let tables = self.tables.read().await;
        Ok(tables
            .user_roles
            .iter()
            .filter(|ur| ur.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl HealthCheck for InMemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::id::new_id;

    fn application(team_id: &str, name: &str) -> Application {
        let now = Utc::now();
        Application {
            id: new_id("app"),
            team_id: team_id.into(),
            name: name.into(),
            description: String::new(),
            app_type: "form".into(),
            config: String::new(),
            is_active: true,
            created_by: "user_1".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn application_names_are_unique_per_team() {
        let store = InMemoryStore::new();
        store
            .insert_application(&application("t1", "crm"))
            .await
            .unwrap();
        store
            .insert_application(&application("t2", "crm"))
            .await
            .unwrap();

        let err = store
            .insert_application(&application("t1", "crm"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn lists_newest_first_with_total() {
        let store = InMemoryStore::new();
        let mut ids = Vec::new();
        for i in 0..5 {
            let app = application("t1", &format!("app-{i}"));
            ids.push(app.id.clone());
            store.insert_application(&app).await.unwrap();
        }

        let (items, total) = store
            .list_applications("t1", Pagination::new(1, 2))
            .await
            .unwrap();
        assert_eq!(total, 5);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, ids[4]);
        assert_eq!(items[1].id, ids[3]);

        let (items, _) = store
            .list_applications("t1", Pagination::new(3, 2))
            .await
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, ids[0]);
    }

    #[tokio::test]
    async fn missing_rows_report_not_found() {
        let store = InMemoryStore::new();
        let app = application("t1", "ghost");
        assert!(matches!(
            store.update_application(&app).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_application(&app.id).await,
            Err(StoreError::NotFound(_))
        ));
    }
}

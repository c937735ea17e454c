//! 存储抽象
//!
//! 每个业务模块对应一个存储 trait，`PlatformStore` 汇总全部 trait。
//! 服务层只依赖 `Arc<dyn PlatformStore>`，内存实现用于测试和无数据库运行，
//! Postgres 实现用于生产。
//!
//! 列表接口统一按 `created_at` 倒序返回一页数据以及总条数。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::app::app_permission::model::{AppPermission, AppUserPermission};
use crate::app::application::model::Application;
use crate::app::batch_qrcode::model::BatchQrCode;
use crate::app::data_collection::model::{DataCollection, DataEntry};
use crate::app::form::model::{Form, FormDataEntry};
use crate::app::form_design::model::FormDesign;
use crate::app::qrcode::model::QrCode;
use crate::auth::model::User;
use crate::core::pagination::Pagination;
use crate::rbac::model::{Permission, Role, RolePermission, UserRole};

pub mod memory;
#[cfg(feature = "database")]
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// 一页数据及总条数
pub type Page<T> = (Vec<T>, i64);

#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert_application(&self, app: &Application) -> StoreResult<()>;
    async fn get_application(&self, id: &str) -> StoreResult<Option<Application>>;
    async fn find_application_by_name(
        &self,
        team_id: &str,
        name: &str,
    ) -> StoreResult<Option<Application>>;
    async fn update_application(&self, app: &Application) -> StoreResult<()>;
    async fn delete_application(&self, id: &str) -> StoreResult<()>;
    async fn list_applications(
        &self,
        team_id: &str,
        page: Pagination,
    ) -> StoreResult<Page<Application>>;
}

#[async_trait]
pub trait QrCodeStore: Send + Sync {
    async fn insert_qrcode(&self, code: &QrCode) -> StoreResult<()>;
    /// 全部插入或全部失败
    async fn insert_qrcodes(&self, codes: &[QrCode]) -> StoreResult<()>;
    async fn get_qrcode(&self, id: &str) -> StoreResult<Option<QrCode>>;
    async fn update_qrcode(&self, code: &QrCode) -> StoreResult<()>;
    async fn set_qrcode_image_path(&self, id: &str, image_path: &str) -> StoreResult<()>;
    async fn delete_qrcode(&self, id: &str) -> StoreResult<()>;
    async fn list_qrcodes(&self, app_id: &str, page: Pagination) -> StoreResult<Page<QrCode>>;
}

#[async_trait]
pub trait BatchQrCodeStore: Send + Sync {
    async fn insert_batch(&self, batch: &BatchQrCode) -> StoreResult<()>;
    async fn get_batch(&self, id: &str) -> StoreResult<Option<BatchQrCode>>;
    async fn update_batch(&self, batch: &BatchQrCode) -> StoreResult<()>;
    async fn set_batch_status(&self, id: &str, status: &str) -> StoreResult<()>;
    /// 原子地切换到 generating，已处于 generating 时返回 `false`
    async fn start_batch_generation(&self, id: &str) -> StoreResult<bool>;
    async fn delete_batch(&self, id: &str) -> StoreResult<()>;
    async fn list_batches(&self, app_id: &str, page: Pagination) -> StoreResult<Page<BatchQrCode>>;
}

#[async_trait]
pub trait FormStore: Send + Sync {
    async fn insert_form(&self, form: &Form) -> StoreResult<()>;
    async fn get_form(&self, id: &str) -> StoreResult<Option<Form>>;
    async fn update_form(&self, form: &Form) -> StoreResult<()>;
    /// 同时删除该表单的提交记录
    async fn delete_form(&self, id: &str) -> StoreResult<()>;
    async fn list_forms(&self, app_id: &str, page: Pagination) -> StoreResult<Page<Form>>;
    async fn insert_form_entry(&self, entry: &FormDataEntry) -> StoreResult<()>;
    async fn list_form_entries(
        &self,
        form_id: &str,
        page: Pagination,
    ) -> StoreResult<Page<FormDataEntry>>;
}

#[async_trait]
pub trait FormDesignStore: Send + Sync {
    async fn insert_form_design(&self, design: &FormDesign) -> StoreResult<()>;
    async fn get_form_design(&self, id: &str) -> StoreResult<Option<FormDesign>>;
    async fn update_form_design(&self, design: &FormDesign) -> StoreResult<()>;
    async fn delete_form_design(&self, id: &str) -> StoreResult<()>;
    async fn list_form_designs(
        &self,
        app_id: &str,
        page: Pagination,
    ) -> StoreResult<Page<FormDesign>>;
}

#[async_trait]
pub trait DataCollectionStore: Send + Sync {
    async fn insert_collection(&self, collection: &DataCollection) -> StoreResult<()>;
    async fn get_collection(&self, id: &str) -> StoreResult<Option<DataCollection>>;
    async fn update_collection(&self, collection: &DataCollection) -> StoreResult<()>;
    /// 同时删除该采集的所有数据条目
    async fn delete_collection(&self, id: &str) -> StoreResult<()>;
    async fn list_collections(
        &self,
        app_id: &str,
        page: Pagination,
    ) -> StoreResult<Page<DataCollection>>;
    async fn insert_data_entry(&self, entry: &DataEntry) -> StoreResult<()>;
    async fn list_data_entries(
        &self,
        collection_id: &str,
        page: Pagination,
    ) -> StoreResult<Page<DataEntry>>;
    /// 按 `created_at` 正序返回全部条目
    async fn all_data_entries(&self, collection_id: &str) -> StoreResult<Vec<DataEntry>>;
}

#[async_trait]
pub trait AppPermissionStore: Send + Sync {
    async fn insert_app_permission(&self, permission: &AppPermission) -> StoreResult<()>;
    async fn get_app_permission(&self, id: &str) -> StoreResult<Option<AppPermission>>;
    async fn find_app_permission_by_name(
        &self,
        app_id: &str,
        name: &str,
    ) -> StoreResult<Option<AppPermission>>;
    /// 应用内携带指定权限值的全部权限记录
    async fn find_app_permissions_by_value(
        &self,
        app_id: &str,
        permission: &str,
    ) -> StoreResult<Vec<AppPermission>>;
    async fn update_app_permission(&self, permission: &AppPermission) -> StoreResult<()>;
    /// 同时删除该权限的所有用户授权
    async fn delete_app_permission(&self, id: &str) -> StoreResult<()>;
    async fn list_app_permissions(
        &self,
        app_id: &str,
        page: Pagination,
    ) -> StoreResult<Page<AppPermission>>;

    async fn find_user_permission(
        &self,
        app_id: &str,
        user_id: &str,
        permission_id: &str,
    ) -> StoreResult<Option<AppUserPermission>>;
    async fn insert_user_permission(&self, grant: &AppUserPermission) -> StoreResult<()>;
    async fn delete_user_permission(&self, id: &str) -> StoreResult<()>;
    async fn list_user_permissions(
        &self,
        app_id: &str,
        user_id: &str,
    ) -> StoreResult<Vec<AppUserPermission>>;
    async fn app_permissions_by_ids(&self, ids: &[String]) -> StoreResult<Vec<AppPermission>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, user: &User) -> StoreResult<()>;
    async fn get_user(&self, id: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn user_exists(&self, username: &str, email: &str) -> StoreResult<bool>;
    async fn update_password_hash(
        &self,
        user_id: &str,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()>;
}

#[async_trait]
pub trait RbacStore: Send + Sync {
    async fn insert_role(&self, role: &Role) -> StoreResult<()>;
    async fn get_role(&self, id: &str) -> StoreResult<Option<Role>>;
    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>>;
    async fn roles_by_names(&self, names: &[String]) -> StoreResult<Vec<Role>>;

    async fn insert_rbac_permission(&self, permission: &Permission) -> StoreResult<()>;
    async fn get_rbac_permission(&self, id: &str) -> StoreResult<Option<Permission>>;
    async fn find_rbac_permission_by_name(&self, name: &str) -> StoreResult<Option<Permission>>;
    async fn rbac_permissions_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Permission>>;

    async fn find_role_permission(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> StoreResult<Option<RolePermission>>;
    async fn insert_role_permission(&self, link: &RolePermission) -> StoreResult<()>;
    async fn role_permission_ids(&self, role_ids: &[String]) -> StoreResult<Vec<String>>;

    async fn insert_user_role(&self, user_role: &UserRole) -> StoreResult<()>;
    async fn list_user_roles(&self, user_id: &str) -> StoreResult<Vec<UserRole>>;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    fn backend(&self) -> &'static str;
    async fn health_check(&self) -> StoreResult<()>;
}

pub trait PlatformStore:
    ApplicationStore
    + QrCodeStore
    + BatchQrCodeStore
    + FormStore
    + FormDesignStore
    + DataCollectionStore
    + AppPermissionStore
    + UserStore
    + RbacStore
    + HealthCheck
{
}

impl<T> PlatformStore for T where
    T: ApplicationStore
        + QrCodeStore
        + BatchQrCodeStore
        + FormStore
        + FormDesignStore
        + DataCollectionStore
        + AppPermissionStore
        + UserStore
        + RbacStore
        + HealthCheck
{
}

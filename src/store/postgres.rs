//! Postgres 存储实现
//!
//! 表结构见 `schema/postgres.sql`。唯一约束冲突映射为 `StoreError::Conflict`，
//! 其余 sqlx 错误包装为 `StoreError::Unexpected`。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

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

const APPLICATION_COLUMNS: &str =
    "id, team_id, name, description, type, config, is_active, created_by, created_at, updated_at";
const QR_CODE_COLUMNS: &str =
    "id, app_id, name, content, type, url, image_path, created_by, created_at, updated_at";
const BATCH_COLUMNS: &str = "id, app_id, name, description, prefix, count, type, url_template, \
     config, status, created_by, created_at, updated_at";
const FORM_COLUMNS: &str =
    "id, app_id, name, description, schema, is_active, created_by, created_at, updated_at";
const FORM_DESIGN_COLUMNS: &str = "id, app_id, name, description, schema, config, is_active, \
     is_published, created_by, created_at, updated_at";
const COLLECTION_COLUMNS: &str =
    "id, app_id, name, description, schema, config, is_active, created_by, created_at, updated_at";
const APP_PERMISSION_COLUMNS: &str =
    "id, app_id, name, description, permission, created_by, created_at, updated_at";
const USER_COLUMNS: &str = "id, username, email, phone, password_hash, real_name, role, status, \
     created_at, updated_at";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unexpected(err.into())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        return db_err.code().map(|code| code == "23505").unwrap_or(false);
    }
    false
}

fn write_error(err: sqlx::Error, what: &str) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::Conflict(what.to_string())
    } else {
        StoreError::Unexpected(err.into())
    }
}

fn expect_one(rows_affected: u64, what: &str) -> StoreResult<()> {
    if rows_affected == 0 {
        return Err(StoreError::NotFound(what.to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `SELECT <columns> FROM <table> WHERE <column> = $1` 的分页版本
    async fn page<T>(
        &self,
        table: &str,
        columns: &str,
        filter_column: &str,
        filter_value: &str,
        page: Pagination,
    ) -> StoreResult<Page<T>>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {table} WHERE {filter_column} = $1"
        ))
        .bind(filter_value)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, T>(&format!(
            "SELECT {columns} FROM {table} WHERE {filter_column} = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        ))
        .bind(filter_value)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((items, total))
    }

    async fn by_id<T>(&self, table: &str, columns: &str, id: &str) -> StoreResult<Option<T>>
    where
        T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
    {
        let row = sqlx::query_as::<_, T>(&format!("SELECT {columns} FROM {table} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete_by_id(&self, table: &str, id: &str, what: &str) -> StoreResult<()> {
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
            .bind(id)
            .execute(&self.pool)
            .await?;
        expect_one(result.rows_affected(), what)
    }
}

#[async_trait]
impl ApplicationStore for PostgresStore {
    async fn insert_application(&self, app: &Application) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO applications (id, team_id, name, description, type, config, is_active, \
             created_by, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&app.id)
        .bind(&app.team_id)
        .bind(&app.name)
        .bind(&app.description)
        .bind(&app.app_type)
        .bind(&app.config)
        .bind(app.is_active)
        .bind(&app.created_by)
        .bind(app.created_at)
        .bind(app.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "application name"))?;
        Ok(())
    }

    async fn get_application(&self, id: &str) -> StoreResult<Option<Application>> {
        self.by_id("applications", APPLICATION_COLUMNS, id).await
    }

    async fn find_application_by_name(
        &self,
        team_id: &str,
        name: &str,
    ) -> StoreResult<Option<Application>> {
        let row = sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE team_id = $1 AND name = $2"
        ))
        .bind(team_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn update_application(&self, app: &Application) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE applications SET name = $2, description = $3, type = $4, config = $5, \
             is_active = $6, updated_at = $7 WHERE id = $1",
        )
        .bind(&app.id)
        .bind(&app.name)
        .bind(&app.description)
        .bind(&app.app_type)
        .bind(&app.config)
        .bind(app.is_active)
        .bind(app.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "application name"))?;
        expect_one(result.rows_affected(), "application")
    }

    async fn delete_application(&self, id: &str) -> StoreResult<()> {
        self.delete_by_id("applications", id, "application").await
    }

    async fn list_applications(
        &self,
        team_id: &str,
        page: Pagination,
    ) -> StoreResult<Page<Application>> {
        self.page("applications", APPLICATION_COLUMNS, "team_id", team_id, page)
            .await
    }
}

#[async_trait]
impl QrCodeStore for PostgresStore {
    async fn insert_qrcode(&self, code: &QrCode) -> StoreResult<()> {
        self.insert_qrcodes(std::slice::from_ref(code)).await
    }

    async fn insert_qrcodes(&self, codes: &[QrCode]) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for code in codes {
            sqlx::query(
                "INSERT INTO qr_codes (id, app_id, name, content, type, url, image_path, \
                 created_by, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
            )
            .bind(&code.id)
            .bind(&code.app_id)
            .bind(&code.name)
            .bind(&code.content)
            .bind(&code.qr_type)
            .bind(&code.url)
            .bind(&code.image_path)
            .bind(&code.created_by)
            .bind(code.created_at)
            .bind(code.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| write_error(e, "qr code"))?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn get_qrcode(&self, id: &str) -> StoreResult<Option<QrCode>> {
        self.by_id("qr_codes", QR_CODE_COLUMNS, id).await
    }

    async fn update_qrcode(&self, code: &QrCode) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE qr_codes SET name = $2, content = $3, type = $4, url = $5, image_path = $6, \
             updated_at = $7 WHERE id = $1",
        )
        .bind(&code.id)
        .bind(&code.name)
        .bind(&code.content)
        .bind(&code.qr_type)
        .bind(&code.url)
        .bind(&code.image_path)
        .bind(code.updated_at)
        .execute(&self.pool)
        .await?;
        expect_one(result.rows_affected(), "qr code")
    }

    async fn set_qrcode_image_path(&self, id: &str, image_path: &str) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE qr_codes SET image_path = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(image_path)
                .execute(&self.pool)
                .await?;
        expect_one(result.rows_affected(), "qr code")
    }

    async fn delete_qrcode(&self, id: &str) -> StoreResult<()> {
        self.delete_by_id("qr_codes", id, "qr code").await
    }

    async fn list_qrcodes(&self, app_id: &str, page: Pagination) -> StoreResult<Page<QrCode>> {
        self.page("qr_codes", QR_CODE_COLUMNS, "app_id", app_id, page)
            .await
    }
}

#[async_trait]
impl BatchQrCodeStore for PostgresStore {
    async fn insert_batch(&self, batch: &BatchQrCode) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO batch_qr_codes (id, app_id, name, description, prefix, count, type, \
             url_template, config, status, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(&batch.id)
        .bind(&batch.app_id)
        .bind(&batch.name)
        .bind(&batch.description)
        .bind(&batch.prefix)
        .bind(batch.count)
        .bind(&batch.qr_type)
        .bind(&batch.url_template)
        .bind(&batch.config)
        .bind(&batch.status)
        .bind(&batch.created_by)
        .bind(batch.created_at)
        .bind(batch.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "batch qr code"))?;
        Ok(())
    }

    async fn get_batch(&self, id: &str) -> StoreResult<Option<BatchQrCode>> {
        self.by_id("batch_qr_codes", BATCH_COLUMNS, id).await
    }

    async fn update_batch(&self, batch: &BatchQrCode) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE batch_qr_codes SET name = $2, description = $3, prefix = $4, count = $5, \
             type = $6, url_template = $7, config = $8, status = $9, updated_at = $10 WHERE id = $1",
        )
        .bind(&batch.id)
        .bind(&batch.name)
        .bind(&batch.description)
        .bind(&batch.prefix)
        .bind(batch.count)
        .bind(&batch.qr_type)
        .bind(&batch.url_template)
        .bind(&batch.config)
        .bind(&batch.status)
        .bind(batch.updated_at)
        .execute(&self.pool)
        .await?;
        expect_one(result.rows_affected(), "batch qr code")
    }

    async fn set_batch_status(&self, id: &str, status: &str) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE batch_qr_codes SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(status)
                .execute(&self.pool)
                .await?;
        expect_one(result.rows_affected(), "batch qr code")
    }

    async fn start_batch_generation(&self, id: &str) -> StoreResult<bool> {
        let generating = BatchStatus::Generating.as_str();
        let result = sqlx::query(
            "UPDATE batch_qr_codes SET status = $2, updated_at = NOW() \
             WHERE id = $1 AND status <> $2",
        )
        .bind(id)
        .bind(generating)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() > 0 {
            return Ok(true);
        }
        // 未更新时区分任务不存在与正在生成
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM batch_qr_codes WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        if exists {
            Ok(false)
        } else {
            Err(StoreError::NotFound("batch qr code".into()))
        }
    }

    async fn delete_batch(&self, id: &str) -> StoreResult<()> {
        self.delete_by_id("batch_qr_codes", id, "batch qr code").await
    }

    async fn list_batches(&self, app_id: &str, page: Pagination) -> StoreResult<Page<BatchQrCode>> {
        self.page("batch_qr_codes", BATCH_COLUMNS, "app_id", app_id, page)
            .await
    }
}

#[async_trait]
impl FormStore for PostgresStore {
    async fn insert_form(&self, form: &Form) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO forms (id, app_id, name, description, schema, is_active, created_by, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(&form.id)
        .bind(&form.app_id)
        .bind(&form.name)
        .bind(&form.description)
        .bind(&form.schema)
        .bind(form.is_active)
        .bind(&form.created_by)
        .bind(form.created_at)
        .bind(form.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "form"))?;
        Ok(())
    }

    async fn get_form(&self, id: &str) -> StoreResult<Option<Form>> {
        self.by_id("forms", FORM_COLUMNS, id).await
    }

    async fn update_form(&self, form: &Form) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE forms SET name = $2, description = $3, schema = $4, is_active = $5, \
             updated_at = $6 WHERE id = $1",
        )
        .bind(&form.id)
        .bind(&form.name)
        .bind(&form.description)
        .bind(&form.schema)
        .bind(form.is_active)
        .bind(form.updated_at)
        .execute(&self.pool)
        .await?;
        expect_one(result.rows_affected(), "form")
    }

    async fn delete_form(&self, id: &str) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM form_data_entries WHERE form_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM forms WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        expect_one(result.rows_affected(), "form")?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_forms(&self, app_id: &str, page: Pagination) -> StoreResult<Page<Form>> {
        self.page("forms", FORM_COLUMNS, "app_id", app_id, page).await
    }

    async fn insert_form_entry(&self, entry: &FormDataEntry) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO form_data_entries (id, form_id, data, created_by, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&entry.id)
        .bind(&entry.form_id)
        .bind(&entry.data)
        .bind(&entry.created_by)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "form data entry"))?;
        Ok(())
    }

    async fn list_form_entries(
        &self,
        form_id: &str,
        page: Pagination,
    ) -> StoreResult<Page<FormDataEntry>> {
        self.page(
            "form_data_entries",
            "id, form_id, data, created_by, created_at",
            "form_id",
            form_id,
            page,
        )
        .await
    }
}

#[async_trait]
impl FormDesignStore for PostgresStore {
    async fn insert_form_design(&self, design: &FormDesign) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO form_designs (id, app_id, name, description, schema, config, is_active, \
             is_published, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&design.id)
        .bind(&design.app_id)
        .bind(&design.name)
        .bind(&design.description)
        .bind(&design.schema)
        .bind(&design.config)
        .bind(design.is_active)
        .bind(design.is_published)
        .bind(&design.created_by)
        .bind(design.created_at)
        .bind(design.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "form design"))?;
        Ok(())
    }

    async fn get_form_design(&self, id: &str) -> StoreResult<Option<FormDesign>> {
        self.by_id("form_designs", FORM_DESIGN_COLUMNS, id).await
    }

    async fn update_form_design(&self, design: &FormDesign) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE form_designs SET name = $2, description = $3, schema = $4, config = $5, \
             is_active = $6, is_published = $7, updated_at = $8 WHERE id = $1",
        )
        .bind(&design.id)
        .bind(&design.name)
        .bind(&design.description)
        .bind(&design.schema)
        .bind(&design.config)
        .bind(design.is_active)
        .bind(design.is_published)
        .bind(design.updated_at)
        .execute(&self.pool)
        .await?;
        expect_one(result.rows_affected(), "form design")
    }

    async fn delete_form_design(&self, id: &str) -> StoreResult<()> {
        self.delete_by_id("form_designs", id, "form design").await
    }

    async fn list_form_designs(
        &self,
        app_id: &str,
        page: Pagination,
    ) -> StoreResult<Page<FormDesign>> {
        self.page("form_designs", FORM_DESIGN_COLUMNS, "app_id", app_id, page)
            .await
    }
}

#[async_trait]
impl DataCollectionStore for PostgresStore {
    async fn insert_collection(&self, collection: &DataCollection) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO data_collections (id, app_id, name, description, schema, config, \
             is_active, created_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&collection.id)
        .bind(&collection.app_id)
        .bind(&collection.name)
        .bind(&collection.description)
        .bind(&collection.schema)
        .bind(&collection.config)
        .bind(collection.is_active)
        .bind(&collection.created_by)
        .bind(collection.created_at)
        .bind(collection.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "data collection"))?;
        Ok(())
    }

    async fn get_collection(&self, id: &str) -> StoreResult<Option<DataCollection>> {
        self.by_id("data_collections", COLLECTION_COLUMNS, id).await
    }

    async fn update_collection(&self, collection: &DataCollection) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE data_collections SET name = $2, description = $3, schema = $4, config = $5, \
             is_active = $6, updated_at = $7 WHERE id = $1",
        )
        .bind(&collection.id)
        .bind(&collection.name)
        .bind(&collection.description)
        .bind(&collection.schema)
        .bind(&collection.config)
        .bind(collection.is_active)
        .bind(collection.updated_at)
        .execute(&self.pool)
        .await?;
        expect_one(result.rows_affected(), "data collection")
    }

    async fn delete_collection(&self, id: &str) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM data_entries WHERE collection_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM data_collections WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        expect_one(result.rows_affected(), "data collection")?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_collections(
        &self,
        app_id: &str,
        page: Pagination,
    ) -> StoreResult<Page<DataCollection>> {
        self.page("data_collections", COLLECTION_COLUMNS, "app_id", app_id, page)
            .await
    }

    async fn insert_data_entry(&self, entry: &DataEntry) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO data_entries (id, collection_id, data, created_by, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&entry.id)
        .bind(&entry.collection_id)
        .bind(&entry.data)
        .bind(&entry.created_by)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "data entry"))?;
        Ok(())
    }

    async fn list_data_entries(
        &self,
        collection_id: &str,
        page: Pagination,
    ) -> StoreResult<Page<DataEntry>> {
        self.page(
            "data_entries",
            "id, collection_id, data, created_by, created_at",
            "collection_id",
            collection_id,
            page,
        )
        .await
    }

    async fn all_data_entries(&self, collection_id: &str) -> StoreResult<Vec<DataEntry>> {
        let rows = sqlx::query_as::<_, DataEntry>(
            "SELECT id, collection_id, data, created_by, created_at FROM data_entries \
             WHERE collection_id = $1 ORDER BY created_at ASC",
        )
        .bind(collection_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl AppPermissionStore for PostgresStore {
    async fn insert_app_permission(&self, permission: &AppPermission) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO app_permissions (id, app_id, name, description, permission, created_by, \
             created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&permission.id)
        .bind(&permission.app_id)
        .bind(&permission.name)
        .bind(&permission.description)
        .bind(&permission.permission)
        .bind(&permission.created_by)
        .bind(permission.created_at)
        .bind(permission.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "application permission name"))?;
        Ok(())
    }

    async fn get_app_permission(&self, id: &str) -> StoreResult<Option<AppPermission>> {
        self.by_id("app_permissions", APP_PERMISSION_COLUMNS, id).await
    }

    async fn find_app_permission_by_name(
        &self,
        app_id: &str,
        name: &str,
    ) -> StoreResult<Option<AppPermission>> {
        let row = sqlx::query_as::<_, AppPermission>(&format!(
            "SELECT {APP_PERMISSION_COLUMNS} FROM app_permissions WHERE app_id = $1 AND name = $2"
        ))
        .bind(app_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn find_app_permissions_by_value(
        &self,
        app_id: &str,
        permission: &str,
    ) -> StoreResult<Vec<AppPermission>> {
        let rows = sqlx::query_as::<_, AppPermission>(&format!(
            "SELECT {APP_PERMISSION_COLUMNS} FROM app_permissions \
             WHERE app_id = $1 AND permission = $2"
        ))
        .bind(app_id)
        .bind(permission)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn update_app_permission(&self, permission: &AppPermission) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE app_permissions SET name = $2, description = $3, permission = $4, \
             updated_at = $5 WHERE id = $1",
        )
        .bind(&permission.id)
        .bind(&permission.name)
        .bind(&permission.description)
        .bind(&permission.permission)
        .bind(permission.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "application permission name"))?;
        expect_one(result.rows_affected(), "application permission")
    }

    async fn delete_app_permission(&self, id: &str) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM app_user_permissions WHERE permission_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM app_permissions WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        expect_one(result.rows_affected(), "application permission")?;
        tx.commit().await?;
        Ok(())
    }

    async fn list_app_permissions(
        &self,
        app_id: &str,
        page: Pagination,
    ) -> StoreResult<Page<AppPermission>> {
        self.page("app_permissions", APP_PERMISSION_COLUMNS, "app_id", app_id, page)
            .await
    }

    async fn find_user_permission(
        &self,
        app_id: &str,
        user_id: &str,
        permission_id: &str,
    ) -> StoreResult<Option<AppUserPermission>> {
        let row = sqlx::query_as::<_, AppUserPermission>(
            "SELECT id, app_id, user_id, permission_id, assigned_by, created_at \
             FROM app_user_permissions WHERE app_id = $1 AND user_id = $2 AND permission_id = $3",
        )
        .bind(app_id)
        .bind(user_id)
        .bind(permission_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_user_permission(&self, grant: &AppUserPermission) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO app_user_permissions (id, app_id, user_id, permission_id, assigned_by, \
             created_at) VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&grant.id)
        .bind(&grant.app_id)
        .bind(&grant.user_id)
        .bind(&grant.permission_id)
        .bind(&grant.assigned_by)
        .bind(grant.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "user permission"))?;
        Ok(())
    }

    async fn delete_user_permission(&self, id: &str) -> StoreResult<()> {
        self.delete_by_id("app_user_permissions", id, "user permission")
            .await
    }

    async fn list_user_permissions(
        &self,
        app_id: &str,
        user_id: &str,
    ) -> StoreResult<Vec<AppUserPermission>> {
        let rows = sqlx::query_as::<_, AppUserPermission>(
            "SELECT id, app_id, user_id, permission_id, assigned_by, created_at \
             FROM app_user_permissions WHERE app_id = $1 AND user_id = $2 ORDER BY created_at",
        )
        .bind(app_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn app_permissions_by_ids(&self, ids: &[String]) -> StoreResult<Vec<AppPermission>> {
        let rows = sqlx::query_as::<_, AppPermission>(&format!(
            "SELECT {APP_PERMISSION_COLUMNS} FROM app_permissions WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO users (id, username, email, phone, password_hash, real_name, role, \
             status, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(&user.real_name)
        .bind(&user.role)
        .bind(&user.status)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "user"))?;
        Ok(())
    }

    async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        self.by_id("users", USER_COLUMNS, id).await
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn user_exists(&self, username: &str, email: &str) -> StoreResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = $1 OR email = $2")
                .bind(username)
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    async fn update_password_hash(
        &self,
        user_id: &str,
        password_hash: &str,
        updated_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
                .bind(user_id)
                .bind(password_hash)
                .bind(updated_at)
                .execute(&self.pool)
                .await?;
        expect_one(result.rows_affected(), "user")
    }
}

#[async_trait]
impl RbacStore for PostgresStore {
    async fn insert_role(&self, role: &Role) -> StoreResult<()> {
        sqlx::query("INSERT INTO roles (id, name, description, created_at) VALUES ($1, $2, $3, $4)")
            .bind(&role.id)
            .bind(&role.name)
            .bind(&role.description)
            .bind(role.created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(e, "role"))?;
        Ok(())
    }

    async fn get_role(&self, id: &str) -> StoreResult<Option<Role>> {
        self.by_id("roles", "id, name, description, created_at", id)
            .await
    }

    async fn find_role_by_name(&self, name: &str) -> StoreResult<Option<Role>> {
        let row = sqlx::query_as::<_, Role>(
            "SELECT id, name, description, created_at FROM roles WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn roles_by_names(&self, names: &[String]) -> StoreResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, Role>(
            "SELECT id, name, description, created_at FROM roles WHERE name = ANY($1)",
        )
        .bind(names)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn insert_rbac_permission(&self, permission: &Permission) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO permissions (id, name, resource, action, description, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&permission.id)
        .bind(&permission.name)
        .bind(&permission.resource)
        .bind(&permission.action)
        .bind(&permission.description)
        .bind(permission.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "permission"))?;
        Ok(())
    }

    async fn get_rbac_permission(&self, id: &str) -> StoreResult<Option<Permission>> {
        self.by_id(
            "permissions",
            "id, name, resource, action, description, created_at",
            id,
        )
        .await
    }

    async fn find_rbac_permission_by_name(&self, name: &str) -> StoreResult<Option<Permission>> {
        let row = sqlx::query_as::<_, Permission>(
            "SELECT id, name, resource, action, description, created_at FROM permissions \
             WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn rbac_permissions_by_ids(&self, ids: &[String]) -> StoreResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, Permission>(
            "SELECT id, name, resource, action, description, created_at FROM permissions \
             WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn find_role_permission(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> StoreResult<Option<RolePermission>> {
        let row = sqlx::query_as::<_, RolePermission>(
            "SELECT id, role_id, permission_id, created_at FROM role_permissions \
             WHERE role_id = $1 AND permission_id = $2",
        )
        .bind(role_id)
        .bind(permission_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_role_permission(&self, link: &RolePermission) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO role_permissions (id, role_id, permission_id, created_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&link.id)
        .bind(&link.role_id)
        .bind(&link.permission_id)
        .bind(link.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "role permission"))?;
        Ok(())
    }

    async fn role_permission_ids(&self, role_ids: &[String]) -> StoreResult<Vec<String>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT permission_id FROM role_permissions WHERE role_id = ANY($1)",
        )
        .bind(role_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn insert_user_role(&self, user_role: &UserRole) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO user_roles (id, user_id, role, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&user_role.id)
        .bind(&user_role.user_id)
        .bind(&user_role.role)
        .bind(user_role.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "user role"))?;
        Ok(())
    }

    async fn list_user_roles(&self, user_id: &str) -> StoreResult<Vec<UserRole>> {
        let rows = sqlx::query_as::<_, UserRole>(
            "SELECT id, user_id, role, created_at FROM user_roles WHERE user_id = $1 \
             ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl HealthCheck for PostgresStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

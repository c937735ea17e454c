//! 表单业务服务

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use super::model::{
    CreateFormRequest, Form, FormDataEntry, SubmitFormDataRequest, UpdateFormRequest,
};
use crate::app::{apply, require_application, require_json};
use crate::core::{
    error::CoreError,
    id::{actor_or, new_id},
    pagination::Pagination,
    response::PageResponse,
};
use crate::store::PlatformStore;

#[derive(Clone)]
pub struct FormService {
    store: Arc<dyn PlatformStore>,
}

impl FormService {
    pub fn new(store: Arc<dyn PlatformStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, req: CreateFormRequest, actor: &str) -> Result<Form, CoreError> {
        require_json(&req.schema, "schema")?;
        require_application(self.store.as_ref(), &req.app_id).await?;

        let now = Utc::now();
        let form = Form {
            id: new_id("form"),
            app_id: req.app_id,
            name: req.name,
            description: req.description,
            schema: req.schema,
            is_active: true,
            created_by: actor_or(req.created_by, actor),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_form(&form).await?;
        info!(form_id = %form.id, app_id = %form.app_id, "表单已创建");
        Ok(form)
    }

    pub async fn get(&self, id: &str) -> Result<Form, CoreError> {
        self.store
            .get_form(id)
            .await?
            .ok_or_else(|| CoreError::not_found("form not found"))
    }

    pub async fn update(&self, id: &str, req: UpdateFormRequest) -> Result<Form, CoreError> {
        let mut form = self.get(id).await?;
        if let Some(schema) = req.schema.as_deref().filter(|s| !s.is_empty()) {
            require_json(schema, "schema")?;
        }

        apply(&mut form.name, req.name);
        apply(&mut form.description, req.description);
        apply(&mut form.schema, req.schema);
        if let Some(is_active) = req.is_active {
            form.is_active = is_active;
        }
        form.updated_at = Utc::now();

        self.store.update_form(&form).await?;
        Ok(form)
    }

    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.get(id).await?;
        self.store.delete_form(id).await?;
        info!(form_id = %id, "表单已删除");
        Ok(())
    }

    pub async fn list(
        &self,
        app_id: &str,
        pagination: Pagination,
    ) -> Result<PageResponse<Form>, CoreError> {
        let (items, total) = self.store.list_forms(app_id, pagination).await?;
        Ok(PageResponse::new(items, total, pagination))
    }

    /// 只接受启用状态表单的提交
    pub async fn submit(
        &self,
        req: SubmitFormDataRequest,
        actor: &str,
    ) -> Result<FormDataEntry, CoreError> {
        let active = self
            .store
            .get_form(&req.form_id)
            .await?
            .filter(|form| form.is_active);
        if active.is_none() {
            return Err(CoreError::not_found("form not found or inactive"));
        }
        require_json(&req.data, "data")?;

        let entry = FormDataEntry {
            id: new_id("fde"),
            form_id: req.form_id,
            data: req.data,
            created_by: actor_or(req.created_by, actor),
            created_at: Utc::now(),
        };
        self.store.insert_form_entry(&entry).await?;
        info!(form_id = %entry.form_id, entry_id = %entry.id, "表单数据已提交");
        Ok(entry)
    }

    pub async fn list_entries(
        &self,
        form_id: &str,
        pagination: Pagination,
    ) -> Result<PageResponse<FormDataEntry>, CoreError> {
        let (items, total) = self.store.list_form_entries(form_id, pagination).await?;
        Ok(PageResponse::new(items, total, pagination))
    }
}

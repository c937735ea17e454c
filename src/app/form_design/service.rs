//! 表单设计业务服务

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use super::model::{CreateFormDesignRequest, FormDesign, UpdateFormDesignRequest};
use crate::app::{apply, require_application, require_json};
use crate::core::{
    error::CoreError,
    id::{actor_or, new_id},
    pagination::Pagination,
    response::PageResponse,
};
use crate::store::PlatformStore;

#[derive(Clone)]
pub struct FormDesignService {
    store: Arc<dyn PlatformStore>,
}

impl FormDesignService {
    pub fn new(store: Arc<dyn PlatformStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        req: CreateFormDesignRequest,
        actor: &str,
    ) -> Result<FormDesign, CoreError> {
        require_json(&req.schema, "schema")?;
        require_application(self.store.as_ref(), &req.app_id).await?;

        let now = Utc::now();
        let design = FormDesign {
            id: new_id("fd"),
            app_id: req.app_id,
            name: req.name,
            description: req.description,
            schema: req.schema,
            config: req.config,
            is_active: true,
            is_published: false,
            created_by: actor_or(req.created_by, actor),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_form_design(&design).await?;
        info!(design_id = %design.id, "表单设计已创建");
        Ok(design)
    }

    pub async fn get(&self, id: &str) -> Result<FormDesign, CoreError> {
        self.store
            .get_form_design(id)
            .await?
            .ok_or_else(|| CoreError::not_found("form design not found"))
    }

    pub async fn update(
        &self,
        id: &str,
        req: UpdateFormDesignRequest,
    ) -> Result<FormDesign, CoreError> {
        let mut design = self.get(id).await?;
        if design.is_published {
            return Err(CoreError::conflict("cannot update published form design"));
        }
        if let Some(schema) = req.schema.as_deref().filter(|s| !s.is_empty()) {
            require_json(schema, "schema")?;
        }

        apply(&mut design.name, req.name);
        apply(&mut design.description, req.description);
        apply(&mut design.schema, req.schema);
        apply(&mut design.config, req.config);
        if let Some(is_active) = req.is_active {
            design.is_active = is_active;
        }
        design.updated_at = Utc::now();

        self.store.update_form_design(&design).await?;
        Ok(design)
    }

    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        let design = self.get(id).await?;
        if design.is_published {
            return Err(CoreError::conflict("cannot delete published form design"));
        }
        self.store.delete_form_design(id).await?;
        info!(design_id = %id, "表单设计已删除");
        Ok(())
    }

    pub async fn list(
        &self,
        app_id: &str,
        pagination: Pagination,
    ) -> Result<PageResponse<FormDesign>, CoreError> {
        let (items, total) = self.store.list_form_designs(app_id, pagination).await?;
        Ok(PageResponse::new(items, total, pagination))
    }

    pub async fn publish(&self, id: &str) -> Result<FormDesign, CoreError> {
        let mut design = self.get(id).await?;
        if design.is_published {
            return Err(CoreError::conflict("form design is already published"));
        }
        design.is_published = true;
        design.updated_at = Utc::now();
        self.store.update_form_design(&design).await?;
        info!(design_id = %id, "表单设计已发布");
        Ok(design)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::application::model::Application;
    use crate::store::{memory::InMemoryStore, ApplicationStore};

    async fn service() -> FormDesignService {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        store
            .insert_application(&Application {
                id: "app_1".into(),
                team_id: "team_1".into(),
                name: "designer".into(),
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
        FormDesignService::new(store)
    }

    fn create_req() -> CreateFormDesignRequest {
        CreateFormDesignRequest {
            app_id: "app_1".into(),
            name: "layout".into(),
            description: String::new(),
            schema: r#"{"rows":[]}"#.into(),
            config: String::new(),
            created_by: None,
        }
    }

    #[tokio::test]
    async fn published_designs_are_frozen() {
        let designs = service().await;
        let design = designs.create(create_req(), "u").await.unwrap();
        assert!(!design.is_published);

        let rename = UpdateFormDesignRequest {
            name: Some("layout v2".into()),
            ..Default::default()
        };
        designs.update(&design.id, rename).await.unwrap();

        let published = designs.publish(&design.id).await.unwrap();
        assert!(published.is_published);

        match designs.publish(&design.id).await {
            Err(CoreError::Conflict(msg)) => assert_eq!(msg, "form design is already published"),
            other => panic!("unexpected: {other:?}"),
        }
        match designs
            .update(&design.id, UpdateFormDesignRequest::default())
            .await
        {
            Err(CoreError::Conflict(msg)) => assert_eq!(msg, "cannot update published form design"),
            other => panic!("unexpected: {other:?}"),
        }
        match designs.delete(&design.id).await {
            Err(CoreError::Conflict(msg)) => assert_eq!(msg, "cannot delete published form design"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unpublished_designs_can_be_deleted() {
        let designs = service().await;
        let design = designs.create(create_req(), "u").await.unwrap();
        designs.delete(&design.id).await.unwrap();
        assert!(matches!(
            designs.get(&design.id).await,
            Err(CoreError::NotFound(_))
        ));
    }
}

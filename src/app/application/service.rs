//! 应用业务服务

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use super::model::{
    Application, CreateApplicationRequest, UpdateApplicationRequest, APPLICATION_TYPES,
};
use crate::app::apply;
use crate::core::{
    error::CoreError,
    id::{actor_or, new_id},
    pagination::Pagination,
    response::PageResponse,
};
use crate::store::{PlatformStore, StoreError};

const DUPLICATE_NAME: &str = "application with this name already exists in the team";

fn validate_type(app_type: &str) -> Result<(), CoreError> {
    if APPLICATION_TYPES.contains(&app_type) {
        Ok(())
    } else {
        Err(CoreError::bad_request("invalid application type"))
    }
}

fn conflict_as_duplicate(err: StoreError) -> CoreError {
    match err {
        StoreError::Conflict(_) => CoreError::conflict(DUPLICATE_NAME),
        other => other.into(),
    }
}

#[derive(Clone)]
pub struct ApplicationService {
    store: Arc<dyn PlatformStore>,
}

impl ApplicationService {
    pub fn new(store: Arc<dyn PlatformStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        req: CreateApplicationRequest,
        actor: &str,
    ) -> Result<Application, CoreError> {
        validate_type(&req.app_type)?;
        if self
            .store
            .find_application_by_name(&req.team_id, &req.name)
            .await?
            .is_some()
        {
            return Err(CoreError::conflict(DUPLICATE_NAME));
        }

        let now = Utc::now();
        let app = Application {
            id: new_id("app"),
            team_id: req.team_id,
            name: req.name,
            description: req.description,
            app_type: req.app_type,
            config: req.config,
            is_active: true,
            created_by: actor_or(req.created_by, actor),
            created_at: now,
            updated_at: now,
        };
        self.store
            .insert_application(&app)
            .await
            .map_err(conflict_as_duplicate)?;

        info!(app_id = %app.id, team_id = %app.team_id, "应用已创建");
        Ok(app)
    }

    pub async fn get(&self, id: &str) -> Result<Application, CoreError> {
        self.store
            .get_application(id)
            .await?
            .ok_or_else(|| CoreError::not_found("application not found"))
    }

    pub async fn update(
        &self,
        id: &str,
        req: UpdateApplicationRequest,
    ) -> Result<Application, CoreError> {
        let mut app = self.get(id).await?;
        if let Some(app_type) = req.app_type.as_deref().filter(|t| !t.is_empty()) {
            validate_type(app_type)?;
        }

        apply(&mut app.name, req.name);
        apply(&mut app.description, req.description);
        apply(&mut app.app_type, req.app_type);
        apply(&mut app.config, req.config);
        if let Some(is_active) = req.is_active {
            app.is_active = is_active;
        }
        app.updated_at = Utc::now();

        self.store
            .update_application(&app)
            .await
            .map_err(conflict_as_duplicate)?;
        Ok(app)
    }

    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.get(id).await?;
        self.store.delete_application(id).await?;
        info!(app_id = %id, "应用已删除");
        Ok(())
    }

    pub async fn list(
        &self,
        team_id: &str,
        pagination: Pagination,
    ) -> Result<PageResponse<Application>, CoreError> {
        let (items, total) = self.store.list_applications(team_id, pagination).await?;
        Ok(PageResponse::new(items, total, pagination))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    fn service() -> ApplicationService {
        ApplicationService::new(Arc::new(InMemoryStore::new()))
    }

    fn create_req(team_id: &str, name: &str, app_type: &str) -> CreateApplicationRequest {
        CreateApplicationRequest {
            team_id: team_id.to_string(),
            name: name.to_string(),
            description: "desc".to_string(),
            app_type: app_type.to_string(),
            config: String::new(),
            created_by: None,
        }
    }

    #[tokio::test]
    async fn create_validates_type_and_uniqueness() {
        let apps = service();
        let app = apps
            .create(create_req("team_1", "Visitors", "qrcode"), "user_1")
            .await
            .unwrap();
        assert!(app.id.starts_with("app_"));
        assert!(app.is_active);
        assert_eq!(app.created_by, "user_1");

        match apps
            .create(create_req("team_1", "Other", "spreadsheet"), "user_1")
            .await
        {
            Err(CoreError::BadRequest(msg)) => assert_eq!(msg, "invalid application type"),
            other => panic!("unexpected: {other:?}"),
        }

        match apps
            .create(create_req("team_1", "Visitors", "form"), "user_1")
            .await
        {
            Err(CoreError::Conflict(msg)) => assert_eq!(msg, DUPLICATE_NAME),
            other => panic!("unexpected: {other:?}"),
        }

        apps.create(create_req("team_2", "Visitors", "form"), "user_1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_applies_only_non_empty_fields() {
        let apps = service();
        let app = apps
            .create(create_req("team_1", "Survey", "survey"), "user_1")
            .await
            .unwrap();

        let updated = apps
            .update(
                &app.id,
                UpdateApplicationRequest {
                    name: Some(String::new()),
                    description: Some("new desc".to_string()),
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Survey");
        assert_eq!(updated.description, "new desc");
        assert!(!updated.is_active);

        let bad = apps
            .update(
                &app.id,
                UpdateApplicationRequest {
                    app_type: Some("nope".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(bad, Err(CoreError::BadRequest(_))));
    }

    #[tokio::test]
    async fn rename_into_existing_name_conflicts() {
        let apps = service();
        apps.create(create_req("team_1", "A", "form"), "u")
            .await
            .unwrap();
        let b = apps
            .create(create_req("team_1", "B", "form"), "u")
            .await
            .unwrap();

        let result = apps
            .update(
                &b.id,
                UpdateApplicationRequest {
                    name: Some("A".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(CoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn delete_and_list() {
        let apps = service();
        for i in 0..3 {
            apps.create(create_req("team_1", &format!("app{i}"), "form"), "u")
                .await
                .unwrap();
        }
        let page = apps.list("team_1", Pagination::new(1, 2)).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 2);

        let id = page.items[0].id.clone();
        apps.delete(&id).await.unwrap();
        assert!(matches!(apps.get(&id).await, Err(CoreError::NotFound(_))));
        assert!(matches!(apps.delete(&id).await, Err(CoreError::NotFound(_))));
    }
}

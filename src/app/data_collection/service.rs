//! 数据采集业务服务

use chrono::Utc;
use std::sync::Arc;
use tracing::info;

use super::model::{
    CreateDataCollectionRequest, DataCollection, DataEntry, SubmitDataEntryRequest,
    UpdateDataCollectionRequest,
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
pub struct DataCollectionService {
    store: Arc<dyn PlatformStore>,
}

impl DataCollectionService {
    pub fn new(store: Arc<dyn PlatformStore>) -> Self {
        Self { store }
    }

    pub async fn create(
        &self,
        req: CreateDataCollectionRequest,
        actor: &str,
    ) -> Result<DataCollection, CoreError> {
        require_json(&req.schema, "schema")?;
        require_application(self.store.as_ref(), &req.app_id).await?;

        let now = Utc::now();
        let collection = DataCollection {
            id: new_id("dc"),
            app_id: req.app_id,
            name: req.name,
            description: req.description,
            schema: req.schema,
            config: req.config,
            is_active: true,
            created_by: actor_or(req.created_by, actor),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_collection(&collection).await?;
        info!(collection_id = %collection.id, "数据采集已创建");
        Ok(collection)
    }

    pub async fn get(&self, id: &str) -> Result<DataCollection, CoreError> {
        self.store
            .get_collection(id)
            .await?
            .ok_or_else(|| CoreError::not_found("data collection not found"))
    }

    pub async fn update(
        &self,
        id: &str,
        req: UpdateDataCollectionRequest,
    ) -> Result<DataCollection, CoreError> {
        let mut collection = self.get(id).await?;
        if let Some(schema) = req.schema.as_deref().filter(|s| !s.is_empty()) {
            require_json(schema, "schema")?;
        }

        apply(&mut collection.name, req.name);
        apply(&mut collection.description, req.description);
        apply(&mut collection.schema, req.schema);
        apply(&mut collection.config, req.config);
        if let Some(is_active) = req.is_active {
            collection.is_active = is_active;
        }
        collection.updated_at = Utc::now();

        self.store.update_collection(&collection).await?;
        Ok(collection)
    }

    /// 连同全部数据条目一起删除
    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.get(id).await?;
        self.store.delete_collection(id).await?;
        info!(collection_id = %id, "数据采集已删除");
        Ok(())
    }

    pub async fn list(
        &self,
        app_id: &str,
        pagination: Pagination,
    ) -> Result<PageResponse<DataCollection>, CoreError> {
        let (items, total) = self.store.list_collections(app_id, pagination).await?;
        Ok(PageResponse::new(items, total, pagination))
    }

    pub async fn submit(
        &self,
        req: SubmitDataEntryRequest,
        actor: &str,
    ) -> Result<DataEntry, CoreError> {
        let active = self
            .store
            .get_collection(&req.collection_id)
            .await?
            .filter(|c| c.is_active);
        if active.is_none() {
            return Err(CoreError::not_found(
                "data collection not found or inactive",
            ));
        }
        require_json(&req.data, "data")?;

        let entry = DataEntry {
            id: new_id("de"),
            collection_id: req.collection_id,
            data: req.data,
            created_by: actor_or(req.created_by, actor),
            created_at: Utc::now(),
        };
        self.store.insert_data_entry(&entry).await?;
        Ok(entry)
    }

    pub async fn list_entries(
        &self,
        collection_id: &str,
        pagination: Pagination,
    ) -> Result<PageResponse<DataEntry>, CoreError> {
        self.get(collection_id).await?;
        let (items, total) = self
            .store
            .list_data_entries(collection_id, pagination)
            .await?;
        Ok(PageResponse::new(items, total, pagination))
    }

    /// 导出全部条目，按提交时间正序
    pub async fn export(&self, collection_id: &str) -> Result<Vec<DataEntry>, CoreError> {
        self.get(collection_id).await?;
        let entries = self.store.all_data_entries(collection_id).await?;
        info!(collection_id, count = entries.len(), "数据条目已导出");
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::application::model::Application;
    use crate::store::{memory::InMemoryStore, ApplicationStore};

    async fn service() -> DataCollectionService {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        store
            .insert_application(&Application {
                id: "app_1".into(),
                team_id: "team_1".into(),
                name: "survey".into(),
                description: String::new(),
                app_type: "survey".into(),
                config: String::new(),
                is_active: true,
                created_by: "user_1".into(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        DataCollectionService::new(store)
    }

    fn create_req() -> CreateDataCollectionRequest {
        CreateDataCollectionRequest {
            app_id: "app_1".into(),
            name: "feedback".into(),
            description: String::new(),
            schema: "{}".into(),
            config: String::new(),
            created_by: None,
        }
    }

    fn entry_req(collection_id: &str, n: u32) -> SubmitDataEntryRequest {
        SubmitDataEntryRequest {
            collection_id: collection_id.into(),
            data: format!(r#"{{"n":{n}}}"#),
            created_by: None,
        }
    }

    #[tokio::test]
    async fn export_returns_entries_oldest_first() {
        let collections = service().await;
        let collection = collections.create(create_req(), "u").await.unwrap();
        for n in 1..=3 {
            collections
                .submit(entry_req(&collection.id, n), "u")
                .await
                .unwrap();
        }

        let exported = collections.export(&collection.id).await.unwrap();
        let data: Vec<&str> = exported.iter().map(|e| e.data.as_str()).collect();
        assert_eq!(data, vec![r#"{"n":1}"#, r#"{"n":2}"#, r#"{"n":3}"#]);

        let page = collections
            .list_entries(&collection.id, Pagination::new(1, 2))
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items[0].data, r#"{"n":3}"#);
    }

    #[tokio::test]
    async fn inactive_collections_reject_entries() {
        let collections = service().await;
        let collection = collections.create(create_req(), "u").await.unwrap();
        collections
            .update(
                &collection.id,
                UpdateDataCollectionRequest {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        match collections.submit(entry_req(&collection.id, 1), "u").await {
            Err(CoreError::NotFound(msg)) => {
                assert_eq!(msg, "data collection not found or inactive")
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_cascades_and_missing_collection_is_reported() {
        let collections = service().await;
        let collection = collections.create(create_req(), "u").await.unwrap();
        collections
            .submit(entry_req(&collection.id, 1), "u")
            .await
            .unwrap();

        collections.delete(&collection.id).await.unwrap();
        assert!(matches!(
            collections
                .list_entries(&collection.id, Pagination::default())
                .await,
            Err(CoreError::NotFound(_))
        ));
        assert!(matches!(
            collections.export(&collection.id).await,
            Err(CoreError::NotFound(_))
        ));
    }
}

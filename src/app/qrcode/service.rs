//! 二维码业务服务

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use super::model::{CreateQrCodeRequest, QrCode, UpdateQrCodeRequest, QR_CODE_TYPES};
use crate::app::{apply, require_application};
use crate::core::{
    error::CoreError,
    id::{actor_or, new_id},
    pagination::Pagination,
    response::PageResponse,
};
use crate::infrastructure::qr_image::QrImageRenderer;
use crate::store::PlatformStore;

pub(crate) fn validate_qr_type(qr_type: &str) -> Result<(), CoreError> {
    if QR_CODE_TYPES.contains(&qr_type) {
        Ok(())
    } else {
        Err(CoreError::bad_request("invalid QR code type"))
    }
}

#[derive(Clone)]
pub struct QrCodeService {
    store: Arc<dyn PlatformStore>,
    renderer: QrImageRenderer,
}

impl QrCodeService {
    pub fn new(store: Arc<dyn PlatformStore>, renderer: QrImageRenderer) -> Self {
        Self { store, renderer }
    }

    pub async fn create(&self, req: CreateQrCodeRequest, actor: &str) -> Result<QrCode, CoreError> {
        validate_qr_type(&req.qr_type)?;
        require_application(self.store.as_ref(), &req.app_id).await?;

        let now = Utc::now();
        let mut code = QrCode {
            id: new_id("qr"),
            app_id: req.app_id,
            name: req.name,
            content: req.content,
            qr_type: req.qr_type,
            url: req.url,
            image_path: String::new(),
            created_by: actor_or(req.created_by, actor),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_qrcode(&code).await?;
        info!(qr_id = %code.id, app_id = %code.app_id, "二维码已创建");

        self.refresh_image(&mut code).await;
        Ok(code)
    }

    pub async fn get(&self, id: &str) -> Result<QrCode, CoreError> {
        self.store
            .get_qrcode(id)
            .await?
            .ok_or_else(|| CoreError::not_found("QR code not found"))
    }

    pub async fn update(&self, id: &str, req: UpdateQrCodeRequest) -> Result<QrCode, CoreError> {
        let mut code = self.get(id).await?;
        if let Some(qr_type) = req.qr_type.as_deref().filter(|t| !t.is_empty()) {
            validate_qr_type(qr_type)?;
        }

        apply(&mut code.name, req.name);
        apply(&mut code.content, req.content);
        apply(&mut code.qr_type, req.qr_type);
        apply(&mut code.url, req.url);
        code.updated_at = Utc::now();
        self.store.update_qrcode(&code).await?;

        self.refresh_image(&mut code).await;
        Ok(code)
    }

    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.get(id).await?;
        self.store.delete_qrcode(id).await?;
        info!(qr_id = %id, "二维码已删除");
        Ok(())
    }

    pub async fn list(
        &self,
        app_id: &str,
        pagination: Pagination,
    ) -> Result<PageResponse<QrCode>, CoreError> {
        let (items, total) = self.store.list_qrcodes(app_id, pagination).await?;
        Ok(PageResponse::new(items, total, pagination))
    }

    /// 显式生成图片，失败时返回错误
    pub async fn generate_image(&self, id: &str) -> Result<QrCode, CoreError> {
        let mut code = self.get(id).await?;
        let path = self
            .renderer
            .render(&code.id, &code.content)
            .await
            .map_err(|e| CoreError::internal("failed to generate QR code image", e))?;
        code.image_path = path.display().to_string();
        self.store
            .set_qrcode_image_path(&code.id, &code.image_path)
            .await?;
        Ok(code)
    }

    /// 创建和更新后的图片生成只记录失败，不影响主流程
    async fn refresh_image(&self, code: &mut QrCode) {
        match self.renderer.render(&code.id, &code.content).await {
            Ok(path) => {
                let path = path.display().to_string();
                match self.store.set_qrcode_image_path(&code.id, &path).await {
                    Ok(()) => code.image_path = path,
                    Err(err) => warn!(qr_id = %code.id, error = %err, "保存二维码图片路径失败"),
                }
            }
            Err(err) => warn!(qr_id = %code.id, error = %err, "生成二维码图片失败"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::application::model::Application;
    use crate::infrastructure::config::QrCodeConfig;
    use crate::store::{memory::InMemoryStore, ApplicationStore};
    use std::path::Path;
    use tempfile::tempdir;

    async fn service(dir: &Path) -> QrCodeService {
        let store = Arc::new(InMemoryStore::new());
        let now = Utc::now();
        store
            .insert_application(&Application {
                id: "app_1".into(),
                team_id: "team_1".into(),
                name: "codes".into(),
                description: String::new(),
                app_type: "qrcode".into(),
                config: String::new(),
                is_active: true,
                created_by: "user_1".into(),
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();
        let renderer = QrImageRenderer::new(&QrCodeConfig {
            image_dir: dir.to_path_buf(),
            image_size: 64,
        });
        QrCodeService::new(store, renderer)
    }

    fn create_req(app_id: &str, qr_type: &str) -> CreateQrCodeRequest {
        CreateQrCodeRequest {
            app_id: app_id.into(),
            name: "door".into(),
            content: "https://example.com/door".into(),
            qr_type: qr_type.into(),
            url: String::new(),
            created_by: Some("user_2".into()),
        }
    }

    #[tokio::test]
    async fn create_renders_image() {
        let dir = tempdir().unwrap();
        let codes = service(dir.path()).await;

        let code = codes.create(create_req("app_1", "static"), "user_1").await.unwrap();
        assert_eq!(code.created_by, "user_2");
        assert!(Path::new(&code.image_path).exists());
        assert_eq!(codes.get(&code.id).await.unwrap().image_path, code.image_path);
    }

    #[tokio::test]
    async fn create_rejects_bad_type_and_unknown_app() {
        let dir = tempdir().unwrap();
        let codes = service(dir.path()).await;

        match codes.create(create_req("app_1", "animated"), "u").await {
            Err(CoreError::BadRequest(msg)) => assert_eq!(msg, "invalid QR code type"),
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            codes.create(create_req("app_404", "static"), "u").await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_and_delete() {
        let dir = tempdir().unwrap();
        let codes = service(dir.path()).await;
        let code = codes.create(create_req("app_1", "static"), "u").await.unwrap();

        let updated = codes
            .update(
                &code.id,
                UpdateQrCodeRequest {
                    qr_type: Some("dynamic".into()),
                    content: Some("https://example.com/v2".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.qr_type, "dynamic");
        assert_eq!(updated.name, "door");

        codes.delete(&code.id).await.unwrap();
        assert!(matches!(codes.get(&code.id).await, Err(CoreError::NotFound(_))));
        assert!(matches!(
            codes.generate_image(&code.id).await,
            Err(CoreError::NotFound(_))
        ));
    }
}

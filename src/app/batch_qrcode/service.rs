//! 批量二维码业务服务

use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use super::model::{
    BatchQrCode, BatchStatus, CreateBatchQrCodeRequest, UpdateBatchQrCodeRequest, MAX_BATCH_COUNT,
};
use crate::app::qrcode::{model::QrCode, service::validate_qr_type};
use crate::app::{apply, require_application};
use crate::core::{
    error::CoreError,
    id::{actor_or, new_id},
    pagination::Pagination,
    response::PageResponse,
};
use crate::infrastructure::qr_image::QrImageRenderer;
use crate::store::PlatformStore;

fn validate_count(count: i32) -> Result<(), CoreError> {
    if (1..=MAX_BATCH_COUNT).contains(&count) {
        Ok(())
    } else {
        Err(CoreError::bad_request(
            "invalid count, must be between 1 and 10000",
        ))
    }
}

#[derive(Clone)]
pub struct BatchQrCodeService {
    store: Arc<dyn PlatformStore>,
    renderer: QrImageRenderer,
}

impl BatchQrCodeService {
    pub fn new(store: Arc<dyn PlatformStore>, renderer: QrImageRenderer) -> Self {
        Self { store, renderer }
    }

    pub async fn create(
        &self,
        req: CreateBatchQrCodeRequest,
        actor: &str,
    ) -> Result<BatchQrCode, CoreError> {
        validate_qr_type(&req.qr_type)?;
        validate_count(req.count)?;
        require_application(self.store.as_ref(), &req.app_id).await?;

        let now = Utc::now();
        let batch = BatchQrCode {
            id: new_id("bqr"),
            app_id: req.app_id,
            name: req.name,
            description: req.description,
            prefix: req.prefix,
            count: req.count,
            qr_type: req.qr_type,
            url_template: req.url_template,
            config: req.config,
            status: BatchStatus::Pending.as_str().to_string(),
            created_by: actor_or(req.created_by, actor),
            created_at: now,
            updated_at: now,
        };
        self.store.insert_batch(&batch).await?;
        info!(batch_id = %batch.id, count = batch.count, "批量二维码任务已创建");
        Ok(batch)
    }

    pub async fn get(&self, id: &str) -> Result<BatchQrCode, CoreError> {
        self.store
            .get_batch(id)
            .await?
            .ok_or_else(|| CoreError::not_found("batch QR code not found"))
    }

    pub async fn update(
        &self,
        id: &str,
        req: UpdateBatchQrCodeRequest,
    ) -> Result<BatchQrCode, CoreError> {
        let mut batch = self.get(id).await?;
        if batch.is(BatchStatus::Generating) {
            return Err(CoreError::conflict(
                "batch QR code generation is in progress",
            ));
        }
        if let Some(qr_type) = req.qr_type.as_deref().filter(|t| !t.is_empty()) {
            validate_qr_type(qr_type)?;
        }
        if let Some(count) = req.count {
            validate_count(count)?;
            batch.count = count;
        }

        apply(&mut batch.name, req.name);
        apply(&mut batch.description, req.description);
        apply(&mut batch.prefix, req.prefix);
        apply(&mut batch.qr_type, req.qr_type);
        apply(&mut batch.url_template, req.url_template);
        apply(&mut batch.config, req.config);
        batch.updated_at = Utc::now();

        self.store.update_batch(&batch).await?;
        Ok(batch)
    }

    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.get(id).await?;
        self.store.delete_batch(id).await?;
        info!(batch_id = %id, "批量二维码任务已删除");
        Ok(())
    }

    pub async fn list(
        &self,
        app_id: &str,
        pagination: Pagination,
    ) -> Result<PageResponse<BatchQrCode>, CoreError> {
        let (items, total) = self.store.list_batches(app_id, pagination).await?;
        Ok(PageResponse::new(items, total, pagination))
    }

    /// 按模板生成 `count` 个二维码。
    ///
    /// 记录一次性写入，写入失败时任务标记为 failed；图片逐个生成，
    /// 单张失败只记录日志。完成后任务标记为 completed。
    pub async fn generate(&self, id: &str) -> Result<Vec<QrCode>, CoreError> {
        let batch = self.get(id).await?;
        if !self.store.start_batch_generation(id).await? {
            return Err(CoreError::conflict(
                "batch QR code generation is already in progress",
            ));
        }

        let now = Utc::now();
        let mut codes: Vec<QrCode> = (1..=batch.count)
            .map(|index| {
                let content = batch.item_content(index);
                QrCode {
                    id: new_id("qr"),
                    app_id: batch.app_id.clone(),
                    name: batch.item_name(index),
                    content: content.clone(),
                    qr_type: batch.qr_type.clone(),
                    url: content,
                    image_path: String::new(),
                    created_by: batch.created_by.clone(),
                    created_at: now,
                    updated_at: now,
                }
            })
            .collect();

        if let Err(err) = self.store.insert_qrcodes(&codes).await {
            if let Err(status_err) = self
                .store
                .set_batch_status(id, BatchStatus::Failed.as_str())
                .await
            {
                error!(batch_id = %id, error = %status_err, "更新批量任务状态失败");
            }
            return Err(CoreError::internal("failed to create QR codes", err));
        }

        let jobs = codes
            .iter()
            .map(|c| (c.id.clone(), c.content.clone()))
            .collect();
        match self.renderer.render_many(jobs).await {
            Ok(results) => {
                for (code, result) in codes.iter_mut().zip(results) {
                    match result {
                        Ok(path) => {
                            let path = path.display().to_string();
                            match self.store.set_qrcode_image_path(&code.id, &path).await {
                                Ok(()) => code.image_path = path,
                                Err(err) => {
                                    warn!(qr_id = %code.id, error = %err, "保存二维码图片路径失败")
                                }
                            }
                        }
                        Err(err) => warn!(qr_id = %code.id, error = %err, "生成二维码图片失败"),
                    }
                }
            }
            Err(err) => warn!(batch_id = %id, error = %err, "批量生成二维码图片失败"),
        }

        self.store
            .set_batch_status(id, BatchStatus::Completed.as_str())
            .await?;
        info!(batch_id = %id, generated = codes.len(), "批量二维码生成完成");
        Ok(codes)
    }
}

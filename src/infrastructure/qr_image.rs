//! 二维码图片渲染

use image::Luma;
use qrcode::{EcLevel, QrCode};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use super::config::QrCodeConfig;

#[derive(Debug, Error)]
pub enum QrImageError {
    #[error("二维码编码失败: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("图片写入失败: {0}")]
    Image(#[from] image::ImageError),
    #[error("目录创建失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("渲染任务异常退出: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// 将内容编码为 PNG 写入 `<image_dir>/<id>.png`
#[derive(Debug, Clone)]
pub struct QrImageRenderer {
    image_dir: PathBuf,
    size: u32,
}

impl QrImageRenderer {
    pub fn new(config: &QrCodeConfig) -> Self {
        Self {
            image_dir: config.image_dir.clone(),
            size: config.image_size,
        }
    }

    pub fn image_path(&self, id: &str) -> PathBuf {
        self.image_dir.join(format!("{id}.png"))
    }

    pub async fn render(&self, id: &str, content: &str) -> Result<PathBuf, QrImageError> {
        let path = self.image_path(id);
        let content = content.to_string();
        let size = self.size;
        let target = path.clone();
        tokio::task::spawn_blocking(move || write_png(&target, &content, size)).await??;
        debug!(path = %path.display(), "二维码图片已生成");
        Ok(path)
    }

    /// 批量渲染在单个阻塞任务中完成，返回值与输入一一对应
    pub async fn render_many(
        &self,
        items: Vec<(String, String)>,
    ) -> Result<Vec<Result<PathBuf, QrImageError>>, QrImageError> {
        let renderer = self.clone();
        let results = tokio::task::spawn_blocking(move || {
            items
                .iter()
                .map(|(id, content)| {
                    let path = renderer.image_path(id);
                    write_png(&path, content, renderer.size).map(|_| path)
                })
                .collect()
        })
        .await?;
        Ok(results)
    }
}

fn write_png(path: &Path, content: &str, size: u32) -> Result<(), QrImageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let code = QrCode::with_error_correction_level(content.as_bytes(), EcLevel::H)?;
    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(size, size)
        .build();
    image.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn renderer(dir: &Path) -> QrImageRenderer {
        QrImageRenderer::new(&QrCodeConfig {
            image_dir: dir.join("qrcodes"),
            image_size: 128,
        })
    }

    #[tokio::test]
    async fn renders_png_into_image_dir() {
        let dir = tempdir().unwrap();
        let renderer = renderer(dir.path());

        let path = renderer.render("qr_1", "https://example.com/1").await.unwrap();

        assert_eq!(path, dir.path().join("qrcodes/qr_1.png"));
        let image = image::open(&path).unwrap();
        assert!(image.width() >= 128);
    }

    #[tokio::test]
    async fn render_many_keeps_input_order() {
        let dir = tempdir().unwrap();
        let renderer = renderer(dir.path());

        let results = renderer
            .render_many(vec![
                ("a".to_string(), "first".to_string()),
                ("b".to_string(), "second".to_string()),
            ])
            .await
            .unwrap();

        let paths: Vec<PathBuf> = results.into_iter().map(Result::unwrap).collect();
        assert!(paths[0].ends_with("a.png"));
        assert!(paths[1].ends_with("b.png"));
        assert!(paths.iter().all(|p| p.exists()));
    }
}

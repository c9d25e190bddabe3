use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use log::{info, warn};

use crate::encoder::Embedder;
use crate::metrics;
use crate::milvus::VectorStore;
use crate::schema::{
    GhostMetadata, GhostRecord, HYBRID_DIM, IMAGE_DIM, IMAGE_SUFFIXES, MAX_FILE_SIZE, TEXT_DIM,
};
use crate::storage::ObjectStorage;

/// 一次成功提交的结果
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    /// 自动分配的记录 ID
    pub id: i64,
    /// 图片在对象存储中的 URL
    pub s3path: String,
}

/// 提交流水线：校验 -> 嵌入 -> 上传 -> 组装 -> 插入
///
/// 协作方通过构造函数注入，流程内不持有任何全局状态。
/// 上传或任何一步嵌入失败时不会写入数据库，一条记录要么完整存在要么完全不存在
pub struct Pipeline {
    embedder: Arc<dyn Embedder>,
    storage: Arc<dyn ObjectStorage>,
    store: Arc<dyn VectorStore>,
}

impl Pipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        storage: Arc<dyn ObjectStorage>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self { embedder, storage, store }
    }

    /// 处理一次完整提交，成功时返回新记录的 ID 与对象 URL
    ///
    /// 重复提交相同内容会产生两条独立记录，这里不做去重
    pub async fn submit(
        &self,
        filename: &str,
        image: &[u8],
        meta: &GhostMetadata,
    ) -> Result<SubmitOutcome> {
        let start = Instant::now();
        let result = self.run(filename, image, meta).await;
        metrics::inc_submit(meta.ghostclass.as_str(), result.is_ok());
        metrics::observe_submit_duration(meta.ghostclass.as_str(), start.elapsed().as_secs_f64());
        result
    }

    async fn run(
        &self,
        filename: &str,
        image: &[u8],
        meta: &GhostMetadata,
    ) -> Result<SubmitOutcome> {
        validate_upload(filename, image)?;

        let vector = self.embedder.embed_image(image).await.context("图片嵌入失败")?;
        ensure_dim("vector", &vector, IMAGE_DIM)?;

        // 上传失败则中止提交，不写入任何记录
        let s3path =
            self.storage.put_object(filename, image).await.context("上传对象存储失败")?;
        let s3timestamp = Utc::now().to_rfc3339();
        info!("{filename} 已上传至 {s3path}");

        let text_vector2 =
            self.embedder.embed_text(&meta.description).await.context("文本稠密嵌入失败")?;
        ensure_dim("text_vector2", &text_vector2, TEXT_DIM)?;

        let text_vector =
            self.embedder.embed_sparse(&meta.description).await.context("文本稀疏嵌入失败")?;
        if text_vector.is_empty() {
            bail!("文本稀疏嵌入为空");
        }

        let text_vector3 =
            self.embedder.embed_hybrid(&meta.description).await.context("混合模型嵌入失败")?;
        ensure_dim("text_vector3", &text_vector3, HYBRID_DIM)?;

        let record = GhostRecord {
            ghostclass: meta.ghostclass.to_string(),
            filename: filename.to_string(),
            s3path: s3path.clone(),
            description: meta.description.clone(),
            category: meta.category.to_string(),
            identification: meta.identification.clone(),
            location: meta.location.clone(),
            country: meta.country.clone(),
            latitude: meta.latitude.clone(),
            longitude: meta.longitude.clone(),
            zipcode: meta.zipcode.clone(),
            timestamp: Utc::now().to_rfc3339(),
            s3timestamp,
            vector,
            text_vector,
            text_vector2,
            text_vector3,
        };

        // 上传成功但插入失败会在存储中留下孤儿对象，这里接受这种结果
        let id = match self.store.insert(&record).await {
            Ok(id) => id,
            Err(e) => {
                warn!("{filename} 插入失败，存储中已留下孤儿对象 {s3path}");
                return Err(e.context("写入向量数据库失败"));
            }
        };
        info!("{} 已入库，id = {id}", meta.ghostclass);
        Ok(SubmitOutcome { id, s3path })
    }
}

/// 校验在流水线最前面执行，不通过则没有任何副作用
fn validate_upload(filename: &str, image: &[u8]) -> Result<()> {
    if image.is_empty() {
        bail!("上传文件为空");
    }
    if image.len() > MAX_FILE_SIZE {
        bail!("上传文件过大: {} 字节，上限 50M", image.len());
    }
    let suffix = Path::new(filename)
        .extension()
        .map(|s| s.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    if !IMAGE_SUFFIXES.contains(&suffix.as_str()) {
        bail!("不支持的图片格式: {filename}");
    }
    Ok(())
}

fn ensure_dim(field: &str, vector: &[f32], dim: usize) -> Result<()> {
    if vector.len() != dim {
        bail!("{field} 维数不符: 期望 {dim}，实际 {}", vector.len());
    }
    Ok(())
}

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use walkdir::WalkDir;

use crate::cli::{SubCommandExtend, build_pipeline};
use crate::config::{EncoderOptions, MilvusOptions, StorageOptions};
use crate::pipeline::Pipeline;
use crate::schema::{Category, GhostClass, GhostMetadata};

/// 命令行传入的元数据字段
#[derive(Parser, Debug, Clone)]
pub struct MetadataOptions {
    /// 灵体分类
    #[arg(long)]
    pub ghostclass: GhostClass,
    /// 记录类别
    #[arg(long)]
    pub category: Category,
    /// 描述文本
    #[arg(long, default_value = "")]
    pub description: String,
    /// 标识
    #[arg(long, default_value = "")]
    pub identification: String,
    /// 地点
    #[arg(long, default_value = "")]
    pub location: String,
    /// 国家
    #[arg(long, default_value = "")]
    pub country: String,
    /// 纬度
    #[arg(long, default_value = "")]
    pub latitude: String,
    /// 经度
    #[arg(long, default_value = "")]
    pub longitude: String,
    /// 邮编
    #[arg(long, default_value = "")]
    pub zipcode: String,
}

impl MetadataOptions {
    pub fn to_metadata(&self) -> GhostMetadata {
        GhostMetadata {
            ghostclass: self.ghostclass,
            category: self.category,
            description: self.description.clone(),
            identification: self.identification.clone(),
            location: self.location.clone(),
            country: self.country.clone(),
            latitude: self.latitude.clone(),
            longitude: self.longitude.clone(),
            zipcode: self.zipcode.clone(),
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// 图片路径，可以是单个文件或目录
    pub path: PathBuf,
    /// 扫描目录时匹配的文件后缀名，多个后缀用逗号分隔
    #[arg(short, long, default_value = "png,jpg,jpeg")]
    pub suffix: String,
    #[command(flatten)]
    pub meta: MetadataOptions,
    #[command(flatten)]
    pub milvus: MilvusOptions,
    #[command(flatten)]
    pub storage: StorageOptions,
    #[command(flatten)]
    pub encoder: EncoderOptions,
}

impl SubCommandExtend for AddCommand {
    async fn run(&self) -> anyhow::Result<()> {
        let (pipeline, milvus) =
            build_pipeline(&self.milvus, &self.storage, &self.encoder)?;
        // 插入前确保集合与索引就绪
        milvus.ensure_collection().await?;

        let meta = self.meta.to_metadata();
        if self.path.is_dir() {
            let suffixes: Vec<String> =
                self.suffix.split(',').map(|s| s.to_ascii_lowercase()).collect();
            for entry in WalkDir::new(&self.path).into_iter().filter_map(|e| e.ok()) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let path = entry.path();
                let matched = path
                    .extension()
                    .map(|s| suffixes.contains(&s.to_string_lossy().to_ascii_lowercase()))
                    .unwrap_or(false);
                if !matched {
                    continue;
                }
                match submit_file(&pipeline, path, &meta).await {
                    Ok(id) => println!("[OK] {} -> id {id}", path.display()),
                    Err(e) => eprintln!("[ERR] {}: {e:#}", path.display()),
                }
            }
            Ok(())
        } else {
            let id = submit_file(&pipeline, &self.path, &meta).await?;
            println!("[OK] {} -> id {id}", self.path.display());
            Ok(())
        }
    }
}

async fn submit_file(
    pipeline: &Pipeline,
    path: &Path,
    meta: &GhostMetadata,
) -> anyhow::Result<i64> {
    let Some(filename) = path.file_name().map(|s| s.to_string_lossy().into_owned()) else {
        bail!("无效的文件名: {}", path.display());
    };
    let image =
        fs::read(path).with_context(|| format!("读取 {} 失败", path.display()))?;
    let outcome = pipeline.submit(&filename, &image, meta).await?;
    Ok(outcome.id)
}

mod add;
mod init;
pub mod server;

use std::sync::Arc;

pub use add::*;
pub use init::*;
pub use server::*;

use crate::config::{EncoderOptions, MilvusOptions, StorageOptions};
use crate::encoder::HttpEmbedder;
use crate::milvus::MilvusClient;
use crate::pipeline::Pipeline;
use crate::storage::HttpObjectStorage;

pub trait SubCommandExtend {
    fn run(&self) -> impl std::future::Future<Output = anyhow::Result<()>> + Send;
}

/// 按配置组装流水线，Milvus 客户端同时作为向量存储与健康检查入口返回
pub fn build_pipeline(
    milvus: &MilvusOptions,
    storage: &StorageOptions,
    encoder: &EncoderOptions,
) -> anyhow::Result<(Pipeline, Arc<MilvusClient>)> {
    let milvus = Arc::new(MilvusClient::new(milvus)?);
    let pipeline = Pipeline::new(
        Arc::new(HttpEmbedder::new(encoder)?),
        Arc::new(HttpObjectStorage::new(storage)?),
        milvus.clone(),
    );
    Ok((pipeline, milvus))
}

use std::sync::Arc;

use crate::milvus::MilvusClient;
use crate::pipeline::Pipeline;

/// 应用状态
pub struct AppState {
    /// 提交流水线
    pub pipeline: Pipeline,
    /// Milvus 客户端，健康检查用
    pub milvus: Arc<MilvusClient>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(pipeline: Pipeline, milvus: Arc<MilvusClient>) -> Arc<Self> {
        Arc::new(AppState { pipeline, milvus })
    }
}

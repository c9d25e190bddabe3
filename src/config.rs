use clap::{Parser, Subcommand};

use crate::cli::*;
use crate::schema;

/// Milvus 连接参数
#[derive(Parser, Debug, Clone)]
pub struct MilvusOptions {
    /// Milvus 服务地址
    #[arg(long, value_name = "URL", default_value = "http://127.0.0.1:19530")]
    pub milvus_url: String,
    /// 集合名称
    #[arg(long, value_name = "NAME", default_value = schema::COLLECTION)]
    pub collection: String,
    /// IVF_FLAT 索引的候选列表大小
    #[arg(long, value_name = "N", default_value_t = 128)]
    pub nlist: usize,
    /// Milvus 请求超时（秒）
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub milvus_timeout: u64,
}

/// 对象存储连接参数
#[derive(Parser, Debug, Clone)]
pub struct StorageOptions {
    /// 对象存储服务地址
    #[arg(long, value_name = "URL", default_value = "http://127.0.0.1:9000")]
    pub s3_url: String,
    /// 存储桶名称
    #[arg(long, value_name = "NAME", default_value = "images")]
    pub bucket: String,
    /// 上传请求超时（秒）
    #[arg(long, value_name = "SECS", default_value_t = 60)]
    pub s3_timeout: u64,
}

/// 嵌入服务地址
///
/// 四个模型各自独立部署，维数由 schema 中的常量固定，
/// 换模型必须同时换 schema
#[derive(Parser, Debug, Clone)]
pub struct EncoderOptions {
    /// 图片嵌入服务地址（512 维）
    #[arg(long, value_name = "URL", default_value = "http://127.0.0.1:8081")]
    pub image_embed_url: String,
    /// 文本稠密嵌入服务地址（768 维）
    #[arg(long, value_name = "URL", default_value = "http://127.0.0.1:8082")]
    pub text_embed_url: String,
    /// 文本稀疏嵌入服务地址
    #[arg(long, value_name = "URL", default_value = "http://127.0.0.1:8083")]
    pub sparse_embed_url: String,
    /// 混合模型嵌入服务地址（1024 维）
    #[arg(long, value_name = "URL", default_value = "http://127.0.0.1:8084")]
    pub hybrid_embed_url: String,
    /// 嵌入请求超时（秒）
    #[arg(long, value_name = "SECS", default_value_t = 60)]
    pub embed_timeout: u64,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "ghoststore", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 初始化集合与索引
    Init(InitCommand),
    /// 提交图片到数据库
    Add(AddCommand),
    /// 启动 HTTP 提交服务
    Server(ServerCommand),
}

use clap::Parser;
use log::info;
use tokio::net::TcpListener;

use crate::cli::{SubCommandExtend, build_pipeline};
use crate::config::{EncoderOptions, MilvusOptions, StorageOptions};
use crate::server;

#[derive(Parser, Debug, Clone)]
pub struct ServerCommand {
    /// 监听地址
    #[arg(long, default_value = "127.0.0.1:8000")]
    pub addr: String,
    #[command(flatten)]
    pub milvus: MilvusOptions,
    #[command(flatten)]
    pub storage: StorageOptions,
    #[command(flatten)]
    pub encoder: EncoderOptions,
}

impl SubCommandExtend for ServerCommand {
    async fn run(&self) -> anyhow::Result<()> {
        let (pipeline, milvus) =
            build_pipeline(&self.milvus, &self.storage, &self.encoder)?;

        // 启动前确保集合与索引就绪，失败直接退出，
        // 不能对着残缺的集合提供提交服务
        milvus.ensure_collection().await?;

        // 创建应用状态
        let state = server::AppState::new(pipeline, milvus);

        // 创建应用
        let app = server::create_app(state);

        // 启动服务器
        info!("服务器启动：http://{}", &self.addr);
        let listener = TcpListener::bind(&self.addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

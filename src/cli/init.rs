use clap::Parser;
use log::info;

use crate::cli::SubCommandExtend;
use crate::config::MilvusOptions;
use crate::milvus::MilvusClient;

#[derive(Parser, Debug, Clone)]
pub struct InitCommand {
    #[command(flatten)]
    pub milvus: MilvusOptions,
}

impl SubCommandExtend for InitCommand {
    async fn run(&self) -> anyhow::Result<()> {
        let client = MilvusClient::new(&self.milvus)?;
        client.ensure_collection().await?;
        info!("集合 {} 就绪", client.collection());
        Ok(())
    }
}

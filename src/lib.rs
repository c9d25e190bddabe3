pub mod cli;
pub mod config;
pub mod encoder;
mod metrics;
pub mod milvus;
pub mod pipeline;
pub mod schema;
mod server;
pub mod storage;

pub use config::Opts;
pub use pipeline::Pipeline;

use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::EncoderOptions;
use crate::schema::SparseVector;

/// 嵌入服务接口，四个模型各自独立
///
/// 实现方只负责 输入 -> 向量，维数校验在流水线中统一进行
#[async_trait]
pub trait Embedder: Send + Sync {
    /// 图片 -> 稠密向量（余弦度量）
    async fn embed_image(&self, image: &[u8]) -> Result<Vec<f32>>;
    /// 描述文本 -> 稠密向量（余弦度量）
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>>;
    /// 描述文本 -> 稀疏向量（内积度量）
    async fn embed_sparse(&self, text: &str) -> Result<SparseVector>;
    /// 描述文本 -> 混合模型稠密向量（欧氏度量，只保留稠密部分）
    async fn embed_hybrid(&self, text: &str) -> Result<Vec<f32>>;
}

/// 稀疏嵌入服务返回的单个词项
#[derive(Debug, Deserialize)]
struct SparseTerm {
    index: u32,
    value: f32,
}

/// 通过 HTTP 调用 TEI 风格嵌入服务的客户端
///
/// 稠密模型走 `/embed`，稀疏模型走 `/embed_sparse`，
/// 图片以 base64 编码后作为 inputs 发送
pub struct HttpEmbedder {
    http: Client,
    opts: EncoderOptions,
}

impl HttpEmbedder {
    pub fn new(opts: &EncoderOptions) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(opts.embed_timeout))
            .build()
            .context("创建 HTTP 客户端失败")?;
        Ok(Self { http, opts: opts.clone() })
    }

    async fn post<T: DeserializeOwned>(&self, base: &str, path: &str, body: &Value) -> Result<T> {
        let url = format!("{}{}", base.trim_end_matches('/'), path);
        let resp = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("请求 {url} 失败"))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("嵌入服务返回 {}: {}", status, resp.text().await.unwrap_or_default());
        }
        resp.json().await.with_context(|| format!("解析 {url} 响应失败"))
    }

    /// 请求稠密嵌入，返回批次中的第一行
    async fn embed_dense(&self, base: &str, input: String) -> Result<Vec<f32>> {
        let rows: Vec<Vec<f32>> =
            self.post(base, "/embed", &json!({"inputs": [input]})).await?;
        rows.into_iter().next().context("嵌入服务返回空结果")
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed_image(&self, image: &[u8]) -> Result<Vec<f32>> {
        let encoded = STANDARD.encode(image);
        self.embed_dense(&self.opts.image_embed_url, encoded).await
    }

    async fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_dense(&self.opts.text_embed_url, text.to_owned()).await
    }

    async fn embed_sparse(&self, text: &str) -> Result<SparseVector> {
        let rows: Vec<Vec<SparseTerm>> = self
            .post(&self.opts.sparse_embed_url, "/embed_sparse", &json!({"inputs": [text]}))
            .await?;
        let row = rows.into_iter().next().context("嵌入服务返回空结果")?;
        Ok(SparseVector(row.into_iter().map(|t| (t.index, t.value)).collect()))
    }

    async fn embed_hybrid(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_dense(&self.opts.hybrid_embed_url, text.to_owned()).await
    }
}

use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;

use crate::config::StorageOptions;

/// 对象存储接口
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// 上传对象并返回可访问的 URL
    ///
    /// key 直接使用用户上传的文件名，同名对象会被静默覆盖，
    /// 但数据库中的两条记录仍然各自存在
    async fn put_object(&self, key: &str, bytes: &[u8]) -> Result<String>;
}

/// 基于 HTTP PUT 的对象存储客户端，适配 MinIO 等 S3 兼容网关
pub struct HttpObjectStorage {
    http: Client,
    endpoint: String,
    bucket: String,
}

impl HttpObjectStorage {
    pub fn new(opts: &StorageOptions) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(opts.s3_timeout))
            .build()
            .context("创建 HTTP 客户端失败")?;
        Ok(Self {
            http,
            endpoint: opts.s3_url.trim_end_matches('/').to_string(),
            bucket: opts.bucket.clone(),
        })
    }

    /// 对象的最终 URL，也就是写入记录的 s3path
    pub fn object_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn put_object(&self, key: &str, bytes: &[u8]) -> Result<String> {
        let url = self.object_url(key);
        let resp = self
            .http
            .put(&url)
            .header("Content-Type", content_type(key))
            .body(bytes.to_vec())
            .send()
            .await
            .with_context(|| format!("上传 {url} 失败"))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("对象存储返回 {}: {}", status, resp.text().await.unwrap_or_default());
        }
        Ok(url)
    }
}

fn content_type(key: &str) -> &'static str {
    match key.rsplit('.').next().map(|s| s.to_ascii_lowercase()).as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageOptions;

    fn storage() -> HttpObjectStorage {
        HttpObjectStorage::new(&StorageOptions {
            s3_url: "http://127.0.0.1:9000/".to_string(),
            bucket: "images".to_string(),
            s3_timeout: 5,
        })
        .unwrap()
    }

    #[test]
    fn object_url_joins_endpoint_bucket_key() {
        assert_eq!(
            storage().object_url("casper.png"),
            "http://127.0.0.1:9000/images/casper.png"
        );
    }

    #[test]
    fn content_type_by_suffix() {
        assert_eq!(content_type("casper.png"), "image/png");
        assert_eq!(content_type("casper.JPG"), "image/jpeg");
        assert_eq!(content_type("casper.jpeg"), "image/jpeg");
        assert_eq!(content_type("casper"), "application/octet-stream");
    }
}

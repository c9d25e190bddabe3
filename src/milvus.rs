use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use log::info;
use reqwest::Client;
use serde_json::{Value, json};

use crate::config::MilvusOptions;
use crate::schema::{GhostRecord, HYBRID_DIM, IMAGE_DIM, PARTITION_NUM, TEXT_DIM};

/// 向量数据库接口，插入是提交流程唯一用到的写操作
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// 插入一条完整记录，返回自动分配的 ID
    async fn insert(&self, record: &GhostRecord) -> Result<i64>;
}

/// Milvus RESTful v2 客户端
///
/// 只覆盖本项目用到的集合管理与插入接口，schema 在创建集合时一次性确定，
/// 之后的插入都必须与之一致
pub struct MilvusClient {
    http: Client,
    base: String,
    collection: String,
    nlist: usize,
}

impl MilvusClient {
    pub fn new(opts: &MilvusOptions) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(opts.milvus_timeout))
            .build()
            .context("创建 HTTP 客户端失败")?;
        Ok(Self {
            http,
            base: opts.milvus_url.trim_end_matches('/').to_string(),
            collection: opts.collection.clone(),
            nlist: opts.nlist,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// 发送请求并剥离 `{code, message, data}` 响应包装
    async fn post(&self, path: &str, body: Value) -> Result<Value> {
        let url = format!("{}/v2/vectordb{}", self.base, path);
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("请求 {url} 失败"))?;
        let status = resp.status();
        if !status.is_success() {
            bail!("Milvus 返回 {}: {}", status, resp.text().await.unwrap_or_default());
        }
        let mut envelope: Value = resp.json().await.context("解析 Milvus 响应失败")?;
        let code = envelope["code"].as_i64().unwrap_or(-1);
        if code != 0 {
            let message = envelope["message"].as_str().unwrap_or("unknown error");
            bail!("Milvus 请求 {path} 失败 (code {code}): {message}");
        }
        Ok(envelope["data"].take())
    }

    pub async fn has_collection(&self) -> Result<bool> {
        let data = self
            .post("/collections/has", json!({"collectionName": self.collection}))
            .await?;
        Ok(data["has"].as_bool().unwrap_or(false))
    }

    /// 创建集合，字段表与分区策略见 [`collection_schema_body`]
    pub async fn create_collection(&self) -> Result<()> {
        self.post("/collections/create", collection_schema_body(&self.collection)).await?;
        Ok(())
    }

    /// 为所有字段创建索引，索引策略见 [`index_params_body`]
    pub async fn create_indexes(&self) -> Result<()> {
        self.post("/indexes/create", index_params_body(&self.collection, self.nlist)).await?;
        Ok(())
    }

    pub async fn load_collection(&self) -> Result<()> {
        self.post("/collections/load", json!({"collectionName": self.collection})).await?;
        Ok(())
    }

    pub async fn load_state(&self) -> Result<String> {
        let data = self
            .post("/collections/get_load_state", json!({"collectionName": self.collection}))
            .await?;
        Ok(data["loadState"].as_str().unwrap_or("Unknown").to_string())
    }

    /// 幂等地确保集合存在：已存在则跳过创建，否则建集合、建索引，最后加载
    ///
    /// 任何一步失败都会向上传播，调用方应视为致命错误退出，
    /// 对着缺失或未索引的集合插入的行为是未定义的
    pub async fn ensure_collection(&self) -> Result<()> {
        if self.has_collection().await? {
            info!("集合 {} 已存在", self.collection);
        } else {
            info!("创建集合 {}", self.collection);
            self.create_collection().await.context("创建集合失败")?;
            self.create_indexes().await.context("创建索引失败")?;
        }
        self.load_collection().await.context("加载集合失败")?;
        let state = self.load_state().await?;
        info!("集合 {} 加载状态: {}", self.collection, state);
        Ok(())
    }
}

#[async_trait]
impl VectorStore for MilvusClient {
    async fn insert(&self, record: &GhostRecord) -> Result<i64> {
        let body = json!({
            "collectionName": self.collection,
            "data": [serde_json::to_value(record)?],
        });
        let data = self.post("/entities/insert", body).await?;
        data["insertIds"][0].as_i64().context("插入结果缺少记录 ID")
    }
}

fn varchar_field(name: &str, max_length: usize) -> Value {
    json!({
        "fieldName": name,
        "dataType": "VarChar",
        "elementTypeParams": {"max_length": max_length},
    })
}

fn vector_field(name: &str, dim: usize) -> Value {
    json!({
        "fieldName": name,
        "dataType": "FloatVector",
        "elementTypeParams": {"dim": dim},
    })
}

/// 集合 schema：一个自增主键、一组元数据字段、四个向量字段，
/// 按 ghostclass 分为 8 个分区
pub fn collection_schema_body(collection: &str) -> Value {
    let mut ghostclass = varchar_field("ghostclass", 20);
    ghostclass["isPartitionKey"] = json!(true);
    json!({
        "collectionName": collection,
        "schema": {
            "autoId": true,
            "enableDynamicField": false,
            "fields": [
                {"fieldName": "id", "dataType": "Int64", "isPrimary": true},
                ghostclass,
                varchar_field("filename", 256),
                varchar_field("s3path", 1024),
                varchar_field("description", 65000),
                varchar_field("category", 256),
                varchar_field("identification", 50),
                varchar_field("location", 256),
                varchar_field("country", 4),
                varchar_field("latitude", 20),
                varchar_field("longitude", 20),
                varchar_field("zipcode", 20),
                varchar_field("timestamp", 128),
                varchar_field("s3timestamp", 128),
                vector_field("vector", IMAGE_DIM),
                {"fieldName": "text_vector", "dataType": "SparseFloatVector"},
                vector_field("text_vector2", TEXT_DIM),
                vector_field("text_vector3", HYBRID_DIM),
            ],
        },
        "params": {"partitionsNum": PARTITION_NUM},
    })
}

/// 索引策略：主键排序索引、分区键前缀树、zipcode 倒排，
/// 三个稠密向量分别用余弦、余弦、欧氏度量，稀疏向量用内积
pub fn index_params_body(collection: &str, nlist: usize) -> Value {
    json!({
        "collectionName": collection,
        "indexParams": [
            {"fieldName": "id", "indexName": "id_sort", "params": {"index_type": "STL_SORT"}},
            {"fieldName": "ghostclass", "indexName": "ghostclass_trie", "params": {"index_type": "TRIE"}},
            {"fieldName": "zipcode", "indexName": "inverted_index", "params": {"index_type": "INVERTED"}},
            {"fieldName": "vector", "indexName": "vector_index", "metricType": "COSINE", "params": {"index_type": "AUTOINDEX"}},
            {"fieldName": "text_vector", "indexName": "text_vector_index", "metricType": "IP", "params": {"index_type": "SPARSE_INVERTED_INDEX"}},
            {"fieldName": "text_vector2", "indexName": "text_vector2_index", "metricType": "COSINE", "params": {"index_type": "AUTOINDEX"}},
            {"fieldName": "text_vector3", "indexName": "text_vector3_index", "metricType": "L2", "params": {"index_type": "IVF_FLAT", "nlist": nlist}},
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_has_all_fields() {
        let body = collection_schema_body("ghosts");
        assert_eq!(body["collectionName"], "ghosts");
        assert_eq!(body["schema"]["autoId"], true);

        let fields = body["schema"]["fields"].as_array().unwrap();
        assert_eq!(fields.len(), 18);

        let id = &fields[0];
        assert_eq!(id["dataType"], "Int64");
        assert_eq!(id["isPrimary"], true);

        let names: Vec<&str> =
            fields.iter().map(|f| f["fieldName"].as_str().unwrap()).collect();
        assert_eq!(
            names,
            [
                "id", "ghostclass", "filename", "s3path", "description", "category",
                "identification", "location", "country", "latitude", "longitude", "zipcode",
                "timestamp", "s3timestamp", "vector", "text_vector", "text_vector2",
                "text_vector3",
            ]
        );
    }

    #[test]
    fn schema_partitions_by_ghostclass() {
        let body = collection_schema_body("ghosts");
        let fields = body["schema"]["fields"].as_array().unwrap();
        let ghostclass =
            fields.iter().find(|f| f["fieldName"] == "ghostclass").unwrap();
        assert_eq!(ghostclass["isPartitionKey"], true);
        assert_eq!(ghostclass["elementTypeParams"]["max_length"], 20);
        assert_eq!(body["params"]["partitionsNum"], 8);
    }

    #[test]
    fn schema_vector_dimensions() {
        let body = collection_schema_body("ghosts");
        let fields = body["schema"]["fields"].as_array().unwrap();
        let dim = |name: &str| {
            fields.iter().find(|f| f["fieldName"] == name).unwrap()["elementTypeParams"]["dim"]
                .as_u64()
                .unwrap() as usize
        };
        assert_eq!(dim("vector"), IMAGE_DIM);
        assert_eq!(dim("text_vector2"), TEXT_DIM);
        assert_eq!(dim("text_vector3"), HYBRID_DIM);

        let sparse = fields.iter().find(|f| f["fieldName"] == "text_vector").unwrap();
        assert_eq!(sparse["dataType"], "SparseFloatVector");
    }

    #[test]
    fn index_policy() {
        let body = index_params_body("ghosts", 128);
        let params = body["indexParams"].as_array().unwrap();
        let by_field = |name: &str| {
            params.iter().find(|p| p["fieldName"] == name).unwrap()
        };

        assert_eq!(by_field("id")["params"]["index_type"], "STL_SORT");
        assert_eq!(by_field("ghostclass")["params"]["index_type"], "TRIE");
        assert_eq!(by_field("zipcode")["params"]["index_type"], "INVERTED");
        assert_eq!(by_field("vector")["metricType"], "COSINE");
        assert_eq!(by_field("text_vector")["metricType"], "IP");
        assert_eq!(by_field("text_vector")["params"]["index_type"], "SPARSE_INVERTED_INDEX");
        assert_eq!(by_field("text_vector2")["metricType"], "COSINE");
        assert_eq!(by_field("text_vector3")["metricType"], "L2");
        assert_eq!(by_field("text_vector3")["params"]["index_type"], "IVF_FLAT");
        assert_eq!(by_field("text_vector3")["params"]["nlist"], 128);
    }
}

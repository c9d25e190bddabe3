use std::fmt::Write;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::response::Html;
use axum_typed_multipart::TypedMultipart;
use log::{info, warn};
use serde_json::{Value, json};

use super::error::{AppError, Result};
use super::state::AppState;
use super::types::*;
use crate::schema::{Category, GhostClass, GhostMetadata, MAX_FILE_SIZE};

/// 提交一条目击记录
#[utoipa::path(
    post,
    path = "/submit",
    request_body(content = SubmitForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, body = SubmitResponse),
        (status = 400, description = "参数校验失败"),
        (status = 500, description = "提交失败"),
    )
)]
pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    data: TypedMultipart<SubmitRequest>,
) -> Result<Json<SubmitResponse>> {
    let filename = data
        .file
        .metadata
        .file_name
        .clone()
        .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("文件名不能为空")))?;

    // 大小校验先于流水线执行
    if data.file.contents.len() > MAX_FILE_SIZE {
        return Err(AppError::bad_request(anyhow::anyhow!(
            "上传文件过大: {} 字节，上限 50M",
            data.file.contents.len()
        )));
    }

    let ghostclass: GhostClass =
        data.ghostclass.parse().map_err(AppError::bad_request)?;
    let category: Category = data.category.parse().map_err(AppError::bad_request)?;
    let meta = GhostMetadata {
        ghostclass,
        category,
        description: data.description.clone(),
        identification: data.identification.clone(),
        location: data.location.clone(),
        country: data.country.clone(),
        latitude: data.latitude.clone(),
        longitude: data.longitude.clone(),
        zipcode: data.zipcode.clone(),
    };

    info!("正在处理上传图片 {filename}");
    let start = Instant::now();
    let outcome = state
        .pipeline
        .submit(&filename, &data.file.contents, &meta)
        .await
        .inspect_err(|e| warn!("{filename} 提交失败: {e:#}"))?;

    Ok(Json(SubmitResponse {
        id: outcome.id,
        s3path: outcome.s3path,
        time: start.elapsed().as_millis() as u64,
    }))
}

/// 健康检查，同时确认集合仍然存在
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let has = state.milvus.has_collection().await?;
    Ok(Json(json!({
        "status": "ok",
        "collection": state.milvus.collection(),
        "collection_exists": has,
    })))
}

/// prometheus 指标
pub async fn metrics_handler() -> Result<String> {
    let mut buf = String::new();
    let encoder = prometheus::TextEncoder::new();
    encoder.encode_utf8(&prometheus::gather(), &mut buf).map_err(anyhow::Error::from)?;
    Ok(buf)
}

/// 提交页面
pub async fn index_handler() -> Html<String> {
    let mut classes = String::new();
    for class in GhostClass::ALL {
        let _ = write!(classes, r#"<option value="{0}">{0}</option>"#, class);
    }
    let mut categories = String::new();
    for category in Category::ALL {
        let _ = write!(categories, r#"<option value="{0}">{0}</option>"#, category);
    }

    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>ghoststore</title></head>
<body>
<h2>Capture your ghost</h2>
<form action="/submit" method="post" enctype="multipart/form-data">
  <p><input type="file" name="file" accept=".png,.jpg,.jpeg" required></p>
  <p>Ghost Class: <select name="ghostclass">{classes}</select></p>
  <p>Category: <select name="category">{categories}</select></p>
  <p><input name="identification" placeholder="identification"></p>
  <p><input name="location" placeholder="location"></p>
  <p><input name="country" placeholder="country"></p>
  <p><input name="latitude" placeholder="latitude">
     <input name="longitude" placeholder="longitude"></p>
  <p><input name="zipcode" placeholder="zipcode"></p>
  <p><textarea name="description" placeholder="Description"></textarea></p>
  <p><button type="submit">Add Ghost</button></p>
</form>
<p><a href="/docs">API docs</a></p>
</body>
</html>"#
    ))
}

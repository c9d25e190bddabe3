use axum::body::Bytes;
use axum_typed_multipart::{FieldData, TryFromMultipart};
use serde::Serialize;
use utoipa::ToSchema;

/// 提交请求参数
#[derive(TryFromMultipart)]
pub struct SubmitRequest {
    pub file: FieldData<Bytes>,
    pub ghostclass: String,
    pub category: String,
    #[form_data(default)]
    pub description: String,
    #[form_data(default)]
    pub identification: String,
    #[form_data(default)]
    pub location: String,
    #[form_data(default)]
    pub country: String,
    #[form_data(default)]
    pub latitude: String,
    #[form_data(default)]
    pub longitude: String,
    #[form_data(default)]
    pub zipcode: String,
}

/// 提交表单（用于API文档）
#[derive(Debug, ToSchema)]
#[allow(unused)]
pub struct SubmitForm {
    /// 上传的图片文件，png/jpg/jpeg，不超过 50M
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
    /// 灵体分类，11 个固定取值之一
    pub ghostclass: String,
    /// 记录类别，7 个固定取值之一
    pub category: String,
    /// 描述文本，四个文本向量都由它计算
    pub description: Option<String>,
    pub identification: Option<String>,
    pub location: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub zipcode: Option<String>,
}

/// 提交响应
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitResponse {
    /// 新记录的 ID
    pub id: i64,
    /// 图片在对象存储中的 URL
    pub s3path: String,
    /// 处理耗时，单位为毫秒
    pub time: u64,
}

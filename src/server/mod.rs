mod api;
mod error;
mod state;
mod types;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::limit::RequestBodyLimitLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use self::state::*;
use crate::schema::MAX_FILE_SIZE;

#[derive(OpenApi)]
#[openapi(
    paths(api::submit_handler,),
    components(schemas(types::SubmitForm, types::SubmitResponse,),)
)]
pub struct ApiDoc;

/// 构建API服务器
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(api::index_handler))
        .route("/submit", post(api::submit_handler))
        .route("/healthz", get(api::health_handler))
        .route("/metrics", get(api::metrics_handler))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::disable())
        // 上传限制：50M，外加表单字段的余量
        .layer(RequestBodyLimitLayer::new(MAX_FILE_SIZE + 1024 * 1024))
        .with_state(state)
}

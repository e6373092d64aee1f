use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    config::InputLimits,
    detection::{AnalysisKind, MediaFile},
    fingerprint::describe_media,
    simulator::LocalSimulator,
};

// ==========================================
// 1. 演示后端的共享状态
// ==========================================
// 真正的检测服务不在本仓库里。这个服务暴露同样的接口，
// 用本地模拟器编造结果，方便在没有模型的环境里联调客户端。
pub struct AppState {
    pub simulator: Arc<LocalSimulator>,
    pub limits: InputLimits,
}

impl AppState {
    pub fn new(simulator: LocalSimulator, limits: InputLimits) -> Self {
        Self {
            simulator: Arc::new(simulator),
            limits,
        }
    }
}

// 后端接受的文件类型
const MEDIA_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/jpg",
    "video/mp4",
    "video/avi",
    "video/mov",
];
const AUDIO_TYPES: &[&str] = &["audio/mpeg", "audio/wav", "audio/ogg", "audio/mp4"];

// multipart 头部等额外开销
const MULTIPART_OVERHEAD: usize = 64 * 1024;

type ApiResult = Result<Json<Value>, (StatusCode, String)>;

// ==========================================
// 2. 路由
// ==========================================
// 检测接口同时挂在根路径和 `/api` 下，两种基地址写法都能连上；
// 探测只打服务根路径 `/`，所以根路由只有一个。
pub fn app(state: Arc<AppState>) -> Router {
    // 表单边界 + 字段头的余量，文件本身的上限在处理函数里单独判断
    let body_limit = state.limits.max_file_bytes + MULTIPART_OVERHEAD;

    let mut router = Router::new().route("/", get(root));

    for prefix in ["", "/api"] {
        router = router
            .route(&format!("{prefix}/deepfake"), post(deepfake_check))
            .route(&format!("{prefix}/voicecheck"), post(voice_check))
            .route(&format!("{prefix}/phishingcheck"), post(phishing_check));
    }

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()) // ⚠️ 演示模式：允许所有跨域
        .with_state(state)
}

// ==========================================
// 3. 处理函数
// ==========================================

async fn root() -> Json<Value> {
    Json(json!({ "service": "AI FraudShield", "status": "ok" }))
}

async fn deepfake_check(State(state): State<Arc<AppState>>, multipart: Multipart) -> ApiResult {
    media_check(
        &state,
        AnalysisKind::Deepfake,
        multipart,
        MEDIA_TYPES,
        "Unsupported file type. Please upload an image or video file.",
    )
    .await
}

async fn voice_check(State(state): State<Arc<AppState>>, multipart: Multipart) -> ApiResult {
    media_check(
        &state,
        AnalysisKind::Voice,
        multipart,
        AUDIO_TYPES,
        "Unsupported file type. Please upload an audio file.",
    )
    .await
}

async fn phishing_check(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> ApiResult {
    let kind = AnalysisKind::Phishing;
    let text = loop {
        let field = multipart.next_field().await.map_err(bad_request)?;
        let Some(field) = field else {
            return Err(missing_field(kind));
        };
        if field.name() == Some(kind.field_name()) {
            break field.text().await.map_err(bad_request)?;
        }
    };

    if text.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Input text cannot be empty.".to_string(),
        ));
    }
    if text.chars().count() > state.limits.max_text_chars {
        return Err((
            StatusCode::BAD_REQUEST,
            format!(
                "Input text is too long. Maximum {} characters allowed.",
                state.limits.max_text_chars
            ),
        ));
    }

    info!("📥 收到检测请求: kind={}, chars={}", kind, text.chars().count());
    let result = state.simulator.simulate(kind).await;
    Ok(Json(result.to_json_value()))
}

async fn media_check(
    state: &AppState,
    kind: AnalysisKind,
    mut multipart: Multipart,
    allowed: &[&str],
    rejection: &str,
) -> ApiResult {
    // 1. 找到文件字段
    let upload = loop {
        let field = multipart.next_field().await.map_err(bad_request)?;
        let Some(field) = field else {
            return Err(missing_field(kind));
        };
        if field.name() != Some(kind.field_name()) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(bad_request)?;
        break MediaFile::new(file_name, content_type, bytes.to_vec());
    };

    // 2. 类型 / 大小校验
    if !allowed.contains(&upload.content_type.as_str()) {
        return Err((StatusCode::BAD_REQUEST, rejection.to_string()));
    }
    if upload.len() > state.limits.max_file_bytes {
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            "File size exceeds upload limit.".to_string(),
        ));
    }

    // 3. 编造结果
    info!("📥 收到检测请求: kind={}, file={}", kind, describe_media(&upload));
    let result = state.simulator.simulate(kind).await;
    Ok(Json(result.to_json_value()))
}

fn bad_request(error: impl std::fmt::Display) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, format!("Malformed form data: {error}"))
}

fn missing_field(kind: AnalysisKind) -> (StatusCode, String) {
    (
        StatusCode::BAD_REQUEST,
        format!("Missing form field '{}'.", kind.field_name()),
    )
}

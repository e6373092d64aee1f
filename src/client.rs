//! 检测后端 HTTP 客户端
//!
//! 三个检测接口各对应一个方法，均为单次尝试：不重试、不缓存、不取消。

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::detection::{AnalysisKind, DetectionRequest, DetectionResult, MediaFile};
use crate::error::DetectionError;
use crate::fingerprint::describe_media;
use crate::probe::{self, ProbeOutcome};

use std::time::Duration;

/// 检测后端的抽象。远端 HTTP 客户端和本地模拟器都实现它，
/// 表单控制器只依赖这个 trait。
#[async_trait]
pub trait DetectionBackend: Send + Sync {
    async fn detect(&self, request: DetectionRequest) -> Result<DetectionResult, DetectionError>;
}

/// 远端检测服务客户端
#[derive(Debug, Clone)]
pub struct FraudShieldClient {
    base_url: String,
    probe_url: String,
    probe_timeout: Duration,
    http: reqwest::Client,
}

impl FraudShieldClient {
    /// 基地址在这里解析一次，之后所有接口地址都从它拼出来
    pub fn new(config: &Config) -> Result<Self, DetectionError> {
        let base_url = resolve_base_url(&config.api_base_url)?;
        let probe_url = resolve_probe_url(&base_url)?;
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| DetectionError::Config(format!("failed to build HTTP client: {e}")))?;

        debug!(
            "检测客户端初始化完成: base_url={}, probe_url={}",
            base_url, probe_url
        );

        Ok(Self {
            base_url,
            probe_url,
            probe_timeout: config.probe_timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 探测地址永远是服务根路径，与基地址是否带 `/api` 无关
    pub fn probe_url(&self) -> &str {
        &self.probe_url
    }

    pub fn endpoint_url(&self, kind: AnalysisKind) -> String {
        format!("{}{}", self.base_url, kind.endpoint_path())
    }

    /// 深度伪造检测：图片 / 视频
    pub async fn submit_deepfake(&self, file: MediaFile) -> Result<DetectionResult, DetectionError> {
        self.submit_media(AnalysisKind::Deepfake, file).await
    }

    /// 语音真实性检测：音频
    pub async fn submit_voice(&self, file: MediaFile) -> Result<DetectionResult, DetectionError> {
        self.submit_media(AnalysisKind::Voice, file).await
    }

    /// 钓鱼检测：URL 或正文文本
    pub async fn submit_phishing(&self, text: &str) -> Result<DetectionResult, DetectionError> {
        let kind = AnalysisKind::Phishing;
        info!("📥 提交检测请求: kind={}, chars={}", kind, text.chars().count());

        let form = Form::new().text(kind.field_name(), text.to_string());
        self.post_form(kind, form).await
    }

    pub async fn submit(&self, request: DetectionRequest) -> Result<DetectionResult, DetectionError> {
        match request {
            DetectionRequest::Deepfake(file) => self.submit_deepfake(file).await,
            DetectionRequest::Voice(file) => self.submit_voice(file).await,
            DetectionRequest::Phishing(text) => self.submit_phishing(&text).await,
        }
    }

    /// 连通性探测：GET 服务根路径，超时即放弃
    pub async fn probe(&self) -> ProbeOutcome {
        probe::probe_url(&self.http, &self.probe_url, self.probe_timeout).await
    }

    async fn submit_media(
        &self,
        kind: AnalysisKind,
        file: MediaFile,
    ) -> Result<DetectionResult, DetectionError> {
        info!("📥 提交检测请求: kind={}, file={}", kind, describe_media(&file));

        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|e| {
                DetectionError::Validation(format!(
                    "Unsupported content type '{}': {e}",
                    file.content_type
                ))
            })?;

        let form = Form::new().part(kind.field_name(), part);
        self.post_form(kind, form).await
    }

    async fn post_form(
        &self,
        kind: AnalysisKind,
        form: Form,
    ) -> Result<DetectionResult, DetectionError> {
        // 0. 接口地址 = 基地址 + 固定路径
        let url = self.endpoint_url(kind);

        // 1. 发送：拿不到响应就是网络错误
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                warn!("❌ 请求未送达: url={}, error={}", url, e);
                DetectionError::Network(e.to_string())
            })?;

        // 2. 状态码：非 2xx 一律视为传输错误
        let status = response.status();
        if !status.is_success() {
            warn!("❌ 后端返回错误状态: url={}, status={}", url, status.as_u16());
            return Err(DetectionError::Transport {
                status: status.as_u16(),
            });
        }

        // 3. 解码：按调用的接口决定结果结构
        //    同一份 JSON 只会按本接口的形状解析，形状不符即解码错误
        let body = response
            .bytes()
            .await
            .map_err(|e| DetectionError::Network(e.to_string()))?;
        let result = DetectionResult::from_json(kind, &body)
            .map_err(|e| DetectionError::Decode(e.to_string()))?;

        info!("✅ 检测完成: kind={}", kind);
        Ok(result)
    }
}

#[async_trait]
impl DetectionBackend for FraudShieldClient {
    async fn detect(&self, request: DetectionRequest) -> Result<DetectionResult, DetectionError> {
        self.submit(request).await
    }
}

/// 校验基地址并去掉末尾的 `/`
///
/// `http://host:8000` 和 `https://host/api` 都是合法的基地址。
pub fn resolve_base_url(raw: &str) -> Result<String, DetectionError> {
    let parsed = Url::parse(raw.trim())
        .map_err(|e| DetectionError::Config(format!("invalid base url '{raw}': {e}")))?;

    // 1. 只接受 http / https
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(DetectionError::Config(format!(
            "base url must use http or https, got '{}'",
            parsed.scheme()
        )));
    }

    // 2. 接口路径直接拼在后面，带查询串或片段会拼出错误地址
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(DetectionError::Config(format!(
            "base url must not carry a query or fragment: '{raw}'"
        )));
    }

    // 3. 去掉末尾 `/`，后面统一用 `{base}{path}` 拼接
    Ok(parsed.as_str().trim_end_matches('/').to_string())
}

/// 由基地址推出服务根路径 `scheme://host:port/`
fn resolve_probe_url(base_url: &str) -> Result<String, DetectionError> {
    Url::parse(base_url)
        .and_then(|base| base.join("/"))
        .map(String::from)
        .map_err(|e| DetectionError::Config(format!("invalid base url '{base_url}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_with_and_without_prefix() {
        assert_eq!(
            resolve_base_url("http://localhost:8000").unwrap(),
            "http://localhost:8000"
        );
        assert_eq!(
            resolve_base_url("https://fraudshield.example/api/").unwrap(),
            "https://fraudshield.example/api"
        );
    }

    #[test]
    fn rejects_relative_and_foreign_schemes() {
        assert!(matches!(
            resolve_base_url("/api"),
            Err(DetectionError::Config(_))
        ));
        assert!(matches!(
            resolve_base_url("ftp://example.test"),
            Err(DetectionError::Config(_))
        ));
    }

    #[test]
    fn rejects_query_and_fragment() {
        assert!(matches!(
            resolve_base_url("http://h/api?x=1"),
            Err(DetectionError::Config(_))
        ));
        assert!(matches!(
            resolve_base_url("http://h/api#top"),
            Err(DetectionError::Config(_))
        ));
    }

    #[test]
    fn connectivity_check_targets_the_server_root() {
        for base in ["http://localhost:8000", "http://localhost:8000/api/"] {
            let config = Config {
                api_base_url: base.to_string(),
                ..Config::default()
            };
            let client = FraudShieldClient::new(&config).unwrap();
            assert_eq!(client.probe_url(), "http://localhost:8000/");
        }
    }

    #[test]
    fn endpoints_hang_off_one_base() {
        let config = Config {
            api_base_url: "https://fraudshield.example/api".to_string(),
            ..Config::default()
        };
        let client = FraudShieldClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint_url(AnalysisKind::Deepfake),
            "https://fraudshield.example/api/deepfake"
        );
        assert_eq!(
            client.endpoint_url(AnalysisKind::Voice),
            "https://fraudshield.example/api/voicecheck"
        );
        assert_eq!(
            client.endpoint_url(AnalysisKind::Phishing),
            "https://fraudshield.example/api/phishingcheck"
        );
    }
}

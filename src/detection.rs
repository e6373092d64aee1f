use serde::{Deserialize, Serialize}; // 结果结构直接对应后端返回的 JSON
use std::fmt;
use std::path::Path;

// ==========================================
// 1. 检测类型 (三个 Tab)
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisKind {
    Deepfake,
    Voice,
    Phishing,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 3] = [
        AnalysisKind::Deepfake,
        AnalysisKind::Voice,
        AnalysisKind::Phishing,
    ];

    /// 相对于基地址的接口路径
    pub fn endpoint_path(self) -> &'static str {
        match self {
            AnalysisKind::Deepfake => "/deepfake",
            AnalysisKind::Voice => "/voicecheck",
            AnalysisKind::Phishing => "/phishingcheck",
        }
    }

    /// multipart 表单中承载输入的字段名
    pub fn field_name(self) -> &'static str {
        match self {
            AnalysisKind::Deepfake | AnalysisKind::Voice => "file",
            AnalysisKind::Phishing => "input_text",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AnalysisKind::Deepfake => "Deepfake Detection",
            AnalysisKind::Voice => "Voice Authenticity",
            AnalysisKind::Phishing => "Phishing Detector",
        }
    }

    /// deepfake / voice 需要上传文件，phishing 只需要文本
    pub fn takes_file(self) -> bool {
        !matches!(self, AnalysisKind::Phishing)
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnalysisKind::Deepfake => "deepfake",
            AnalysisKind::Voice => "voice",
            AnalysisKind::Phishing => "phishing",
        };
        f.write_str(name)
    }
}

// ==========================================
// 2. 请求 (DetectionRequest)
// ==========================================

/// 用户选择的待检测文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl MediaFile {
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// 从磁盘读取文件，按扩展名推断 MIME 类型
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = guess_content_type(path).to_string();

        Ok(Self {
            file_name,
            content_type,
            bytes,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// 按扩展名推断 MIME 类型，覆盖后端接受的图片/视频/音频格式
pub fn guess_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "mp4" => "video/mp4",
        "avi" => "video/avi",
        "mov" => "video/mov",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        _ => "application/octet-stream",
    }
}

/// 一次提交的请求体。由表单控制器创建，后端调用结束后即丢弃。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionRequest {
    Deepfake(MediaFile),
    Voice(MediaFile),
    Phishing(String),
}

impl DetectionRequest {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            DetectionRequest::Deepfake(_) => AnalysisKind::Deepfake,
            DetectionRequest::Voice(_) => AnalysisKind::Voice,
            DetectionRequest::Phishing(_) => AnalysisKind::Phishing,
        }
    }
}

// ==========================================
// 3. 结果 (DetectionResult)
// ==========================================
// 约定：confidence 一律是 0~1 的小数；risk_percentage 一律是 0~100 的整数。

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepfakeVerdict {
    pub is_deepfake: bool,
    pub confidence: f64,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceVerdict {
    pub is_fake: bool,
    pub confidence: f64,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhishingVerdict {
    pub risk_level: RiskLevel,
    pub risk_percentage: u8,
    pub explanation: String,
}

/// 钓鱼检测的风险等级
///
/// 后端分析失败时会返回 `"Unknown"`，其他无法识别的字符串同样落到 `Unknown`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskLevel {
    /// 百分比分档：>70 高，>40 中，其余低
    pub fn from_percentage(percentage: u8) -> Self {
        if percentage > 70 {
            RiskLevel::High
        } else if percentage > 40 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Unknown => "Unknown",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw {
            "Low" => RiskLevel::Low,
            "Medium" => RiskLevel::Medium,
            "High" => RiskLevel::High,
            _ => RiskLevel::Unknown,
        }
    }
}

impl Serialize for RiskLevel {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RiskLevel {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(RiskLevel::parse(&raw))
    }
}

/// 后端结果。变体由调用的接口决定，而不是事后根据字段猜测。
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionResult {
    Deepfake(DeepfakeVerdict),
    Voice(VoiceVerdict),
    Phishing(PhishingVerdict),
}

impl DetectionResult {
    pub fn kind(&self) -> AnalysisKind {
        match self {
            DetectionResult::Deepfake(_) => AnalysisKind::Deepfake,
            DetectionResult::Voice(_) => AnalysisKind::Voice,
            DetectionResult::Phishing(_) => AnalysisKind::Phishing,
        }
    }

    pub fn explanation(&self) -> &str {
        match self {
            DetectionResult::Deepfake(v) => &v.explanation,
            DetectionResult::Voice(v) => &v.explanation,
            DetectionResult::Phishing(v) => &v.explanation,
        }
    }

    /// 按接口类型把 JSON 解码成对应的结果结构
    pub fn from_json(kind: AnalysisKind, raw: &[u8]) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            AnalysisKind::Deepfake => DetectionResult::Deepfake(serde_json::from_slice(raw)?),
            AnalysisKind::Voice => DetectionResult::Voice(serde_json::from_slice(raw)?),
            AnalysisKind::Phishing => DetectionResult::Phishing(serde_json::from_slice(raw)?),
        })
    }

    /// 序列化成后端的线上格式 (不带类型标签)
    pub fn to_json_value(&self) -> serde_json::Value {
        let value = match self {
            DetectionResult::Deepfake(v) => serde_json::to_value(v),
            DetectionResult::Voice(v) => serde_json::to_value(v),
            DetectionResult::Phishing(v) => serde_json::to_value(v),
        };
        // 三个结构都只含基础字段，序列化不会失败
        value.unwrap_or(serde_json::Value::Null)
    }
}

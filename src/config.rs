use std::env;
use std::time::Duration;

/// 上传文件大小上限 (10 MiB)，与旧版静态页面的前端校验一致
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// 钓鱼检测文本长度上限，与后端校验一致
pub const DEFAULT_MAX_TEXT_CHARS: usize = 10_000;

#[derive(Debug, Clone)]
pub struct Config {
    // 后端基地址，可以带 `/api` 前缀，也可以不带。启动时解析一次。
    pub api_base_url: String,
    pub probe_timeout: Duration,
    pub max_upload_bytes: usize,
    pub max_text_chars: usize,
    pub session_path: String,
    // 以下仅供演示后端 (serve-demo) 使用
    pub host: String,
    pub port: u16,
    pub demo_latency: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            probe_timeout: Duration::from_secs(5),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
            session_path: "data/session_db".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            demo_latency: Duration::from_millis(1500),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            api_base_url: env::var("FRAUDSHIELD_API_URL").unwrap_or(defaults.api_base_url),
            probe_timeout: parse_env("FRAUDSHIELD_PROBE_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.probe_timeout),
            max_upload_bytes: parse_env("FRAUDSHIELD_MAX_UPLOAD_BYTES")
                .unwrap_or(defaults.max_upload_bytes),
            max_text_chars: parse_env("FRAUDSHIELD_MAX_TEXT_CHARS")
                .unwrap_or(defaults.max_text_chars),
            session_path: env::var("FRAUDSHIELD_SESSION_PATH").unwrap_or(defaults.session_path),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_env("PORT").unwrap_or(defaults.port),
            demo_latency: parse_env("FRAUDSHIELD_DEMO_LATENCY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.demo_latency),
        }
    }

    /// 表单本地校验使用的输入限制
    pub fn input_limits(&self) -> InputLimits {
        InputLimits {
            max_file_bytes: self.max_upload_bytes,
            max_text_chars: self.max_text_chars,
        }
    }
}

/// 提交前的本地输入限制 (前端和演示后端共用)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputLimits {
    pub max_file_bytes: usize,
    pub max_text_chars: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_file_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_text_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }
}

// 未设置或无法解析时返回 None，由调用方回落到默认值
fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|raw| raw.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_limits() {
        let config = Config::default();
        assert_eq!(config.probe_timeout, Duration::from_secs(5));
        assert_eq!(config.input_limits(), InputLimits::default());
        assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
    }
}

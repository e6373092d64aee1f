//! 连通性探测
//!
//! 启动时对后端根路径发一次 GET，只用于诊断展示，不影响任何检测功能。

use std::time::Duration;

use reqwest::header::ACCESS_CONTROL_ALLOW_ORIGIN;
use tokio::sync::OnceCell;
use tracing::{info, warn};

use crate::client::FraudShieldClient;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 2xx。顺带记录 CORS 头，前端跨域访问依赖它
    Connected { cors_allow_origin: Option<String> },
    /// 有响应但状态码不是 2xx
    ConnectionError { status: u16 },
    /// 超时未响应，请求已被取消
    Timeout,
    /// 其他网络异常 (连接被拒绝、DNS 失败……)
    ConnectionFailed { message: String },
}

impl ProbeOutcome {
    pub fn is_connected(&self) -> bool {
        matches!(self, ProbeOutcome::Connected { .. })
    }

    pub fn status_line(&self) -> &'static str {
        match self {
            ProbeOutcome::Connected { .. } => "✅ Connected",
            ProbeOutcome::ConnectionError { .. } => "❌ Connection Error",
            ProbeOutcome::Timeout => "❌ Timeout",
            ProbeOutcome::ConnectionFailed { .. } => "❌ Connection Failed",
        }
    }

    pub fn details(&self) -> String {
        match self {
            ProbeOutcome::Connected { .. } => {
                "Frontend successfully connected to backend API".to_string()
            }
            ProbeOutcome::ConnectionError { status } => {
                format!("Backend returned status {status}")
            }
            ProbeOutcome::Timeout => {
                "Connection timed out - backend may not be running".to_string()
            }
            ProbeOutcome::ConnectionFailed { message } => format!("Error: {message}"),
        }
    }
}

/// 对指定地址做一次带超时的 GET
///
/// 超时通过丢弃请求 future 实现，底层连接随之取消。
pub async fn probe_url(http: &reqwest::Client, url: &str, timeout: Duration) -> ProbeOutcome {
    let outcome = match tokio::time::timeout(timeout, http.get(url).send()).await {
        Err(_elapsed) => ProbeOutcome::Timeout,
        Ok(Err(e)) if e.is_timeout() => ProbeOutcome::Timeout,
        Ok(Err(e)) => ProbeOutcome::ConnectionFailed {
            message: e.to_string(),
        },
        Ok(Ok(response)) if response.status().is_success() => ProbeOutcome::Connected {
            cors_allow_origin: response
                .headers()
                .get(ACCESS_CONTROL_ALLOW_ORIGIN)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
        },
        Ok(Ok(response)) => ProbeOutcome::ConnectionError {
            status: response.status().as_u16(),
        },
    };

    if outcome.is_connected() {
        info!("🔌 后端连通: url={}", url);
    } else {
        warn!("🔌 后端不可用: url={}, outcome={:?}", url, outcome);
    }

    outcome
}

/// 只跑一次的探测器：第一次读取时发请求，之后一直返回同一个结果
#[derive(Debug, Default)]
pub struct ConnectivityProbe {
    outcome: OnceCell<ProbeOutcome>,
}

impl ConnectivityProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn run_once(&self, client: &FraudShieldClient) -> &ProbeOutcome {
        self.outcome.get_or_init(|| client.probe()).await
    }

    /// 尚未探测时为 None
    pub fn outcome(&self) -> Option<&ProbeOutcome> {
        self.outcome.get()
    }
}

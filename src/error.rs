use thiserror::Error;

/// 一次检测提交可能遇到的全部错误
///
/// 所有错误只终止当前这一次提交，控制器会回到可以重新提交的状态。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectionError {
    /// 本地校验失败 (没选文件、文本为空、超出大小限制)，不会发出网络请求
    #[error("{0}")]
    Validation(String),

    /// 后端返回了非 2xx 状态码
    #[error("Server error: {status}")]
    Transport { status: u16 },

    /// 根本没有拿到响应 (DNS 失败、连接被拒绝等)
    #[error("Network error: {0}")]
    Network(String),

    /// 2xx 响应，但 JSON 和对应接口的结果结构对不上
    #[error("Unexpected response body: {0}")]
    Decode(String),

    /// 基地址等配置无效
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl DetectionError {
    /// 传输层错误携带的 HTTP 状态码
    pub fn status(&self) -> Option<u16> {
        match self {
            DetectionError::Transport { status } => Some(*status),
            _ => None,
        }
    }
}

//! AI FraudShield 客户端核心
//!
//! 输入 (文件 / 文本) -> [`controller::TabController`] 校验并发起提交 ->
//! [`client::DetectionBackend`] (远端 HTTP 或本地模拟器) 返回结果 ->
//! [`normalize::normalize`] 统一成展示模型 -> 控制器状态更新。

pub mod api;
pub mod client;
pub mod config;
pub mod controller;
pub mod detection;
pub mod error;
pub mod fingerprint;
pub mod normalize;
pub mod probe;
pub mod session;
pub mod simulator;

pub use client::{DetectionBackend, FraudShieldClient};
pub use config::{Config, InputLimits};
pub use controller::{Dashboard, TabController, TabState};
pub use detection::{AnalysisKind, DetectionRequest, DetectionResult, MediaFile, RiskLevel};
pub use error::DetectionError;
pub use normalize::{normalize, DisplayModel, RiskClass};
pub use probe::{ConnectivityProbe, ProbeOutcome};

//! 集成测试共用的小工具：在随机端口上拉起 axum 服务

#![allow(dead_code)]

use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use fraudshield_core::api::{self, AppState};
use fraudshield_core::simulator::LocalSimulator;
use fraudshield_core::{Config, InputLimits};

/// 启动服务，返回形如 `http://127.0.0.1:port` 的基地址
pub async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// 固定种子、零延迟的演示后端
pub fn demo_app() -> Router {
    demo_app_with(InputLimits::default())
}

/// 自定义输入上限的演示后端，便于用小文件触发大小校验
pub fn demo_app_with(limits: InputLimits) -> Router {
    api::app(Arc::new(AppState::new(LocalSimulator::with_seed(1), limits)))
}

pub fn config_for(base_url: &str) -> Config {
    Config {
        api_base_url: base_url.to_string(),
        probe_timeout: Duration::from_millis(500),
        ..Config::default()
    }
}

/// 一个绑定过又释放掉的端口，连上去会被拒绝
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fraudshield_core::{
    api,
    session::SessionStore,
    simulator::LocalSimulator,
    AnalysisKind, Config, ConnectivityProbe, FraudShieldClient, MediaFile, TabController,
    TabState,
};

#[derive(Parser)]
#[command(name = "fraudshield", version, about = "AI FraudShield 命令行客户端")]
struct Cli {
    /// 演示模式：不访问后端，本地随机编造结果
    #[arg(long, global = true)]
    demo: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 检查后端是否可达
    Probe,
    /// 深度伪造检测 (图片 / 视频)
    Deepfake { path: PathBuf },
    /// 语音真实性检测 (音频)
    Voice { path: PathBuf },
    /// 钓鱼检测 (URL 或正文)
    Phishing { text: String },
    /// 本地占位登录 (不做任何服务端校验)
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// 查看当前会话
    Whoami,
    /// 启动演示后端 (随机结果)
    ServeDemo {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

enum AnalysisInput {
    File(PathBuf),
    Text(String),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ----------------------------------------------------------------
    // 0. 配置 & 日志 (先加载 .env，RUST_LOG 才能写在里面)
    // ----------------------------------------------------------------
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fraudshield=info,fraudshield_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    let cli = Cli::parse();

    debug!(
        "⚙️  配置加载完成: api={}, session={}, demo={}",
        config.api_base_url, config.session_path, cli.demo
    );

    // ----------------------------------------------------------------
    // 1. 分发子命令
    // ----------------------------------------------------------------
    match cli.command {
        Command::Probe => run_probe(&config).await,
        Command::Deepfake { path } => {
            run_analysis(&config, cli.demo, AnalysisKind::Deepfake, AnalysisInput::File(path)).await
        }
        Command::Voice { path } => {
            run_analysis(&config, cli.demo, AnalysisKind::Voice, AnalysisInput::File(path)).await
        }
        Command::Phishing { text } => {
            run_analysis(&config, cli.demo, AnalysisKind::Phishing, AnalysisInput::Text(text)).await
        }
        Command::Login { email, password } => {
            let store = SessionStore::open(&config.session_path)?;
            let session = store.login(&email, &password)?;
            println!("✅ Signed in as {} <{}>", session.name, session.email);
            Ok(())
        }
        Command::Logout => {
            SessionStore::open(&config.session_path)?.logout()?;
            println!("👋 Signed out");
            Ok(())
        }
        Command::Whoami => {
            match SessionStore::open(&config.session_path)?.current()? {
                Some(session) => println!("{} <{}>", session.name, session.email),
                None => println!("Not signed in"),
            }
            Ok(())
        }
        Command::ServeDemo { host, port } => {
            let host = host.unwrap_or_else(|| config.host.clone());
            let port = port.unwrap_or(config.port);
            serve_demo(&config, &host, port).await
        }
    }
}

async fn run_probe(config: &Config) -> anyhow::Result<()> {
    let client = FraudShieldClient::new(config)?;
    let outcome = client.probe().await;

    println!("API Connection Status: {}", outcome.status_line());
    println!("  {}", outcome.details());
    if let fraudshield_core::ProbeOutcome::Connected {
        cors_allow_origin: Some(origin),
    } = &outcome
    {
        println!("  Access-Control-Allow-Origin: {origin}");
    }

    if outcome.is_connected() {
        Ok(())
    } else {
        anyhow::bail!("backend at {} is not reachable", client.base_url())
    }
}

async fn run_analysis(
    config: &Config,
    demo: bool,
    kind: AnalysisKind,
    input: AnalysisInput,
) -> anyhow::Result<()> {
    greet(config);

    // 1. 填表
    let mut tab = TabController::new(kind, config.input_limits());
    match input {
        AnalysisInput::File(path) => {
            let file = MediaFile::from_path(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            tab.set_file(Some(file));
        }
        AnalysisInput::Text(text) => tab.set_text(text),
    }

    // 2. 提交；远端模式下连通性探测与提交同时进行
    println!("⏳ Analyzing content...");
    if demo {
        let simulator = LocalSimulator::new(config.demo_latency);
        tab.submit(&simulator).await;
    } else {
        let client = FraudShieldClient::new(config)?;
        let probe = ConnectivityProbe::new();
        let (_, outcome) = tokio::join!(
            async {
                tab.submit(&client).await;
            },
            probe.run_once(&client)
        );
        debug!("🔌 连通性: {} - {}", outcome.status_line(), outcome.details());
    }

    // 3. 展示
    render(kind, tab.state())
}

// 没登录过就不碰存储目录
fn greet(config: &Config) {
    let current = SessionStore::open_existing(&config.session_path).and_then(|store| match store {
        Some(store) => store.current(),
        None => Ok(None),
    });
    match current {
        Ok(Some(session)) => println!("Welcome back, {}", session.name),
        Ok(None) => {}
        Err(error) => debug!("会话读取失败: {}", error),
    }
}

fn render(kind: AnalysisKind, state: &TabState) -> anyhow::Result<()> {
    match state {
        TabState::Success(model) => {
            let filled = usize::from(model.confidence_percent) / 5;
            println!("{}", kind.label());
            println!("  Result:      {} ({})", model.badge_text, model.risk_class.as_str());
            println!(
                "  Confidence:  {}% [{}{}]",
                model.confidence_percent,
                "#".repeat(filled),
                "-".repeat(20 - filled)
            );
            println!("  Explanation: {}", model.explanation);
            Ok(())
        }
        TabState::Error(message) => anyhow::bail!("Error: {message}"),
        TabState::Idle {
            validation_error: Some(message),
        } => anyhow::bail!("{message}"),
        other => anyhow::bail!("analysis did not finish: {other:?}"),
    }
}

async fn serve_demo(config: &Config, host: &str, port: u16) -> anyhow::Result<()> {
    let state = Arc::new(api::AppState::new(
        LocalSimulator::new(config.demo_latency),
        config.input_limits(),
    ));
    let app = api::app(state);

    let addr = format!("{host}:{port}");
    let listener = TcpListener::bind(&addr).await?;

    info!("🚀 演示后端已运行在: http://{}", addr);
    info!("   - GET  /               : 连通性探测");
    info!("   - POST /deepfake       : 深度伪造检测 (multipart: file)");
    info!("   - POST /voicecheck     : 语音真实性检测 (multipart: file)");
    info!("   - POST /phishingcheck  : 钓鱼检测 (multipart: input_text)");
    info!("   (三个检测接口同时挂在 /api 前缀下)");

    axum::serve(listener, app).await?;
    Ok(())
}

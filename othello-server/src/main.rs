use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use othello_server::{OthelloServer, ServerConfig};
use protocol::{NetworkConfig, TcpListener};

/// 黑白棋对战服务端
#[derive(Parser, Debug)]
#[command(name = "othello-server")]
#[command(about = "Two-player Othello game server", long_about = None)]
#[command(version)]
struct Cli {
    /// 监听地址
    host: String,

    /// 监听端口
    port: u16,

    /// 执黑抽签的随机种子
    #[arg(long)]
    seed: Option<u64>,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 初始化日志
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("othello_server={}", level).parse()?)
                .add_directive(format!("protocol={}", level).parse()?),
        )
        .init();

    info!("黑白棋服务端启动中...");

    let config = ServerConfig {
        network: NetworkConfig::new(cli.host, cli.port),
        seed: cli.seed,
    };
    let mut server = OthelloServer::<TcpListener>::bind(&config)
        .await
        .with_context(|| format!("无法监听 {}", config.network.addr()))?;

    tokio::select! {
        _ = server.serve() => {}
        _ = tokio::signal::ctrl_c() => info!("收到中断信号，服务端退出"),
    }

    Ok(())
}

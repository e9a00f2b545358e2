use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use othello_client::{ClientOptions, Ending, OthelloClient, StdinLines};
use protocol::{Connector, NetworkConfig, TcpConnector};

/// 黑白棋终端客户端
#[derive(Parser, Debug)]
#[command(name = "othello-client")]
#[command(about = "Terminal client for the two-player Othello server", long_about = None)]
#[command(version)]
struct Cli {
    /// 服务端地址
    host: String,

    /// 服务端端口
    port: u16,

    /// 昵称，未指定时在终端输入
    #[arg(long)]
    name: Option<String>,

    /// 关闭 ANSI 颜色
    #[arg(long)]
    no_color: bool,

    /// 输出调试日志
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let result = tokio::runtime::Runtime::new()
        .context("无法创建运行时")
        .and_then(|runtime| {
            let result = runtime.block_on(run(cli));
            // 放弃的标准输入读取仍占着阻塞线程，不等待它结束
            runtime.shutdown_background();
            result
        });

    if let Err(e) = result {
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // 初始化日志（输出到 stderr，避免与棋盘混在一起）
    let level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("othello_client={}", level).parse()?)
                .add_directive(format!("protocol={}", level).parse()?),
        )
        .init();

    let network = NetworkConfig::new(cli.host, cli.port);
    let addr = network.addr();
    let conn = TcpConnector
        .connect(&addr)
        .await
        .with_context(|| format!("无法连接到 {}", addr))?;
    info!("已连接到服务端: {}", addr);
    println!("Connected to server {}", addr);

    let options = ClientOptions {
        name: cli.name,
        color: !cli.no_color,
    };
    let mut client = OthelloClient::new(conn, StdinLines::new(), std::io::stdout(), options);

    match client.run().await? {
        Ending::GameOver(outcome) => info!("对局结束: {}", outcome),
        Ending::OpponentLeft => info!("对手断线，对局结束"),
    }

    Ok(())
}

//! 服务器主逻辑

use std::time::Duration;

use tracing::{info, warn};

use protocol::{Color, Listener, NetworkConfig, PeerChannel, Result};

use crate::session::{Pairing, SessionOutcome};

/// 接受连接失败后的退避时间
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// 服务端配置
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    pub network: NetworkConfig,
    /// 执黑抽签的随机种子
    pub seed: Option<u64>,
}

/// 黑白棋服务器
///
/// 接入循环负责配对，每局对局在独立任务中运行，局与局之间没有共享状态
pub struct OthelloServer<L: Listener> {
    listener: L,
    pairing: Pairing<L::Conn>,
}

impl<L> OthelloServer<L>
where
    L: Listener,
    L::Conn: 'static,
{
    /// 绑定监听地址
    pub async fn bind(config: &ServerConfig) -> Result<Self> {
        let listener = L::bind(&config.network.addr()).await?;
        Ok(Self {
            listener,
            pairing: Pairing::new(config.seed),
        })
    }

    pub fn local_addr(&self) -> Option<String> {
        self.listener.local_addr()
    }

    /// 运行接入循环
    pub async fn serve(&mut self) {
        info!(
            "服务端监听于 {}",
            self.local_addr().unwrap_or_else(|| "<unknown>".to_string())
        );

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok(conn) => self.admit(conn).await,
                    Err(e) => {
                        warn!("接受连接失败: {}", e);
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
                _ = self.pairing.watch_waiting() => {}
            }
        }
    }

    async fn admit(&mut self, conn: L::Conn) {
        let peer = conn.peer_addr().unwrap_or_else(|| "<unknown>".to_string());
        info!("新连接: {}", peer);

        match self.pairing.admit(conn).await {
            Ok(Some(mut session)) => {
                tokio::spawn(async move {
                    match session.run().await {
                        SessionOutcome::Finished { outcome, .. } => {
                            info!(
                                "{} 对 {} 结束: {}",
                                session.player_name(Color::Dark),
                                session.player_name(Color::Light),
                                outcome
                            );
                        }
                        SessionOutcome::Disconnected { name, .. } => {
                            info!("对局因 {} 断线而结束", name);
                        }
                    }
                });
            }
            Ok(None) => {}
            Err(e) => warn!("连接 {} 在命名前离开: {}", peer, e),
        }
    }
}

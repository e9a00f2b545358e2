//! 与服务端的消息循环
//!
//! 客户端完全由服务端消息驱动：收到 YOUR_TURN 时提示输入坐标，
//! 收到 INVALID 时重新提交，收到 END 或 OPPONENT_DISCONNECT 时结束。

use std::io::Write;

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use protocol::{Notation, Outcome, PeerChannel, ProtocolError, ServerMessage};

use crate::input::LineSource;
use crate::render::Renderer;
use crate::state::ClientGame;

/// 客户端选项
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// 预设昵称，为空时提示输入
    pub name: Option<String>,
    /// 是否输出 ANSI 颜色
    pub color: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            name: None,
            color: true,
        }
    }
}

/// 对局结束方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    /// 正常终局
    GameOver(Outcome),
    /// 对手断线
    OpponentLeft,
}

/// 等待服务端确认的提交
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Name,
    Move,
    Nothing,
}

/// 帧完整但内容无法解析，可以跳过
fn is_recoverable(e: &ProtocolError) -> bool {
    !e.breaks_framing()
}

/// 黑白棋客户端
pub struct OthelloClient<C, I, W> {
    channel: C,
    input: I,
    out: W,
    renderer: Renderer,
    game: ClientGame,
    preset_name: Option<String>,
    pending: Pending,
}

impl<C, I, W> OthelloClient<C, I, W>
where
    C: PeerChannel,
    I: LineSource,
    W: Write + Send,
{
    pub fn new(channel: C, input: I, out: W, options: ClientOptions) -> Self {
        Self {
            channel,
            input,
            out,
            renderer: Renderer::new(options.color),
            game: ClientGame::default(),
            preset_name: options.name,
            pending: Pending::Nothing,
        }
    }

    pub fn game(&self) -> &ClientGame {
        &self.game
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// 提交昵称并处理服务端消息直至对局结束
    pub async fn run(&mut self) -> Result<Ending> {
        self.submit_name().await?;

        loop {
            let msg = match self.channel.recv::<ServerMessage>().await {
                Ok(msg) => msg,
                Err(e) if is_recoverable(&e) => {
                    warn!("忽略无法解析的消息: {}", e);
                    continue;
                }
                Err(e) => {
                    writeln!(self.out, "Connection lost")?;
                    return Err(e).context("与服务端的连接已断开");
                }
            };

            debug!("收到 {}", msg.tag());
            if let Some(ending) = self.handle(msg).await? {
                let _ = self.channel.close().await;
                return Ok(ending);
            }
        }
    }

    async fn handle(&mut self, msg: ServerMessage) -> Result<Option<Ending>> {
        if let Some(board) = msg.board() {
            self.game.board = board.clone();
        }

        match msg {
            ServerMessage::Wait { message } => {
                self.pending = Pending::Nothing;
                writeln!(self.out, "{}", message)?;
            }
            ServerMessage::Start { opponent, color } => {
                self.pending = Pending::Nothing;
                self.game.start(opponent, color);
                writeln!(self.out, "\nGame started!")?;
                writeln!(self.out, "You are playing as {}", color)?;
                writeln!(self.out, "Opponent: {}", self.game.opponent)?;
                writeln!(self.out, "Waiting for game to begin...")?;
            }
            ServerMessage::YourTurn { .. } => {
                self.show(true)?;
                self.submit_move().await?;
            }
            ServerMessage::OpponentTurn { .. } => {
                self.show(false)?;
            }
            ServerMessage::Invalid { reason } => {
                writeln!(self.out, "Error: {}. Please try again.", reason)?;
                match self.pending {
                    Pending::Name => self.submit_name().await?,
                    Pending::Move => self.submit_move().await?,
                    Pending::Nothing => warn!("收到意外的 INVALID: {}", reason),
                }
            }
            ServerMessage::MoveOk { position } => {
                debug!("落子 {} 已被接受", Notation::encode(position));
                self.pending = Pending::Nothing;
            }
            ServerMessage::Skip { .. } => {
                writeln!(self.out, "\nYou have no valid moves. Skipping your turn...")?;
            }
            ServerMessage::OpponentSkip { .. } => {
                writeln!(
                    self.out,
                    "\n{} has no valid moves. Skipping...",
                    self.game.opponent
                )?;
            }
            ServerMessage::End { outcome, .. } => {
                self.show(false)?;
                write!(
                    self.out,
                    "{}",
                    self.renderer.summary(&self.game, &outcome.to_string())
                )?;
                self.out.flush()?;
                return Ok(Some(Ending::GameOver(outcome)));
            }
            ServerMessage::OpponentDisconnect => {
                writeln!(self.out, "\nOpponent disconnected. You win!")?;
                self.out.flush()?;
                return Ok(Some(Ending::OpponentLeft));
            }
        }

        self.out.flush()?;
        Ok(None)
    }

    fn show(&mut self, my_turn: bool) -> Result<()> {
        self.renderer.clear(&mut self.out)?;
        write!(self.out, "{}", self.renderer.board(&self.game, my_turn))?;
        Ok(())
    }

    /// 读取一行输入
    ///
    /// 等待期间服务端有消息到达或连接关闭时放弃输入并返回 None，
    /// 由消息循环处理该消息
    async fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.out, "{}", text)?;
        self.out.flush()?;

        let line = tokio::select! {
            biased;
            line = self.input.next_line() => line?,
            _ = self.channel.ready() => {
                debug!("等待输入时收到服务端消息");
                writeln!(self.out)?;
                return Ok(None);
            }
        };
        match line {
            Some(line) => Ok(Some(line.trim().to_string())),
            None => bail!("输入已结束"),
        }
    }

    async fn submit_name(&mut self) -> Result<()> {
        let name = match self.preset_name.take() {
            Some(name) => name.trim().to_string(),
            None => match self.prompt("Enter your name: ").await? {
                Some(name) => name,
                None => return Ok(()),
            },
        };
        self.game.name = name;
        self.channel
            .send(&self.game.name)
            .await
            .context("发送昵称失败")?;
        self.pending = Pending::Name;
        Ok(())
    }

    async fn submit_move(&mut self) -> Result<()> {
        let Some(text) = self.prompt("\nEnter your step. (ex. a1): ").await? else {
            return Ok(());
        };
        self.channel.send(&text).await.context("发送落子失败")?;
        self.pending = Pending::Move;
        Ok(())
    }
}

//! 配对与对局状态机
//!
//! `Pairing` 负责 AwaitingFirst -> AwaitingSecond -> InProgress 的配对阶段，
//! `Session` 负责 InProgress 的回合循环直至 Terminated。
//! 每个对局由单个任务顺序驱动，棋盘无需加锁。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use protocol::{
    Board, Color, GameRecord, Liveness, Notation, Outcome, PeerChannel, Position, Result,
    ServerMessage,
};

use crate::player::Participant;

/// 等待对手时发送的提示
pub const WAIT_MESSAGE: &str = "Waiting for another player...";

/// 坐标格式错误时的 INVALID 原因
pub const INVALID_FORMAT_REASON: &str = "Invalid position format";

/// 落子不合法时的 INVALID 原因
pub const INVALID_MOVE_REASON: &str = "Invalid move";

/// 非当前方发来消息时的 INVALID 原因
pub const NOT_YOUR_TURN_REASON: &str = "Not your turn";

/// 对局状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// 等待第一名参与者
    AwaitingFirst,
    /// 等待第二名参与者
    AwaitingSecond,
    /// 对局进行中
    InProgress,
    /// 对局已结束
    Terminated,
}

/// 对局结束方式
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// 双方均无子可下，正常终局
    Finished { outcome: Outcome, board: Board },
    /// 一方断线
    Disconnected { color: Color, name: String },
}

// ============================================================================
// 配对
// ============================================================================

/// 配对器：凑齐两名已命名的参与者后创建对局
pub struct Pairing<C> {
    state: SessionState,
    waiting: Option<Participant<C>>,
    rng: StdRng,
}

impl<C: PeerChannel> Pairing<C> {
    /// 创建配对器，指定种子时执黑方的抽签结果可复现
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            state: SessionState::AwaitingFirst,
            waiting: None,
            rng,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// 等待中的参与者昵称
    pub fn waiting_name(&self) -> Option<&str> {
        self.waiting.as_ref().map(|p| p.name.as_str())
    }

    /// 接入一个新连接
    ///
    /// 读取昵称后，若已有参与者在等待则返回新对局，否则该连接进入等待。
    /// 连接在命名前离开时返回错误，不影响正在等待的参与者。
    pub async fn admit(&mut self, channel: C) -> Result<Option<Session<C>>> {
        let mut newcomer = Participant::identify(channel).await?;
        info!("参与者 {} 已命名", newcomer.name);

        if let Some(mut first) = self.waiting.take() {
            if first.channel.liveness().await == Liveness::Closed {
                warn!("{} 在等待对手时离开", first.name);
            } else {
                let (dark, light) = if self.rng.gen_bool(0.5) {
                    (first, newcomer)
                } else {
                    (newcomer, first)
                };
                info!("配对完成: {} 执黑 (X)，{} 执白 (O)", dark.name, light.name);
                self.state = SessionState::AwaitingFirst;
                return Ok(Some(Session::new(dark, light)));
            }
        }

        newcomer
            .channel
            .send(&ServerMessage::Wait {
                message: WAIT_MESSAGE.to_string(),
            })
            .await?;
        info!("{} 正在等待对手", newcomer.name);
        self.waiting = Some(newcomer);
        self.state = SessionState::AwaitingSecond;
        Ok(None)
    }

    /// 等待中的参与者离开时完成，并回到 AwaitingFirst
    ///
    /// 没有参与者在等待时永不完成
    pub async fn watch_waiting(&mut self) {
        match self.waiting.as_mut() {
            Some(first) => first.channel.closed().await,
            None => std::future::pending::<()>().await,
        }

        if let Some(first) = self.waiting.take() {
            warn!("{} 在等待对手时离开", first.name);
        }
        self.state = SessionState::AwaitingFirst;
    }
}

// ============================================================================
// 对局
// ============================================================================

/// 一方已离开（断线或读写失败）
struct Departed(Color);

fn seat(color: Color) -> usize {
    match color {
        Color::Dark => 0,
        Color::Light => 1,
    }
}

/// 一局两人对局
pub struct Session<C> {
    /// 下标 0 为黑方，1 为白方
    players: [Participant<C>; 2],
    board: Board,
    current: Color,
    state: SessionState,
    record: GameRecord,
}

impl<C: PeerChannel> Session<C> {
    /// 创建对局，黑方先手
    pub fn new(dark: Participant<C>, light: Participant<C>) -> Self {
        let record = GameRecord::new(dark.name.clone(), light.name.clone());
        Self {
            players: [dark, light],
            board: Board::initial(),
            current: Color::Dark,
            state: SessionState::InProgress,
            record,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// 当前回合方
    pub fn current(&self) -> Color {
        self.current
    }

    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    pub fn player_name(&self, color: Color) -> &str {
        &self.players[seat(color)].name
    }

    /// 运行对局直至结束，结束后关闭双方连接
    pub async fn run(&mut self) -> SessionOutcome {
        let outcome = match self.play().await {
            Ok(outcome) => outcome,
            Err(Departed(color)) => self.abandon(color).await,
        };
        self.state = SessionState::Terminated;

        match self.record.to_json() {
            Ok(json) => debug!("对局记录:\n{}", json),
            Err(e) => warn!("对局记录序列化失败: {}", e),
        }

        for player in &mut self.players {
            let _ = player.channel.close().await;
        }
        outcome
    }

    /// 回合循环
    async fn play(&mut self) -> std::result::Result<SessionOutcome, Departed> {
        self.announce().await?;

        loop {
            self.check_liveness().await?;
            let mover = self.current;

            if !self.board.has_any_legal_move(mover) {
                if !self.board.has_any_legal_move(mover.opponent()) {
                    return Ok(self.finish().await);
                }

                info!("{} ({}) 无子可下，跳过", self.player_name(mover), mover);
                self.record.add_skip(mover);
                let board = self.board.clone();
                self.notify(
                    mover,
                    ServerMessage::Skip {
                        board: board.clone(),
                    },
                    ServerMessage::OpponentSkip { board },
                )
                .await?;
                self.current = mover.opponent();
                continue;
            }

            let board = self.board.clone();
            self.notify(
                mover,
                ServerMessage::YourTurn {
                    board: board.clone(),
                },
                ServerMessage::OpponentTurn { board },
            )
            .await?;

            let (pos, flipped) = self.await_move(mover).await?;
            info!(
                "{} ({}) 落子 {}，翻转 {} 子",
                self.player_name(mover),
                mover,
                Notation::encode(pos),
                flipped
            );
            self.record.add_move(mover, pos, flipped);
            self.send_to(mover, &ServerMessage::MoveOk { position: pos })
                .await?;
            self.current = mover.opponent();
        }
    }

    /// 通知双方对局开始
    async fn announce(&mut self) -> std::result::Result<(), Departed> {
        info!("{} (X) 先手", self.player_name(Color::Dark));
        for color in [Color::Dark, Color::Light] {
            let msg = ServerMessage::Start {
                opponent: self.player_name(color.opponent()).to_string(),
                color,
            };
            self.send_to(color, &msg).await?;
        }
        Ok(())
    }

    /// 等待当前方提交合法落子，返回落子位置与翻转数
    ///
    /// 同时监听对方：对方断线立即结束，回合外发来的帧被拒绝并丢弃
    async fn await_move(&mut self, mover: Color) -> std::result::Result<(Position, usize), Departed> {
        loop {
            self.check_liveness().await?;

            // ready 不消费数据，未被选中的一方不会丢失半帧
            let (me, other) = self.seats_mut(mover);
            let from = tokio::select! {
                _ = me.channel.ready() => mover,
                _ = other.channel.ready() => mover.opponent(),
            };

            let text = match self.players[seat(from)].channel.recv::<String>().await {
                Ok(text) => Some(text),
                Err(e) if e.breaks_framing() => {
                    if !e.is_disconnect() {
                        warn!("{} 的连接出错: {}", self.player_name(from), e);
                    }
                    return Err(Departed(from));
                }
                Err(e) => {
                    debug!("{} 发送了无法解析的帧: {}", self.player_name(from), e);
                    None
                }
            };

            if from != mover {
                debug!("{} 在对手回合发送了消息，已丢弃", self.player_name(from));
                self.send_to(
                    from,
                    &ServerMessage::Invalid {
                        reason: NOT_YOUR_TURN_REASON.to_string(),
                    },
                )
                .await?;
                continue;
            }

            let Some(Ok(pos)) = text.as_deref().map(Notation::decode) else {
                debug!("{} 提交无效坐标: {:?}", self.player_name(mover), text);
                self.send_to(
                    mover,
                    &ServerMessage::Invalid {
                        reason: INVALID_FORMAT_REASON.to_string(),
                    },
                )
                .await?;
                continue;
            };

            match self.board.apply(pos, mover) {
                Ok(flipped) => return Ok((pos, flipped.len())),
                Err(e) => {
                    debug!("{} 提交非法落子: {}", self.player_name(mover), e);
                    self.send_to(
                        mover,
                        &ServerMessage::Invalid {
                            reason: INVALID_MOVE_REASON.to_string(),
                        },
                    )
                    .await?;
                }
            }
        }
    }

    /// 正常终局，结果尽力送达双方
    async fn finish(&mut self) -> SessionOutcome {
        let outcome = self.board.result();
        info!(
            "对局结束: {} (X {} : O {})",
            outcome,
            self.board.dark_count(),
            self.board.light_count()
        );
        self.record.set_result(outcome, &self.board);

        let end = ServerMessage::End {
            outcome,
            board: self.board.clone(),
        };
        for color in [Color::Dark, Color::Light] {
            let _ = self.send_to(color, &end).await;
        }

        SessionOutcome::Finished {
            outcome,
            board: self.board.clone(),
        }
    }

    /// 一方离开，通知另一方
    async fn abandon(&mut self, departed: Color) -> SessionOutcome {
        let name = self.player_name(departed).to_string();
        warn!("{} ({}) 断开连接，对局终止", name, departed);
        self.record.set_disconnected(departed, &self.board);

        let survivor = &mut self.players[seat(departed.opponent())];
        if let Err(e) = survivor.channel.send(&ServerMessage::OpponentDisconnect).await {
            debug!("无法通知 {} 对手断线: {}", survivor.name, e);
        }

        SessionOutcome::Disconnected {
            color: departed,
            name,
        }
    }

    /// 探测双方连接
    async fn check_liveness(&mut self) -> std::result::Result<(), Departed> {
        for color in [Color::Dark, Color::Light] {
            if self.players[seat(color)].channel.liveness().await == Liveness::Closed {
                return Err(Departed(color));
            }
        }
        Ok(())
    }

    async fn notify(
        &mut self,
        mover: Color,
        to_mover: ServerMessage,
        to_other: ServerMessage,
    ) -> std::result::Result<(), Departed> {
        self.send_to(mover, &to_mover).await?;
        self.send_to(mover.opponent(), &to_other).await
    }

    async fn send_to(
        &mut self,
        color: Color,
        msg: &ServerMessage,
    ) -> std::result::Result<(), Departed> {
        let player = &mut self.players[seat(color)];
        match player.channel.send(msg).await {
            Ok(()) => Ok(()),
            Err(e) => {
                debug!("向 {} 发送 {} 失败: {}", player.name, msg.tag(), e);
                Err(Departed(color))
            }
        }
    }

    /// 同时借用当前方与对方
    fn seats_mut(&mut self, mover: Color) -> (&mut Participant<C>, &mut Participant<C>) {
        let [dark, light] = &mut self.players;
        match mover {
            Color::Dark => (dark, light),
            Color::Light => (light, dark),
        }
    }
}

//! 消息类型定义
//!
//! 消息体是以冒号分隔的文本，第一个字段为命令标签，例如
//! `START:Bob:X`、`YOUR_TURN:<64 字符棋盘>`、`END:X wins!:<棋盘>`。
//! 客户端发往服务端的消息（昵称、坐标）是不带标签的原始文本。

use crate::board::{Board, Outcome};
use crate::constants::FIELD_SEPARATOR;
use crate::error::{ProtocolError, Result};
use crate::notation::Notation;
use crate::piece::{Color, Position};

/// 可以编码为一帧文本的消息
pub trait WireMessage: Sized + Send {
    /// 编码为帧内容
    fn encode(&self) -> String;

    /// 从帧内容解码
    fn decode(frame: &str) -> Result<Self>;
}

/// 客户端发送的原始文本（昵称或坐标）
impl WireMessage for String {
    fn encode(&self) -> String {
        self.clone()
    }

    fn decode(frame: &str) -> Result<Self> {
        Ok(frame.to_string())
    }
}

/// 服务端发送给客户端的消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// 等待对手加入
    Wait { message: String },
    /// 对局开始
    Start { opponent: String, color: Color },
    /// 轮到你落子
    YourTurn { board: Board },
    /// 轮到对手落子
    OpponentTurn { board: Board },
    /// 昵称或落子被拒绝，请重新提交
    Invalid { reason: String },
    /// 落子已接受
    MoveOk { position: Position },
    /// 你无子可下，本回合跳过
    Skip { board: Board },
    /// 对手无子可下，对手回合跳过
    OpponentSkip { board: Board },
    /// 对局正常结束
    End { outcome: Outcome, board: Board },
    /// 对手断线，对局结束
    OpponentDisconnect,
}

impl ServerMessage {
    pub const TAG_WAIT: &'static str = "WAIT";
    pub const TAG_START: &'static str = "START";
    pub const TAG_YOUR_TURN: &'static str = "YOUR_TURN";
    pub const TAG_OPPONENT_TURN: &'static str = "OPPONENT_TURN";
    pub const TAG_INVALID: &'static str = "INVALID";
    pub const TAG_MOVE_OK: &'static str = "MOVE_OK";
    pub const TAG_SKIP: &'static str = "SKIP";
    pub const TAG_OPPONENT_SKIP: &'static str = "OPPONENT_SKIP";
    pub const TAG_END: &'static str = "END";
    pub const TAG_OPPONENT_DISCONNECT: &'static str = "OPPONENT_DISCONNECT";

    /// 命令标签
    pub fn tag(&self) -> &'static str {
        match self {
            ServerMessage::Wait { .. } => Self::TAG_WAIT,
            ServerMessage::Start { .. } => Self::TAG_START,
            ServerMessage::YourTurn { .. } => Self::TAG_YOUR_TURN,
            ServerMessage::OpponentTurn { .. } => Self::TAG_OPPONENT_TURN,
            ServerMessage::Invalid { .. } => Self::TAG_INVALID,
            ServerMessage::MoveOk { .. } => Self::TAG_MOVE_OK,
            ServerMessage::Skip { .. } => Self::TAG_SKIP,
            ServerMessage::OpponentSkip { .. } => Self::TAG_OPPONENT_SKIP,
            ServerMessage::End { .. } => Self::TAG_END,
            ServerMessage::OpponentDisconnect => Self::TAG_OPPONENT_DISCONNECT,
        }
    }

    /// 是否为终局消息（END 或 OPPONENT_DISCONNECT）
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ServerMessage::End { .. } | ServerMessage::OpponentDisconnect
        )
    }

    /// 消息携带的棋盘（如果有）
    pub fn board(&self) -> Option<&Board> {
        match self {
            ServerMessage::YourTurn { board }
            | ServerMessage::OpponentTurn { board }
            | ServerMessage::Skip { board }
            | ServerMessage::OpponentSkip { board }
            | ServerMessage::End { board, .. } => Some(board),
            _ => None,
        }
    }
}

impl WireMessage for ServerMessage {
    fn encode(&self) -> String {
        let body = match self {
            ServerMessage::Wait { message } => message.clone(),
            ServerMessage::Start { opponent, color } => {
                format!("{}{}{}", opponent, FIELD_SEPARATOR, color.symbol())
            }
            ServerMessage::YourTurn { board }
            | ServerMessage::OpponentTurn { board }
            | ServerMessage::Skip { board }
            | ServerMessage::OpponentSkip { board } => board.serialize(),
            ServerMessage::Invalid { reason } => reason.clone(),
            ServerMessage::MoveOk { position } => Notation::encode(*position),
            ServerMessage::End { outcome, board } => {
                format!("{}{}{}", outcome, FIELD_SEPARATOR, board.serialize())
            }
            ServerMessage::OpponentDisconnect => String::new(),
        };
        format!("{}{}{}", self.tag(), FIELD_SEPARATOR, body)
    }

    fn decode(frame: &str) -> Result<Self> {
        let (tag, body) = frame.split_once(FIELD_SEPARATOR).unwrap_or((frame, ""));
        let malformed = || ProtocolError::MalformedMessage {
            frame: frame.to_string(),
        };

        let msg = match tag {
            Self::TAG_WAIT => ServerMessage::Wait {
                message: body.to_string(),
            },
            Self::TAG_START => {
                let (opponent, symbol) = body.rsplit_once(FIELD_SEPARATOR).ok_or_else(malformed)?;
                let mut chars = symbol.chars();
                let color = match (chars.next(), chars.next()) {
                    (Some(c), None) => Color::from_symbol(c).ok_or_else(malformed)?,
                    _ => return Err(malformed()),
                };
                ServerMessage::Start {
                    opponent: opponent.to_string(),
                    color,
                }
            }
            Self::TAG_YOUR_TURN => ServerMessage::YourTurn { board: body.parse()? },
            Self::TAG_OPPONENT_TURN => ServerMessage::OpponentTurn { board: body.parse()? },
            Self::TAG_INVALID => ServerMessage::Invalid {
                reason: body.to_string(),
            },
            Self::TAG_MOVE_OK => ServerMessage::MoveOk {
                position: Notation::decode(body)?,
            },
            Self::TAG_SKIP => ServerMessage::Skip { board: body.parse()? },
            Self::TAG_OPPONENT_SKIP => ServerMessage::OpponentSkip { board: body.parse()? },
            Self::TAG_END => {
                let (result, board) = body.rsplit_once(FIELD_SEPARATOR).ok_or_else(malformed)?;
                ServerMessage::End {
                    outcome: result.parse()?,
                    board: board.parse()?,
                }
            }
            Self::TAG_OPPONENT_DISCONNECT => ServerMessage::OpponentDisconnect,
            other => {
                return Err(ProtocolError::UnknownCommand {
                    tag: other.to_string(),
                })
            }
        };
        Ok(msg)
    }
}

//! 错误类型定义

use thiserror::Error;

/// 黑白棋规则与格式错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    /// 落子不合法（目标非空，或没有任何方向可以翻转）
    #[error("Illegal move at ({row}, {col})")]
    IllegalMove { row: u8, col: u8 },

    /// 无效的坐标文本
    #[error("Invalid coordinate: {input:?}")]
    InvalidCoordinate { input: String },

    /// 无效的棋盘序列化文本
    #[error("Invalid board string: {reason}")]
    InvalidBoard { reason: String },
}

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON 序列化错误
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// 协议版本不匹配
    #[error("Protocol version mismatch: expected {expected}, got {actual}")]
    VersionMismatch { expected: u8, actual: u8 },

    /// 帧大小超限
    #[error("Frame too large: {size} bytes (max: {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// 帧内容不是合法 UTF-8
    #[error("Frame payload is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// 连接超时
    #[error("Connection timeout")]
    ConnectionTimeout,

    /// 连接已关闭
    #[error("Connection closed")]
    ConnectionClosed,

    /// 消息字段缺失或格式错误
    #[error("Malformed message: {frame:?}")]
    MalformedMessage { frame: String },

    /// 未知的命令标签
    #[error("Unknown command tag: {tag:?}")]
    UnknownCommand { tag: String },

    /// 昵称为空
    #[error("Name is empty")]
    NameEmpty,

    /// 昵称过长
    #[error("Name too long: {len} chars (max: {max})")]
    NameTooLong { len: usize, max: usize },

    /// 昵称包含非法字符
    #[error("Name contains invalid character {ch:?}")]
    NameInvalidChar { ch: char },

    /// 规则或格式错误
    #[error("Game error: {0}")]
    Game(#[from] GameError),
}

impl ProtocolError {
    /// 是否表示对端已离开（断线或传输失败）
    pub fn is_disconnect(&self) -> bool {
        matches!(
            self,
            ProtocolError::Io(_) | ProtocolError::ConnectionClosed | ProtocolError::ConnectionTimeout
        )
    }

    /// 是否已无法继续读取后续帧
    ///
    /// 除断线外，版本不匹配与超长帧会使帧边界失去同步；
    /// 其余错误发生时整帧已被消费，连接仍可继续使用
    pub fn breaks_framing(&self) -> bool {
        self.is_disconnect()
            || matches!(
                self,
                ProtocolError::VersionMismatch { .. } | ProtocolError::FrameTooLarge { .. }
            )
    }
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;

//! 黑白棋共享协议库
//!
//! 包含:
//! - 棋子颜色、位置、棋盘等核心数据结构
//! - 落子规则、翻转计算与终局判定
//! - 消息类型定义 (ServerMessage) 与坐标记法
//! - 传输层抽象 (PeerChannel, Connector, Listener traits)
//! - 帧编解码 (FrameReader, FrameWriter)
//! - 对局记录 (JSON)

mod board;
mod constants;
mod error;
mod message;
mod notation;
mod piece;
mod record;
mod transport;

pub use board::{Board, Outcome};
pub use constants::*;
pub use error::{GameError, ProtocolError, Result};
pub use message::{ServerMessage, WireMessage};
pub use notation::Notation;
pub use piece::{Color, Position};
pub use record::{GameMetadata, GameRecord, TurnRecord};
pub use transport::{
    duplex_pair, Connector, DuplexConnection, FrameReader, FrameWriter, FramedConnection,
    Liveness, Listener, NetworkConfig, PeerChannel, TcpConnection, TcpConnector, TcpListener,
};

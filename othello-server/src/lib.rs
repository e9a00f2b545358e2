//! 黑白棋服务端
//!
//! 包含:
//! - 参与者昵称校验
//! - 配对（等待第一、第二名参与者）
//! - 对局状态机（回合循环）
//! - 监听与接入

pub mod player;
pub mod server;
pub mod session;

pub use player::{validate_name, Participant};
pub use server::{OthelloServer, ServerConfig};
pub use session::{Pairing, Session, SessionOutcome, SessionState};

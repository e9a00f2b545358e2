//! 黑白棋终端客户端
//!
//! 包含:
//! - 客户端对局状态
//! - 棋盘文本渲染（ANSI 颜色、可落子提示）
//! - 终端输入
//! - 与服务端的消息循环

pub mod client;
pub mod input;
pub mod render;
pub mod state;

pub use client::{ClientOptions, Ending, OthelloClient};
pub use input::{LineSource, StdinLines};
pub use render::Renderer;
pub use state::ClientGame;

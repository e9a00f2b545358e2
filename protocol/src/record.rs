//! 对局记录
//!
//! 会话在内存中维护，终局时以 JSON 输出到日志

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::board::{Board, Outcome};
use crate::notation::Notation;
use crate::piece::{Color, Position};

/// 记录格式版本
pub const RECORD_VERSION: &str = "1.0";

/// 对局元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    /// 黑方玩家名
    pub dark_player: String,
    /// 白方玩家名
    pub light_player: String,
    /// 开局时间
    pub started_at: DateTime<Utc>,
    /// 正常终局的结果
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Outcome>,
    /// 中途断线的一方
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disconnected: Option<Color>,
    /// 终局棋盘（64 字符）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_board: Option<String>,
}

/// 单个回合记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnRecord {
    /// 落子
    Move {
        color: Color,
        /// 坐标记法，如 `d3`
        coordinate: String,
        /// 翻转的棋子数
        flipped: usize,
        timestamp: DateTime<Utc>,
    },
    /// 无子可下，跳过
    Skip {
        color: Color,
        timestamp: DateTime<Utc>,
    },
}

/// 完整的对局记录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    /// 版本号
    pub version: String,
    /// 元数据
    pub metadata: GameMetadata,
    /// 回合列表
    pub turns: Vec<TurnRecord>,
}

impl GameRecord {
    /// 创建新的对局记录
    pub fn new(dark_player: String, light_player: String) -> Self {
        Self {
            version: RECORD_VERSION.to_string(),
            metadata: GameMetadata {
                dark_player,
                light_player,
                started_at: Utc::now(),
                result: None,
                disconnected: None,
                final_board: None,
            },
            turns: Vec::new(),
        }
    }

    /// 添加落子
    pub fn add_move(&mut self, color: Color, pos: Position, flipped: usize) {
        self.turns.push(TurnRecord::Move {
            color,
            coordinate: Notation::encode(pos),
            flipped,
            timestamp: Utc::now(),
        });
    }

    /// 添加跳过
    pub fn add_skip(&mut self, color: Color) {
        self.turns.push(TurnRecord::Skip {
            color,
            timestamp: Utc::now(),
        });
    }

    /// 设置正常终局结果
    pub fn set_result(&mut self, outcome: Outcome, board: &Board) {
        self.metadata.result = Some(outcome);
        self.metadata.final_board = Some(board.serialize());
    }

    /// 记录断线
    pub fn set_disconnected(&mut self, color: Color, board: &Board) {
        self.metadata.disconnected = Some(color);
        self.metadata.final_board = Some(board.serialize());
    }

    /// 落子次数（不含跳过）
    pub fn move_count(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| matches!(t, TurnRecord::Move { .. }))
            .count()
    }

    /// 转换为 JSON 字符串
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// 从 JSON 字符串解析
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

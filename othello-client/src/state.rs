//! 客户端对局状态

use protocol::{Board, Color, Position};

/// 客户端对局状态
#[derive(Debug, Clone, Default)]
pub struct ClientGame {
    /// 自己的昵称
    pub name: String,
    /// 对手昵称
    pub opponent: String,
    /// 自己执的颜色（START 之前未知）
    pub color: Option<Color>,
    /// 最近一次收到的棋盘
    pub board: Board,
}

impl ClientGame {
    /// 对局开始
    pub fn start(&mut self, opponent: String, color: Color) {
        self.opponent = opponent;
        self.color = Some(color);
    }

    /// 自己可以落子的位置
    pub fn hints(&self) -> Vec<Position> {
        match self.color {
            Some(color) => self.board.legal_moves(color),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hints_follow_color() {
        let mut game = ClientGame {
            name: "Alice".to_string(),
            ..Default::default()
        };
        assert!(game.hints().is_empty());

        game.start("Bob".to_string(), Color::Light);
        assert_eq!(game.opponent, "Bob");
        assert_eq!(game.hints(), Board::initial().legal_moves(Color::Light));
    }
}

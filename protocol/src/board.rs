//! 棋盘状态与规则引擎
//!
//! 8x8 棋盘，行优先存储。所有落子只通过 [`Board::apply`] 进行，
//! 双方棋子数在每次变更后重新统计，不单独维护。

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_CELLS, EMPTY_SYMBOL};
use crate::error::GameError;
use crate::piece::{Color, Position};

/// 八个射线方向：上、下、左、右、左上、右上、左下、右下
const DIRECTIONS: [(i8, i8); 8] = [
    (-1, 0),
    (1, 0),
    (0, -1),
    (0, 1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

/// 对局结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// 一方子数多者胜
    Win(Color),
    /// 子数相同
    Draw,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Win(color) => write!(f, "{} wins!", color.symbol()),
            Outcome::Draw => write!(f, "Draw!"),
        }
    }
}

impl FromStr for Outcome {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "Draw!" {
            return Ok(Outcome::Draw);
        }
        let mut chars = s.chars();
        let color = chars.next().and_then(Color::from_symbol);
        match (color, chars.as_str()) {
            (Some(color), " wins!") => Ok(Outcome::Win(color)),
            _ => Err(GameError::InvalidBoard {
                reason: format!("unknown result text {:?}", s),
            }),
        }
    }
}

/// 棋盘
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// 64 格，索引为 row * 8 + col
    squares: Vec<Option<Color>>,
    dark_count: u8,
    light_count: u8,
}

impl Board {
    /// 创建空棋盘
    pub fn empty() -> Self {
        Self {
            squares: vec![None; BOARD_CELLS],
            dark_count: 0,
            light_count: 0,
        }
    }

    /// 创建初始棋盘：中心四格，黑子在 (3,3)/(4,4)，白子在 (3,4)/(4,3)
    pub fn initial() -> Self {
        let mut board = Self::empty();
        board.set(Position::new_unchecked(3, 3), Some(Color::Dark));
        board.set(Position::new_unchecked(3, 4), Some(Color::Light));
        board.set(Position::new_unchecked(4, 3), Some(Color::Light));
        board.set(Position::new_unchecked(4, 4), Some(Color::Dark));
        board.recount();
        board
    }

    /// 获取指定位置的棋子
    pub fn get(&self, pos: Position) -> Option<Color> {
        if pos.is_valid() {
            self.squares[pos.to_index()]
        } else {
            None
        }
    }

    fn set(&mut self, pos: Position, cell: Option<Color>) {
        if pos.is_valid() {
            self.squares[pos.to_index()] = cell;
        }
    }

    fn recount(&mut self) {
        let mut dark = 0;
        let mut light = 0;
        for cell in &self.squares {
            match cell {
                Some(Color::Dark) => dark += 1,
                Some(Color::Light) => light += 1,
                None => {}
            }
        }
        self.dark_count = dark;
        self.light_count = light;
    }

    /// 黑子数量
    pub fn dark_count(&self) -> u8 {
        self.dark_count
    }

    /// 白子数量
    pub fn light_count(&self) -> u8 {
        self.light_count
    }

    /// 空格数量
    pub fn empty_count(&self) -> u8 {
        BOARD_CELLS as u8 - self.dark_count - self.light_count
    }

    /// 指定阵营的棋子数量
    pub fn count(&self, color: Color) -> u8 {
        match color {
            Color::Dark => self.dark_count,
            Color::Light => self.light_count,
        }
    }

    /// 沿一个方向收集可翻转的对方棋子。
    ///
    /// 相邻格必须是对方棋子，连续的对方棋子之后必须紧跟己方棋子；
    /// 遇到空格或出界则该方向不成立，返回空。
    fn run_in_direction(&self, pos: Position, color: Color, (dr, dc): (i8, i8)) -> Vec<Position> {
        let opponent = color.opponent();
        let mut run = Vec::new();
        let mut current = pos;

        while let Some(next) = current.offset(dr, dc) {
            match self.get(next) {
                Some(c) if c == opponent => run.push(next),
                Some(_) => return run,
                None => break,
            }
            current = next;
        }

        Vec::new()
    }

    /// 在 `pos` 落下 `color` 时会被翻转的全部棋子（目标非空时为空）
    pub fn flips(&self, pos: Position, color: Color) -> Vec<Position> {
        if !pos.is_valid() || self.get(pos).is_some() {
            return Vec::new();
        }

        DIRECTIONS
            .iter()
            .flat_map(|&dir| self.run_in_direction(pos, color, dir))
            .collect()
    }

    /// 检查落子是否合法：目标为空，且至少一个方向能翻转
    pub fn is_legal(&self, pos: Position, color: Color) -> bool {
        if !pos.is_valid() || self.get(pos).is_some() {
            return false;
        }

        DIRECTIONS
            .iter()
            .any(|&dir| !self.run_in_direction(pos, color, dir).is_empty())
    }

    /// 落子并翻转所有成立方向上的对方棋子，返回被翻转的位置
    pub fn apply(&mut self, pos: Position, color: Color) -> Result<Vec<Position>, GameError> {
        let flipped = self.flips(pos, color);
        if flipped.is_empty() {
            return Err(GameError::IllegalMove {
                row: pos.row,
                col: pos.col,
            });
        }

        self.set(pos, Some(color));
        for &p in &flipped {
            self.set(p, Some(color));
        }
        self.recount();

        Ok(flipped)
    }

    /// 指定阵营的所有合法落点（行优先顺序）
    pub fn legal_moves(&self, color: Color) -> Vec<Position> {
        Position::all().filter(|&pos| self.is_legal(pos, color)).collect()
    }

    /// 指定阵营是否有任何合法落点
    pub fn has_any_legal_move(&self, color: Color) -> bool {
        Position::all().any(|pos| self.is_legal(pos, color))
    }

    /// 双方都无子可下时对局结束
    pub fn is_terminal(&self) -> bool {
        !self.has_any_legal_move(Color::Dark) && !self.has_any_legal_move(Color::Light)
    }

    /// 按当前子数比较得出结果，任何时候都可调用
    pub fn result(&self) -> Outcome {
        match self.dark_count.cmp(&self.light_count) {
            std::cmp::Ordering::Greater => Outcome::Win(Color::Dark),
            std::cmp::Ordering::Less => Outcome::Win(Color::Light),
            std::cmp::Ordering::Equal => Outcome::Draw,
        }
    }

    /// 序列化为 64 字符（行优先）
    pub fn serialize(&self) -> String {
        self.squares
            .iter()
            .map(|cell| cell.map_or(EMPTY_SYMBOL, |c| c.symbol()))
            .collect()
    }

    /// 从 64 字符文本整体替换棋盘；失败时棋盘保持不变
    pub fn deserialize(&mut self, text: &str) -> Result<(), GameError> {
        let len = text.chars().count();
        if len != BOARD_CELLS {
            return Err(GameError::InvalidBoard {
                reason: format!("expected {} cells, got {}", BOARD_CELLS, len),
            });
        }

        let mut squares = Vec::with_capacity(BOARD_CELLS);
        for (index, c) in text.chars().enumerate() {
            let cell = match c {
                EMPTY_SYMBOL => None,
                other => Some(Color::from_symbol(other).ok_or_else(|| GameError::InvalidBoard {
                    reason: format!("invalid symbol {:?} at index {}", other, index),
                })?),
            };
            squares.push(cell);
        }

        self.squares = squares;
        self.recount();
        Ok(())
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::initial()
    }
}

impl FromStr for Board {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut board = Self::empty();
        board.deserialize(s)?;
        Ok(board)
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.serialize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(row: u8, col: u8) -> Position {
        Position::new_unchecked(row, col)
    }

    /// 构造棋盘：`rows` 为 8 行文本，其余格子为空
    fn board_from_rows(rows: [&str; 8]) -> Board {
        rows.concat().parse().unwrap()
    }

    #[test]
    fn test_initial_board() {
        let board = Board::initial();

        assert_eq!(board.get(pos(3, 3)), Some(Color::Dark));
        assert_eq!(board.get(pos(4, 4)), Some(Color::Dark));
        assert_eq!(board.get(pos(3, 4)), Some(Color::Light));
        assert_eq!(board.get(pos(4, 3)), Some(Color::Light));
        assert_eq!(board.dark_count(), 2);
        assert_eq!(board.light_count(), 2);
        assert_eq!(board.empty_count(), 60);
    }

    #[test]
    fn test_initial_legal_moves() {
        let board = Board::initial();

        assert_eq!(
            board.legal_moves(Color::Dark),
            vec![pos(2, 4), pos(3, 5), pos(4, 2), pos(5, 3)]
        );
        assert_eq!(
            board.legal_moves(Color::Light),
            vec![pos(2, 3), pos(3, 2), pos(4, 5), pos(5, 4)]
        );
        // (2,3) 下方紧邻的是黑子自己，对黑方不成立
        assert!(!board.is_legal(pos(2, 3), Color::Dark));
    }

    #[test]
    fn test_apply_flips_single_run() {
        let mut board = Board::initial();

        let flipped = board.apply(pos(2, 4), Color::Dark).unwrap();
        assert_eq!(flipped, vec![pos(3, 4)]);
        assert_eq!(board.get(pos(2, 4)), Some(Color::Dark));
        assert_eq!(board.get(pos(3, 4)), Some(Color::Dark));
        assert_eq!(board.dark_count(), 4);
        assert_eq!(board.light_count(), 1);
    }

    #[test]
    fn test_apply_light_opening() {
        let mut board = Board::initial();

        assert!(board.is_legal(pos(2, 3), Color::Light));
        board.apply(pos(2, 3), Color::Light).unwrap();
        assert_eq!(board.get(pos(3, 3)), Some(Color::Light));
        assert_eq!(board.light_count(), 4);
        assert_eq!(board.dark_count(), 1);
    }

    #[test]
    fn test_apply_flips_every_direction() {
        // (3,4) 八个方向各有两枚白子，外侧是黑子
        let mut board = board_from_rows([
            "*X**X**X",
            "**O*O*O*",
            "***OOO**",
            "*XOO*OOX",
            "***OOO**",
            "**O*O*O*",
            "*X**X**X",
            "********",
        ]);
        assert!(board.is_legal(pos(3, 4), Color::Dark));

        let flipped = board.apply(pos(3, 4), Color::Dark).unwrap();
        // 八个方向各两枚
        assert_eq!(flipped.len(), 16);
        for p in flipped {
            assert_eq!(board.get(p), Some(Color::Dark));
        }
        assert_eq!(board.light_count(), 0);
    }

    #[test]
    fn test_run_stops_at_empty_and_edge() {
        let board = board_from_rows([
            "OOX*****",
            "********",
            "********",
            "********",
            "********",
            "********",
            "********",
            "********",
        ]);
        // 白子背靠棋盘边缘，黑方无法夹住
        assert!(!board.is_legal(pos(1, 0), Color::Dark));
        assert!(board.legal_moves(Color::Dark).is_empty());
        // 白方在 (0,3) 可以夹住 (0,2)
        assert_eq!(board.legal_moves(Color::Light), vec![pos(0, 3)]);
    }

    #[test]
    fn test_illegal_move_rejected() {
        let mut board = Board::initial();
        let before = board.clone();

        // 已占用
        assert_eq!(
            board.apply(pos(3, 3), Color::Light),
            Err(GameError::IllegalMove { row: 3, col: 3 })
        );
        // 不能翻转
        assert!(board.apply(pos(0, 0), Color::Dark).is_err());
        // 越界
        assert!(board.apply(Position::new_unchecked(9, 0), Color::Dark).is_err());

        assert_eq!(board, before);
    }

    #[test]
    fn test_occupied_never_legal() {
        let board = Board::initial();
        for p in Position::all().filter(|&p| board.get(p).is_some()) {
            assert!(!board.is_legal(p, Color::Dark));
            assert!(!board.is_legal(p, Color::Light));
        }
    }

    #[test]
    fn test_result() {
        assert_eq!(Board::initial().result(), Outcome::Draw);

        let mut board = Board::initial();
        board.apply(pos(2, 4), Color::Dark).unwrap();
        assert_eq!(board.result(), Outcome::Win(Color::Dark));
    }

    #[test]
    fn test_outcome_text() {
        assert_eq!(Outcome::Win(Color::Dark).to_string(), "X wins!");
        assert_eq!(Outcome::Win(Color::Light).to_string(), "O wins!");
        assert_eq!(Outcome::Draw.to_string(), "Draw!");

        assert_eq!("O wins!".parse::<Outcome>(), Ok(Outcome::Win(Color::Light)));
        assert_eq!("Draw!".parse::<Outcome>(), Ok(Outcome::Draw));
        assert!("* wins!".parse::<Outcome>().is_err());
    }

    #[test]
    fn test_terminal_full_board() {
        let board: Board = format!("{}{}", "X".repeat(40), "O".repeat(24)).parse().unwrap();

        assert!(board.is_terminal());
        assert_eq!(board.result(), Outcome::Win(Color::Dark));
    }

    #[test]
    fn test_terminal_one_color_wiped_out() {
        let board = board_from_rows([
            "********",
            "********",
            "********",
            "***OO***",
            "***OO***",
            "********",
            "********",
            "********",
        ]);
        assert!(!board.has_any_legal_move(Color::Dark));
        assert!(!board.has_any_legal_move(Color::Light));
        assert!(board.is_terminal());
        assert_eq!(board.result(), Outcome::Win(Color::Light));
    }

    #[test]
    fn test_serialize_initial() {
        let text = Board::initial().serialize();
        assert_eq!(text.len(), 64);
        assert_eq!(&text[24..32], "***XO***");
        assert_eq!(&text[32..40], "***OX***");
    }

    #[test]
    fn test_deserialize_round_trip() {
        let mut board = Board::initial();
        board.apply(pos(2, 4), Color::Dark).unwrap();
        board.apply(pos(2, 3), Color::Light).unwrap();

        let parsed: Board = board.serialize().parse().unwrap();
        assert_eq!(parsed, board);
        assert_eq!(parsed.dark_count(), board.dark_count());
        assert_eq!(parsed.light_count(), board.light_count());
    }

    #[test]
    fn test_deserialize_rejects_bad_input() {
        let mut board = Board::initial();
        let before = board.clone();

        assert!(matches!(
            board.deserialize("X*O"),
            Err(GameError::InvalidBoard { .. })
        ));
        let bad_symbol = format!("{}#", "*".repeat(63));
        assert!(matches!(
            board.deserialize(&bad_symbol),
            Err(GameError::InvalidBoard { .. })
        ));
        assert_eq!(board, before);
    }

    #[test]
    fn test_invariants_through_full_game() {
        // 双方总是走第一个合法落点，无子可下时跳过，直到终局
        let mut board = Board::initial();
        let mut color = Color::Dark;
        let mut plies = 0;

        while !board.is_terminal() {
            if let Some(&target) = board.legal_moves(color).first() {
                let placed_before = 64 - board.empty_count();
                let own_before = board.count(color);

                let flipped = board.apply(target, color).unwrap();

                assert!(!flipped.is_empty());
                assert_eq!(64 - board.empty_count(), placed_before + 1);
                assert_eq!(board.count(color) as usize, own_before as usize + flipped.len() + 1);
                assert_eq!(board.dark_count() + board.light_count() + board.empty_count(), 64);
                assert_eq!(board.serialize().parse::<Board>().unwrap(), board);
                plies += 1;
            }
            color = color.opponent();
            assert!(plies <= 60);
        }

        assert_eq!(
            board.is_terminal(),
            !board.has_any_legal_move(Color::Dark) && !board.has_any_legal_move(Color::Light)
        );
    }
}

//! 棋子颜色与棋盘位置

use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_CELLS, BOARD_SIZE, DARK_SYMBOL, LIGHT_SYMBOL};

/// 阵营（棋子颜色）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// 黑方（先手）
    Dark,
    /// 白方
    Light,
}

impl Color {
    /// 获取对方阵营
    pub fn opponent(&self) -> Color {
        match self {
            Color::Dark => Color::Light,
            Color::Light => Color::Dark,
        }
    }

    /// 棋盘与协议中使用的符号
    pub fn symbol(&self) -> char {
        match self {
            Color::Dark => DARK_SYMBOL,
            Color::Light => LIGHT_SYMBOL,
        }
    }

    /// 从符号解析
    pub fn from_symbol(c: char) -> Option<Color> {
        match c {
            DARK_SYMBOL => Some(Color::Dark),
            LIGHT_SYMBOL => Some(Color::Light),
            _ => None,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// 棋盘位置，行 0 为最上方
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// 行 (0-7)
    pub row: u8,
    /// 列 (0-7)
    pub col: u8,
}

impl Position {
    /// 创建新位置
    pub fn new(row: u8, col: u8) -> Option<Self> {
        if (row as usize) < BOARD_SIZE && (col as usize) < BOARD_SIZE {
            Some(Self { row, col })
        } else {
            None
        }
    }

    /// 创建新位置（不检查边界，内部使用）
    pub const fn new_unchecked(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// 检查位置是否在棋盘内
    pub fn is_valid(&self) -> bool {
        (self.row as usize) < BOARD_SIZE && (self.col as usize) < BOARD_SIZE
    }

    /// 获取偏移后的位置
    pub fn offset(&self, dr: i8, dc: i8) -> Option<Position> {
        let row = self.row as i8 + dr;
        let col = self.col as i8 + dc;
        if row >= 0 && (row as usize) < BOARD_SIZE && col >= 0 && (col as usize) < BOARD_SIZE {
            Some(Position {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// 转换为数组索引（行优先）
    pub fn to_index(&self) -> usize {
        self.row as usize * BOARD_SIZE + self.col as usize
    }

    /// 从数组索引转换
    pub fn from_index(index: usize) -> Option<Self> {
        if index < BOARD_CELLS {
            Some(Position {
                row: (index / BOARD_SIZE) as u8,
                col: (index % BOARD_SIZE) as u8,
            })
        } else {
            None
        }
    }

    /// 按行优先顺序遍历全部 64 个位置
    pub fn all() -> impl Iterator<Item = Position> {
        (0..BOARD_CELLS).filter_map(Position::from_index)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_symbol() {
        assert_eq!(Color::Dark.symbol(), 'X');
        assert_eq!(Color::Light.symbol(), 'O');
        assert_eq!(Color::from_symbol('X'), Some(Color::Dark));
        assert_eq!(Color::from_symbol('O'), Some(Color::Light));
        assert_eq!(Color::from_symbol('*'), None);
    }

    #[test]
    fn test_color_opponent() {
        assert_eq!(Color::Dark.opponent(), Color::Light);
        assert_eq!(Color::Light.opponent(), Color::Dark);
    }

    #[test]
    fn test_position_valid() {
        assert!(Position::new(0, 0).is_some());
        assert!(Position::new(7, 7).is_some());
        assert!(Position::new(8, 0).is_none());
        assert!(Position::new(0, 8).is_none());
    }

    #[test]
    fn test_position_offset() {
        let pos = Position::new_unchecked(0, 7);
        assert_eq!(pos.offset(1, -1), Some(Position::new_unchecked(1, 6)));
        assert_eq!(pos.offset(-1, 0), None);
        assert_eq!(pos.offset(0, 1), None);
    }

    #[test]
    fn test_position_index() {
        assert_eq!(Position::new_unchecked(2, 3).to_index(), 19);
        assert_eq!(Position::from_index(19), Some(Position::new_unchecked(2, 3)));
        assert_eq!(Position::from_index(64), None);
        assert_eq!(Position::all().count(), 64);
    }
}

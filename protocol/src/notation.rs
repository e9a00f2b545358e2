//! 坐标记法
//!
//! 两个字符：列字母 a-h（不区分大小写）+ 行数字 1-8。
//! 数字 8 对应最上方的第 0 行，数字 1 对应第 7 行，例如 `d3` 为 (5, 3)。

use crate::constants::BOARD_SIZE;
use crate::error::GameError;
use crate::piece::Position;

/// 坐标记法
pub struct Notation;

impl Notation {
    /// 解析坐标文本
    pub fn decode(text: &str) -> Result<Position, GameError> {
        let invalid = || GameError::InvalidCoordinate {
            input: text.to_string(),
        };

        let mut chars = text.chars();
        let (Some(letter), Some(digit), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(invalid());
        };

        let letter = letter.to_ascii_lowercase();
        if !('a'..='h').contains(&letter) {
            return Err(invalid());
        }
        let digit = digit.to_digit(10).filter(|d| (1..=8).contains(d)).ok_or_else(invalid)?;

        let col = letter as u8 - b'a';
        let row = BOARD_SIZE as u8 - digit as u8;
        Position::new(row, col).ok_or_else(invalid)
    }

    /// 生成坐标文本，位置必须在棋盘内
    pub fn encode(pos: Position) -> String {
        debug_assert!(pos.is_valid(), "position off the board: {:?}", pos);
        let letter = (b'a' + pos.col) as char;
        let digit = BOARD_SIZE as u8 - pos.row;
        format!("{}{}", letter, digit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_corners() {
        assert_eq!(Notation::decode("a8"), Ok(Position::new_unchecked(0, 0)));
        assert_eq!(Notation::decode("h8"), Ok(Position::new_unchecked(0, 7)));
        assert_eq!(Notation::decode("a1"), Ok(Position::new_unchecked(7, 0)));
        assert_eq!(Notation::decode("h1"), Ok(Position::new_unchecked(7, 7)));
    }

    #[test]
    fn test_decode_case_insensitive() {
        assert_eq!(Notation::decode("D3"), Notation::decode("d3"));
        assert_eq!(Notation::decode("d3"), Ok(Position::new_unchecked(5, 3)));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for input in ["", "d", "d33", "z9", "i1", "a0", "a9", "3d", "d-", " d3", "é1"] {
            assert_eq!(
                Notation::decode(input),
                Err(GameError::InvalidCoordinate {
                    input: input.to_string()
                }),
                "{:?} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_encode() {
        assert_eq!(Notation::encode(Position::new_unchecked(0, 0)), "a8");
        assert_eq!(Notation::encode(Position::new_unchecked(5, 3)), "d3");
        assert_eq!(Notation::encode(Position::new_unchecked(7, 7)), "h1");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "position off the board")]
    fn test_encode_off_board_panics_in_debug() {
        Notation::encode(Position::new_unchecked(8, 0));
    }

    #[test]
    fn test_encode_decode_all_cells() {
        for pos in Position::all() {
            assert_eq!(Notation::decode(&Notation::encode(pos)), Ok(pos));
        }
    }
}

//! 棋盘文本渲染

use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color as TermColor, Stylize};
use crossterm::terminal::{Clear, ClearType};

use protocol::{Color, Position, BOARD_SIZE, DARK_SYMBOL, EMPTY_SYMBOL, LIGHT_SYMBOL};

use crate::state::ClientGame;

const DARK_COLOR: TermColor = TermColor::Red;
const LIGHT_COLOR: TermColor = TermColor::Green;
const HINT_COLOR: TermColor = TermColor::Yellow;

/// 可落子提示符号
pub const HINT_SYMBOL: char = '+';

/// 列标签行
pub const COLUMN_LABELS: &str = "  a b c d e f g h";

/// 文本渲染器
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    /// 是否输出颜色与清屏
    pub color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// 清屏并把光标移到左上角，关闭颜色时不输出任何内容
    pub fn clear<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.color {
            queue!(out, Clear(ClearType::All), Clear(ClearType::Purge), MoveTo(0, 0))?;
        }
        Ok(())
    }

    fn paint(&self, symbol: char, color: TermColor) -> String {
        if self.color {
            symbol.with(color).to_string()
        } else {
            symbol.to_string()
        }
    }

    /// 渲染棋盘，自己回合时标出可落子位置
    pub fn board(&self, game: &ClientGame, my_turn: bool) -> String {
        let mine = game.color.map(|c| c.symbol()).unwrap_or('?');
        let theirs = game.color.map(|c| c.opponent().symbol()).unwrap_or('?');
        let hints = if my_turn { game.hints() } else { Vec::new() };

        let mut out = String::new();
        out.push_str(&format!(
            "\n{}(you): {}    {}: {}\n",
            game.name, mine, game.opponent, theirs
        ));
        out.push_str(&format!(
            "{}: {}    {}: {}\n",
            DARK_SYMBOL,
            game.board.dark_count(),
            LIGHT_SYMBOL,
            game.board.light_count()
        ));
        out.push_str(if my_turn {
            "now it's your turn.\n"
        } else {
            "The opponent is thinking.\n"
        });

        for row in 0..BOARD_SIZE as u8 {
            let cells: Vec<String> = (0..BOARD_SIZE as u8)
                .map(|col| {
                    let pos = Position::new_unchecked(row, col);
                    match game.board.get(pos) {
                        Some(Color::Dark) => self.paint(DARK_SYMBOL, DARK_COLOR),
                        Some(Color::Light) => self.paint(LIGHT_SYMBOL, LIGHT_COLOR),
                        None if hints.contains(&pos) => self.paint(HINT_SYMBOL, HINT_COLOR),
                        None => EMPTY_SYMBOL.to_string(),
                    }
                })
                .collect();
            out.push_str(&format!("{} {}\n", BOARD_SIZE as u8 - row, cells.join(" ")));
        }
        out.push_str(COLUMN_LABELS);
        out.push('\n');
        out
    }

    /// 终局摘要
    pub fn summary(&self, game: &ClientGame, result: &str) -> String {
        format!(
            "\n===================\nGame Over!\n{}\nBlack ({}): {}\nWhite ({}): {}\n===================\n",
            result,
            DARK_SYMBOL,
            game.board.dark_count(),
            LIGHT_SYMBOL,
            game.board.light_count()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dark_game() -> ClientGame {
        let mut game = ClientGame {
            name: "Alice".to_string(),
            ..Default::default()
        };
        game.start("Bob".to_string(), Color::Dark);
        game
    }

    #[test]
    fn test_plain_board_with_hints() {
        let text = Renderer::new(false).board(&dark_game(), true);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[1], "Alice(you): X    Bob: O");
        assert_eq!(lines[2], "X: 2    O: 2");
        assert_eq!(lines[3], "now it's your turn.");
        assert_eq!(lines[4], "8 * * * * * * * *");
        assert_eq!(lines[6], "6 * * * * + * * *");
        assert_eq!(lines[7], "5 * * * X O + * *");
        assert_eq!(lines[8], "4 * * + O X * * *");
        assert_eq!(lines[9], "3 * * * + * * * *");
        assert_eq!(lines[12], COLUMN_LABELS);
        assert!(!text.contains('\x1b'));
    }

    #[test]
    fn test_no_hints_on_opponent_turn() {
        let text = Renderer::new(false).board(&dark_game(), false);
        assert!(text.contains("The opponent is thinking."));
        assert!(!text.contains(HINT_SYMBOL));
    }

    #[test]
    fn test_colored_board() {
        let renderer = Renderer::new(true);
        let text = renderer.board(&dark_game(), true);
        assert!(text.contains(&'X'.with(DARK_COLOR).to_string()));
        assert!(text.contains(&'O'.with(LIGHT_COLOR).to_string()));
        assert!(text.contains(&'+'.with(HINT_COLOR).to_string()));
    }

    #[test]
    fn test_clear_only_when_colored() {
        let mut colored = Vec::new();
        Renderer::new(true).clear(&mut colored).unwrap();
        assert!(!colored.is_empty());

        let mut plain = Vec::new();
        Renderer::new(false).clear(&mut plain).unwrap();
        assert!(plain.is_empty());
    }

    #[test]
    fn test_summary_counts() {
        let text = Renderer::new(false).summary(&dark_game(), "Draw!");
        assert!(text.contains("Game Over!\nDraw!\nBlack (X): 2\nWhite (O): 2\n"));
    }
}

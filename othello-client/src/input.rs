//! 终端输入

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// 按行读取用户输入
#[async_trait]
pub trait LineSource: Send {
    /// 读取下一行（已去除首尾空白），输入结束时返回 None
    async fn next_line(&mut self) -> std::io::Result<Option<String>>;
}

/// 标准输入
pub struct StdinLines {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinLines {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }
}

impl Default for StdinLines {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LineSource for StdinLines {
    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        let line = self.lines.next_line().await?;
        Ok(line.map(|l| l.trim().to_string()))
    }
}

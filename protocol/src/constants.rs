//! 协议常量定义

use std::time::Duration;

/// 协议版本号
pub const PROTOCOL_VERSION: u8 = 1;

/// 棋盘边长（行数 = 列数）
pub const BOARD_SIZE: usize = 8;

/// 棋盘格子总数
pub const BOARD_CELLS: usize = BOARD_SIZE * BOARD_SIZE;

/// 空格符号
pub const EMPTY_SYMBOL: char = '*';

/// 黑方（先手）棋子符号
pub const DARK_SYMBOL: char = 'X';

/// 白方棋子符号
pub const LIGHT_SYMBOL: char = 'O';

/// 昵称最大长度
pub const MAX_NAME_LEN: usize = 20;

/// 消息帧最大大小
pub const MAX_FRAME_SIZE: usize = 4096;

/// 消息字段分隔符
pub const FIELD_SEPARATOR: char = ':';

/// 连接超时（秒）
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// 连接超时 Duration
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(CONNECT_TIMEOUT_SECS);

/// 连接存活探测窗口（毫秒）
pub const LIVENESS_PROBE_MS: u64 = 1;

/// 连接存活探测窗口 Duration
pub const LIVENESS_PROBE: Duration = Duration::from_millis(LIVENESS_PROBE_MS);

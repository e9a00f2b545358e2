//! 参与者管理

use tracing::debug;

use protocol::{PeerChannel, ProtocolError, Result, ServerMessage, FIELD_SEPARATOR, MAX_NAME_LEN};

/// 已完成命名的参与者
pub struct Participant<C> {
    pub name: String,
    pub channel: C,
}

impl<C: PeerChannel> Participant<C> {
    /// 读取昵称，不合法时回复 INVALID 并继续等待同一连接
    ///
    /// 连接在命名前关闭或出错时返回错误
    pub async fn identify(mut channel: C) -> Result<Self> {
        loop {
            let raw: String = channel.recv().await?;
            match validate_name(&raw) {
                Ok(name) => return Ok(Self { name, channel }),
                Err(e) => {
                    debug!("拒绝昵称 {:?}: {}", raw, e);
                    channel
                        .send(&ServerMessage::Invalid {
                            reason: e.to_string(),
                        })
                        .await?;
                }
            }
        }
    }
}

/// 验证昵称，返回去除首尾空白后的昵称
pub fn validate_name(raw: &str) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(ProtocolError::NameEmpty);
    }

    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(ProtocolError::NameTooLong {
            len,
            max: MAX_NAME_LEN,
        });
    }

    // 冒号是字段分隔符，会破坏 START 消息
    if let Some(ch) = name.chars().find(|c| *c == FIELD_SEPARATOR || c.is_control()) {
        return Err(ProtocolError::NameInvalidChar { ch });
    }

    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{duplex_pair, Liveness};

    #[test]
    fn test_valid_names() {
        assert_eq!(validate_name("Alice").unwrap(), "Alice");
        assert_eq!(validate_name("  Bob \r").unwrap(), "Bob");
        assert_eq!(validate_name("玩家一").unwrap(), "玩家一");
        assert_eq!(validate_name(&"a".repeat(20)).unwrap(), "a".repeat(20));
    }

    #[test]
    fn test_invalid_names() {
        assert!(matches!(validate_name(""), Err(ProtocolError::NameEmpty)));
        assert!(matches!(validate_name("   "), Err(ProtocolError::NameEmpty)));
        assert!(matches!(
            validate_name(&"a".repeat(21)),
            Err(ProtocolError::NameTooLong { len: 21, max: 20 })
        ));
        assert!(matches!(
            validate_name("Al:ice"),
            Err(ProtocolError::NameInvalidChar { ch: ':' })
        ));
        assert!(matches!(
            validate_name("Al\tice"),
            Err(ProtocolError::NameInvalidChar { ch: '\t' })
        ));
    }

    #[tokio::test]
    async fn test_identify_retries_until_valid() {
        let (server_side, mut client_side) = duplex_pair(4096);

        client_side.send(&"".to_string()).await.unwrap();
        client_side.send(&"x:y".to_string()).await.unwrap();
        client_side.send(&" Carol ".to_string()).await.unwrap();

        let participant = Participant::identify(server_side).await.unwrap();
        assert_eq!(participant.name, "Carol");

        for _ in 0..2 {
            let reply: ServerMessage = client_side.recv().await.unwrap();
            assert_eq!(reply.tag(), ServerMessage::TAG_INVALID);
        }
        assert_eq!(
            client_side.liveness().await,
            Liveness::Empty,
            "valid name must not be answered here"
        );
    }

    #[tokio::test]
    async fn test_identify_fails_when_closed_before_naming() {
        let (server_side, client_side) = duplex_pair(4096);
        drop(client_side);

        let result = Participant::identify(server_side).await;
        assert!(matches!(result, Err(ProtocolError::ConnectionClosed)));
    }
}

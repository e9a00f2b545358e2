//! 传输层抽象
//!
//! 提供 PeerChannel/Connector/Listener traits 使会话逻辑与具体传输实现解耦。
//! 生产环境使用 TCP，测试使用内存中的 duplex 管道，二者共用同一套帧编解码。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, DuplexStream,
    ReadHalf, WriteHalf,
};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{ProtocolError, Result};
use crate::message::WireMessage;
use crate::{CONNECT_TIMEOUT, LIVENESS_PROBE, MAX_FRAME_SIZE, PROTOCOL_VERSION};

/// 网络配置
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub host: String,
    pub port: u16,
}

impl NetworkConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// `host:port` 形式的地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 9527,
        }
    }
}

/// 连接可读状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// 有数据待读
    Pending,
    /// 对端已关闭（或连接出错）
    Closed,
    /// 暂时没有数据
    Empty,
}

/// 单个参与者的消息通道（核心抽象，用于会话层）
#[async_trait]
pub trait PeerChannel: Send {
    /// 发送一帧消息
    async fn send<M: WireMessage + Sync>(&mut self, msg: &M) -> Result<()>;

    /// 接收一帧消息（阻塞直到收到完整一帧）
    async fn recv<M: WireMessage>(&mut self) -> Result<M>;

    /// 非阻塞探测：区分有数据、已关闭、暂无数据
    async fn liveness(&mut self) -> Liveness;

    /// 仅在对端关闭时完成；若对端已有待读数据则永不完成
    async fn closed(&mut self);

    /// 等待到有数据可读（Pending）或对端关闭（Closed），从不返回 Empty
    ///
    /// 不消费数据，可以安全地放在 `select!` 中被取消
    async fn ready(&mut self) -> Liveness;

    /// 关闭连接
    async fn close(&mut self) -> Result<()>;

    /// 获取远端地址
    fn peer_addr(&self) -> Option<String>;
}

/// 连接器 trait（客户端使用）
#[async_trait]
pub trait Connector: Send + Sync {
    type Conn: PeerChannel;

    /// 建立连接
    async fn connect(&self, addr: &str) -> Result<Self::Conn>;
}

/// 监听器 trait（服务端使用）
#[async_trait]
pub trait Listener: Send + Sized {
    type Conn: PeerChannel;

    /// 绑定地址
    async fn bind(addr: &str) -> Result<Self>;

    /// 接受连接
    async fn accept(&mut self) -> Result<Self::Conn>;

    /// 获取本地地址
    fn local_addr(&self) -> Option<String>;
}

// ============================================================================
// 帧连接
// ============================================================================

/// 基于任意读写端的帧连接
pub struct FramedConnection<R, W> {
    reader: FrameReader<R>,
    writer: FrameWriter<W>,
    peer_addr: Option<String>,
}

/// TCP 连接
pub type TcpConnection = FramedConnection<OwnedReadHalf, OwnedWriteHalf>;

/// 内存管道连接（测试与进程内对接使用）
pub type DuplexConnection = FramedConnection<ReadHalf<DuplexStream>, WriteHalf<DuplexStream>>;

impl<R, W> FramedConnection<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W, peer_addr: Option<String>) -> Self {
        Self {
            reader: FrameReader::new(reader),
            writer: FrameWriter::new(writer),
            peer_addr,
        }
    }
}

impl TcpConnection {
    /// 从 TcpStream 创建（服务端使用）
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        stream.set_nodelay(true)?;
        let peer_addr = stream.peer_addr().ok().map(|a| a.to_string());
        let (read_half, write_half) = stream.into_split();
        Ok(Self::new(read_half, write_half, peer_addr))
    }
}

/// 创建一对互联的内存连接
pub fn duplex_pair(max_buf_size: usize) -> (DuplexConnection, DuplexConnection) {
    let (a, b) = tokio::io::duplex(max_buf_size);
    let (a_read, a_write) = tokio::io::split(a);
    let (b_read, b_write) = tokio::io::split(b);
    (
        FramedConnection::new(a_read, a_write, Some("duplex-a".to_string())),
        FramedConnection::new(b_read, b_write, Some("duplex-b".to_string())),
    )
}

#[async_trait]
impl<R, W> PeerChannel for FramedConnection<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn send<M: WireMessage + Sync>(&mut self, msg: &M) -> Result<()> {
        self.writer.write_frame(msg).await
    }

    async fn recv<M: WireMessage>(&mut self) -> Result<M> {
        self.reader.read_frame().await
    }

    async fn liveness(&mut self) -> Liveness {
        self.reader.liveness().await
    }

    async fn closed(&mut self) {
        self.reader.closed().await
    }

    async fn ready(&mut self) -> Liveness {
        self.reader.ready().await
    }

    async fn close(&mut self) -> Result<()> {
        self.writer.shutdown().await
    }

    fn peer_addr(&self) -> Option<String> {
        self.peer_addr.clone()
    }
}

// ============================================================================
// TCP 实现
// ============================================================================

/// TCP 连接器
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    type Conn = TcpConnection;

    async fn connect(&self, addr: &str) -> Result<Self::Conn> {
        let stream = timeout(CONNECT_TIMEOUT, TcpStream::connect(addr))
            .await
            .map_err(|_| ProtocolError::ConnectionTimeout)?
            .map_err(ProtocolError::Io)?;

        TcpConnection::from_stream(stream)
    }
}

/// TCP 监听器
pub struct TcpListener {
    listener: tokio::net::TcpListener,
}

#[async_trait]
impl Listener for TcpListener {
    type Conn = TcpConnection;

    async fn bind(addr: &str) -> Result<Self> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(ProtocolError::Io)?;
        Ok(Self { listener })
    }

    async fn accept(&mut self) -> Result<Self::Conn> {
        let (stream, _addr) = self.listener.accept().await.map_err(ProtocolError::Io)?;
        TcpConnection::from_stream(stream)
    }

    fn local_addr(&self) -> Option<String> {
        self.listener.local_addr().ok().map(|a| a.to_string())
    }
}

// ============================================================================
// 帧编解码
// ============================================================================

/// 帧头大小: 1 字节版本 + 4 字节长度
const HEADER_SIZE: usize = 5;

fn map_eof(e: std::io::Error) -> ProtocolError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        ProtocolError::ConnectionClosed
    } else {
        ProtocolError::Io(e)
    }
}

/// 帧读取器
pub struct FrameReader<R> {
    reader: BufReader<R>,
    buffer: Vec<u8>,
}

impl<R: AsyncRead + Unpin + Send> FrameReader<R> {
    /// 创建新的帧读取器
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            buffer: Vec::with_capacity(MAX_FRAME_SIZE),
        }
    }

    /// 读取并解码一帧消息
    pub async fn read_frame<M: WireMessage>(&mut self) -> Result<M> {
        // 读取帧头
        let mut header = [0u8; HEADER_SIZE];
        self.reader.read_exact(&mut header).await.map_err(map_eof)?;

        // 解析版本号
        let version = header[0];
        if version != PROTOCOL_VERSION {
            debug!("丢弃版本不匹配的帧: {}", version);
            return Err(ProtocolError::VersionMismatch {
                expected: PROTOCOL_VERSION,
                actual: version,
            });
        }

        // 解析长度（大端序）
        let length = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;
        if length > MAX_FRAME_SIZE {
            debug!("帧长度超限: {} 字节", length);
            return Err(ProtocolError::FrameTooLarge {
                size: length,
                max: MAX_FRAME_SIZE,
            });
        }

        // 读取消息体
        self.buffer.resize(length, 0);
        self.reader
            .read_exact(&mut self.buffer[..length])
            .await
            .map_err(map_eof)?;

        let text = String::from_utf8(self.buffer[..length].to_vec())?;
        M::decode(&text)
    }

    /// 探测可读状态，不消费任何数据
    pub async fn liveness(&mut self) -> Liveness {
        if !self.reader.buffer().is_empty() {
            return Liveness::Pending;
        }

        match timeout(LIVENESS_PROBE, self.reader.fill_buf()).await {
            Ok(Ok(buf)) if buf.is_empty() => Liveness::Closed,
            Ok(Ok(_)) => Liveness::Pending,
            Ok(Err(_)) => Liveness::Closed,
            Err(_) => Liveness::Empty,
        }
    }

    /// 等待数据到达或对端关闭，不消费任何数据
    pub async fn ready(&mut self) -> Liveness {
        match self.reader.fill_buf().await {
            Ok(buf) if !buf.is_empty() => Liveness::Pending,
            _ => Liveness::Closed,
        }
    }

    /// 等待对端关闭
    pub async fn closed(&mut self) {
        let has_data = matches!(self.reader.fill_buf().await, Ok(buf) if !buf.is_empty());
        if has_data {
            // 有待读数据时无法区分关闭，交由下一次读取发现
            std::future::pending::<()>().await;
        }
    }
}

/// 帧写入器
pub struct FrameWriter<W> {
    writer: W,
}

impl<W: AsyncWrite + Unpin + Send> FrameWriter<W> {
    /// 创建新的帧写入器
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// 编码并写入一帧消息
    pub async fn write_frame<M: WireMessage>(&mut self, msg: &M) -> Result<()> {
        let payload = msg.encode().into_bytes();

        if payload.len() > MAX_FRAME_SIZE {
            return Err(ProtocolError::FrameTooLarge {
                size: payload.len(),
                max: MAX_FRAME_SIZE,
            });
        }

        // 构造帧头
        let length = payload.len() as u32;
        let mut header = [0u8; HEADER_SIZE];
        header[0] = PROTOCOL_VERSION;
        header[1..5].copy_from_slice(&length.to_be_bytes());

        // 写入帧头和消息体
        self.writer.write_all(&header).await?;
        self.writer.write_all(&payload).await?;
        self.writer.flush().await?;

        Ok(())
    }

    /// 关闭写端
    pub async fn shutdown(&mut self) -> Result<()> {
        self.writer.shutdown().await?;
        Ok(())
    }
}

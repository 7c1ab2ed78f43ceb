//! Server: one listener, one room
//!
//! Accepts connections on a single address and binds each one to the
//! listener's shared room. Each listening port is a fully independent
//! broadcast domain.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::error::AppError;
use crate::room::{Room, SharedRoom};
use crate::session;

/// A chat server for one port: TCP listener plus its broadcast room
pub struct Server {
    listener: TcpListener,
    room: SharedRoom,
}

impl Server {
    /// Bind a listener on the given address with a fresh room
    pub async fn bind(addr: SocketAddr) -> Result<Self, AppError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            room: Room::shared(),
        })
    }

    /// The address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr, AppError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept loop: start a session per connection, forever
    ///
    /// Accept failures are logged and accepting continues; a session's
    /// later failures never reach this loop.
    pub async fn run(self) {
        match self.local_addr() {
            Ok(addr) => info!("Chat server listening on {}", addr),
            Err(_) => info!("Chat server listening"),
        }

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!("New connection from {}", addr);
                    session::start(stream, self.room.clone()).await;
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    async fn spawn_server() -> SocketAddr {
        let server = Server::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(server.run());
        addr
    }

    async fn read_frame(stream: &mut TcpStream, body_len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; 4 + body_len];
        timeout(WAIT, stream.read_exact(&mut buf))
            .await
            .expect("timed out waiting for frame")
            .unwrap();
        buf
    }

    #[tokio::test]
    async fn test_broadcast_between_clients() {
        let addr = spawn_server().await;

        let mut b = TcpStream::connect(addr).await.unwrap();
        let mut a = TcpStream::connect(addr).await.unwrap();

        a.write_all(b"   2hi").await.unwrap();

        // b receives the frame either live or via backlog replay on
        // join, depending on accept timing; the bytes are the same.
        assert_eq!(read_frame(&mut b, 2).await, b"   2hi");

        // The sender is a participant too and gets its own message back
        assert_eq!(read_frame(&mut a, 2).await, b"   2hi");
    }

    #[tokio::test]
    async fn test_late_joiner_receives_backlog_in_order() {
        let addr = spawn_server().await;

        let mut a = TcpStream::connect(addr).await.unwrap();
        a.write_all(b"   3one   3two").await.unwrap();

        let mut b = TcpStream::connect(addr).await.unwrap();
        assert_eq!(read_frame(&mut b, 3).await, b"   3one");
        assert_eq!(read_frame(&mut b, 3).await, b"   3two");
    }

    #[tokio::test]
    async fn test_empty_body_frame_is_broadcast() {
        let addr = spawn_server().await;

        let mut a = TcpStream::connect(addr).await.unwrap();
        a.write_all(b"   0   2hi").await.unwrap();

        let mut b = TcpStream::connect(addr).await.unwrap();
        assert_eq!(read_frame(&mut b, 0).await, b"   0");
        assert_eq!(read_frame(&mut b, 2).await, b"   2hi");
    }

    #[tokio::test]
    async fn test_oversize_header_drops_sender() {
        let addr = spawn_server().await;

        let mut a = TcpStream::connect(addr).await.unwrap();
        a.write_all(b"9999").await.unwrap();

        // The server abandons the session, which closes the socket
        let mut buf = [0u8; 1];
        let n = timeout(WAIT, a.read(&mut buf)).await.unwrap().unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn test_partial_frame_is_not_delivered() {
        let addr = spawn_server().await;

        let mut b = TcpStream::connect(addr).await.unwrap();
        let mut a = TcpStream::connect(addr).await.unwrap();

        // Header promises 10 body bytes; only 4 arrive before the
        // sender disconnects mid-frame.
        a.write_all(b"  10part").await.unwrap();
        drop(a);

        // Nothing must reach b for the aborted frame
        let mut buf = [0u8; 1];
        let res = timeout(Duration::from_millis(300), b.read_exact(&mut buf)).await;
        assert!(res.is_err(), "partial frame must not be broadcast");

        // The room still works for the remaining client: a newcomer's
        // message reaches b intact.
        let mut c = TcpStream::connect(addr).await.unwrap();
        c.write_all(b"   5after").await.unwrap();
        assert_eq!(read_frame(&mut b, 5).await, b"   5after");
    }

    #[tokio::test]
    async fn test_dropped_client_stops_receiving() {
        let addr = spawn_server().await;

        let mut a = TcpStream::connect(addr).await.unwrap();
        let b = TcpStream::connect(addr).await.unwrap();

        // Make sure b's session has joined before disconnecting it,
        // then give the server a moment to notice the EOF.
        a.write_all(b"   4sync").await.unwrap();
        assert_eq!(read_frame(&mut a, 4).await, b"   4sync");
        drop(b);
        tokio::time::sleep(Duration::from_millis(100)).await;

        // Delivery to the departed b must not disturb anyone else
        a.write_all(b"   5still").await.unwrap();
        assert_eq!(read_frame(&mut a, 5).await, b"   5still");
    }

    #[tokio::test]
    async fn test_ports_are_independent_rooms() {
        let addr1 = spawn_server().await;
        let addr2 = spawn_server().await;

        let mut a = TcpStream::connect(addr1).await.unwrap();
        let mut b = TcpStream::connect(addr2).await.unwrap();

        a.write_all(b"   4one!").await.unwrap();
        // a's own echo proves delivery happened on addr1
        assert_eq!(read_frame(&mut a, 4).await, b"   4one!");

        // Nothing crosses over to addr2
        let mut buf = [0u8; 1];
        let res = timeout(Duration::from_millis(300), b.read_exact(&mut buf)).await;
        assert!(res.is_err(), "rooms must not share messages across ports");
    }
}

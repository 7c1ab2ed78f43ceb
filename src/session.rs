//! Per-connection session
//!
//! Ties one TCP connection to the shared room. A session runs two
//! independent cycles over the two halves of its stream:
//!
//! - the read cycle decodes frames (header, then body) and hands each
//!   complete message to the room for fan-out;
//! - the write cycle drains the outbound queue, writing one full frame
//!   at a time.
//!
//! The first failure on either cycle removes the session from the room
//! and ends that cycle; removal is idempotent so the cycles need no
//! coordination. A session is gone once both tasks have ended and the
//! room no longer holds its participant handle.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::AppError;
use crate::message::Message;
use crate::room::{Participant, SharedRoom};
use crate::types::SessionId;

/// The room-facing side of a session
///
/// Held by the room's participant set while the session is joined.
/// Delivery queues the message for the write cycle; the queue is
/// unbounded, so delivery itself never blocks the room.
struct SessionHandle {
    id: SessionId,
    outbound: mpsc::UnboundedSender<Message>,
}

impl Participant for SessionHandle {
    fn id(&self) -> SessionId {
        self.id
    }

    fn deliver(&self, msg: &Message) {
        // If the write cycle has already ended the queue is closed and
        // the message is dropped; the session is on its way out anyway.
        let _ = self.outbound.send(msg.clone());
    }
}

/// Start a session for an accepted connection
///
/// Joins the room and spawns the read and write cycles. Returns the
/// session's ID for logging.
pub async fn start(stream: TcpStream, room: SharedRoom) -> SessionId {
    let id = SessionId::new();
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    let (reader, writer) = stream.into_split();
    let (outbound, queue) = mpsc::unbounded_channel();
    let handle = Arc::new(SessionHandle { id, outbound });

    // Join before the first read so the backlog replay is queued ahead
    // of any live message this session provokes.
    room.lock().await.join(handle);
    info!("Session {} started for {}", id, peer);

    tokio::spawn(read_cycle(id, reader, room.clone()));
    tokio::spawn(write_cycle(id, writer, queue, room));

    id
}

/// Read cycle: header, body, deliver, repeat
///
/// Stops on the first I/O error, EOF, or header overflow, leaving the
/// room on the way out.
async fn read_cycle(id: SessionId, mut reader: OwnedReadHalf, room: SharedRoom) {
    let mut msg = Message::new();
    loop {
        match read_frame(&mut reader, &mut msg).await {
            Ok(()) => room.lock().await.deliver(&msg),
            Err(e) => {
                debug!("Session {} read cycle ended: {}", id, e);
                break;
            }
        }
    }
    room.lock().await.leave(id);
    info!("Session {} closed", id);
}

/// Read one complete frame into the message buffer
///
/// `read_exact` yields the requested byte count or an error, so no
/// partial frame ever reaches the room.
async fn read_frame(reader: &mut OwnedReadHalf, msg: &mut Message) -> Result<(), AppError> {
    reader.read_exact(msg.header_mut()).await?;
    msg.decode_header()?;
    reader.read_exact(msg.body_mut()).await?;
    Ok(())
}

/// Write cycle: drain the outbound queue one full frame at a time
///
/// A write failure leaves the room and discards whatever remains
/// queued. The cycle also ends once the queue closes, which happens
/// when the room drops the session's participant handle.
async fn write_cycle(
    id: SessionId,
    mut writer: OwnedWriteHalf,
    mut queue: mpsc::UnboundedReceiver<Message>,
    room: SharedRoom,
) {
    while let Some(msg) = queue.recv().await {
        if let Err(e) = writer.write_all(msg.bytes()).await {
            debug!("Session {} write cycle ended: {}", id, e);
            room.lock().await.leave(id);
            return;
        }
    }
    debug!("Session {} write queue closed", id);
}

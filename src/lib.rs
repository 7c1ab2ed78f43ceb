//! Broadcast TCP Chat Server Library
//!
//! A chat server where every connected client receives every message,
//! built on tokio's asynchronous TCP primitives.
//!
//! # Features
//! - Length-framed wire protocol (4-byte ASCII-decimal header + body)
//! - Broadcast room with a bounded recent-message backlog
//! - Backlog replay so late joiners catch up
//! - Independent per-connection read and write cycles
//! - One independent room per listening port
//!
//! # Architecture
//! Each accepted connection becomes a session with two tasks: a read
//! cycle that decodes frames and delivers them to the room, and a write
//! cycle that drains the session's outbound queue. The room is shared
//! behind a single async mutex, so its `join`/`leave`/`deliver`
//! operations never interleave. The room addresses sessions only
//! through the [`Participant`] trait.
//!
//! # Example
//! ```ignore
//! use chatcast::Server;
//!
//! #[tokio::main]
//! async fn main() {
//!     let server = Server::bind("0.0.0.0:8080".parse().unwrap())
//!         .await
//!         .unwrap();
//!     server.run().await;
//! }
//! ```

pub mod error;
pub mod message;
pub mod room;
pub mod server;
pub mod session;
pub mod types;

// Re-export main types for convenience
pub use error::AppError;
pub use message::{Message, HEADER_LEN, MAX_BODY_LEN};
pub use room::{Participant, Room, SharedRoom, MAX_RECENT_MSGS};
pub use server::Server;
pub use types::SessionId;

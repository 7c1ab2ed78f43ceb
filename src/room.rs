//! Room: the broadcast domain
//!
//! Tracks the set of live participants and a bounded backlog of recent
//! messages. Delivering a message fans it out to every participant;
//! joining replays the backlog so a new client can catch up.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::message::Message;
use crate::types::SessionId;

/// Backlog capacity: how many recent messages a room retains
pub const MAX_RECENT_MSGS: usize = 100;

/// The capability of receiving a delivered message
///
/// The room notifies targets only through this trait, never through a
/// concrete session type. Sessions implement it by queueing the message
/// onto their outbound write cycle; tests implement it with stand-ins
/// that simply record deliveries.
pub trait Participant: Send + Sync {
    /// Identity used to key the participant set
    fn id(&self) -> SessionId;

    /// Deliver one message to this participant
    fn deliver(&self, msg: &Message);
}

/// A room shared by every session on one listener
///
/// All mutation goes through the mutex, so `join`/`leave`/`deliver`
/// never interleave even on a multi-threaded runtime. Lock holders
/// never await, so the fan-out runs to completion before any other
/// room operation starts.
pub type SharedRoom = Arc<Mutex<Room>>;

/// Broadcast room state: live participants plus recent-message backlog
///
/// One room per listening port. Participant references are held only
/// while joined; leaving drops the room's handle to the session.
#[derive(Default)]
pub struct Room {
    /// Joined participants, keyed by session identity
    participants: HashMap<SessionId, Arc<dyn Participant>>,
    /// Bounded FIFO of the most recently delivered messages
    recent_msgs: VecDeque<Message>,
}

impl Room {
    /// Create an empty room
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty room behind its sharing handle
    pub fn shared() -> SharedRoom {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Add a participant and replay the backlog to it
    ///
    /// Insertion dedupes by identity, but the backlog is replayed on
    /// every call, oldest first.
    pub fn join(&mut self, participant: Arc<dyn Participant>) {
        self.participants
            .insert(participant.id(), participant.clone());
        for msg in &self.recent_msgs {
            participant.deliver(msg);
        }
    }

    /// Remove a participant
    ///
    /// Idempotent: both read and write cycles call this on failure, and
    /// the second call is a no-op.
    pub fn leave(&mut self, id: SessionId) {
        self.participants.remove(&id);
    }

    /// Record a message in the backlog and fan it out to every
    /// joined participant
    pub fn deliver(&mut self, msg: &Message) {
        self.recent_msgs.push_back(msg.clone());
        while self.recent_msgs.len() > MAX_RECENT_MSGS {
            self.recent_msgs.pop_front();
        }
        for participant in self.participants.values() {
            participant.deliver(msg);
        }
    }

    /// Number of currently joined participants
    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }
}

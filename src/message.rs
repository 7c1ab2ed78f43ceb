//! Wire message framing
//!
//! A frame on the wire is a 4-byte ASCII-decimal header holding the body
//! length, followed by the body itself (0..=512 bytes). The header is
//! space-padded to width 4 with no separator or terminator, e.g. a
//! 7-byte body is framed as `"   7<body>"`.

use crate::error::AppError;

/// Header size in bytes
pub const HEADER_LEN: usize = 4;

/// Maximum body size in bytes
pub const MAX_BODY_LEN: usize = 512;

/// Full capacity of one frame's backing buffer
const MAX_FRAME_LEN: usize = HEADER_LEN + MAX_BODY_LEN;

/// One framed chat message
///
/// Owns a fixed-capacity backing buffer: the first HEADER_LEN bytes are
/// the encoded header, the next `body_len` bytes are the body. The same
/// value serves as the reusable read buffer on the inbound path and as
/// an immutable queued frame on the outbound path.
#[derive(Clone)]
pub struct Message {
    data: [u8; MAX_FRAME_LEN],
    body_len: usize,
}

impl Message {
    /// Create an empty message (read path)
    pub fn new() -> Self {
        Self {
            data: [0; MAX_FRAME_LEN],
            body_len: 0,
        }
    }

    /// Create a message holding the given body, header already encoded
    /// (write path). Bodies longer than MAX_BODY_LEN are truncated.
    pub fn from_body(body: &[u8]) -> Self {
        let mut msg = Self::new();
        msg.set_body_len(body.len());
        msg.data[HEADER_LEN..HEADER_LEN + msg.body_len].copy_from_slice(&body[..msg.body_len]);
        msg.encode_header();
        msg
    }

    /// Current body length
    pub fn body_len(&self) -> usize {
        self.body_len
    }

    /// Set the body length, silently clamping to MAX_BODY_LEN
    pub fn set_body_len(&mut self, len: usize) {
        self.body_len = len.min(MAX_BODY_LEN);
    }

    /// Total frame length (header + body)
    pub fn len(&self) -> usize {
        HEADER_LEN + self.body_len
    }

    /// True when the body is empty
    pub fn is_empty(&self) -> bool {
        self.body_len == 0
    }

    /// The body bytes
    pub fn body(&self) -> &[u8] {
        &self.data[HEADER_LEN..HEADER_LEN + self.body_len]
    }

    /// Mutable body region sized by the current body length,
    /// for reading the body off the wire
    pub fn body_mut(&mut self) -> &mut [u8] {
        &mut self.data[HEADER_LEN..HEADER_LEN + self.body_len]
    }

    /// Mutable header region, for reading the header off the wire
    pub fn header_mut(&mut self) -> &mut [u8] {
        &mut self.data[..HEADER_LEN]
    }

    /// The complete frame bytes (header + body), for writing
    pub fn bytes(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    /// Render the body length into the header as width-4 space-padded
    /// ASCII decimal
    pub fn encode_header(&mut self) {
        let header = format!("{:4}", self.body_len);
        self.data[..HEADER_LEN].copy_from_slice(header.as_bytes());
    }

    /// Parse the header bytes into the body length
    ///
    /// Parsing is lenient (atoi semantics): leading whitespace is
    /// skipped, digits are consumed until the first non-digit, and a
    /// header with no leading digits parses as 0. A parsed value above
    /// MAX_BODY_LEN is a protocol violation: the body length resets to
    /// 0 and the frame is rejected.
    pub fn decode_header(&mut self) -> Result<(), AppError> {
        let header = &self.data[..HEADER_LEN];
        let mut value: usize = 0;
        let mut i = 0;
        while i < HEADER_LEN && header[i].is_ascii_whitespace() {
            i += 1;
        }
        while i < HEADER_LEN && header[i].is_ascii_digit() {
            value = value * 10 + (header[i] - b'0') as usize;
            i += 1;
        }
        if value > MAX_BODY_LEN {
            self.body_len = 0;
            return Err(AppError::HeaderOverflow(value));
        }
        self.body_len = value;
        Ok(())
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Message")
            .field("body_len", &self.body_len)
            .field("body", &String::from_utf8_lossy(self.body()))
            .finish()
    }
}

//! Request encoding and response framing.
//!
//! [`FrameReader`] is fed whatever chunks the transport hands back and
//! yields the first complete response frame for its query code. Anything in
//! front of the frame is noise: echoed requests, stray status bytes, or whole
//! frames answering a different query.

use std::fmt;

use tracing::trace;

use crate::error::{Error, Result};

pub const FRAME_START: u8 = b'{';
pub const FRAME_END: u8 = b'}';
pub const REQUEST_MARK: u8 = b'?';
pub const RESPONSE_MARK: u8 = b'!';
pub const ESCAPE_BYTE: u8 = b'\\';

/// Default upper bound on a response body.
pub const DEFAULT_MAX_BODY_LEN: usize = 64 * 1024;

fn is_code_byte(b: u8) -> bool {
    b.is_ascii_uppercase() || b.is_ascii_digit()
}

/// Query codes are two ASCII uppercase letters or digits.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(is_code_byte)
}

/// Encode the request for `code`, e.g. `FN` -> `{FN?}`.
pub fn encode_request(code: &str) -> Result<Vec<u8>> {
    if !is_valid_code(code) {
        return Err(Error::InvalidCode(code.to_string()));
    }
    let mut out = Vec::with_capacity(5);
    out.push(FRAME_START);
    out.extend_from_slice(code.as_bytes());
    out.push(REQUEST_MARK);
    out.push(FRAME_END);
    Ok(out)
}

/// One complete response frame. The body keeps its escape pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    code: String,
    body: String,
}

impl Frame {
    pub fn new(code: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            body: body.into(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}!{}}}", self.code, self.body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Looking for `{`.
    Seek,
    /// Collected `len` bytes of `XX!` after a `{`.
    Header { code: [u8; 2], len: usize },
    Body,
    Escape,
    /// Consuming a frame that answers another query.
    Skip,
    SkipEscape,
}

/// Incremental extractor for the response frame of one query code.
#[derive(Debug)]
pub struct FrameReader {
    code: [u8; 2],
    state: State,
    body: Vec<u8>,
    max_body_len: usize,
}

impl FrameReader {
    pub fn new(code: &str) -> Result<Self> {
        if !is_valid_code(code) {
            return Err(Error::InvalidCode(code.to_string()));
        }
        let bytes = code.as_bytes();
        Ok(Self {
            code: [bytes[0], bytes[1]],
            state: State::Seek,
            body: Vec::new(),
            max_body_len: DEFAULT_MAX_BODY_LEN,
        })
    }

    pub fn with_max_body_len(mut self, max_body_len: usize) -> Self {
        self.max_body_len = max_body_len;
        self
    }

    /// Whether a frame for this code has started but not finished.
    pub fn in_frame(&self) -> bool {
        matches!(self.state, State::Body | State::Escape)
    }

    /// Reset to the initial state, dropping any partial frame.
    pub fn reset(&mut self) {
        self.state = State::Seek;
        self.body.clear();
    }

    /// Feed a chunk. Returns the frame once its closing brace arrives; bytes
    /// after the closing brace are dropped.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Option<Frame>> {
        for (idx, &b) in chunk.iter().enumerate() {
            if let Some(frame) = self.step(b)? {
                let rest = chunk.len() - idx - 1;
                if rest > 0 {
                    trace!("[FRM] dropping {} trailing byte(s)", rest);
                }
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }

    fn step(&mut self, b: u8) -> Result<Option<Frame>> {
        let state = self.state;
        self.state = match state {
            State::Seek => {
                if b == FRAME_START {
                    State::Header { code: [0; 2], len: 0 }
                } else {
                    State::Seek
                }
            }
            State::Header { mut code, len } => {
                if b == FRAME_START {
                    State::Header { code: [0; 2], len: 0 }
                } else if len < 2 {
                    if is_code_byte(b) {
                        code[len] = b;
                        State::Header { code, len: len + 1 }
                    } else {
                        State::Seek
                    }
                } else if b != RESPONSE_MARK {
                    // `{FN?}` echoes and other non-response braces
                    State::Seek
                } else if code == self.code {
                    self.body.clear();
                    State::Body
                } else {
                    trace!(
                        "[FRM] skipping frame for {}",
                        String::from_utf8_lossy(&code)
                    );
                    State::Skip
                }
            }
            State::Body => match b {
                FRAME_END => return self.finish().map(Some),
                ESCAPE_BYTE => {
                    self.push_body(b)?;
                    State::Escape
                }
                _ => {
                    self.push_body(b)?;
                    State::Body
                }
            },
            State::Escape => {
                self.push_body(b)?;
                State::Body
            }
            State::Skip => match b {
                FRAME_END => State::Seek,
                ESCAPE_BYTE => State::SkipEscape,
                _ => State::Skip,
            },
            State::SkipEscape => State::Skip,
        };
        Ok(None)
    }

    fn push_body(&mut self, b: u8) -> Result<()> {
        if self.body.len() >= self.max_body_len {
            self.reset();
            return Err(Error::FrameTooLarge {
                limit: self.max_body_len,
            });
        }
        self.body.push(b);
        Ok(())
    }

    fn finish(&mut self) -> Result<Frame> {
        self.state = State::Seek;
        let body = std::mem::take(&mut self.body);
        let body = String::from_utf8(body).map_err(|e| e.utf8_error())?;
        // Codes are ASCII by construction.
        let code = String::from_utf8_lossy(&self.code).into_owned();
        Ok(Frame { code, body })
    }
}

/// Pull the first complete frame for `code` out of `text`.
pub fn extract_frame(text: &str, code: &str) -> Result<Frame> {
    let mut reader = FrameReader::new(code)?.with_max_body_len(usize::MAX);
    reader.push(text.as_bytes())?.ok_or_else(|| Error::Incomplete {
        code: code.to_string(),
    })
}

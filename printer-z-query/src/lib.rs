//! Wire codec for printer status queries.
//!
//! A status query is a short ASCII request such as `{FN?}`. The printer
//! answers with a single frame `{FN!<body>}` whose body is a `;`-separated
//! list of `KEY[:VALUE]` entries. This crate knows nothing about transports;
//! it encodes requests, pulls response frames out of an arbitrary byte stream
//! and tokenizes frame bodies.

pub mod error;
pub mod escape;
pub mod frame;
pub mod response;

pub use error::{Error, Result};
pub use escape::{escape, split_unescaped, splitn_unescaped, unescape};
pub use frame::{DEFAULT_MAX_BODY_LEN, Frame, FrameReader, encode_request, extract_frame, is_valid_code};
pub use response::{Entry, Response, parse_response, tokenize};

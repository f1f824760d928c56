//! Typed access to printer status query responses.
//!
//! A [`Connection`] wraps a byte [`Transport`] and runs query exchanges.
//! Parameter views such as [`FontList`] bind to a connection and expose the
//! fields of the last decoded response, each with an explicit presence flag:
//! a field the printer did not report reads as `None` rather than as a magic
//! value.
//!
//! ```no_run
//! use printer_z::{Builder, Connection, FontList, transport::loopback};
//!
//! let (transport, _printer) = loopback();
//! let connection = Connection::builder(transport).build()?;
//! let mut fonts = FontList::new(&connection);
//! fonts.refresh()?;
//! for font in fonts.fonts_or_empty() {
//!     println!("{} {}", font.id, font.location);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod connection;
pub mod decode;
pub mod error;
pub mod file_list;
pub mod font;
pub mod font_list;
pub mod general_status;
pub mod query;
pub mod registry;
pub mod state;
pub mod transport;
mod utils;

pub use config::{QueryConfig, QueryConfigBuilder};
pub use connection::{Connection, ConnectionBuilder};
pub use error::{ConfigError, ParseError, QueryError, TransportError};
pub use file_list::{FileData, FileList, FileListFields};
pub use font::{FontData, FontLocation};
pub use font_list::{FontList, FontListFields};
pub use general_status::{GeneralStatus, GeneralStatusFields};
pub use query::QueryId;
pub use registry::{DecodedFields, decode, decode_frame, decode_response};
pub use state::{ParameterDecoder, PrinterState};
pub use transport::Transport;

pub trait Builder {
    type Output;
    fn build(self) -> Result<Self::Output, ConfigError>;
}

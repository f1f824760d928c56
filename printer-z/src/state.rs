//! Shared update machinery behind every parameter view.

use std::fmt;
use std::ops::Deref;

use printer_z_query::{Frame, Response, parse_response};
use tracing::{debug, warn};

use crate::{
    connection::Connection,
    error::{ParseError, QueryError},
    query::QueryId,
};

/// A set of typed fields decoded from one query's response.
///
/// `Default` is the state before any successful update: every field absent.
pub trait ParameterDecoder: Default {
    const QUERY: QueryId;

    fn try_update(response: &Response) -> Result<Self, ParseError>;

    /// Whether at least one field is present.
    fn has_any(&self) -> bool;
}

/// A parameter view bound to a connection.
///
/// Construction performs no I/O and leaves every field absent. Fields are
/// replaced as a whole by [`update`](Self::update) or
/// [`refresh`](Self::refresh); a failed update resets them to absent rather
/// than leaving stale values behind. The field accessors of `D` are reachable
/// directly through `Deref`.
pub struct PrinterState<D> {
    connection: Connection,
    fields: D,
    valid: bool,
}

impl<D: ParameterDecoder> PrinterState<D> {
    pub fn new(connection: &Connection) -> Self {
        Self {
            connection: connection.clone(),
            fields: D::default(),
            valid: false,
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn query_id(&self) -> QueryId {
        D::QUERY
    }

    /// True when the last update succeeded and reported at least one field.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn fields(&self) -> &D {
        &self.fields
    }

    /// Decode raw response text, e.g. `{FN!N:1;F:50,R}`.
    ///
    /// Leading noise and frames for other queries are skipped. A response
    /// that omits a field is a success that leaves the field absent.
    pub fn update(&mut self, response: &str) -> Result<(), ParseError> {
        let decoded = parse_response(response, D::QUERY.code())
            .map_err(ParseError::from)
            .and_then(|response| D::try_update(&response));
        self.apply(decoded)
    }

    /// Decode an already framed response.
    pub fn update_frame(&mut self, frame: &Frame) -> Result<(), ParseError> {
        let decoded = Response::from_frame(frame)
            .map_err(ParseError::from)
            .and_then(|response| D::try_update(&response));
        self.apply(decoded)
    }

    /// Query the printer over the bound connection and decode the reply.
    pub fn refresh(&mut self) -> Result<(), QueryError> {
        let frame = match self.connection.exchange(D::QUERY) {
            Ok(frame) => frame,
            Err(e) => {
                self.reset();
                return Err(e);
            }
        };
        self.update_frame(&frame)?;
        Ok(())
    }

    /// Forget every field.
    pub fn reset(&mut self) {
        self.fields = D::default();
        self.valid = false;
    }

    fn apply(&mut self, decoded: Result<D, ParseError>) -> Result<(), ParseError> {
        match decoded {
            Ok(fields) => {
                self.valid = fields.has_any();
                self.fields = fields;
                debug!(
                    "[STATE] {} updated on session {} (fields present: {})",
                    D::QUERY,
                    self.connection.id(),
                    self.valid
                );
                Ok(())
            }
            Err(e) => {
                warn!(
                    "[STATE] {} update failed on session {}: {}",
                    D::QUERY,
                    self.connection.id(),
                    e
                );
                self.reset();
                Err(e)
            }
        }
    }
}

impl<D> Deref for PrinterState<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.fields
    }
}

impl<D: fmt::Debug> fmt::Debug for PrinterState<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrinterState")
            .field("connection", &self.connection)
            .field("fields", &self.fields)
            .field("valid", &self.valid)
            .finish()
    }
}

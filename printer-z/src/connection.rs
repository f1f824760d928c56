use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use printer_z_query::{Frame, FrameReader};
use tracing::{debug, trace, warn};

use crate::{
    Builder,
    config::{QueryConfig, QueryConfigBuilder},
    error::{ConfigError, QueryError},
    query::QueryId,
    registry::{self, DecodedFields},
    transport::Transport,
};

#[derive(Debug, Default)]
pub struct GlobalCounter(AtomicUsize);

impl GlobalCounter {
    pub const fn new() -> Self {
        Self(AtomicUsize::new(0))
    }

    pub fn increment(&self) -> usize {
        self.0.fetch_add(1, Ordering::AcqRel)
    }
}

// Session ids for log correlation
static SESSIONS: GlobalCounter = GlobalCounter::new();

pub struct ConnectionBuilder {
    transport: Box<dyn Transport>,
    config: Option<QueryConfig>,
    name: Option<String>,
}

impl ConnectionBuilder {
    pub fn with_config(mut self, config: QueryConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Label used in logs, e.g. the printer's address.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl Builder for ConnectionBuilder {
    type Output = Connection;

    fn build(self) -> Result<Connection, ConfigError> {
        let config = match self.config {
            Some(config) => {
                config.validate()?;
                config
            }
            None => QueryConfigBuilder::default().build()?,
        };
        let id = SESSIONS.increment();
        let name = self.name.unwrap_or_else(|| format!("printer-{id}"));
        debug!("[CON] opened session {} ({})", id, name);
        Ok(Connection {
            inner: Arc::new(Shared {
                id,
                name,
                config,
                transport: Mutex::new(self.transport),
            }),
        })
    }
}

struct Shared {
    id: usize,
    name: String,
    config: QueryConfig,
    transport: Mutex<Box<dyn Transport>>,
}

/// Cloneable handle to one printer session.
///
/// Parameter views hold a clone; every clone talks to the same transport.
/// An exchange keeps the transport locked from request to response, so
/// exchanges from different threads never interleave on the wire.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Shared>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .finish_non_exhaustive()
    }
}

impl Connection {
    pub fn builder<T: Transport + 'static>(transport: T) -> ConnectionBuilder {
        ConnectionBuilder {
            transport: Box::new(transport),
            config: None,
            name: None,
        }
    }

    pub fn id(&self) -> usize {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn config(&self) -> &QueryConfig {
        &self.inner.config
    }

    /// Whether both handles refer to the same session.
    pub fn same_session(&self, other: &Connection) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Send the request for `query` and wait for its response frame.
    ///
    /// Each attempt discards stale input, writes the request and reads until
    /// the frame closes or the attempt's deadline passes. Timed-out attempts
    /// are retried `retries` times; transport and framing errors are not.
    #[tracing::instrument(name = "exchange", skip(self), fields(
        session = self.inner.id,
        query = %query
    ))]
    pub fn exchange(&self, query: QueryId) -> Result<Frame, QueryError> {
        let config = &self.inner.config;
        let request = query.request();
        let attempts = config.retries.saturating_add(1);

        let mut transport = self.inner.transport.lock();
        for attempt in 1..=attempts {
            if attempt > 1 && !config.retry_delay().is_zero() {
                std::thread::sleep(config.retry_delay());
            }

            transport.discard_input()?;
            debug!("[QRY] -> {} (attempt {}/{})", request, attempt, attempts);
            transport.write_all(request.as_bytes())?;

            let mut reader =
                FrameReader::new(query.code())?.with_max_body_len(config.max_response_len);
            let deadline = Instant::now() + config.timeout();
            loop {
                let remaining = deadline.saturating_duration_since(Instant::now());
                if remaining.is_zero() {
                    break;
                }
                let Some(chunk) = transport.read(remaining)? else {
                    break;
                };
                trace!("[QRY] <- {} byte(s)", chunk.len());
                if let Some(frame) = reader.push(&chunk)? {
                    debug!("[QRY] <- {}", frame);
                    return Ok(frame);
                }
            }

            warn!(
                "[QRY] {} timed out after {:?} (attempt {}/{})",
                query,
                config.timeout(),
                attempt,
                attempts
            );
        }

        Err(QueryError::Timeout { query, attempts })
    }

    /// Exchange `query` and decode the response through the dispatch table.
    pub fn query(&self, query: QueryId) -> Result<DecodedFields, QueryError> {
        let frame = self.exchange(query)?;
        Ok(registry::decode_frame(&frame)?)
    }
}

//! Integration tests for query exchanges over in-memory transports

use std::thread;
use std::time::Duration;

use printer_z::{
    Builder, Connection, DecodedFields, FontList, GeneralStatus, ParseError, QueryConfig,
    QueryConfigBuilder, QueryError, QueryId, TransportError,
    transport::{ScriptedTransport, loopback},
};

fn config(retries: u32) -> QueryConfig {
    QueryConfigBuilder::default()
        .ignore_env()
        .with_retries(retries)
        .with_retry_delay(Duration::ZERO)
        .with_timeout(Duration::from_secs(2))
        .build()
        .unwrap()
}

fn connect(transport: ScriptedTransport, retries: u32) -> Connection {
    Connection::builder(transport)
        .with_config(config(retries))
        .build()
        .unwrap()
}

// ============================================================================
// Exchange with a scripted printer
// ============================================================================

#[test]
fn test_exchange_single_reply() {
    let transport = ScriptedTransport::new().reply("{FN?}", ["{FN!N:1;F:50,R}"]);
    let log = transport.log();
    let connection = connect(transport, 0);

    let frame = connection.exchange(QueryId::FontList).unwrap();
    assert_eq!(frame.body(), "N:1;F:50,R");
    assert_eq!(log.requests(), vec![b"{FN?}".to_vec()]);
}

#[test]
fn test_exchange_reassembles_chunks() {
    let transport = ScriptedTransport::new().reply(
        "{ST?}",
        ["\x11{S", "T!PO:0", ";LO:1", "}trailing"],
    );
    let connection = connect(transport, 0);

    let mut status = GeneralStatus::new(&connection);
    status.refresh().unwrap();
    assert_eq!(status.paper_out(), Some(false));
    assert_eq!(status.latch_open(), Some(true));
}

#[test]
fn test_exchange_retries_after_timeout() {
    let transport = ScriptedTransport::new()
        .silence("{FN?}")
        .reply("{FN?}", ["{FN!N:0}"]);
    let log = transport.log();
    let connection = connect(transport, 1);

    let mut fonts = FontList::new(&connection);
    fonts.refresh().unwrap();
    assert!(fonts.fonts_is_present());
    assert!(fonts.fonts_or_empty().is_empty());
    assert_eq!(log.len(), 2);
}

#[test]
fn test_exchange_gives_up_after_retries() {
    let transport = ScriptedTransport::new()
        .silence("{FN?}")
        .silence("{FN?}")
        .silence("{FN?}");
    let log = transport.log();
    let connection = connect(transport, 2);

    let mut fonts = FontList::new(&connection);
    let err = fonts.refresh().unwrap_err();
    assert!(matches!(
        err,
        QueryError::Timeout {
            query: QueryId::FontList,
            attempts: 3
        }
    ));
    assert_eq!(log.len(), 3);
    assert!(!fonts.is_valid());
}

#[test]
fn test_stale_input_is_discarded() {
    let transport = ScriptedTransport::new()
        .with_pending_input("{FN!F:OLD,R}")
        .reply("{FN?}", ["{FN!F:NEW,R}"]);
    let connection = connect(transport, 0);

    let frame = connection.exchange(QueryId::FontList).unwrap();
    assert_eq!(frame.body(), "F:NEW,R");
}

#[test]
fn test_foreign_frames_are_skipped() {
    let transport =
        ScriptedTransport::new().reply("{FL?}", ["{ST!PO:1}", "{FL!FILE:a.fmt,10}"]);
    let connection = connect(transport, 0);

    match connection.query(QueryId::FileList).unwrap() {
        DecodedFields::FileList(fields) => assert_eq!(fields.files().unwrap().len(), 1),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_transport_errors_are_not_retried() {
    let transport = ScriptedTransport::new().reply("{ST?}", ["{ST!}"]);
    let log = transport.log();
    let connection = connect(transport, 3);

    let err = connection.exchange(QueryId::FontList).unwrap_err();
    assert!(matches!(
        err,
        QueryError::Transport(TransportError::UnexpectedRequest(_))
    ));
    assert_eq!(log.len(), 1);
}

#[test]
fn test_oversized_response() {
    let transport = ScriptedTransport::new().reply("{FN?}", ["{FN!F:0123456789,R}"]);
    let config = QueryConfigBuilder::default()
        .ignore_env()
        .with_max_response_len(4)
        .build()
        .unwrap();
    let connection = Connection::builder(transport)
        .with_config(config)
        .build()
        .unwrap();

    let err = connection.exchange(QueryId::FontList).unwrap_err();
    assert!(matches!(
        err,
        QueryError::Parse(ParseError::Frame(printer_z_query::Error::FrameTooLarge { .. }))
    ));
}

#[test]
fn test_decode_failure_surfaces_from_query() {
    let transport = ScriptedTransport::new().reply("{FN?}", ["{FN!N:5}"]);
    let connection = connect(transport, 0);
    assert!(matches!(
        connection.query(QueryId::FontList),
        Err(QueryError::Parse(ParseError::CountMismatch { .. }))
    ));
}

// ============================================================================
// Connection handles
// ============================================================================

#[test]
fn test_connection_handles() {
    let a = Connection::builder(ScriptedTransport::new())
        .with_config(config(0))
        .with_name("bench-printer")
        .build()
        .unwrap();
    let b = Connection::builder(ScriptedTransport::new())
        .with_config(config(0))
        .build()
        .unwrap();

    assert_eq!(a.name(), "bench-printer");
    assert_eq!(b.name(), format!("printer-{}", b.id()));
    assert_ne!(a.id(), b.id());
    assert!(a.same_session(&a.clone()));
    assert!(!a.same_session(&b));

    let fonts = FontList::new(&a);
    assert!(fonts.connection().same_session(&a));
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = QueryConfig {
        timeout_ms: 0,
        ..QueryConfig::default()
    };
    assert!(
        Connection::builder(ScriptedTransport::new())
            .with_config(config)
            .build()
            .is_err()
    );
}

// ============================================================================
// Loopback printer thread
// ============================================================================

#[test]
fn test_loopback_printer_thread() {
    let (transport, printer) = loopback();
    let connection = Connection::builder(transport)
        .with_config(config(0))
        .build()
        .unwrap();

    let handle = thread::spawn(move || {
        for _ in 0..2 {
            let request = printer
                .recv_request(Duration::from_secs(5))
                .unwrap()
                .expect("request");
            match request.as_slice() {
                b"{FN?}" => {
                    printer.reply("{FN?}\r\n{FN!N:2;").unwrap();
                    printer.reply(r"F:50,R,Sans;F:MF1,D,My\;Font}").unwrap();
                }
                b"{ST?}" => printer.reply("{ST!BL:1;BV:6.9}").unwrap(),
                other => panic!("unexpected request {other:?}"),
            }
        }
    });

    let mut fonts = FontList::new(&connection);
    fonts.refresh().unwrap();
    assert_eq!(fonts.fonts_or_empty().len(), 2);
    assert_eq!(fonts.fonts_or_empty()[1].name.as_deref(), Some("My;Font"));

    let mut status = GeneralStatus::new(&connection);
    status.refresh().unwrap();
    assert_eq!(status.battery_low(), Some(true));
    assert_eq!(status.battery_voltage(), Some(6.9));

    handle.join().unwrap();
}

#[test]
fn test_loopback_timeout_then_closed() {
    let (transport, printer) = loopback();
    let config = QueryConfigBuilder::default()
        .ignore_env()
        .with_retries(0)
        .with_timeout(Duration::from_millis(20))
        .build()
        .unwrap();
    let connection = Connection::builder(transport)
        .with_config(config)
        .build()
        .unwrap();

    assert!(matches!(
        connection.exchange(QueryId::GeneralStatus),
        Err(QueryError::Timeout { attempts: 1, .. })
    ));

    drop(printer);
    assert!(matches!(
        connection.exchange(QueryId::GeneralStatus),
        Err(QueryError::Transport(TransportError::Closed))
    ));
}

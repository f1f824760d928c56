//! Integration tests for printer-z-query

use printer_z_query::{
    Entry, Error, Frame, FrameReader, Response, encode_request, escape, extract_frame,
    parse_response, tokenize,
};

// ============================================================================
// Framing tests
// ============================================================================

#[test]
fn test_extract_simple_frame() {
    let frame = extract_frame("{FN!N:2;F:50,R;F:51,D}", "FN").unwrap();
    assert_eq!(frame.code(), "FN");
    assert_eq!(frame.body(), "N:2;F:50,R;F:51,D");
}

#[test]
fn test_frame_split_across_chunks() {
    let wire = b"{FN!N:1;F:MF204,D,Custom Font}";
    let expected = extract_frame(std::str::from_utf8(wire).unwrap(), "FN").unwrap();

    for split in 1..wire.len() {
        let mut reader = FrameReader::new("FN").unwrap();
        let (head, tail) = wire.split_at(split);
        assert_eq!(reader.push(head).unwrap(), None, "split at {split}");
        assert_eq!(reader.push(tail).unwrap(), Some(expected.clone()), "split at {split}");
    }
}

#[test]
fn test_byte_at_a_time() {
    let mut reader = FrameReader::new("ST").unwrap();
    let wire = b"\x11\x13{ST!PO:0;LO:1}";
    let mut frames = Vec::new();
    for b in wire {
        if let Some(frame) = reader.push(std::slice::from_ref(b)).unwrap() {
            frames.push(frame);
        }
    }
    assert_eq!(frames, vec![Frame::new("ST", "PO:0;LO:1")]);
}

#[test]
fn test_noise_and_echo_are_skipped() {
    let frame = extract_frame("garbage{FN?}\r\n{ {x{FN!N:0}", "FN").unwrap();
    assert_eq!(frame.body(), "N:0");
}

#[test]
fn test_foreign_frame_is_skipped() {
    // The status frame contains an escaped brace that must not end the skip early.
    let frame = extract_frame(r"{ST!PO:1;X:a\}b}{FN!N:0}", "FN").unwrap();
    assert_eq!(frame, Frame::new("FN", "N:0"));
}

#[test]
fn test_brace_restarts_header() {
    let frame = extract_frame("{F{FN!N:0}", "FN").unwrap();
    assert_eq!(frame.body(), "N:0");
}

#[test]
fn test_incomplete_frame() {
    assert_eq!(
        extract_frame("{FN!N:2;F:50", "FN").unwrap_err(),
        Error::Incomplete {
            code: "FN".to_string()
        }
    );
    assert!(matches!(
        extract_frame("", "FN"),
        Err(Error::Incomplete { .. })
    ));
}

#[test]
fn test_frame_too_large() {
    let mut reader = FrameReader::new("FL").unwrap().with_max_body_len(4);
    assert_eq!(reader.push(b"{FL!1234").unwrap(), None);
    assert_eq!(
        reader.push(b"5}").unwrap_err(),
        Error::FrameTooLarge { limit: 4 }
    );
    // The reader is usable again after the error.
    assert_eq!(reader.push(b"{FL!ok}").unwrap(), Some(Frame::new("FL", "ok")));
}

#[test]
fn test_invalid_utf8_body() {
    let mut reader = FrameReader::new("FN").unwrap();
    assert!(matches!(
        reader.push(b"{FN!F:\xff\xfe,R}"),
        Err(Error::Utf8(_))
    ));
}

#[test]
fn test_invalid_code() {
    assert!(matches!(FrameReader::new("F"), Err(Error::InvalidCode(_))));
    assert!(matches!(extract_frame("{fn!}", "fn"), Err(Error::InvalidCode(_))));
}

#[test]
fn test_request_bytes() {
    assert_eq!(encode_request("ST").unwrap(), b"{ST?}".to_vec());
}

// ============================================================================
// Tokenizer tests
// ============================================================================

#[test]
fn test_tokenize_entries() {
    let entries = tokenize("N:2; F:50,R ;F:51,D,Bold;;PO").unwrap();
    assert_eq!(
        entries,
        vec![
            Entry::new("N", "2"),
            Entry::new("F", "50,R"),
            Entry::new("F", "51,D,Bold"),
            Entry::new("PO", ""),
        ]
    );
}

#[test]
fn test_tokenize_empty_body() {
    assert!(tokenize("").unwrap().is_empty());
    assert!(tokenize(" ; ;").unwrap().is_empty());
}

#[test]
fn test_tokenize_escaped_separators() {
    let entries = tokenize(r"F:1,R,Time\;s\: New\, Roman;N:1").unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].value().unwrap(), "1,R,Time;s: New, Roman");
    assert_eq!(
        entries[0].split_value(',', 3).unwrap(),
        vec!["1", "R", "Time;s: New, Roman"]
    );
}

#[test]
fn test_value_keeps_later_colons() {
    let entries = tokenize("T:12:30:00").unwrap();
    assert_eq!(entries[0].key(), "T");
    assert_eq!(entries[0].value().unwrap(), "12:30:00");
}

#[test]
fn test_tokenize_invalid_key() {
    assert_eq!(
        tokenize("N:1;:5").unwrap_err(),
        Error::InvalidKey(String::new())
    );
    assert_eq!(
        tokenize("BAD KEY:1").unwrap_err(),
        Error::InvalidKey("BAD KEY".to_string())
    );
}

#[test]
fn test_tokenize_dangling_escape() {
    assert_eq!(tokenize(r"F:abc\").unwrap_err(), Error::DanglingEscape);
    // A bare key ending in an escape is dangling too, not an invalid key
    assert_eq!(tokenize(r"N\").unwrap_err(), Error::DanglingEscape);
    assert_eq!(tokenize(r"PO:1;N\").unwrap_err(), Error::DanglingEscape);
}

#[test]
fn test_split_value_trims_parts() {
    let entry = Entry::new("F", "50 , R , Helvetica Bold ");
    assert_eq!(
        entry.split_value(',', 3).unwrap(),
        vec!["50", "R", "Helvetica Bold"]
    );
}

#[test]
fn test_escape_survives_the_wire() {
    let name = "Fancy; {bold}, 12:00";
    let text = format!("{{FN!F:7,D,{}}}", escape(name));
    let response = parse_response(&text, "FN").unwrap();
    let parts = response.get("F").unwrap().split_value(',', 3).unwrap();
    assert_eq!(parts[2], name);

    let padded = "  Sans  ";
    let entries = tokenize(&format!("F:{}", escape(padded))).unwrap();
    assert_eq!(entries[0].value().unwrap(), padded);

    let text = format!("{{FN!F:7,D,{}}}", escape(padded));
    let response = parse_response(&text, "FN").unwrap();
    let parts = response.get("F").unwrap().split_value(',', 3).unwrap();
    assert_eq!(parts[2], padded);
}

// ============================================================================
// Response tests
// ============================================================================

#[test]
fn test_response_lookup() {
    let response = parse_response("{FL!FILE:a.lbl,10;FREE:900;FILE:b.lbl,20}", "FL").unwrap();
    assert_eq!(response.code(), "FL");
    assert_eq!(response.entries().len(), 3);
    assert_eq!(response.get("FREE").unwrap().raw_value(), "900");
    let files: Vec<_> = response.get_all("FILE").map(|e| e.raw_value()).collect();
    assert_eq!(files, vec!["a.lbl,10", "b.lbl,20"]);
    assert!(!response.contains("N"));
}

#[test]
fn test_response_from_frame() {
    let frame = Frame::new("ST", "PO:1");
    let response = Response::from_frame(&frame).unwrap();
    assert!(!response.is_empty());
    assert_eq!(response.get("PO").unwrap().value().unwrap(), "1");
}

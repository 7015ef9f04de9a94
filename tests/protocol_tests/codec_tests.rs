//! Codec Tests
//!
//! Tests for command, response and record encoding/decoding.

use std::io::Cursor;

use petstore::protocol::{
    decode_command, decode_record, decode_response, encode_command, encode_record,
    encode_response, read_command, read_response, write_command, write_response, Command,
    Response, Status, MAX_RECORD_SIZE,
};
use petstore::Pet;

// =============================================================================
// Command Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_create() {
    let record = encode_record(&Pet::named("Rex")).unwrap();
    let cmd = Command::Create {
        record: record.clone(),
    };
    let decoded = decode_command(&encode_command(&cmd)).unwrap();

    match decoded {
        Command::Create { record: body } => {
            assert_eq!(body, record);
            assert_eq!(decode_record::<Pet>(&body).unwrap(), Pet::named("Rex"));
        }
        _ => panic!("Expected CREATE command"),
    }
}

#[test]
fn test_encode_decode_fetch() {
    let cmd = Command::Fetch { id: 42 };
    let decoded = decode_command(&encode_command(&cmd)).unwrap();
    assert_eq!(decoded, Command::Fetch { id: 42 });
}

#[test]
fn test_encode_decode_replace() {
    let record = encode_record(&Pet::new(7, "Fido").with_status("sold")).unwrap();
    let cmd = Command::Replace {
        id: 7,
        record: record.clone(),
    };
    let decoded = decode_command(&encode_command(&cmd)).unwrap();

    match decoded {
        Command::Replace { id, record: body } => {
            assert_eq!(id, 7);
            assert_eq!(body, record);
        }
        _ => panic!("Expected REPLACE command"),
    }
}

#[test]
fn test_encode_decode_remove_negative_id() {
    let cmd = Command::Remove { id: -3 };
    let decoded = decode_command(&encode_command(&cmd)).unwrap();
    assert_eq!(decoded, Command::Remove { id: -3 });
}

#[test]
fn test_encode_decode_ping() {
    let decoded = decode_command(&encode_command(&Command::Ping)).unwrap();
    assert_eq!(decoded, Command::Ping);
}

#[test]
fn test_record_with_missing_fields() {
    let pet = Pet {
        id: None,
        name: Some("Rex".to_string()),
        status: None,
    };
    let decoded: Pet = decode_record(&encode_record(&pet).unwrap()).unwrap();
    assert_eq!(decoded, pet);
}

#[test]
fn test_decode_garbage_record() {
    let result = decode_record::<Pet>(&[0xFF, 0xFF, 0xFF]);
    assert!(result.is_err());
}

// =============================================================================
// Response Encoding/Decoding Tests
// =============================================================================

#[test]
fn test_encode_decode_response_ok() {
    let resp = Response::ok(Some(b"value".to_vec()));
    let decoded = decode_response(&encode_response(&resp)).unwrap();

    assert_eq!(decoded.status, Status::Ok);
    assert_eq!(decoded.payload, Some(b"value".to_vec()));
}

#[test]
fn test_encode_decode_response_ok_no_payload() {
    let decoded = decode_response(&encode_response(&Response::ok(None))).unwrap();

    assert_eq!(decoded.status, Status::Ok);
    assert_eq!(decoded.payload, None);
}

#[test]
fn test_encode_decode_failure_statuses() {
    let responses = [
        (Response::not_found("no pet"), Status::NotFound),
        (Response::error("something went wrong"), Status::Error),
        (Response::conflict("id taken"), Status::Conflict),
        (Response::bad_request("bad body"), Status::BadRequest),
        (Response::busy("locked"), Status::Busy),
    ];

    for (resp, status) in responses {
        let decoded = decode_response(&encode_response(&resp)).unwrap();
        assert_eq!(decoded.status, status);
        assert_eq!(decoded.message(), resp.message());
    }
}

// =============================================================================
// Error Handling Tests
// =============================================================================

#[test]
fn test_incomplete_header() {
    let bytes = [0x02, 0x00, 0x00]; // Only 3 bytes, need 5
    let result = decode_command(&bytes);
    assert!(result.unwrap_err().to_string().contains("Incomplete command header"));
}

#[test]
fn test_incomplete_payload() {
    // Header says 8 bytes payload, but only 2 provided
    let bytes = [0x02, 0x00, 0x00, 0x00, 0x08, 0x00, 0x01];
    let result = decode_command(&bytes);
    assert!(result.unwrap_err().to_string().contains("Incomplete"));
}

#[test]
fn test_unknown_command_type() {
    let bytes = [0xFF, 0x00, 0x00, 0x00, 0x00];
    let result = decode_command(&bytes);
    assert!(result.unwrap_err().to_string().contains("Unknown command type"));
}

#[test]
fn test_unknown_response_status() {
    let bytes = [0xFF, 0x00, 0x00, 0x00, 0x00];
    let result = decode_response(&bytes);
    assert!(result.unwrap_err().to_string().contains("Unknown response status"));
}

#[test]
fn test_fetch_with_short_id() {
    let bytes = [0x02, 0x00, 0x00, 0x00, 0x02, 0x00, 0x01];
    let result = decode_command(&bytes);
    assert!(result.unwrap_err().to_string().contains("incomplete id"));
}

#[test]
fn test_remove_with_trailing_bytes() {
    let mut bytes = vec![0x04, 0x00, 0x00, 0x00, 0x09];
    bytes.extend_from_slice(&1i64.to_be_bytes());
    bytes.push(0xAA);

    let result = decode_command(&bytes);
    assert!(result.unwrap_err().to_string().contains("after id"));
}

#[test]
fn test_ping_with_unexpected_payload() {
    let bytes = [0x05, 0x00, 0x00, 0x00, 0x05, 0x68, 0x65, 0x6C, 0x6C, 0x6F];
    let result = decode_command(&bytes);
    assert!(result.unwrap_err().to_string().contains("unexpected payload"));
}

#[test]
fn test_oversized_payload_rejected() {
    let bytes = [0x01, 0xFF, 0xFF, 0xFF, 0xFF];
    let result = read_command(&mut Cursor::new(bytes.to_vec()));
    assert!(result.unwrap_err().to_string().contains("Payload too large"));
}

#[test]
fn test_oversized_record_rejected_at_encode() {
    let pet = Pet::new(1, "x".repeat(MAX_RECORD_SIZE));
    let result = encode_record(&pet);
    assert!(result.unwrap_err().to_string().contains("Record too large"));
}

#[test]
fn test_largest_record_fits_replace_frame() {
    // Option tag + i64 id + Option tag + u64 length prefix + None status
    let overhead = 1 + 8 + 1 + 8 + 1;
    let pet = Pet::new(1, "x".repeat(MAX_RECORD_SIZE - overhead));
    let record = encode_record(&pet).unwrap();
    assert_eq!(record.len(), MAX_RECORD_SIZE);

    let cmd = Command::Replace { id: 1, record };
    let decoded = decode_command(&encode_command(&cmd)).unwrap();
    assert_eq!(decoded, cmd);
}

// =============================================================================
// Stream I/O Tests
// =============================================================================

#[test]
fn test_stream_write_read_command() {
    let cmd = Command::Replace {
        id: 1,
        record: encode_record(&Pet::new(1, "Rex")).unwrap(),
    };

    let mut buffer = Vec::new();
    write_command(&mut buffer, &cmd).unwrap();

    let decoded = read_command(&mut Cursor::new(buffer)).unwrap();
    assert_eq!(decoded, cmd);
}

#[test]
fn test_stream_multiple_commands() {
    let commands = vec![
        Command::Ping,
        Command::Create {
            record: encode_record(&Pet::named("Rex")).unwrap(),
        },
        Command::Fetch { id: 1 },
        Command::Remove { id: 1 },
    ];

    let mut buffer = Vec::new();
    for cmd in &commands {
        write_command(&mut buffer, cmd).unwrap();
    }

    let mut cursor = Cursor::new(buffer);
    for expected in &commands {
        assert_eq!(&read_command(&mut cursor).unwrap(), expected);
    }
}

#[test]
fn test_stream_multiple_responses() {
    let responses = vec![
        Response::ok(Some(b"data".to_vec())),
        Response::not_found("gone"),
        Response::busy("locked"),
        Response::ok(None),
    ];

    let mut buffer = Vec::new();
    for resp in &responses {
        write_response(&mut buffer, resp).unwrap();
    }

    let mut cursor = Cursor::new(buffer);
    for expected in &responses {
        assert_eq!(&read_response(&mut cursor).unwrap(), expected);
    }
}

#[test]
fn test_stream_truncated_frame() {
    let mut buffer = encode_command(&Command::Fetch { id: 9 });
    buffer.truncate(buffer.len() - 3);

    assert!(read_command(&mut Cursor::new(buffer)).is_err());
}

// =============================================================================
// Wire Format Verification Tests
// =============================================================================

#[test]
fn test_wire_format_fetch() {
    let encoded = encode_command(&Command::Fetch { id: 258 });

    // Expected: [0x02][0x00 0x00 0x00 0x08][id as i64 big-endian]
    assert_eq!(encoded.len(), 13);
    assert_eq!(encoded[0], 0x02); // FETCH command
    assert_eq!(&encoded[1..5], &[0x00, 0x00, 0x00, 0x08]); // payload len = 8
    assert_eq!(&encoded[5..13], &[0, 0, 0, 0, 0, 0, 0x01, 0x02]);
}

#[test]
fn test_wire_format_response_busy() {
    let encoded = encode_response(&Response::busy("hi"));

    // Expected: [0x05][0x00 0x00 0x00 0x02][h i]
    assert_eq!(encoded[0], 0x05); // BUSY status
    assert_eq!(&encoded[1..5], &[0x00, 0x00, 0x00, 0x02]);
    assert_eq!(&encoded[5..7], b"hi");
}

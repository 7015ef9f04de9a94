//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - CREATE:  record
//! - FETCH:   id (8 bytes, i64 BE)
//! - REPLACE: id (8 bytes, i64 BE) + record
//! - REMOVE:  id (8 bytes, i64 BE)
//! - PING:    empty
//!
//! Records are bincode-encoded.
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use bytes::{Buf, BufMut, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Command, Response, Status};
use crate::error::{Result, StoreError};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Size of an encoded record id
pub const ID_SIZE: usize = 8;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Record Encoding/Decoding
// =============================================================================

/// Largest record body that still fits a REPLACE frame
pub const MAX_RECORD_SIZE: usize = MAX_PAYLOAD_SIZE as usize - ID_SIZE;

/// Encode a record body
///
/// Fails with `Protocol` if the body would not fit in a frame.
pub fn encode_record<R: Serialize>(record: &R) -> Result<Vec<u8>> {
    let size = bincode::serialized_size(record)?;
    if size > MAX_RECORD_SIZE as u64 {
        return Err(StoreError::Protocol(format!(
            "Record too large: {} bytes (max {})",
            size, MAX_RECORD_SIZE
        )));
    }
    Ok(bincode::serialize(record)?)
}

/// Decode a record body
pub fn decode_record<R: DeserializeOwned>(bytes: &[u8]) -> Result<R> {
    Ok(bincode::deserialize(bytes)?)
}

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Vec<u8> {
    let mut payload = BytesMut::new();
    match command {
        Command::Create { record } => payload.extend_from_slice(record),
        Command::Fetch { id } | Command::Remove { id } => payload.put_i64(*id),
        Command::Replace { id, record } => {
            payload.put_i64(*id);
            payload.extend_from_slice(record);
        }
        Command::Ping => {}
    }

    frame(command.command_type() as u8, &payload)
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (cmd_type, payload) = split_frame(bytes, "command")?;

    match cmd_type {
        0x01 => Ok(Command::Create {
            record: payload.to_vec(),
        }),
        0x02 => Ok(Command::Fetch {
            id: decode_id("FETCH", payload, false)?,
        }),
        0x03 => Ok(Command::Replace {
            id: decode_id("REPLACE", payload, true)?,
            record: payload[ID_SIZE..].to_vec(),
        }),
        0x04 => Ok(Command::Remove {
            id: decode_id("REMOVE", payload, false)?,
        }),
        0x05 => decode_ping_command(payload),
        _ => Err(StoreError::Protocol(format!(
            "Unknown command type: 0x{:02x}",
            cmd_type
        ))),
    }
}

/// Read the leading id of a payload
///
/// `trailing` allows bytes after the id (a record body).
fn decode_id(name: &str, payload: &[u8], trailing: bool) -> Result<i64> {
    if payload.len() < ID_SIZE {
        return Err(StoreError::Protocol(format!(
            "{} command: incomplete id (expected {} bytes, got {})",
            name,
            ID_SIZE,
            payload.len()
        )));
    }
    if !trailing && payload.len() > ID_SIZE {
        return Err(StoreError::Protocol(format!(
            "{} command: unexpected {} bytes after id",
            name,
            payload.len() - ID_SIZE
        )));
    }

    let mut cursor = payload;
    Ok(cursor.get_i64())
}

/// Decode PING command payload
fn decode_ping_command(payload: &[u8]) -> Result<Command> {
    if !payload.is_empty() {
        return Err(StoreError::Protocol(format!(
            "PING command: unexpected payload of {} bytes",
            payload.len()
        )));
    }
    Ok(Command::Ping)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    let status = Status::from_byte(status_byte).ok_or_else(|| {
        StoreError::Protocol(format!("Unknown response status: 0x{:02x}", status_byte))
    })?;

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Framing
// =============================================================================

fn frame(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(tag);
    message.put_u32(payload.len() as u32);
    message.extend_from_slice(payload);
    message.to_vec()
}

/// Validate a frame and return its tag and payload
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(StoreError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..HEADER_SIZE];
    let tag = header.get_u8();
    let payload_len = header.get_u32();
    check_payload_len(payload_len)?;

    let total_len = HEADER_SIZE + payload_len as usize;
    if bytes.len() < total_len {
        return Err(StoreError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((tag, &bytes[HEADER_SIZE..total_len]))
}

fn check_payload_len(payload_len: u32) -> Result<()> {
    if payload_len > MAX_PAYLOAD_SIZE {
        return Err(StoreError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(())
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one complete frame (header + payload) from a stream
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let mut len_bytes = &header[1..];
    let payload_len = len_bytes.get_u32();
    check_payload_len(payload_len)?;

    let mut message = vec![0u8; HEADER_SIZE + payload_len as usize];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }
    Ok(message)
}

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    decode_command(&read_frame(reader)?)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    writer.write_all(&encode_command(command))?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    decode_response(&read_frame(reader)?)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&encode_response(response))?;
    writer.flush()?;
    Ok(())
}

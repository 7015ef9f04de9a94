//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: CREATE  - Payload: record
//! - 0x02: FETCH   - Payload: id (8)
//! - 0x03: REPLACE - Payload: id (8) + record
//! - 0x04: REMOVE  - Payload: id (8)
//! - 0x05: PING    - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK
//! - 0x01: NOT_FOUND
//! - 0x02: ERROR
//! - 0x03: CONFLICT
//! - 0x04: BAD_REQUEST
//! - 0x05: BUSY

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Response, Status};
pub use codec::{
    decode_command, decode_record, decode_response, encode_command, encode_record,
    encode_response, read_command, read_response, write_command, write_response,
    MAX_RECORD_SIZE,
};

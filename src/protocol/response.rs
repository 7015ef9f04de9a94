//! Response definitions
//!
//! Represents responses to clients.

use crate::service::ServiceError;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Error = 0x02,
    Conflict = 0x03,
    BadRequest = 0x04,
    Busy = 0x05,
}

impl Status {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Status::Ok),
            0x01 => Some(Status::NotFound),
            0x02 => Some(Status::Error),
            0x03 => Some(Status::Conflict),
            0x04 => Some(Status::BadRequest),
            0x05 => Some(Status::Busy),
            _ => None,
        }
    }
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (encoded record on OK, message otherwise)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found(message: &str) -> Self {
        Self::with_message(Status::NotFound, message)
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self::with_message(Status::Error, message)
    }

    pub fn conflict(message: &str) -> Self {
        Self::with_message(Status::Conflict, message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::with_message(Status::BadRequest, message)
    }

    pub fn busy(message: &str) -> Self {
        Self::with_message(Status::Busy, message)
    }

    /// Payload interpreted as a UTF-8 message
    pub fn message(&self) -> Option<String> {
        self.payload
            .as_ref()
            .map(|payload| String::from_utf8_lossy(payload).into_owned())
    }

    fn with_message(status: Status, message: &str) -> Self {
        Self {
            status,
            payload: Some(message.as_bytes().to_vec()),
        }
    }
}

impl From<ServiceError> for Response {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::BadRequest(_) => Response::bad_request(&message),
            ServiceError::NotFound(_) => Response::not_found(&message),
            ServiceError::Conflict(_) => Response::conflict(&message),
            ServiceError::Busy(_) => Response::busy(&message),
            ServiceError::Internal(_) => Response::error(&message),
        }
    }
}

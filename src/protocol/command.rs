//! Command definitions
//!
//! Represents requests from clients.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Create = 0x01,
    Fetch = 0x02,
    Replace = 0x03,
    Remove = 0x04,
    Ping = 0x05,
}

/// A parsed command
///
/// Record bodies stay encoded here; the connection decodes them into the
/// served record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create a record
    Create { record: Vec<u8> },

    /// Fetch a record by id
    Fetch { id: i64 },

    /// Replace the record at id
    Replace { id: i64, record: Vec<u8> },

    /// Remove the record at id
    Remove { id: i64 },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Create { .. } => CommandType::Create,
            Command::Fetch { .. } => CommandType::Fetch,
            Command::Replace { .. } => CommandType::Replace,
            Command::Remove { .. } => CommandType::Remove,
            Command::Ping => CommandType::Ping,
        }
    }
}

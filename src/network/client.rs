//! Blocking client
//!
//! Sends commands over one TCP connection and reads the responses.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};
use crate::protocol::{
    decode_record, encode_record, read_response, write_command, Command, Response, Status,
};

/// Client connection to a pet store server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| StoreError::Network(format!("connect failed: {}", e)))?;
        stream.set_nodelay(true)?;
        Ok(Self {
            reader: BufReader::new(stream.try_clone()?),
            writer: BufWriter::new(stream),
        })
    }

    pub fn set_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.reader.get_ref().set_read_timeout(timeout)?;
        self.writer.get_ref().set_write_timeout(timeout)?;
        Ok(())
    }

    /// Send one command and wait for its response
    pub fn request(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }

    pub fn ping(&mut self) -> Result<Response> {
        self.request(&Command::Ping)
    }

    pub fn create<R: Serialize>(&mut self, record: &R) -> Result<Response> {
        let record = encode_record(record)?;
        self.request(&Command::Create { record })
    }

    pub fn fetch(&mut self, id: i64) -> Result<Response> {
        self.request(&Command::Fetch { id })
    }

    pub fn replace<R: Serialize>(&mut self, id: i64, record: &R) -> Result<Response> {
        let record = encode_record(record)?;
        self.request(&Command::Replace { id, record })
    }

    pub fn remove(&mut self, id: i64) -> Result<Response> {
        self.request(&Command::Remove { id })
    }
}

/// Decode the record carried by an OK response
///
/// Non-OK responses become a `Protocol` error holding the status and message.
pub fn response_record<R: DeserializeOwned>(response: &Response) -> Result<R> {
    match (response.status, &response.payload) {
        (Status::Ok, Some(payload)) => decode_record(payload),
        (status, _) => Err(StoreError::Protocol(format!(
            "{:?}: {}",
            status,
            response.message().unwrap_or_default()
        ))),
    }
}

//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StoreError};
use crate::protocol::{decode_record, encode_record, read_command, write_response, Command, Response};
use crate::record::Record;
use crate::service::{Service, ServiceError, ServiceResult};

/// Handles a single client connection
pub struct Connection<R: Record> {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Service the commands are executed against
    service: Arc<Service<R>>,

    /// Peer address for logging
    peer_addr: String,
}

impl<R> Connection<R>
where
    R: Record + Serialize + DeserializeOwned,
{
    /// Create a new connection handler
    ///
    /// Sets up buffered I/O
    pub fn new(stream: TcpStream, service: Arc<Service<R>>) -> Result<Self> {
        // Get peer address for logging before we split the stream
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            service,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 disables a timeout)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads commands in a loop and sends responses.
    /// Returns when the client disconnects or an error occurs.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);

        loop {
            let command = match read_command(&mut self.reader) {
                Ok(cmd) => cmd,
                Err(StoreError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Client {} disconnected ({:?})", self.peer_addr, e.kind());
                    return Ok(());
                }
                Err(StoreError::Io(ref e))
                    if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    // Read timeout (Windows reports TimedOut instead of WouldBlock)
                    tracing::debug!("Read timeout for client {}", self.peer_addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    let _ = self.send_response(Response::bad_request(&e.to_string()));
                    return Err(e);
                }
            };

            tracing::trace!("Received command from {}: {:?}", self.peer_addr, command.command_type());

            let response = self.execute_command(command);

            if let Err(e) = self.send_response(response) {
                if let StoreError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Execute a command and return a response
    fn execute_command(&self, command: Command) -> Response {
        let result = match command {
            Command::Create { record } => {
                Self::decode(&record).and_then(|record| self.service.create(record))
            }
            Command::Fetch { id } => self.service.fetch(id),
            Command::Replace { id, record } => {
                Self::decode(&record).and_then(|record| self.service.replace(id, record))
            }
            Command::Remove { id } => self.service.remove(id),
            Command::Ping => return Response::ok(Some(b"PONG".to_vec())),
        };

        match result.and_then(|record| encode_record(&record).map_err(ServiceError::from)) {
            Ok(payload) => Response::ok(Some(payload)),
            Err(err) => err.into(),
        }
    }

    fn decode(bytes: &[u8]) -> ServiceResult<R> {
        decode_record(bytes).map_err(ServiceError::from)
    }

    /// Send a response to the client
    fn send_response(&mut self, response: Response) -> Result<()> {
        write_response(&mut self.writer, &response)
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
    )
}

//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Connection;
use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::protocol::{write_response, Response};
use crate::record::Record;
use crate::service::Service;

/// How long the accept loop sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// TCP server for one service
///
/// ## Threading
/// - The thread calling `run` accepts connections
/// - `config.worker_threads` workers each serve one connection at a time,
///   pulling accepted streams from a shared channel
/// - Connections beyond `config.max_connections` get a BUSY response and
///   are closed
pub struct Server<R: Record> {
    config: Config,
    service: Arc<Service<R>>,
    listener: Option<TcpListener>,
    shutdown: Arc<AtomicBool>,
    active: Arc<AtomicUsize>,
}

impl<R> Server<R>
where
    R: Record + Serialize + DeserializeOwned,
{
    /// Create a new server with the given config and service
    pub fn new(config: Config, service: Arc<Service<R>>) -> Self {
        Self {
            config,
            service,
            listener: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Bind the listen address without serving yet
    pub fn bind(&mut self) -> Result<SocketAddr> {
        let listener = TcpListener::bind(&self.config.listen_addr).map_err(|e| {
            StoreError::Network(format!("failed to bind {}: {}", self.config.listen_addr, e))
        })?;
        let addr = listener.local_addr()?;
        self.listener = Some(listener);
        Ok(addr)
    }

    /// Address actually bound, once `bind` or `run` has been called
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().and_then(|l| l.local_addr().ok())
    }

    /// Flag that stops the accept loop when set
    pub fn shutdown_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Start the server (blocking until shutdown)
    pub fn run(&mut self) -> Result<()> {
        if self.listener.is_none() {
            self.bind()?;
        }
        let listener = match self.listener.take() {
            Some(listener) => listener,
            None => return Err(StoreError::Network("listener not bound".into())),
        };
        listener.set_nonblocking(true)?;

        tracing::info!("Listening on {}", listener.local_addr()?);

        let (sender, receiver) = channel::bounded::<TcpStream>(self.config.max_connections.max(1));
        let workers = self.spawn_workers(receiver)?;

        while !self.shutdown.load(Ordering::Relaxed) {
            match listener.accept() {
                Ok((stream, addr)) => {
                    if let Err(e) = stream.set_nonblocking(false) {
                        tracing::warn!("Dropping connection from {}: {}", addr, e);
                        continue;
                    }

                    if self.active.load(Ordering::Acquire) >= self.config.max_connections {
                        tracing::warn!("Rejecting {}: connection limit reached", addr);
                        reject(stream);
                        continue;
                    }

                    self.active.fetch_add(1, Ordering::AcqRel);
                    if sender.send(stream).is_err() {
                        break;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    tracing::warn!("Accept failed: {}", e);
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        tracing::info!("Shutting down, waiting for {} workers", workers.len());
        drop(sender);
        for worker in workers {
            let name = worker.thread().name().unwrap_or("worker").to_string();
            if worker.join().is_err() {
                tracing::warn!("{} panicked", name);
            }
        }
        Ok(())
    }

    fn spawn_workers(&self, receiver: Receiver<TcpStream>) -> Result<Vec<JoinHandle<()>>> {
        (0..self.config.worker_threads.max(1))
            .map(|i| {
                let receiver = receiver.clone();
                let service = Arc::clone(&self.service);
                let active = Arc::clone(&self.active);
                let timeouts = (self.config.read_timeout_ms, self.config.write_timeout_ms);

                thread::Builder::new()
                    .name(format!("petstore-worker-{}", i))
                    .spawn(move || serve(receiver, service, active, timeouts))
                    .map_err(StoreError::from)
            })
            .collect()
    }
}

/// Worker loop: serve connections until the channel closes
fn serve<R>(
    receiver: Receiver<TcpStream>,
    service: Arc<Service<R>>,
    active: Arc<AtomicUsize>,
    (read_ms, write_ms): (u64, u64),
) where
    R: Record + Serialize + DeserializeOwned,
{
    for stream in receiver.iter() {
        match Connection::new(stream, Arc::clone(&service)) {
            Ok(mut connection) => {
                let result = connection
                    .set_timeouts(read_ms, write_ms)
                    .and_then(|()| connection.handle());
                if let Err(e) = result {
                    tracing::debug!("Connection {} ended with error: {}", connection.peer_addr(), e);
                }
            }
            Err(e) => tracing::debug!("Failed to set up connection: {}", e),
        }
        active.fetch_sub(1, Ordering::AcqRel);
    }
}

fn reject(mut stream: TcpStream) {
    let _ = write_response(&mut stream, &Response::busy("connection limit reached"));
}

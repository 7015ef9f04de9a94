//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread
//! - Worker thread pool for connections
//! - Commands routed through the Service

mod client;
mod connection;
mod server;

pub use client::{response_record, Client};
pub use connection::Connection;
pub use server::Server;

//! Pet Store Server Binary
//!
//! Starts the TCP server for the pet store.

use std::sync::Arc;

use clap::{Parser, ValueEnum};
use petstore::network::Server;
use petstore::record::{pet_schema, PET_TABLE};
use petstore::{Config, Pet, Service, Store, WritePolicy};
use tracing_subscriber::{fmt, EnvFilter};

/// What a request does when another write holds the table
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Contention {
    /// Wait for the other write to finish
    Block,
    /// Answer BUSY immediately
    Fail,
    /// Wait up to --write-wait-ms, then answer BUSY
    Timeout,
}

/// Pet Store Server
#[derive(Parser, Debug)]
#[command(name = "petstore-server")]
#[command(about = "CRUD pet store backed by an in-memory transactional store")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Connection worker threads
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// Behaviour of a write that finds another write in progress
    #[arg(long, value_enum, default_value = "block")]
    contention: Contention,

    /// Wait budget for --contention timeout (milliseconds)
    #[arg(long, default_value = "1000")]
    write_wait_ms: u64,

    /// Connection read timeout in milliseconds (0 disables)
    #[arg(long, default_value = "5000")]
    read_timeout_ms: u64,

    /// Connection write timeout in milliseconds (0 disables)
    #[arg(long, default_value = "5000")]
    write_timeout_ms: u64,
}

/// Map command-line flags onto the config builder
fn build_config(args: &Args) -> Config {
    let write_policy = match args.contention {
        Contention::Block => WritePolicy::Block,
        Contention::Fail => WritePolicy::FailFast,
        Contention::Timeout => WritePolicy::Timeout {
            ms: args.write_wait_ms,
        },
    };

    Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .worker_threads(args.workers)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .write_policy(write_policy)
        .build()
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,petstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    let config = build_config(&args);

    tracing::info!("Pet Store Server v{}", petstore::VERSION);
    tracing::info!("Listen address: {}", config.listen_addr);
    tracing::info!("Write policy: {:?}", config.write_policy);

    // Open store
    let store = match Store::<Pet>::open_with_policy(pet_schema(), config.write_policy) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to open store: {}", e);
            std::process::exit(1);
        }
    };

    let service = match Service::new(store, PET_TABLE) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            tracing::error!("Failed to start service: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Store initialized successfully");

    // Start server
    let mut server = Server::new(config, service);
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}

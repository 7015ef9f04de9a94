//! Configuration for the pet store
//!
//! Centralized configuration with sensible defaults.

use std::time::Duration;

/// Main configuration for a pet store instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Store Configuration
    // -------------------------------------------------------------------------
    /// What `begin_write` does while another write transaction is active
    pub write_policy: WritePolicy,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Number of threads serving connections
    pub worker_threads: usize,

    /// Connection read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds)
    pub write_timeout_ms: u64,
}

/// Policy for a write transaction that finds the table's writer slot taken
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WritePolicy {
    /// Wait until the active writer commits or aborts (no timeout)
    #[default]
    Block,

    /// Return `Busy` immediately
    FailFast,

    /// Wait up to `ms` milliseconds, then return `Busy`
    Timeout { ms: u64 },
}

impl WritePolicy {
    /// Wait budget for the policy, `None` meaning unbounded
    pub fn wait_budget(&self) -> Option<Duration> {
        match self {
            WritePolicy::Block => None,
            WritePolicy::FailFast => Some(Duration::ZERO),
            WritePolicy::Timeout { ms } => Some(Duration::from_millis(*ms)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            write_policy: WritePolicy::Block,
            listen_addr: "127.0.0.1:8080".to_string(),
            max_connections: 1024,
            worker_threads: 8,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the contended-writer policy
    pub fn write_policy(mut self, policy: WritePolicy) -> Self {
        self.config.write_policy = policy;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the number of connection worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

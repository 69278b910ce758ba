use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 9000;

/// Default maximum request line length: 1 MiB.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Listener and per-connection settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// How long a connection waits for the executor. Default: 5 s.
    pub reply_timeout: Duration,
    /// Close connections with no complete line for this long. Default: 60 s.
    pub idle_timeout: Duration,
    /// Time given to open connections after shutdown. Default: 1 s.
    pub grace_period: Duration,
    /// Longest accepted request line in bytes. Default: 1 MiB.
    pub max_line_length: usize,
}

impl ServerConfig {
    /// `host:port` as passed to the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            reply_timeout: self.reply_timeout,
            idle_timeout: self.idle_timeout,
            max_line_length: self.max_line_length,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            reply_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            grace_period: Duration::from_secs(1),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

/// The part of [`ServerConfig`] each connection task needs.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionSettings {
    pub reply_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_line_length: usize,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        ServerConfig::default().connection_settings()
    }
}

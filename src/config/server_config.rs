//! HTTP server configuration parsing from environment variables.

use std::env;

/// Server environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerEnvConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerEnvConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

impl ServerEnvConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_address: env::var("SERVER_BIND_ADDRESS").unwrap_or(defaults.bind_address),
            port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(defaults.port),
        }
    }

    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

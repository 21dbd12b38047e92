//! Error types for mailpager.

/// Top-level error type for the bridge.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Mailbox error: {0}")]
    Mailbox(#[from] MailboxError),
}

/// Configuration-related errors. Fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Mailbox (POP3) errors. Caught per-cycle, never fatal after startup.
#[derive(Debug, thiserror::Error)]
pub enum MailboxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    #[error("Invalid mailbox hostname: {0}")]
    InvalidHostname(#[from] rustls::pki_types::InvalidDnsNameError),

    #[error("Authentication rejected: {0}")]
    Auth(String),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Result type alias for the bridge.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_to_top_level() {
        let e = Error::from(ConfigError::MissingEnvVar("WAIT_TIME".into()));
        assert_eq!(
            e.to_string(),
            "Configuration error: Missing required environment variable: WAIT_TIME"
        );
    }

    #[test]
    fn mailbox_error_converts_to_top_level() {
        let e = Error::from(MailboxError::Auth("-ERR invalid password".into()));
        assert_eq!(
            e.to_string(),
            "Mailbox error: Authentication rejected: -ERR invalid password"
        );
    }
}

//! Configuration, built once from environment variables at startup.

use crate::error::ConfigError;

/// Default port for POP3 over TLS.
pub const DEFAULT_POP3_PORT: u16 = 995;

/// POP3 mailbox settings.
#[derive(Debug, Clone)]
pub struct MailboxConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
}

/// SMS transport (voip.ms REST API) settings.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub username: String,
    pub password: String,
    /// Sender identifier (`did` parameter).
    pub did: String,
}

/// Destination routing settings.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// Destination for non-emergency messages.
    pub main_dst: String,
    /// Emergency destinations, fanned out in this order.
    pub emergency_dsts: Vec<String>,
    /// Subjects that exactly match one of these route as emergencies.
    pub emergency_phrases: Vec<String>,
}

/// Immutable process configuration, passed by reference into each component.
#[derive(Debug, Clone)]
pub struct Config {
    pub mailbox: MailboxConfig,
    pub transport: TransportConfig,
    pub routing: RoutingConfig,
    pub poll_interval_secs: u64,
}

impl Config {
    /// Build config from environment variables.
    ///
    /// Every variable except `EMAIL_PORT` is required; a missing one is a
    /// startup-fatal `ConfigError`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mailbox = MailboxConfig {
            host: required("EMAIL_SERVER")?,
            port: parsed_or("EMAIL_PORT", DEFAULT_POP3_PORT)?,
            username: required("EMAIL_USER")?,
            password: required("EMAIL_PASS")?,
        };

        let transport = TransportConfig {
            username: required("VOIP_USER")?,
            password: required("VOIP_PASS")?,
            did: required("VOIP_DID")?,
        };

        let routing = RoutingConfig {
            main_dst: required("MAIN_DST")?,
            emergency_dsts: split_list(&required("EMERGENCY_DST")?),
            emergency_phrases: split_list(&required("EMERGENCY_PHRASES")?),
        };

        let poll_interval_secs = poll_interval(&required("WAIT_TIME")?)?;

        Ok(Self {
            mailbox,
            transport,
            routing,
            poll_interval_secs,
        })
    }
}

fn required(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn parsed_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw.parse().map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("{e}"),
        }),
        Err(_) => Ok(default),
    }
}

/// Parse the poll interval. Zero is rejected: the cycle timer cannot run
/// with a zero period, so it must fail here, before the loop starts.
fn poll_interval(raw: &str) -> Result<u64, ConfigError> {
    let secs: u64 = raw.parse().map_err(|e| ConfigError::InvalidValue {
        key: "WAIT_TIME".into(),
        message: format!("expected whole seconds: {e}"),
    })?;
    if secs == 0 {
        return Err(ConfigError::InvalidValue {
            key: "WAIT_TIME".into(),
            message: "poll interval must be at least 1 second".into(),
        });
    }
    Ok(secs)
}

/// Split a comma-separated list, dropping empty entries so an empty variable
/// degrades to the empty set rather than a single empty-string element.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::to_string)
        .filter(|s| !s.is_empty())
        .collect()
}

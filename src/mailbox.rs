//! POP3 mailbox fetcher — blocking retrieve-and-delete over TLS.
//!
//! Every message present at connection time is treated as new (POP3 has no
//! unseen flag). Each retrieved message is marked for deletion; the server
//! only commits deletions on a clean QUIT, so a crash mid-fetch leaves the
//! mailbox untouched and the next cycle sees the same messages again.

use std::io::{Read, Write as IoWrite};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use mail_parser::{MessageParser, MimeHeaders};
use tracing::{debug, warn};

use crate::config::MailboxConfig;
use crate::error::MailboxError;

/// A fetched mail message, reduced to the fields routing needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    /// From header, rendered as `Name <addr>` or the bare address.
    pub sender: String,
    /// Subject with RFC 2047 encoded-words decoded to plain text.
    pub subject: String,
    /// Body text (HTML stripped when no text part exists).
    pub body: String,
}

type TlsStream = rustls::StreamOwned<rustls::ClientConnection, TcpStream>;

/// Fetch all messages currently in the mailbox and mark them for deletion.
///
/// Blocking — run under `spawn_blocking`. Returns an empty vec for an empty
/// mailbox; connect/TLS/auth failures propagate.
pub fn fetch_new(config: &MailboxConfig) -> Result<Vec<MailMessage>, MailboxError> {
    let tcp = TcpStream::connect((&*config.host, config.port))?;
    tcp.set_read_timeout(Some(Duration::from_secs(30)))?;

    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let tls_config = Arc::new(
        rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth(),
    );
    let server_name: rustls::pki_types::ServerName<'_> =
        rustls::pki_types::ServerName::try_from(config.host.clone())?;
    let conn = rustls::ClientConnection::new(tls_config, server_name)?;
    let mut tls = rustls::StreamOwned::new(conn, tcp);

    let greeting = read_line(&mut tls)?;
    if !greeting.starts_with("+OK") {
        return Err(MailboxError::Protocol(format!(
            "unexpected greeting: {}",
            greeting.trim_end()
        )));
    }

    let user_resp = command(&mut tls, &format!("USER {}", config.username))?;
    if !user_resp.starts_with("+OK") {
        return Err(MailboxError::Auth(user_resp.trim_end().to_string()));
    }
    let pass_resp = command(&mut tls, &format!("PASS {}", config.password))?;
    if !pass_resp.starts_with("+OK") {
        return Err(MailboxError::Auth(pass_resp.trim_end().to_string()));
    }

    let stat_resp = command(&mut tls, "STAT")?;
    let count = parse_stat(&stat_resp)?;
    debug!(count, "Mailbox STAT");

    let mut results = Vec::new();
    for index in 1..=count {
        let retr_resp = command(&mut tls, &format!("RETR {index}"))?;
        if !retr_resp.starts_with("+OK") {
            return Err(MailboxError::Protocol(format!(
                "RETR {index} rejected: {}",
                retr_resp.trim_end()
            )));
        }
        let raw = read_multiline(&mut tls)?;

        match extract_message(&raw) {
            Some(message) => results.push(message),
            // Consumed anyway — leaving it would refetch the same broken
            // record every cycle.
            None => warn!(index, "Unparseable message, deleting without relay"),
        }

        let dele_resp = command(&mut tls, &format!("DELE {index}"))?;
        if !dele_resp.starts_with("+OK") {
            warn!(index, response = %dele_resp.trim_end(), "DELE rejected");
        }
    }

    // Deletions commit here.
    let _ = command(&mut tls, "QUIT");

    Ok(results)
}

/// Send one command and read the single status line of the response.
fn command(tls: &mut TlsStream, cmd: &str) -> Result<String, MailboxError> {
    tls.write_all(cmd.as_bytes())?;
    tls.write_all(b"\r\n")?;
    tls.flush()?;
    read_line(tls)
}

/// Read one CRLF-terminated line as lossy UTF-8.
fn read_line<R: Read>(reader: &mut R) -> Result<String, MailboxError> {
    Ok(String::from_utf8_lossy(&read_line_bytes(reader)?).to_string())
}

/// Read one CRLF-terminated line, returning the raw bytes including CRLF.
fn read_line_bytes<R: Read>(reader: &mut R) -> Result<Vec<u8>, MailboxError> {
    let mut buf = Vec::new();
    loop {
        let mut byte = [0u8; 1];
        match reader.read(&mut byte)? {
            0 => {
                return Err(MailboxError::Protocol(
                    "connection closed mid-response".into(),
                ));
            }
            _ => {
                buf.push(byte[0]);
                if buf.ends_with(b"\r\n") {
                    return Ok(buf);
                }
            }
        }
    }
}

/// Read a multi-line POP3 response up to the lone `.` terminator,
/// reversing dot-stuffing (a leading `..` becomes `.`).
fn read_multiline<R: Read>(reader: &mut R) -> Result<Vec<u8>, MailboxError> {
    let mut raw = Vec::new();
    loop {
        let line = read_line_bytes(reader)?;
        if line == b".\r\n" {
            return Ok(raw);
        }
        if line.starts_with(b"..") {
            raw.extend_from_slice(&line[1..]);
        } else {
            raw.extend_from_slice(&line);
        }
    }
}

/// Parse the message count out of a `+OK <count> <octets>` STAT response.
fn parse_stat(resp: &str) -> Result<usize, MailboxError> {
    if !resp.starts_with("+OK") {
        return Err(MailboxError::Protocol(format!(
            "STAT rejected: {}",
            resp.trim_end()
        )));
    }
    resp.split_whitespace()
        .nth(1)
        .and_then(|n| n.parse().ok())
        .ok_or_else(|| MailboxError::Protocol(format!("malformed STAT: {}", resp.trim_end())))
}

/// Extract sender, decoded subject, and body text from a raw RFC 822 record.
fn extract_message(raw: &[u8]) -> Option<MailMessage> {
    let parsed = MessageParser::default().parse(raw)?;
    Some(MailMessage {
        sender: extract_sender(&parsed),
        subject: parsed.subject().unwrap_or_default().to_string(),
        body: extract_text(&parsed),
    })
}

/// Render the From header as `Name <addr>`, bare address, or `unknown`.
fn extract_sender(parsed: &mail_parser::Message) -> String {
    let addr = parsed.from().and_then(|from| from.first());
    match addr {
        Some(a) => match (a.name(), a.address()) {
            (Some(name), Some(address)) => format!("{name} <{address}>"),
            (None, Some(address)) => address.to_string(),
            (Some(name), None) => name.to_string(),
            (None, None) => "unknown".into(),
        },
        None => "unknown".into(),
    }
}

/// Extract readable text from a parsed message.
fn extract_text(parsed: &mail_parser::Message) -> String {
    if let Some(text) = parsed.body_text(0) {
        return text.to_string();
    }
    if let Some(html) = parsed.body_html(0) {
        return strip_html(html.as_ref());
    }
    for part in parsed.attachments() {
        let part: &mail_parser::MessagePart = part;
        if let Some(ct) = MimeHeaders::content_type(part)
            && ct.ctype() == "text"
            && let Ok(text) = std::str::from_utf8(part.contents())
        {
            return text.to_string();
        }
    }
    "(no readable content)".to_string()
}

/// Strip HTML tags from content (basic).
fn strip_html(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

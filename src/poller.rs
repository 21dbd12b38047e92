//! Poll-classify-dispatch loop.
//!
//! One sequential task: fetch everything in the mailbox, relay each message
//! as an SMS routed by its own subject, sleep, repeat. A mailbox failure
//! costs one cycle, never the process.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Local};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::mailbox::{self, MailMessage};
use crate::notifier::{NotificationResult, Notifier};
use crate::routing::{RoutingDecision, classify};

/// Timestamp format used inside notification bodies.
const BODY_TIMESTAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Run the bridge forever.
pub async fn run(config: Config) -> ! {
    let notifier = Notifier::new(config.transport.clone());
    let mut tick = tokio::time::interval(Duration::from_secs(config.poll_interval_secs));

    loop {
        tick.tick().await;
        poll_once(&config, &notifier).await;
        debug!(
            seconds = config.poll_interval_secs,
            "Sleeping until next cycle"
        );
    }
}

/// One cycle: fetch, then classify and dispatch each message in mailbox order.
async fn poll_once(config: &Config, notifier: &Notifier) {
    info!(host = %config.mailbox.host, "Checking mailbox");

    let mailbox_config = config.mailbox.clone();
    let fetched = tokio::task::spawn_blocking(move || mailbox::fetch_new(&mailbox_config)).await;

    let messages = match fetched {
        Ok(Ok(messages)) => messages,
        Ok(Err(e)) => {
            error!("Mailbox poll failed: {e}");
            return;
        }
        Err(e) => {
            error!("Mailbox poll task panicked: {e}");
            return;
        }
    };

    if messages.is_empty() {
        debug!("No new mail");
        return;
    }

    info!(count = messages.len(), "New mail found");

    for message in &messages {
        info!(from = %message.sender, subject = %message.subject, "Relaying message");

        // Timestamp captured per message, at format time.
        let body = format_notification(message, Local::now());

        let decision = classify(&message.subject, &config.routing);
        if matches!(&decision, RoutingDecision::Emergency(_)) {
            warn!(subject = %message.subject, "Emergency phrase matched");
        }

        let results = dispatch(decision, &body, |msg, dst| async move {
            notifier.send(&msg, &dst).await
        })
        .await;

        for result in &results {
            info!(
                destination = %result.destination,
                response = %result.transport_response,
                "Notification sent"
            );
        }
    }
}

/// Perform the sends for one message: one call per emergency destination in
/// configured order, or a single call to the main destination.
async fn dispatch<F, Fut>(
    decision: RoutingDecision<'_>,
    body: &str,
    send: F,
) -> Vec<NotificationResult>
where
    F: Fn(String, String) -> Fut,
    Fut: Future<Output = NotificationResult>,
{
    let mut results = Vec::new();
    match decision {
        RoutingDecision::Emergency(destinations) => {
            for destination in destinations {
                results.push(send(body.to_string(), destination.clone()).await);
            }
        }
        RoutingDecision::Normal(destination) => {
            results.push(send(body.to_string(), destination.to_string()).await);
        }
    }
    results
}

/// Compose the outbound body: sender, subject, timestamp, blank line, body.
fn format_notification(message: &MailMessage, timestamp: DateTime<Local>) -> String {
    format!(
        "{}\n{}\n{}\n\n{}",
        message.sender,
        message.subject,
        timestamp.format(BODY_TIMESTAMP_FORMAT),
        message.body
    )
}

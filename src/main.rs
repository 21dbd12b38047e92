use mailpager::config::Config;
use mailpager::error::Result;
use mailpager::poller;

fn load_config() -> Result<Config> {
    Ok(Config::from_env()?)
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = load_config().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    eprintln!("📟 Mailpager v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Mailbox: {}:{} ({})",
        config.mailbox.host, config.mailbox.port, config.mailbox.username
    );
    eprintln!("   Main destination: {}", config.routing.main_dst);
    eprintln!(
        "   Emergency: {} destination(s), {} phrase(s)",
        config.routing.emergency_dsts.len(),
        config.routing.emergency_phrases.len()
    );
    eprintln!("   Poll interval: {}s\n", config.poll_interval_secs);

    poller::run(config).await
}

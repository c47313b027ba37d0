use axum::{routing::get, Router};
use inbox_client::api::likes::LikeTarget;
use inbox_client::api::ApiSession;
use inbox_client::channel::PushChannel;
use inbox_client::config::Config;
use inbox_client::render::LogRenderer;
use inbox_client::worker::{InboxSync, UserCommand};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, trace, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load configuration FIRST (before logging, to know debug mode)
    let config = Config::from_env();

    // Initialize logging based on debug mode
    init_logging(&config);

    info!("═══════════════════════════════════════════════════════════");
    info!("  INBOX CLIENT STARTING");
    info!("═══════════════════════════════════════════════════════════");

    // Log debug configuration
    if config.debug.enabled {
        warn!("DEBUG MODE ENABLED - verbose logging active");
        debug!("Debug config:");
        debug!("  log_payloads: {}", config.debug.log_payloads);
        debug!("  log_requests: {}", config.debug.log_requests);
        debug!("  log_timing: {}", config.debug.log_timing);
    }
    info!(
        server_host = %config.server_host,
        secure = config.secure,
        channel_url = %config.channel_url(),
        toast_ttl_secs = config.toast_ttl_secs,
        reconnect = ?config.reconnect,
        "Configuration loaded"
    );
    trace!("Full config: {:?}", config);

    if config.csrf_token.is_empty() {
        warn!("CSRF_TOKEN not set - mutating requests will be rejected by the server");
    }
    if !config.is_authenticated() {
        warn!("SESSION_COOKIE not set - viewer is anonymous, gated actions will be refused");
    }

    // API session (Django contract: CSRF cookie + XHR marker headers)
    debug!("Creating API session...");
    let session = Arc::new(ApiSession::new(&config));

    // Metrics recorder (rendered at /metrics)
    debug!("Installing metrics recorder...");
    let metrics_handle = match metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
    {
        Ok(handle) => Some(handle),
        Err(e) => {
            error!(error = %e, "Failed to install metrics recorder - /metrics disabled");
            None
        }
    };

    // Channels: push feed into the sync loop, user commands from stdin
    debug!("Creating notification feed channel...");
    let (feed_tx, feed_rx) = mpsc::unbounded_channel();
    let (command_tx, command_rx) = mpsc::channel::<UserCommand>(16);

    // Start push channel
    debug!("Starting push channel...");
    let channel = PushChannel::new(
        config.channel_url(),
        config.reconnect,
        config.debug.log_payloads,
    );
    let channel_handle = tokio::spawn(async move {
        if let Err(e) = channel.run(feed_tx).await {
            error!(error = %e, "Push channel failed");
        }
    });
    info!("Push channel started");

    // Start inbox sync loop
    debug!("Starting inbox sync loop...");
    let (sync, expiry_rx) = InboxSync::new(
        LogRenderer::new(),
        session,
        Duration::from_secs(config.toast_ttl_secs),
    );
    let sync_handle = tokio::spawn(async move {
        sync.run(feed_rx, expiry_rx, command_rx).await;
    });
    info!(toast_ttl_secs = config.toast_ttl_secs, "Inbox sync started");

    // Read user commands from stdin
    debug!("Starting command reader...");
    let command_handle = tokio::spawn(async move {
        read_commands(command_tx).await;
    });

    // Start HTTP server (health + metrics only)
    debug!("Starting HTTP server...");
    let router = Router::new()
        .route("/health", get(health_handler))
        .route(
            "/metrics",
            get(move || {
                let handle = metrics_handle.clone();
                async move {
                    match handle {
                        Some(handle) => handle.render(),
                        None => "# inbox_client metrics\n".to_string(),
                    }
                }
            }),
        )
        .layer(TraceLayer::new_for_http());

    let addr = config.server_addr();

    let tcp_listener = match TcpListener::bind(&addr).await {
        Ok(l) => {
            debug!("TCP listener bound to {}", addr);
            l
        }
        Err(e) => {
            error!(error = %e, addr = %addr, "Failed to bind HTTP server");
            std::process::exit(1);
        }
    };

    info!("═══════════════════════════════════════════════════════════");
    info!("  CLIENT READY");
    info!("  Health:    http://{}/health", addr);
    info!("  Metrics:   http://{}/metrics", addr);
    info!("  Channel:   {}", config.channel_url());
    info!("  Commands:  read|open|delete <id>, like article|comment <url>, quit");
    info!("═══════════════════════════════════════════════════════════");

    // Run server with graceful shutdown
    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(tcp_listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
        {
            error!(error = %e, "HTTP server failed");
        }
    });

    // The sync loop ends when the command stream closes (quit / EOF)
    tokio::select! {
        _ = sync_handle => {
            info!("Inbox sync loop ended");
        }
        _ = server_handle => {
            info!("Server shutdown complete");
        }
    }

    channel_handle.abort();
    command_handle.abort();

    info!("═══════════════════════════════════════════════════════════");
    info!("  INBOX CLIENT STOPPED");
    info!("═══════════════════════════════════════════════════════════");
}

async fn health_handler() -> &'static str {
    "OK"
}

/// Parse stdin lines into user commands until EOF or `quit`
async fn read_commands(tx: mpsc::Sender<UserCommand>) {
    let stdin = tokio::io::stdin();
    let mut lines = tokio::io::BufReader::new(stdin).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            info!("Quit requested");
            break;
        }
        match parse_command(line) {
            Some(command) => {
                if tx.send(command).await.is_err() {
                    break;
                }
            }
            None => warn!(input = %line, "Unrecognized command"),
        }
    }
    // Dropping the sender ends the sync loop
}

fn parse_command(line: &str) -> Option<UserCommand> {
    let mut parts = line.split_whitespace();
    match parts.next()? {
        "read" => Some(UserCommand::Read {
            id: parts.next()?.to_string(),
        }),
        "open" => Some(UserCommand::ToastOpen {
            id: parts.next()?.to_string(),
        }),
        "delete" => Some(UserCommand::Delete {
            id: parts.next()?.to_string(),
        }),
        "like" => {
            let target = match parts.next()? {
                "article" => LikeTarget::Article,
                "comment" => LikeTarget::Comment,
                _ => return None,
            };
            Some(UserCommand::Like {
                target,
                endpoint: parts.next()?.to_string(),
            })
        }
        _ => None,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}

/// Initialize logging based on debug configuration
fn init_logging(config: &Config) {
    use tracing_subscriber::fmt;

    // Determine log level based on DEBUG_MODE
    let env_filter = if config.debug.enabled {
        // In debug mode: use trace level for our crate, debug for others
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "inbox_client=trace,tower_http=debug,axum=debug,tungstenite=debug,reqwest=debug".into()
        })
    } else {
        // Production: use RUST_LOG or default to info
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "inbox_client=info".into())
    };

    if config.debug.enabled {
        // Debug mode: JSON structured logging for better parsing
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_thread_ids(true)
                    .with_target(true),
            )
            .init();
    } else {
        // Production: compact human-readable format
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact().with_target(true).with_thread_ids(false))
            .init();
    }
}

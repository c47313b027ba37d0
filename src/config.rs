use std::env;

/// Debug configuratie - ultra logging voor development/troubleshooting
#[derive(Debug, Clone)]
pub struct DebugConfig {
    /// Master switch voor debug mode (DEBUG_MODE env var)
    pub enabled: bool,
    /// Log volledige channel payloads (DEBUG_LOG_PAYLOADS)
    pub log_payloads: bool,
    /// Log outgoing HTTP requests (DEBUG_LOG_REQUESTS)
    pub log_requests: bool,
    /// Log timing voor alle operaties (DEBUG_LOG_TIMING)
    pub log_timing: bool,
}

impl DebugConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: env::var("DEBUG_MODE")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
            log_payloads: env::var("DEBUG_LOG_PAYLOADS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
            log_requests: env::var("DEBUG_LOG_REQUESTS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
            log_timing: env::var("DEBUG_LOG_TIMING")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(true), // Default true - timing is always useful
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_payloads: false,
            log_requests: false,
            log_timing: true,
        }
    }
}

/// What the push channel does after the server closes the connection.
///
/// `PageLifetime` mirrors the original page-scoped behavior: one connection,
/// no retry. `Retry` reconnects after a fixed delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectPolicy {
    PageLifetime,
    Retry { delay_secs: u64 },
}

#[derive(Debug, Clone)]
pub struct Config {
    // Platform server (the page origin)
    pub server_host: String,
    /// Secure transport: wss + https iff the origin is secure
    pub secure: bool,

    // Viewer session
    pub csrf_token: String,
    pub session_cookie: Option<String>,
    /// IANA timezone name, sent as a `timezone` cookie when present
    pub timezone: Option<String>,

    // Push channel
    pub reconnect: ReconnectPolicy,

    // Inbox behavior
    pub toast_ttl_secs: u64,

    // Upload (the only timed request)
    pub upload_timeout_secs: u64,

    // Local HTTP server (health + metrics only)
    pub http_host: String,
    pub http_port: u16,

    // Debug
    pub debug: DebugConfig,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "localhost:8000".into()),
            secure: env::var("SECURE_TRANSPORT")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),

            csrf_token: env::var("CSRF_TOKEN").unwrap_or_default(),
            session_cookie: env::var("SESSION_COOKIE").ok(),
            timezone: env::var("VIEWER_TIMEZONE").ok(),

            reconnect: env::var("CHANNEL_RECONNECT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(|delay_secs| ReconnectPolicy::Retry { delay_secs })
                .unwrap_or(ReconnectPolicy::PageLifetime),

            toast_ttl_secs: env::var("TOAST_TTL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(600),

            upload_timeout_secs: env::var("UPLOAD_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),

            http_host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            http_port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8081),

            debug: DebugConfig::from_env(),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Push channel endpoint, scheme derived from the origin's transport security
    pub fn channel_url(&self) -> String {
        let scheme = if self.secure { "wss" } else { "ws" };
        format!("{}://{}/ws/notifications/", scheme, self.server_host)
    }

    /// Base URL for platform REST endpoints
    pub fn base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        format!("{}://{}", scheme, self.server_host)
    }

    /// Check of de viewer een sessie heeft
    pub fn is_authenticated(&self) -> bool {
        self.session_cookie.is_some()
    }
}

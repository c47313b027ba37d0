use crate::config::Config;
use reqwest::header;
use reqwest::Client;
use tracing::{debug, trace};

/// Viewer session against the platform server.
///
/// Every mutating request carries the CSRF token both as a cookie and as the
/// `X-CSRFToken` header, plus the `X-Requested-With: XMLHttpRequest` marker.
/// This is the server framework's contract, not negotiable by the client.
pub struct ApiSession {
    client: Client,
    base_url: String,
    csrf_token: String,
    session_cookie: Option<String>,
    timezone: Option<String>,
    log_requests: bool,
}

impl ApiSession {
    pub fn new(config: &Config) -> Self {
        debug!(
            base_url = %config.base_url(),
            authenticated = config.is_authenticated(),
            "Creating API session"
        );
        Self {
            // No default timeout: only the upload path times out
            client: Client::new(),
            base_url: config.base_url(),
            csrf_token: config.csrf_token.clone(),
            session_cookie: config.session_cookie.clone(),
            timezone: config.timezone.clone(),
            log_requests: config.debug.log_requests,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session_cookie.is_some()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn cookie_header(&self) -> String {
        let mut cookies = format!("csrftoken={}", self.csrf_token);
        if let Some(session) = &self.session_cookie {
            cookies.push_str(&format!("; sessionid={}", session));
        }
        if let Some(timezone) = &self.timezone {
            cookies.push_str(&format!("; timezone={}", timezone));
        }
        cookies
    }

    /// POST with the full Django contract applied
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        if self.log_requests {
            trace!(path = %path, "Building POST request");
        }
        self.client
            .post(self.url(path))
            .header("X-CSRFToken", &self.csrf_token)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(header::COOKIE, self.cookie_header())
    }
}

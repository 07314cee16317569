//! Client configuration derived from the page location.

/// Port the API listens on in development.
pub const DEFAULT_API_PORT: u16 = 5000;
/// Path prefix under which the API mounts its routes.
pub const API_PREFIX: &str = "/api";
/// Upper bound for a single auth request.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u32 = 15_000;

/// Ports used by front-end dev servers; these never host the API.
const DEV_SERVER_PORTS: [&str; 3] = ["8080", "5173", "3000"];

/// Runtime settings for the REST client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL including the API prefix, without a trailing slash.
    pub api_base_url: String,
    /// Timeout applied to every auth request.
    pub request_timeout_ms: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: format!("http://localhost:{DEFAULT_API_PORT}{API_PREFIX}"),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    /// Derive settings from `window.location` parts. `protocol` includes the
    /// trailing colon, as the DOM reports it.
    #[must_use]
    pub fn from_location(protocol: &str, host: &str, port: &str) -> Self {
        if host.trim().is_empty() {
            return Self::default();
        }
        let protocol = if protocol.ends_with(':') {
            protocol.to_string()
        } else {
            format!("{protocol}:")
        };
        let mut base = format!("{protocol}//{host}");
        if DEV_SERVER_PORTS.contains(&port) {
            base.push_str(&format!(":{DEFAULT_API_PORT}"));
        } else if !port.is_empty() {
            base.push(':');
            base.push_str(port);
        }
        base.push_str(API_PREFIX);
        Self {
            api_base_url: base,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }

    /// Absolute URL for an API path such as `/auth/login`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

//! Client configuration, read once from the environment at startup.

#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the classification service.
    pub api_base: String,
    /// Per-request timeout. The reference deployment guarantees no timeout at
    /// all, so an explicit one is applied here.
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            api_base: std::env::var("API_BASE")
                .unwrap_or_else(|_| "https://nasa-ml-exoplanets-0xcz.onrender.com".to_string()),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = Config::from_env();
        assert!(cfg.api_base.starts_with("http"));
        assert!(cfg.http_timeout_secs > 0);
    }
}

use thiserror::Error;
use url::Url;

/// Endpoints and keys the client is built against.
///
/// All values are opaque to the state machine except `backend_base_url`,
/// which is joined with short-url fragments for display, and
/// `redirect_base_url`, which prefixes forwarded paths.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClientConfig {
    /// `POST` target for shorten requests.
    pub shorten_url: String,
    /// Prefix for history reads; the encoded email is appended verbatim.
    pub history_url: String,
    /// Public base that short-url fragments are shown under.
    pub backend_base_url: String,
    /// Base that non-root paths are forwarded to.
    pub redirect_base_url: String,
    /// Site key of the verification widget.
    pub widget_site_key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} is not a valid http(s) URL: {reason}")]
    InvalidUrl { field: &'static str, reason: String },
    #[error("widget site key must not be empty")]
    MissingSiteKey,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let urls = [
            ("shorten_url", &self.shorten_url),
            ("history_url", &self.history_url),
            ("backend_base_url", &self.backend_base_url),
            ("redirect_base_url", &self.redirect_base_url),
        ];
        for (field, value) in urls {
            let parsed = Url::parse(value).map_err(|err| ConfigError::InvalidUrl {
                field,
                reason: err.to_string(),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidUrl {
                    field,
                    reason: format!("unsupported scheme {}", parsed.scheme()),
                });
            }
        }
        if self.widget_site_key.trim().is_empty() {
            return Err(ConfigError::MissingSiteKey);
        }
        Ok(())
    }

    /// Full short URL for a fragment returned by the backend.
    pub fn short_url(&self, fragment: &str) -> String {
        join_url(&self.backend_base_url, fragment)
    }
}

/// Joins `base` and `fragment` with exactly one `/` between them.
pub fn join_url(base: &str, fragment: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        fragment.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig {
            shorten_url: "https://api.s.ly/shorten".into(),
            history_url: "https://api.s.ly/urls/".into(),
            backend_base_url: "https://s.ly/".into(),
            redirect_base_url: "https://go.s.ly".into(),
            widget_site_key: "site-key".into(),
        }
    }

    #[test]
    fn join_url_collapses_slashes() {
        assert_eq!(join_url("https://s.ly/", "/abc123"), "https://s.ly/abc123");
        assert_eq!(join_url("https://s.ly", "abc123"), "https://s.ly/abc123");
        assert_eq!(join_url("https://s.ly//", "//abc"), "https://s.ly/abc");
    }

    #[test]
    fn validate_accepts_http_urls() {
        assert_eq!(config().validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_relative_and_foreign_schemes() {
        let mut bad = config();
        bad.history_url = "/urls/".into();
        assert!(matches!(
            bad.validate(),
            Err(ConfigError::InvalidUrl {
                field: "history_url",
                ..
            })
        ));

        let mut ftp = config();
        ftp.backend_base_url = "ftp://s.ly/".into();
        assert!(matches!(
            ftp.validate(),
            Err(ConfigError::InvalidUrl {
                field: "backend_base_url",
                ..
            })
        ));
    }

    #[test]
    fn validate_requires_site_key() {
        let mut bad = config();
        bad.widget_site_key = "  ".into();
        assert_eq!(bad.validate(), Err(ConfigError::MissingSiteKey));
    }
}

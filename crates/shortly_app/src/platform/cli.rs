//! Command-line surface and configuration.

use std::time::Duration;

use shortly_core::ClientConfig;
use shortly_engine::{ApiSettings, Endpoints, Identity};

use super::logging::LogDestination;

#[derive(clap::Parser)]
#[command(name = "shortly")]
#[command(version)]
#[command(about = "Shorten URLs and keep a history of them")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub config: ConfigArgs,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogDestination::File)]
    pub log: LogDestination,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Interactive session (default)
    Run,
    /// Shorten one URL and print the result
    Shorten {
        /// The long URL
        url: String,

        /// Verification token from a completed challenge
        #[arg(long, env = "SHORTLY_VERIFICATION_TOKEN")]
        token: String,

        /// Sign in first so the URL lands in your history
        #[arg(long)]
        login: bool,
    },
    /// Print where a path on the client origin is forwarded
    Resolve {
        #[arg(value_name = "PATH")]
        path: String,
    },
}

#[derive(clap::Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Endpoint shorten requests are posted to
    #[arg(long, env = "SHORTLY_SHORTEN_URL")]
    pub shorten_url: String,

    /// Prefix of the history endpoint; the encoded email is appended
    #[arg(long, env = "SHORTLY_HISTORY_URL")]
    pub history_url: String,

    /// Public base URL short links are shown under
    #[arg(long = "backend-url", env = "SHORTLY_BACKEND_URL")]
    pub backend_base_url: String,

    /// Base URL non-root paths are forwarded to
    #[arg(long = "redirect-url", env = "SHORTLY_REDIRECT_URL")]
    pub redirect_base_url: String,

    /// Site key of the verification widget
    #[arg(long, env = "SHORTLY_SITE_KEY")]
    pub site_key: String,

    /// Email to sign in as
    #[arg(long, env = "SHORTLY_EMAIL")]
    pub email: Option<String>,

    /// Display name for the signed-in user (defaults to the email)
    #[arg(long, env = "SHORTLY_DISPLAY_NAME")]
    pub display_name: Option<String>,

    /// Avatar URL for the signed-in user
    #[arg(long, env = "SHORTLY_AVATAR_URL")]
    pub avatar_url: Option<String>,

    /// Total timeout for each remote call, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

impl ConfigArgs {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            shorten_url: self.shorten_url.clone(),
            history_url: self.history_url.clone(),
            backend_base_url: self.backend_base_url.clone(),
            redirect_base_url: self.redirect_base_url.clone(),
            widget_site_key: self.site_key.clone(),
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            shorten_url: self.shorten_url.clone(),
            history_url: self.history_url.clone(),
        }
    }

    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            request_timeout: Duration::from_secs(self.timeout_secs.max(1)),
            ..ApiSettings::default()
        }
    }

    pub fn identity(&self) -> Option<Identity> {
        let email = self.email.as_deref().map(str::trim).filter(|e| !e.is_empty())?;
        Some(Identity {
            email: email.to_string(),
            display_name: self
                .display_name
                .clone()
                .unwrap_or_else(|| email.to_string()),
            photo_url: self.avatar_url.clone().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    const BASE_ARGS: [&str; 11] = [
        "shortly",
        "--shorten-url",
        "https://api.s.ly/shorten",
        "--history-url",
        "https://api.s.ly/urls/",
        "--backend-url",
        "https://s.ly/",
        "--redirect-url",
        "https://api.s.ly/",
        "--site-key",
        "key",
    ];

    #[test]
    fn parses_flags_into_client_config() {
        let cli = Cli::try_parse_from(BASE_ARGS).expect("parse");
        assert!(cli.command.is_none());
        let config = cli.config.client_config();
        assert_eq!(config.backend_base_url, "https://s.ly/");
        assert_eq!(config.widget_site_key, "key");
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(cli.config.identity(), None);
    }

    #[test]
    fn identity_defaults_display_name_to_email() {
        let mut args = BASE_ARGS.to_vec();
        args.extend(["--email", "ada@example.com", "resolve", "/abc"]);
        let cli = Cli::try_parse_from(args).expect("parse");

        let identity = cli.config.identity().expect("identity");
        assert_eq!(identity.display_name, "ada@example.com");
        assert_eq!(identity.photo_url, "");
        assert!(matches!(cli.command, Some(Commands::Resolve { .. })));
    }

    #[test]
    fn blank_email_means_no_identity() {
        let mut args = BASE_ARGS.to_vec();
        args.extend(["--email", "  "]);
        let cli = Cli::try_parse_from(args).expect("parse");
        assert_eq!(cli.config.identity(), None);
    }
}

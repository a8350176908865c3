use clap::{Args, Parser, Subcommand, ValueEnum};
use std::time::Duration;
use url::Url;

use crate::client::error::{LivePaperError, LivePaperResult};

// LivePaper production endpoints
pub const AUTH_URL: &str = "https://www.livepaperapi.com/auth/token";
pub const PAYOFF_URL: &str = "https://www.livepaperapi.com/api/v1/payoffs";
pub const TRIGGER_URL: &str = "https://www.livepaperapi.com/api/v1/triggers";
pub const WATERMARK_DOWNLOAD_URL: &str = "https://watermark.livepaperapi.com/watermark/v1/triggers";
pub const STORAGE_URL: &str = "https://storage.livepaperapi.com/objects/v1/files";

// OAuth client-credentials request
pub const AUTH_GRANT_TYPE: &str = "client_credentials";
pub const AUTH_SCOPE: &str = "default";

// Transport
pub const TIMEOUT_SECONDS: u64 = 30;
pub const USER_AGENT: &str = "akaere-livepaper/0.1";

// Environment variables read by `Config::from_env`
pub const ENV_CLIENT_ID: &str = "LIVEPAPER_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "LIVEPAPER_CLIENT_SECRET";
pub const ENV_ACCESS_TOKEN: &str = "LIVEPAPER_ACCESS_TOKEN";
pub const ENV_API_BASE: &str = "LIVEPAPER_API_BASE";
pub const ENV_TIMEOUT: &str = "LIVEPAPER_TIMEOUT";

/// Full URLs of every LivePaper endpoint the client talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub auth_url: String,
    pub payoff_url: String,
    pub trigger_url: String,
    pub watermark_download_url: String,
    pub storage_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth_url: AUTH_URL.to_string(),
            payoff_url: PAYOFF_URL.to_string(),
            trigger_url: TRIGGER_URL.to_string(),
            watermark_download_url: WATERMARK_DOWNLOAD_URL.to_string(),
            storage_url: STORAGE_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Keep the production paths but serve all of them from `base`
    /// (staging hosts, local mocks).
    pub fn rooted_at(base: &str) -> LivePaperResult<Self> {
        let base = Url::parse(base)?;
        let root = base.as_str().trim_end_matches('/');

        let reroot = |production: &str| -> LivePaperResult<String> {
            let path = Url::parse(production)?.path().to_string();
            Ok(format!("{}{}", root, path))
        };

        Ok(Self {
            auth_url: reroot(AUTH_URL)?,
            payoff_url: reroot(PAYOFF_URL)?,
            trigger_url: reroot(TRIGGER_URL)?,
            watermark_download_url: reroot(WATERMARK_DOWNLOAD_URL)?,
            storage_url: reroot(STORAGE_URL)?,
        })
    }
}

/// How the client obtains its bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    ClientCredentials { client_id: String, client_secret: String },
    AccessToken(String),
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub endpoints: Endpoints,
    pub timeout: Duration,
}

impl Config {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            endpoints: Endpoints::default(),
            timeout: Duration::from_secs(TIMEOUT_SECONDS),
        }
    }

    /// Build the configuration from `LIVEPAPER_*` environment variables
    pub fn from_env() -> LivePaperResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> LivePaperResult<Self> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let credentials = if let Some(token) = non_empty(ENV_ACCESS_TOKEN) {
            Credentials::AccessToken(token)
        } else {
            let client_id = non_empty(ENV_CLIENT_ID).ok_or_else(|| {
                LivePaperError::Authentication(format!("{} is not set", ENV_CLIENT_ID))
            })?;
            let client_secret = non_empty(ENV_CLIENT_SECRET).ok_or_else(|| {
                LivePaperError::Authentication(format!("{} is not set", ENV_CLIENT_SECRET))
            })?;
            Credentials::ClientCredentials {
                client_id,
                client_secret,
            }
        };

        let endpoints = match non_empty(ENV_API_BASE) {
            Some(base) => Endpoints::rooted_at(&base)?,
            None => Endpoints::default(),
        };

        let timeout = non_empty(ENV_TIMEOUT)
            .and_then(|value| value.trim().parse::<u64>().ok())
            .unwrap_or(TIMEOUT_SECONDS);

        Ok(Self {
            credentials,
            endpoints,
            timeout: Duration::from_secs(timeout),
        })
    }
}

#[derive(Parser)]
#[command(author, version, about = "Command-line client for the LivePaper API")]
pub struct Cli {
    /// Enable debug output
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Emit journald-formatted log records
    #[arg(long, global = true)]
    pub journald: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Copy a remote image into LivePaper storage and print its new URL
    Upload {
        /// Source image URL
        url: String,
    },
    /// Payoff operations
    #[command(subcommand)]
    Payoff(PayoffCommand),
    /// Trigger operations
    #[command(subcommand)]
    Trigger(TriggerCommand),
}

#[derive(Subcommand)]
pub enum PayoffCommand {
    /// Fetch a payoff by id
    Get { id: String },
    /// Create a payoff
    Create(PayoffCreateArgs),
}

#[derive(Args)]
pub struct PayoffCreateArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long = "type", value_enum, default_value_t = PayoffKindArg::Web)]
    pub kind: PayoffKindArg,

    /// Target URL of the payoff
    #[arg(long)]
    pub url: String,

    /// Content type of the private rich payoff data
    #[arg(long)]
    pub data_type: Option<String>,

    /// Rich payoff data as a JSON document
    #[arg(long)]
    pub data: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum PayoffKindArg {
    Web,
    Rich,
}

#[derive(Subcommand)]
pub enum TriggerCommand {
    /// Fetch a trigger by id
    Get { id: String },
    /// Create a watermark trigger
    Create {
        #[arg(long)]
        name: String,

        /// Watermark strength
        #[arg(long, default_value_t = 10)]
        strength: u32,

        /// Image to watermark; uploaded to LivePaper storage first
        #[arg(long)]
        image_url: String,

        #[arg(long)]
        subscription: Option<String>,
    },
    /// Download the watermarked image of a trigger
    Watermark {
        id: String,

        /// Output file
        #[arg(short, long)]
        output: String,
    },
}

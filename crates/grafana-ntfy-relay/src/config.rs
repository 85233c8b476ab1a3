// Numan Thabit 2025
use std::{
    fs,
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::info;
use url::Url;

const DEFAULT_LISTEN: &str = "0.0.0.0:8080";
const DEFAULT_NTFY_URL: &str = "https://ntfy.sh";
const DEFAULT_DISPATCH_TIMEOUT_SECS: u64 = 10;

#[derive(Parser, Debug, Clone, Default)]
#[command(
    author,
    version,
    about = "Relay Grafana alert webhooks to ntfy push notifications",
    rename_all = "kebab-case"
)]
pub struct CliArgs {
    /// Path to a TOML configuration file.
    #[arg(long, value_name = "PATH", env = "RELAY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Socket address to bind the webhook server on.
    #[arg(long, env = "RELAY_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Shared secret expected as `Authorization: Bearer <token>`.
    #[arg(long, env = "AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// ntfy topic notifications are published to.
    #[arg(long, env = "TOPIC")]
    pub topic: Option<String>,

    /// Base URL of the ntfy server.
    #[arg(long, env = "NTFY_URL")]
    pub ntfy_url: Option<Url>,

    /// Outbound push timeout in seconds (0 disables the timeout).
    #[arg(long, env = "DISPATCH_TIMEOUT_SECS")]
    pub dispatch_timeout_secs: Option<u64>,

    /// Enable per-request HTTP tracing logs.
    #[arg(long, default_value_t = false)]
    pub http_trace: bool,
}

#[derive(Clone)]
pub struct Config {
    pub listen: SocketAddr,
    pub auth_token: String,
    pub topic: String,
    pub ntfy_url: Url,
    pub dispatch_timeout: Option<Duration>,
    pub http_trace: bool,
    pub config_path: Option<PathBuf>,
}

// Hand-written so the token never reaches logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("listen", &self.listen)
            .field("auth_token", &"<redacted>")
            .field("topic", &self.topic)
            .field("ntfy_url", &self.ntfy_url.as_str())
            .field("dispatch_timeout", &self.dispatch_timeout)
            .field("http_trace", &self.http_trace)
            .field("config_path", &self.config_path)
            .finish()
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    listen: Option<SocketAddr>,
    auth_token: Option<String>,
    topic: Option<String>,
    ntfy_url: Option<Url>,
    dispatch_timeout_secs: Option<u64>,
    http_trace: Option<bool>,
}

impl Config {
    pub fn from_cli(cli: &CliArgs) -> Result<Self> {
        let file_cfg =
            load_file_config(cli.config.as_deref()).context("failed to load config file")?;
        let config = merge(cli, file_cfg)?;
        config.validate()?;
        config.log_summary();
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.auth_token.is_empty() {
            bail!("auth_token must be set (--auth-token, AUTH_TOKEN or config file)");
        }
        if self.topic.is_empty() {
            bail!("topic must be set (--topic, TOPIC or config file)");
        }
        if self.topic.contains('/') {
            bail!("topic must not contain '/'");
        }
        if !matches!(self.ntfy_url.scheme(), "http" | "https") {
            bail!("ntfy_url must use http or https");
        }
        Ok(())
    }

    fn log_summary(&self) {
        info!(
            listen = %self.listen,
            topic = %self.topic,
            ntfy_url = %self.ntfy_url,
            dispatch_timeout = ?self.dispatch_timeout,
            http_trace = self.http_trace,
            config = ?self.config_path,
            "grafana-ntfy-relay configuration"
        );
    }
}

fn merge(cli: &CliArgs, file_cfg: Option<(PathBuf, FileConfig)>) -> Result<Config> {
    let (cfg_path, file_cfg) = file_cfg.unzip();
    let file_cfg = file_cfg.unwrap_or_default();

    let listen = pick(
        cli.listen,
        file_cfg.listen,
        DEFAULT_LISTEN.parse().context("default listen address")?,
    );
    let auth_token = pick(cli.auth_token.clone(), file_cfg.auth_token, String::new());
    let topic = pick(cli.topic.clone(), file_cfg.topic, String::new());
    let ntfy_url = pick(
        cli.ntfy_url.clone(),
        file_cfg.ntfy_url,
        Url::parse(DEFAULT_NTFY_URL).context("default ntfy url")?,
    );
    let dispatch_timeout_secs = pick(
        cli.dispatch_timeout_secs,
        file_cfg.dispatch_timeout_secs,
        DEFAULT_DISPATCH_TIMEOUT_SECS,
    );
    let dispatch_timeout = if dispatch_timeout_secs == 0 {
        None
    } else {
        Some(Duration::from_secs(dispatch_timeout_secs))
    };
    let http_trace = cli.http_trace || file_cfg.http_trace.unwrap_or(false);

    Ok(Config {
        listen,
        auth_token,
        topic,
        ntfy_url,
        dispatch_timeout,
        http_trace,
        config_path: cfg_path,
    })
}

fn pick<T>(cli: Option<T>, file: Option<T>, default: T) -> T {
    cli.or(file).unwrap_or(default)
}

fn load_file_config(path: Option<&Path>) -> Result<Option<(PathBuf, FileConfig)>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let parsed: FileConfig = toml::from_str(&raw)
        .with_context(|| format!("failed to parse {} as TOML", path.display()))?;
    Ok(Some((path.to_path_buf(), parsed)))
}

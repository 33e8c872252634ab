use crate::config::{
    LoadConfig, UserConfig, DEFAULT_CONCURRENCY, DEFAULT_DURATION_SECS, DEFAULT_METHOD,
    DEFAULT_TIMEOUT_MS,
};
use crate::error::ConfigError;
use crate::utils::parse_headers;
use clap::{ArgAction, Parser};
use std::ffi::OsString;
use std::time::Duration;

/// Multi-letter flags that are also accepted with a single dash (`-redir`).
const LONG_FLAGS: &[&str] = &["help", "redir", "no-c", "no-ka", "body"];

#[derive(Parser, Debug)]
#[command(name = "barrage")]
#[command(about = "Sustained concurrent HTTP load from the command line")]
#[command(override_usage = "barrage <options> <url>")]
#[command(long_about = None)]
pub struct Cli {
    /// Print version details
    #[arg(short = 'v')]
    pub version: bool,
    /// Allow redirects
    #[arg(long = "redir")]
    pub allow_redirects: bool,
    /// Disable compression - prevents sending the "Accept-Encoding: gzip" header
    #[arg(long = "no-c")]
    pub disable_compression: bool,
    /// Disable keep-alive - prevents re-use of TCP connections between requests
    #[arg(long = "no-ka")]
    pub disable_keep_alive: bool,
    /// Number of concurrent workers (default 10)
    #[arg(short = 'c', value_name = "N")]
    pub concurrency: Option<usize>,
    /// Duration of test in seconds (default 10)
    #[arg(short = 'd', value_name = "N")]
    pub duration: Option<u64>,
    /// Socket/request timeout in ms (default 1000)
    #[arg(short = 'T', value_name = "N")]
    pub timeout_ms: Option<u64>,
    /// HTTP method (default GET)
    #[arg(short = 'M', value_name = "METHOD")]
    pub method: Option<String>,
    /// Extra request header in format "Key: Value"
    #[arg(short = 'H', value_name = "HEADER", action = ArgAction::Append)]
    pub headers: Vec<String>,
    /// Request body
    #[arg(long = "body", value_name = "BODY")]
    pub body: Option<String>,
    /// Skip TLS certificate verification
    #[arg(short = 'i')]
    pub insecure: bool,
    /// Target URL
    pub url: Option<String>,
}

impl Cli {
    /// Resolves flags against user defaults and built-in defaults, in that order.
    pub fn into_config(self, user: &UserConfig) -> Result<LoadConfig, ConfigError> {
        let url = self.url.ok_or(ConfigError::MissingUrl)?;

        let concurrency = self
            .concurrency
            .or(user.concurrency)
            .unwrap_or(DEFAULT_CONCURRENCY);
        let duration = self
            .duration
            .or(user.duration_secs)
            .unwrap_or(DEFAULT_DURATION_SECS);
        let timeout_ms = self
            .timeout_ms
            .or(user.timeout_ms)
            .unwrap_or(DEFAULT_TIMEOUT_MS);
        let method = self
            .method
            .or_else(|| user.method.clone())
            .unwrap_or_else(|| DEFAULT_METHOD.to_string());

        let mut headers = parse_headers(&user.headers)?;
        headers.extend(parse_headers(&self.headers)?);

        LoadConfig::builder(url)
            .method(method)
            .concurrency(concurrency)
            .duration(Duration::from_secs(duration))
            .timeout(Duration::from_millis(timeout_ms))
            .allow_redirects(self.allow_redirects)
            .disable_compression(self.disable_compression)
            .disable_keep_alive(self.disable_keep_alive)
            .insecure(self.insecure)
            .headers(headers)
            .body(self.body)
            .build()
    }
}

/// Rewrites `-redir` style flags to `--redir` so clap sees them as long flags.
/// Arguments after `--` are passed through untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(|arg| {
            let arg: OsString = arg.into();
            if passthrough {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }
            let rewrite = matches!(
                text.strip_prefix('-'),
                Some(rest) if !rest.starts_with('-') && is_long_flag(rest)
            );
            if rewrite {
                OsString::from(format!("-{}", text))
            } else {
                arg
            }
        })
        .collect()
}

fn is_long_flag(flag: &str) -> bool {
    let name = flag.split('=').next().unwrap_or(flag);
    LONG_FLAGS.contains(&name)
}

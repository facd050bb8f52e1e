use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};

/// Command-line arguments for the Quire binary.
#[derive(Debug, Parser)]
#[command(name = "quire", version, about = "Quire blog front end")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "QUIRE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the public and admin HTTP listeners.
    Serve(Box<ServeArgs>),
    /// Probe the upstream API once and exit non-zero when it is unreachable.
    #[command(name = "check-api")]
    CheckApi(CheckApiArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ApiOverride {
    /// Override the upstream API base URL.
    #[arg(long = "api-base-url", value_name = "URL")]
    pub api_base_url: Option<String>,

    /// Override the upstream request timeout.
    #[arg(long = "api-timeout-seconds", value_name = "SECONDS")]
    pub api_timeout_seconds: Option<u64>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct CheckApiArgs {
    #[command(flatten)]
    pub api: ApiOverride,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    #[command(flatten)]
    pub api: ApiOverride,

    /// Override the public listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the administrative listener host.
    #[arg(long = "server-admin-host", value_name = "HOST")]
    pub server_admin_host: Option<String>,

    /// Override the public listener port.
    #[arg(long = "server-public-port", value_name = "PORT")]
    pub public_port: Option<u16>,

    /// Override the administrative listener port.
    #[arg(long = "server-admin-port", value_name = "PORT")]
    pub admin_port: Option<u16>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the public site URL used for canonical links.
    #[arg(long = "site-public-url", value_name = "URL")]
    pub site_public_url: Option<String>,

    /// Mark the session cookie `Secure`.
    #[arg(
        long = "session-secure",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub session_secure: Option<bool>,

    /// Override the editor autosave debounce window.
    #[arg(long = "editor-autosave-debounce-ms", value_name = "MS")]
    pub editor_autosave_debounce_ms: Option<u64>,

    /// Override the maximum request size for featured image uploads in bytes.
    #[arg(long = "uploads-max-request-bytes", value_name = "BYTES")]
    pub uploads_max_request_bytes: Option<u64>,
}

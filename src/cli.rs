//! Command-line interface for gpt-relay
//!
//! Provides argument parsing and subcommand handling for the gpt-relay binary.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CORS-enabled relay for OpenAI-compatible chat completions
#[derive(Parser)]
#[command(name = "gpt-relay")]
#[command(version)]
#[command(about = "CORS-enabled relay for OpenAI-compatible chat completions")]
#[command(
    long_about = "gpt-relay forwards chat completion requests from browsers to an \
    OpenAI-compatible API using the caller's own API key, adding CORS headers \
    and normalising errors."
)]
pub struct Cli {
    /// Path to configuration file (defaults to ./gpt-relay.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override server.host from the configuration
    #[arg(long)]
    pub host: Option<String>,

    /// Override server.port from the configuration
    #[arg(short, long)]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a template configuration file
    Config {
        /// Output file path (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Generate template configuration content
pub fn generate_config_template() -> &'static str {
    r#"# gpt-relay Configuration
# ========================
#
# Every section and key is optional; omitted values use the defaults shown.

# ─────────────────────────────────────────────────────────────────────────────
# SERVER
# ─────────────────────────────────────────────────────────────────────────────

[server]
# IP address to bind to (0.0.0.0 for all interfaces, 127.0.0.1 for localhost only)
host = "0.0.0.0"

# Port to listen on
port = 3000

# Largest accepted request body in bytes (10 MiB)
max_body_bytes = 10485760

# ─────────────────────────────────────────────────────────────────────────────
# UPSTREAM CHAT COMPLETIONS API
# ─────────────────────────────────────────────────────────────────────────────
#
# API keys are never configured here. Each caller sends their own key as
# `Authorization: Bearer sk-...` and it is forwarded unchanged.

[upstream]
# Base URL including the version prefix; requests go to <base_url>/chat/completions
base_url = "https://api.openai.com/v1"

# Values used when the caller omits them
default_model = "gpt-4o-mini"
default_max_tokens = 4000
default_temperature = 0.9

# Optional bound on the upstream round trip in seconds (1-600).
# When unset the relay waits as long as the upstream takes.
# timeout_seconds = 120

# ─────────────────────────────────────────────────────────────────────────────
# OBSERVABILITY
# ─────────────────────────────────────────────────────────────────────────────

[observability]
# Log level: "trace", "debug", "info", "warn", "error"
# RUST_LOG overrides this when set.
log_level = "info"

# Prometheus metrics are always available at /metrics on the server port
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_arguments() {
        let cli = Cli::parse_from(["gpt-relay"]);
        assert!(cli.config.is_none());
        assert!(cli.host.is_none());
        assert!(cli.port.is_none());
        assert!(cli.command.is_none());
    }

    #[test]
    fn custom_config_path_and_overrides() {
        let cli = Cli::parse_from([
            "gpt-relay",
            "--config",
            "custom.toml",
            "--host",
            "127.0.0.1",
            "-p",
            "8080",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert_eq!(cli.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(cli.port, Some(8080));
    }

    #[test]
    fn config_subcommand_with_output() {
        let cli = Cli::parse_from(["gpt-relay", "config", "-o", "relay.toml"]);
        assert!(matches!(
            cli.command,
            Some(Command::Config { output: Some(ref path) }) if path == &PathBuf::from("relay.toml")
        ));
    }

    #[test]
    fn template_parses_and_validates() {
        let config: Config =
            toml::from_str(generate_config_template()).expect("template should be valid TOML");
        config.validate().expect("template should validate");
        assert_eq!(config.upstream.default_model(), "gpt-4o-mini");
        assert_eq!(config.server.max_body_bytes, 10 * 1024 * 1024);
    }
}

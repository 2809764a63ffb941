use serde::Deserialize;
use std::path::Path;

use crate::tools::KNOWN_TOOLS;

/// Top-level configuration parsed from TOML.
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Server-level configuration.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Period of the SSE `ping` event, in seconds.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            heartbeat_interval_secs: default_heartbeat_interval(),
        }
    }
}

/// Connection details and query defaults for the football statistics API.
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sent as `x-apisports-key`. An empty key is allowed; the upstream rejects the call.
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_result_limit")]
    pub result_limit: usize,
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
    #[serde(default = "default_league")]
    pub default_league: String,
    #[serde(default = "default_season")]
    pub default_season: u16,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            result_limit: default_result_limit(),
            search_limit: default_search_limit(),
            default_league: default_league(),
            default_season: default_season(),
        }
    }
}

/// Which tools the dispatcher exposes.
#[derive(Debug, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_enabled_tools")]
    pub enabled: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled_tools(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_heartbeat_interval() -> u64 {
    30
}

fn default_base_url() -> String {
    "https://v3.football.api-sports.io".to_string()
}

fn default_result_limit() -> usize {
    10
}

fn default_search_limit() -> usize {
    5
}

fn default_league() -> String {
    "39".to_string()
}

fn default_season() -> u16 {
    2024
}

fn default_enabled_tools() -> Vec<String> {
    KNOWN_TOOLS.iter().map(|s| s.to_string()).collect()
}

/// Load and validate config, applying environment variable overrides.
///
/// Without a path the built-in defaults are used, so the server can run
/// from environment variables alone.
pub fn load_config(path: Option<&Path>) -> Result<Config, String> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path).map_err(|e| {
                format!("Failed to read config file '{}': {}", path.display(), e)
            })?;
            toml::from_str(&content).map_err(|e| format!("Failed to parse TOML config: {e}"))?
        }
        None => Config::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate(&config)?;

    Ok(config)
}

/// Apply environment variable overrides. `lookup` is `std::env::var` outside tests.
fn apply_env_overrides(
    config: &mut Config,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<(), String> {
    if let Some(val) = lookup("PORT") {
        config.server.port = val
            .parse()
            .map_err(|e| format!("PORT must be a valid port number ({val}): {e}"))?;
    }

    if let Some(val) = lookup("API_FOOTBALL_KEY") {
        config.upstream.api_key = val;
    }

    if let Some(val) = lookup("API_FOOTBALL_BASE_URL") {
        config.upstream.base_url = val;
    }

    Ok(())
}

/// Validate the entire configuration. Returns an error string on failure.
fn validate(config: &Config) -> Result<(), String> {
    validate_server(&config.server)?;
    validate_upstream(&config.upstream)?;
    validate_tools(&config.tools)?;
    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), String> {
    if server.host.is_empty() {
        return Err("server.host is required".to_string());
    }

    if server.heartbeat_interval_secs == 0 {
        return Err("server.heartbeat_interval_secs must be greater than zero".to_string());
    }

    Ok(())
}

fn validate_upstream(upstream: &UpstreamConfig) -> Result<(), String> {
    if upstream.base_url.ends_with('/') {
        return Err("upstream.base_url must not have a trailing slash".to_string());
    }

    if upstream.base_url.starts_with("http://") {
        tracing::warn!("upstream.base_url uses http://, the API key is sent in cleartext");
    } else if !upstream.base_url.starts_with("https://") {
        return Err("upstream.base_url must be a valid HTTP(S) URL".to_string());
    }

    // Missing key is tolerated: calls fail upstream with an auth error instead.
    if upstream.api_key.is_empty() {
        tracing::warn!(
            "upstream.api_key is empty (set API_FOOTBALL_KEY); upstream calls will be rejected"
        );
    }

    let league_regex = regex_lite::Regex::new(r"^[0-9]+$").unwrap();
    if !league_regex.is_match(&upstream.default_league) {
        return Err(format!(
            "upstream.default_league '{}' must be a numeric league id",
            upstream.default_league
        ));
    }

    for (key, value) in [
        ("result_limit", upstream.result_limit),
        ("search_limit", upstream.search_limit),
    ] {
        if !(1..=50).contains(&value) {
            return Err(format!(
                "upstream.{key} must be between 1 and 50 (got {value})"
            ));
        }
    }

    Ok(())
}

fn validate_tools(tools: &ToolsConfig) -> Result<(), String> {
    if tools.enabled.is_empty() {
        return Err("tools.enabled must name at least one tool".to_string());
    }

    let mut seen = std::collections::HashSet::new();
    for name in &tools.enabled {
        if !KNOWN_TOOLS.contains(&name.as_str()) {
            return Err(format!(
                "tools.enabled: unknown tool '{}'. Use any of: {}",
                name,
                KNOWN_TOOLS.join(", ")
            ));
        }
        if !seen.insert(name) {
            return Err(format!("tools.enabled: '{name}' is listed twice"));
        }
    }

    Ok(())
}

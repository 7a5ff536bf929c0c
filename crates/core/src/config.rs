use crate::error::{Error, Result};
use crate::types::Credentials;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Provider API base used when nothing else is configured
pub const DEFAULT_API_URL: &str = "https://api.cloudflare.com/client/v4";

pub const ENV_EMAIL: &str = "CF_EMAIL";
pub const ENV_KEY: &str = "CF_KEY";
pub const ENV_DOMAIN: &str = "CF_DOMAIN";
pub const ENV_API_URL: &str = "CF_API_URL";

/// Optional `config.toml` structure
///
/// ```toml
/// [cloudflare]
/// email = "ops@example.com"
/// api_key = "..."
/// zone = "example.com"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub cloudflare: CloudflareSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct CloudflareSection {
    pub email: Option<String>,
    pub api_key: Option<String>,
    pub zone: Option<String>,
    pub api_url: Option<String>,
}

/// Values given on the command line; `None` or empty means "not given"
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub email: Option<String>,
    pub key: Option<String>,
    pub zone: Option<String>,
    pub api_url: Option<String>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub credentials: Credentials,
    pub domain: String,
    pub api_url: String,
}

/// Default config location: `~/.cfzone/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()?;
    Some(PathBuf::from(home).join(".cfzone").join("config.toml"))
}

/// Load a config file, returning `None` when it does not exist
pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<Option<ConfigFile>> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!("No config file at {}", path.display());
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let config = parse_config_str(&content)?;
    tracing::debug!("Loaded config file {}", path.display());
    Ok(Some(config))
}

/// Parse config from a string (useful for testing)
pub fn parse_config_str(content: &str) -> Result<ConfigFile> {
    Ok(toml::from_str(content)?)
}

/// First non-empty candidate wins
fn first_set<I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
}

impl Settings {
    /// Resolve settings from flags, then `env`, then the config file.
    ///
    /// `env` looks up an environment variable by name. Email, key and zone
    /// are required; the API URL falls back to [`DEFAULT_API_URL`].
    pub fn resolve<F>(flags: &Overrides, env: F, file: Option<&ConfigFile>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let section = file.map(|f| &f.cloudflare);

        let email = first_set([
            flags.email.clone(),
            env(ENV_EMAIL),
            section.and_then(|s| s.email.clone()),
        ])
        .ok_or(Error::MissingSetting("email"))?;
        let api_key = first_set([
            flags.key.clone(),
            env(ENV_KEY),
            section.and_then(|s| s.api_key.clone()),
        ])
        .ok_or(Error::MissingSetting("key"))?;
        let domain = first_set([
            flags.zone.clone(),
            env(ENV_DOMAIN),
            section.and_then(|s| s.zone.clone()),
        ])
        .ok_or(Error::MissingSetting("zone"))?;
        let api_url = first_set([
            flags.api_url.clone(),
            env(ENV_API_URL),
            section.and_then(|s| s.api_url.clone()),
        ])
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            credentials: Credentials::new(email, api_key),
            domain,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve against the process environment
    pub fn from_process_env(flags: &Overrides, file: Option<&ConfigFile>) -> Result<Self> {
        Self::resolve(flags, |name| std::env::var(name).ok(), file)
    }
}

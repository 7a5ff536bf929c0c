use anyhow::{Context, Result};
use cfzone_client::ZoneClient;
use cfzone_core::config::{default_config_path, load_config_file};
use cfzone_core::{Action, ActionRequest, ConfigFile, Overrides, SecurityLevel, Settings};
use std::path::PathBuf;

const INVALID_LEVEL_MESSAGE: &str =
    "Invalid security level specified. Available options: attack/high/medium/low";

/// Load the config file; an explicit path must exist, the default one may not
fn load_config(explicit: Option<PathBuf>) -> Result<Option<ConfigFile>> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            let config = load_config_file(&path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?;
            Ok(config)
        }
        None => match default_config_path() {
            Some(path) => load_config_file(&path)
                .with_context(|| format!("Failed to load config file {}", path.display())),
            None => Ok(None),
        },
    }
}

/// Context attached to a failed action
fn failure_context(action: &Action) -> &'static str {
    match action {
        Action::PurgeCache => "Error clearing cache",
        Action::SetSecurityLevel(_) => "Error setting security level",
        Action::SetDevelopmentMode(_) => "Error setting development mode",
    }
}

fn describe(request: &ActionRequest) -> String {
    match &request.action {
        Action::PurgeCache => format!("Purging cache for {}", request.domain),
        Action::SetSecurityLevel(level) => {
            format!("Setting security level of {} to {}", request.domain, level)
        }
        Action::SetDevelopmentMode(mode) => {
            format!("Setting development mode of {} to {}", request.domain, mode)
        }
    }
}

/// Run one zone action and print the raw provider response
pub async fn run(action: Action, overrides: Overrides, config: Option<PathBuf>) -> Result<()> {
    // Reject unknown levels before touching credentials or the network
    if let Action::SetSecurityLevel(token) = &action
        && token.parse::<SecurityLevel>().is_err()
    {
        tracing::debug!("Rejected security level token '{}'", token);
        println!("{}", INVALID_LEVEL_MESSAGE);
        return Ok(());
    }

    let config = load_config(config)?;
    let settings = Settings::from_process_env(&overrides, config.as_ref())
        .context("Failed to resolve Cloudflare settings")?;

    let client = ZoneClient::new(&settings)?;
    let request = ActionRequest {
        action,
        domain: settings.domain,
    };

    tracing::info!("{}", describe(&request));
    let body = client
        .execute(&request)
        .await
        .context(failure_context(&request.action))?;

    println!("{}", body);
    Ok(())
}

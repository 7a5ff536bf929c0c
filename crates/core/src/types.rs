use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Account credentials sent as `X-Auth-Email` / `X-Auth-Key` headers
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub api_key: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            api_key: api_key.into(),
        }
    }
}

// Keep the key out of logs and panic messages
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Opaque zone identifier returned by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneId(String);

impl ZoneId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Zone security level.
///
/// Parsed from the user-facing tokens (`attack`, `high`, `medium`, `low`)
/// and sent to the provider as its own tokens (`under_attack`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityLevel {
    UnderAttack,
    High,
    Medium,
    Low,
}

impl SecurityLevel {
    /// Token expected by the `security_level` settings endpoint
    pub fn as_api_value(&self) -> &'static str {
        match self {
            SecurityLevel::UnderAttack => "under_attack",
            SecurityLevel::High => "high",
            SecurityLevel::Medium => "medium",
            SecurityLevel::Low => "low",
        }
    }
}

impl FromStr for SecurityLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "attack" => Ok(SecurityLevel::UnderAttack),
            "high" => Ok(SecurityLevel::High),
            "medium" => Ok(SecurityLevel::Medium),
            "low" => Ok(SecurityLevel::Low),
            other => Err(Error::InvalidSecurityLevel(other.to_string())),
        }
    }
}

/// The single administrative action performed by one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    PurgeCache,
    /// Raw user token, mapped to a [`SecurityLevel`] just before dispatch
    SetSecurityLevel(String),
    /// Passed through unvalidated; `on` or `off` expected
    SetDevelopmentMode(String),
}

impl Action {
    /// Pick the action to run from the raw flag values.
    ///
    /// Priority is purge-cache, then security level, then development mode.
    /// Returns the chosen action (if any) and the flag names that were set
    /// but will not run.
    pub fn select(
        purge_cache: bool,
        security_level: Option<&str>,
        development_mode: Option<&str>,
    ) -> (Option<Action>, Vec<&'static str>) {
        let security_level = security_level.filter(|s| !s.is_empty());
        let development_mode = development_mode.filter(|s| !s.is_empty());

        let mut candidates = Vec::new();
        if purge_cache {
            candidates.push(("purge-cache", Action::PurgeCache));
        }
        if let Some(level) = security_level {
            candidates.push(("secure-level", Action::SetSecurityLevel(level.to_string())));
        }
        if let Some(mode) = development_mode {
            candidates.push((
                "development-mode",
                Action::SetDevelopmentMode(mode.to_string()),
            ));
        }

        let mut iter = candidates.into_iter();
        let chosen = iter.next().map(|(_, action)| action);
        let ignored = iter.map(|(name, _)| name).collect();
        (chosen, ignored)
    }
}

/// An action bound to its target domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub action: Action,
    pub domain: String,
}

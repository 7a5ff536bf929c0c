use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Building the outbound request failed (bad URL, header value, ...)
    Request(String),
    /// The request could not be sent or no response arrived
    Transport(String),
    /// The response arrived but its body could not be read
    BodyRead(String),
    /// A request payload could not be serialized
    Marshal(String),
    /// The zone lookup response was not JSON
    Decode(String),
    /// The zone lookup matched no zone for this domain
    ZoneNotFound(String),
    /// Security level token outside attack/high/medium/low
    InvalidSecurityLevel(String),
    /// A required setting was empty after flags, env and config file
    MissingSetting(&'static str),
    ConfigParse(String),
    IoError(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Request(msg) => write!(f, "Failed to build request: {}", msg),
            Error::Transport(msg) => write!(f, "Request failed: {}", msg),
            Error::BodyRead(msg) => write!(f, "Failed to read response body: {}", msg),
            Error::Marshal(msg) => write!(f, "Failed to serialize payload: {}", msg),
            Error::Decode(msg) => write!(f, "Failed to decode zone lookup response: {}", msg),
            Error::ZoneNotFound(domain) => write!(f, "No zone found for domain: {}", domain),
            Error::InvalidSecurityLevel(level) => write!(
                f,
                "Invalid security level '{}'. Available options: attack/high/medium/low",
                level
            ),
            Error::MissingSetting(name) => write!(f, "Missing required setting: {}", name),
            Error::ConfigParse(msg) => write!(f, "Configuration parse error: {}", msg),
            Error::IoError(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::ConfigParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

//! API key and profile configuration.
//!
//! Both values are static strings supplied before the core runs, read from
//! the process environment with `.env` file support.

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "NEXTDNS_API_KEY";

/// Environment variable holding the profile identifier.
pub const ENV_PROFILE: &str = "NEXTDNS_PROFILE";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is absent from the environment and `.env`
    #[error("missing {0} - set it in the environment or in .env")]
    MissingVar(&'static str),
}

/// Credentials and profile selection for one invocation.
///
/// Read-only after startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Static API key sent with every request
    pub api_key: String,
    /// Profile identifier whose logs are fetched
    pub profile: String,
}

impl Settings {
    /// Load settings from the environment, consulting `.env` in the working
    /// directory first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine; the variables may come from the
        // environment directly.
        dotenvy::dotenv().ok();

        Ok(Self {
            api_key: require(ENV_API_KEY)?,
            profile: require(ENV_PROFILE)?,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

//! Daemon configuration.
//!
//! Everything is sourced from environment variables (a `.env` file is honored
//! for local development). The login credentials gate a single shared
//! account; there are no per-user accounts.

/// Environment variable prefix shared by all settings.
const ENV_PREFIX: &str = "TUTORDESK";

#[derive(Debug, Clone)]
pub struct Config {
    pub username: String,
    pub password: String,
    /// When enabled, unclassified backend errors surface their raw message.
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "password123".to_string(),
            debug: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        // Missing .env is fine; plain environment variables still apply.
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        Self {
            username: env_var("USERNAME").unwrap_or(defaults.username),
            password: env_var("PASSWORD").unwrap_or(defaults.password),
            debug: env_var("DEBUG")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.debug),
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{}_{}", ENV_PREFIX, name))
        .ok()
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shared_account() {
        let config = Config::default();
        assert_eq!(config.username, "admin");
        assert!(!config.debug);
    }
}

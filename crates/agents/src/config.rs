//! Environment configuration and readiness checks

use crate::{AgentError, Result};

pub const ENV_GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const ENV_GRAPH_URI: &str = "GRAPH_URI";
pub const ENV_GRAPH_USERNAME: &str = "GRAPH_USERNAME";
pub const ENV_GRAPH_PASSWORD: &str = "GRAPH_PASSWORD";

/// The four credentials required before the assistant may operate.
///
/// When any are absent the system reports itself not ready instead of
/// attempting partial operation; callers check readiness before opening a
/// session.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub groq_api_key: String,
    pub graph_uri: String,
    pub graph_username: String,
    pub graph_password: String,
}

impl AppConfig {
    /// Read all required credentials, listing every missing variable at once
    pub fn from_env() -> Result<Self> {
        let mut missing = Vec::new();

        let groq_api_key = read_var(ENV_GROQ_API_KEY, &mut missing);
        let graph_uri = read_var(ENV_GRAPH_URI, &mut missing);
        let graph_username = read_var(ENV_GRAPH_USERNAME, &mut missing);
        let graph_password = read_var(ENV_GRAPH_PASSWORD, &mut missing);

        if !missing.is_empty() {
            return Err(AgentError::MissingConfig(missing.join(", ")));
        }

        Ok(Self {
            groq_api_key: groq_api_key.unwrap_or_default(),
            graph_uri: graph_uri.unwrap_or_default(),
            graph_username: graph_username.unwrap_or_default(),
            graph_password: graph_password.unwrap_or_default(),
        })
    }

    /// Read only the completion credential, for local graph modes
    pub fn completion_key_from_env() -> Result<String> {
        let mut missing = Vec::new();
        match read_var(ENV_GROQ_API_KEY, &mut missing) {
            Some(key) => Ok(key),
            None => Err(AgentError::MissingConfig(ENV_GROQ_API_KEY.to_string())),
        }
    }
}

fn read_var(key: &str, missing: &mut Vec<String>) -> Option<String> {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => {
            missing.push(key.to_string());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // env mutation is process-wide, so both cases run in one test
    #[test]
    fn test_from_env_readiness() {
        std::env::remove_var(ENV_GROQ_API_KEY);
        std::env::remove_var(ENV_GRAPH_URI);
        std::env::remove_var(ENV_GRAPH_USERNAME);
        std::env::remove_var(ENV_GRAPH_PASSWORD);

        let err = AppConfig::from_env().unwrap_err();
        let message = err.to_string();
        assert!(message.contains(ENV_GROQ_API_KEY));
        assert!(message.contains(ENV_GRAPH_URI));
        assert!(message.contains(ENV_GRAPH_USERNAME));
        assert!(message.contains(ENV_GRAPH_PASSWORD));

        std::env::set_var(ENV_GROQ_API_KEY, "gsk_test");
        std::env::set_var(ENV_GRAPH_URI, "ws://localhost:8000");
        std::env::set_var(ENV_GRAPH_USERNAME, "root");
        std::env::set_var(ENV_GRAPH_PASSWORD, "root");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.graph_uri, "ws://localhost:8000");
        assert_eq!(AppConfig::completion_key_from_env().unwrap(), "gsk_test");

        std::env::remove_var(ENV_GROQ_API_KEY);
        std::env::remove_var(ENV_GRAPH_URI);
        std::env::remove_var(ENV_GRAPH_USERNAME);
        std::env::remove_var(ENV_GRAPH_PASSWORD);
    }
}

//! Secure credential handling for the Galaxy server
//!
//! Credentials are read once from an environment snapshot at startup and
//! kept in a `secrecy::SecretString` so the API token cannot leak through
//! `Debug` output. Any tool output that is logged or reported goes through
//! [`Credentials::mask`] first.

use crate::core::error::PublishError;
use crate::galaxy::resolver::normalize_server_base;
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;

/// Server URL variables, preferred name first
const SERVER_URL_VARS: &[&str] = &["GALAXY_SERVER_URL", "ANSIBLE_GALAXY_SERVER_GALAXY_URL"];

/// API token variables, preferred name first
const SERVER_TOKEN_VARS: &[&str] = &[
    "GALAXY_SERVER_TOKEN",
    "ANSIBLE_GALAXY_SERVER_VALIDATED_TOKEN",
];

/// Server address and API key for the run
#[derive(Debug)]
pub struct Credentials {
    /// Normalized server base URL, always with a scheme and no trailing slash
    pub server_url: String,
    pub token: SecretString,
}

impl Credentials {
    pub fn new(server_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            token: SecretString::new(token.into().into()),
        }
    }

    /// Replace every occurrence of the token in `text` with its masked form
    pub fn mask(&self, text: &str) -> String {
        let token = self.token.expose_secret();
        if token.is_empty() {
            return text.to_string();
        }
        text.replace(token, &SecureTokenManager::mask_token(token))
    }
}

/// Reads Galaxy credentials from an environment snapshot
///
/// # Examples
///
/// ```
/// use collection_publisher::security::SecureTokenManager;
/// use std::collections::HashMap;
///
/// let mut env = HashMap::new();
/// env.insert("GALAXY_SERVER_URL".to_string(), "galaxy.example.com".to_string());
/// env.insert("GALAXY_SERVER_TOKEN".to_string(), "0123456789abcdef".to_string());
///
/// let credentials = SecureTokenManager::new(env).credentials().unwrap();
/// assert_eq!(credentials.server_url, "https://galaxy.example.com");
/// ```
#[derive(Debug, Default)]
pub struct SecureTokenManager {
    env: HashMap<String, String>,
}

impl SecureTokenManager {
    pub fn new(env: HashMap<String, String>) -> Self {
        Self { env }
    }

    /// Snapshot the process environment
    pub fn from_process_env() -> Self {
        Self::new(std::env::vars().collect())
    }

    /// First non-empty value among `names`
    fn lookup(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.env.get(*name))
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }

    /// Required variables that are unset or empty, by preferred name
    pub fn missing_variables(&self) -> Vec<String> {
        [SERVER_URL_VARS, SERVER_TOKEN_VARS]
            .iter()
            .filter(|names| self.lookup(names).is_none())
            .map(|names| names[0].to_string())
            .collect()
    }

    /// Build the run's credentials
    ///
    /// # Errors
    ///
    /// - `PublishError::EnvironmentMissing` - URL or token unset or empty
    /// - `PublishError::InvalidServerUrl` - URL has a scheme other than http/https
    pub fn credentials(&self) -> Result<Credentials, PublishError> {
        match (self.lookup(SERVER_URL_VARS), self.lookup(SERVER_TOKEN_VARS)) {
            (Some(url), Some(token)) => Ok(Credentials::new(normalize_server_base(url)?, token)),
            _ => Err(PublishError::EnvironmentMissing {
                variables: self.missing_variables(),
            }),
        }
    }

    /// Masks a token for safe logging
    ///
    /// Shows only the first 3 and last 3 characters for identification purposes.
    /// Tokens shorter than 10 characters are fully masked as "****".
    ///
    /// # Examples
    ///
    /// ```
    /// use collection_publisher::security::SecureTokenManager;
    ///
    /// assert_eq!(SecureTokenManager::mask_token("abcdef123456"), "abc...456");
    /// assert_eq!(SecureTokenManager::mask_token("short"), "****");
    /// ```
    pub fn mask_token(token: &str) -> String {
        let chars: Vec<char> = token.chars().collect();
        if chars.len() < 10 {
            return "****".to_string();
        }

        let prefix: String = chars[..3].iter().collect();
        let suffix: String = chars[chars.len() - 3..].iter().collect();
        format!("{}...{}", prefix, suffix)
    }
}

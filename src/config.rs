use std::path::Path;
use std::{fmt, fs};

use error_stack::{IntoReport, Report, ResultExt};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::plex::account::PlexAccount;

#[derive(Debug, Clone)]
pub struct ConfigError;
impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Config error")
    }
}
impl std::error::Error for ConfigError {}

pub type ConfigResult<T> = error_stack::Result<T, ConfigError>;

#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct PorterConfig {
    pub username: String,
    pub auth_token: String,
    pub client_identifier: String,
}

impl PorterConfig {
    pub fn new() -> Self {
        Self {
            username: "".to_string(),
            auth_token: "".to_string(),
            client_identifier: "".to_string(),
        }
    }

    /// Interactive plex.tv sign-in, persisting the resulting token.
    pub async fn login_and_store() -> ConfigResult<Self> {
        let mut config = PorterConfig::new();
        if Self::config_file_exists()? {
            config.read_config_file()?;
        }
        if config.client_identifier.is_empty() {
            config.client_identifier = Self::generate_client_identifier();
        }

        let account = PlexAccount::interactive_signin(&config.client_identifier)
            .await
            .change_context(ConfigError)?;
        config.username = account.username.clone();
        config.auth_token = account.token().to_string();
        config.save_config_file()?;
        Ok(config)
    }

    pub fn read_config_file(&mut self) -> ConfigResult<()> {
        let config_path =
            Self::get_config_file_path().attach_printable("Failed to get the config file path")?;
        if !Self::config_file_exists()? {
            return Err(Report::new(ConfigError).attach_printable(format!(
                "Config file not found at: {}. Please run `plex-porter login` first.",
                config_path
            )));
        }

        let config_content = fs::read_to_string(&config_path)
            .into_report()
            .change_context(ConfigError)
            .attach_printable(format!("Failed to read config file at: {}", config_path))?;
        let config: PorterConfig = serde_json::from_str(&config_content)
            .into_report()
            .change_context(ConfigError)
            .attach_printable("Config file is not valid JSON")?;
        *self = config;
        Ok(())
    }

    pub fn save_config_file(&self) -> ConfigResult<()> {
        let config_path = Self::get_config_file_path()?;
        let config_folder = Path::new(&config_path)
            .parent()
            .ok_or(ConfigError)
            .into_report()?
            .to_path_buf();
        if !config_folder.exists() {
            fs::create_dir_all(&config_folder)
                .into_report()
                .change_context(ConfigError)?;
        }
        let serialized = serde_json::to_string_pretty(self)
            .into_report()
            .change_context(ConfigError)?;
        fs::write(&config_path, serialized)
            .into_report()
            .change_context(ConfigError)
            .attach_printable(format!("Failed to write config file at: {}", config_path))?;
        Ok(())
    }

    pub fn config_file_exists() -> ConfigResult<bool> {
        let config_path = Self::get_config_file_path()?;
        Ok(Path::new(&config_path).exists())
    }

    pub fn get_config_file_path() -> ConfigResult<String> {
        let home_dir = dirs::home_dir().ok_or(ConfigError).into_report()?;
        let config_path = home_dir.join(".plex-porter").join("config.json");
        Ok(config_path.to_string_lossy().to_string())
    }

    pub fn generate_client_identifier() -> String {
        let mut rng = rand::thread_rng();
        (0..24)
            .map(|_| format!("{:x}", rng.gen_range(0..16)))
            .collect()
    }

    pub fn redacted(&self) -> Self {
        let mut redacted = self.clone();
        if !redacted.auth_token.is_empty() {
            redacted.auth_token = "<redacted>".to_string();
        }
        redacted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_identifier_is_24_hex_chars() {
        let identifier = PorterConfig::generate_client_identifier();
        assert_eq!(identifier.len(), 24);
        assert!(identifier.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_redacted_config_hides_the_token() {
        let config = PorterConfig {
            username: "someone".to_string(),
            auth_token: "secret-token".to_string(),
            client_identifier: "abc".to_string(),
        };
        assert_eq!(config.redacted().auth_token, "<redacted>");
        assert_eq!(config.redacted().username, "someone");
    }
}

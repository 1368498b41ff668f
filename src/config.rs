use crate::api::models::Platform;
use config::{Config, ConfigError, Environment, File};
use dirs_next::home_dir;
use std::fs;
use std::path::{Path, PathBuf};

pub struct Settings {
    pub api_base: String,
    pub client_id: String,
    pub webhook_url: String,
    pub credentials_dir: PathBuf,
    pub profile: String,
    pub default_platforms: Vec<Platform>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // 1) Which profile? default or prod
        let profile = std::env::var("CROSSPOST_ENV").unwrap_or_else(|_| "default".into());

        // 2) Path to ~/.crosspost/config.toml
        let mut path =
            home_dir().ok_or_else(|| ConfigError::Message("Could not find home dir".into()))?;
        path.push(".crosspost/config.toml");

        // 3) Create default config if it doesn't exist
        Self::ensure_default_config(&path)?;

        // 4) Load file + ENV
        let cfg = Config::builder()
            .add_source(File::with_name(path.to_str().unwrap()).required(false))
            .add_source(Environment::with_prefix("CROSSPOST").separator("__"))
            .build()?;

        // 5) Extract each setting under the chosen profile
        let api_base = cfg.get_string(&format!("{profile}.api_base"))?;
        let client_id = cfg.get_string(&format!("{profile}.client_id"))?;
        let webhook_url = cfg.get_string(&format!("{profile}.webhook_url"))?;
        let cred_dir_raw = cfg.get_string(&format!("{profile}.credentials_dir"))?;

        // 6) Expand leading '~' if present
        let credentials_dir = if let Some(path_without_tilde) = cred_dir_raw.strip_prefix("~/") {
            let mut home = home_dir().ok_or_else(|| {
                ConfigError::Message("Cannot expand '~' in credentials_dir".into())
            })?;
            home.push(path_without_tilde);
            home
        } else {
            PathBuf::from(cred_dir_raw)
        };

        // 7) Optional comma-separated platform defaults for `xpost post`
        let default_platforms = match cfg.get_string(&format!("{profile}.default_platforms")) {
            Ok(raw) if !raw.trim().is_empty() => parse_platform_list(&raw)?,
            _ => Vec::new(),
        };

        Ok(Settings {
            api_base,
            client_id,
            webhook_url,
            credentials_dir,
            profile,
            default_platforms,
        })
    }

    /// Where `connect` caches the account list for offline display.
    pub fn accounts_cache_path(&self) -> PathBuf {
        self.credentials_dir
            .join(&self.profile)
            .join("accounts.toml")
    }

    fn ensure_default_config(config_path: &Path) -> Result<(), ConfigError> {
        // Check if config file already exists
        if config_path.exists() {
            return Ok(());
        }

        // Create the directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        // Create default configuration content
        let default_config = r#"[default]
api_base = "https://api.crosspost.dev"
client_id = "kqTbCQXxVVmj3q8dNcWZ5A"
webhook_url = "https://hooks.crosspost.dev/webhook/publish-post"
credentials_dir = "~/.crosspost"
# Comma-separated platforms preselected by `xpost post`, e.g. "twitter,linkedin"
# default_platforms = ""
"#;

        // Write the default configuration
        fs::write(config_path, default_config).map_err(|e| {
            ConfigError::Message(format!("Failed to create default config file: {e}"))
        })?;

        Ok(())
    }
}

fn parse_platform_list(raw: &str) -> Result<Vec<Platform>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse::<Platform>()
                .map_err(|e| ConfigError::Message(format!("Invalid default_platforms entry: {e}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_platform_list() {
        let platforms = parse_platform_list("twitter, linkedin,reddit").unwrap();
        assert_eq!(
            platforms,
            vec![Platform::Twitter, Platform::Linkedin, Platform::Reddit]
        );
    }

    #[test]
    fn test_parse_platform_list_skips_empty_entries() {
        let platforms = parse_platform_list("twitter,,  ").unwrap();
        assert_eq!(platforms, vec![Platform::Twitter]);
    }

    #[test]
    fn test_parse_platform_list_rejects_unknown_names() {
        assert!(parse_platform_list("twitter,myspace").is_err());
    }
}

//! Syndicator configuration loaded from `~/.config/crosspost/config.toml`.
//!
//! ```toml
//! identifier = "alice.bsky.social"
//! profile_url = "https://bsky.app/profile"
//! service_url = "https://bsky.social"
//! include_permalink = true
//! syndicate_external_likes = false
//! syndicate_external_reposts = true
//! ```
//!
//! The password may be given in the file or, preferably, through the
//! `CROSSPOST_PASSWORD` environment variable, which wins.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::media::MAX_IMAGE_BYTES;

/// Environment variable overriding the configured password.
pub const PASSWORD_ENV: &str = "CROSSPOST_PASSWORD";

/// Syndicator settings, read once per call.
#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Account handle or DID.
    pub identifier: String,
    /// App password.
    pub password: String,
    /// Base of public profile URLs; posts live at
    /// `{profile_url}/{account}/post/{rkey}`.
    pub profile_url: String,
    /// Backend service endpoint.
    pub service_url: String,
    /// Append the permalink to regular posts.
    pub include_permalink: bool,
    /// Turn likes of outside URLs into link posts.
    pub syndicate_external_likes: bool,
    /// Turn reposts of outside URLs into link posts.
    pub syndicate_external_reposts: bool,
    /// Timeout for metadata and remote image fetches.
    pub fetch_timeout_secs: u64,
    /// Per-image upload budget.
    pub max_image_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            identifier: String::new(),
            password: String::new(),
            profile_url: "https://bsky.app/profile".to_string(),
            service_url: "https://bsky.social".to_string(),
            include_permalink: false,
            syndicate_external_likes: false,
            syndicate_external_reposts: false,
            fetch_timeout_secs: 10,
            max_image_bytes: MAX_IMAGE_BYTES,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("identifier", &self.identifier)
            .field("password", &if self.password.is_empty() { "" } else { "<redacted>" })
            .field("profile_url", &self.profile_url)
            .field("service_url", &self.service_url)
            .field("include_permalink", &self.include_permalink)
            .field("syndicate_external_likes", &self.syndicate_external_likes)
            .field("syndicate_external_reposts", &self.syndicate_external_reposts)
            .field("fetch_timeout_secs", &self.fetch_timeout_secs)
            .field("max_image_bytes", &self.max_image_bytes)
            .finish()
    }
}

impl Config {
    /// Load from the default path.
    ///
    /// A missing file yields the defaults; the environment override is
    /// applied either way.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load from `path`, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
            toml::from_str(&content)
                .map_err(|e| Error::Config(format!("invalid TOML in {}: {e}", path.display())))?
        } else {
            Self::default()
        };

        let config = config.with_password_override(std::env::var(PASSWORD_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::Config(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    fn with_password_override(mut self, password: Option<String>) -> Self {
        if let Some(password) = password.filter(|p| !p.is_empty()) {
            self.password = password;
        }
        self
    }

    /// Check URLs and limits.
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("profile_url", &self.profile_url),
            ("service_url", &self.service_url),
        ] {
            let parsed = url::Url::parse(value)
                .map_err(|e| Error::Config(format!("{field} {value:?} is not a URL: {e}")))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(Error::Config(format!("{field} must be http(s), got {value:?}")));
            }
        }
        if self.fetch_timeout_secs == 0 {
            return Err(Error::Config("fetch_timeout_secs must be positive".to_string()));
        }
        if self.max_image_bytes == 0 {
            return Err(Error::Config("max_image_bytes must be positive".to_string()));
        }
        Ok(())
    }

    /// Fail unless both identifier and password are set.
    pub fn require_credentials(&self) -> Result<()> {
        if self.identifier.is_empty() || self.password.is_empty() {
            return Err(Error::Config(format!(
                "identifier and password are required (set the password via {PASSWORD_ENV})"
            )));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Return the path to the config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("crosspost")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.profile_url, "https://bsky.app/profile");
        assert!(!config.include_permalink);
        assert!(!config.syndicate_external_likes);
        assert_eq!(config.max_image_bytes, MAX_IMAGE_BYTES);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn parses_all_flags() {
        let config = Config::from_toml_str(
            r#"
identifier = "alice.example"
password = "app-pass"
profile_url = "https://me.example"
include_permalink = true
syndicate_external_likes = true
syndicate_external_reposts = true
fetch_timeout_secs = 3
"#,
        )
        .unwrap();
        assert_eq!(config.identifier, "alice.example");
        assert!(config.include_permalink);
        assert!(config.syndicate_external_likes);
        assert!(config.syndicate_external_reposts);
        assert_eq!(config.fetch_timeout_secs, 3);
        assert!(config.require_credentials().is_ok());
    }

    #[test]
    fn rejects_unknown_keys_and_bad_urls() {
        assert!(Config::from_toml_str("includePermalink = true").is_err());
        assert!(Config::from_toml_str(r#"profile_url = "not a url""#).is_err());
        assert!(Config::from_toml_str(r#"service_url = "ftp://x.example""#).is_err());
        assert!(Config::from_toml_str("max_image_bytes = 0").is_err());
    }

    #[test]
    fn password_override_wins_when_set() {
        let config = Config::default().with_password_override(Some("from-env".to_string()));
        assert_eq!(config.password, "from-env");
        let config = config.with_password_override(Some(String::new()));
        assert_eq!(config.password, "from-env");
    }

    #[test]
    fn debug_redacts_password() {
        let config = Config {
            password: "secret".to_string(),
            ..Config::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn missing_credentials_are_reported() {
        assert!(matches!(
            Config::default().require_credentials(),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "include_permalink = true\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert!(config.include_permalink);

        let missing = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert!(!missing.include_permalink);
    }
}

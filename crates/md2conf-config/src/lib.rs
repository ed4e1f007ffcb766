//! Configuration management for md2conf.
//!
//! Connection settings come from three places, highest precedence first:
//!
//! 1. Command-line flags
//! 2. `CONFLUENCE_*` environment variables (resolved by the CLI parser)
//! 3. An optional `md2conf.toml` file, auto-discovered in the current
//!    directory and its parents
//!
//! CLI and environment values are applied on top of the loaded file via
//! [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String values in the `[confluence]` section support `${VAR}` and
//! `${VAR:-default}` expansion, so secrets can stay out of the file:
//!
//! ```toml
//! [confluence]
//! orgname = "acme"
//! username = "me@acme.com"
//! api_key = "${CONFLUENCE_API_KEY}"
//! ```

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "md2conf.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override Confluence username.
    pub username: Option<String>,
    /// Override Confluence API key.
    pub api_key: Option<String>,
    /// Override Confluence organisation name.
    pub orgname: Option<String>,
    /// Override full wiki URL.
    pub wiki_url: Option<String>,
    /// Force plain HTTP.
    pub nossl: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Confluence connection settings.
    pub confluence: ConfluenceConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Confluence connection settings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfluenceConfig {
    /// Account username (usually an email address for Confluence Cloud).
    pub username: Option<String>,
    /// API key / token used as the basic auth password.
    pub api_key: Option<String>,
    /// Organisation name (`acme` for `acme.atlassian.net`) or a fully
    /// qualified host when it contains a dot.
    pub orgname: Option<String>,
    /// Full wiki base URL. Takes precedence over `orgname`.
    pub url: Option<String>,
    /// Use HTTP instead of HTTPS.
    pub nossl: bool,
}

/// Resolved connection credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Wiki base URL without trailing slash (e.g. `https://acme.atlassian.net/wiki`).
    pub base_url: String,
    /// Basic auth username.
    pub username: String,
    /// Basic auth password (API key).
    pub api_key: String,
}

impl ConfluenceConfig {
    /// Resolve the wiki base URL.
    ///
    /// An explicit `url` wins. Otherwise an `orgname` containing a dot is
    /// treated as a host name (`https://{orgname}`), and a bare name as an
    /// Atlassian Cloud tenant (`https://{orgname}.atlassian.net/wiki`).
    /// With `nossl` the scheme is downgraded to `http://`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if neither URL nor orgname is set,
    /// or the URL does not use an http(s) scheme.
    pub fn base_url(&self) -> Result<String, ConfigError> {
        let url = if let Some(url) = non_empty(self.url.as_deref()) {
            require_http_url(url, "confluence.url")?;
            url.trim_end_matches('/').to_owned()
        } else if let Some(org) = non_empty(self.orgname.as_deref()) {
            let org = org.trim_end_matches('/');
            if org.contains('.') {
                format!("https://{org}")
            } else {
                format!("https://{org}.atlassian.net/wiki")
            }
        } else {
            return Err(ConfigError::Validation(
                "organisation not specified (use --orgname, --wikiurl, CONFLUENCE_ORGNAME or CONFLUENCE_URL)"
                    .to_owned(),
            ));
        };

        if self.nossl
            && let Some(rest) = url.strip_prefix("https://")
        {
            return Ok(format!("http://{rest}"));
        }
        Ok(url)
    }

    /// Resolve complete credentials.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` naming the first missing setting.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let username = non_empty(self.username.as_deref()).ok_or_else(|| {
            ConfigError::Validation(
                "username not specified (use --username or CONFLUENCE_USERNAME)".to_owned(),
            )
        })?;
        let api_key = non_empty(self.api_key.as_deref()).ok_or_else(|| {
            ConfigError::Validation(
                "API key not specified (use --apikey or CONFLUENCE_API_KEY)".to_owned(),
            )
        })?;

        Ok(Credentials {
            base_url: self.base_url()?,
            username: username.to_owned(),
            api_key: api_key.to_owned(),
        })
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`confluence.api_key`").
        field: String,
        /// Error message (e.g., "${`CONFLUENCE_API_KEY`} not set").
        message: String,
    },
}

/// Treat empty strings the same as unset values.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `md2conf.toml` in current directory and parents,
    /// falling back to an empty configuration.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        let confluence = &mut self.confluence;
        if let Some(username) = &settings.username {
            confluence.username = Some(username.clone());
        }
        if let Some(api_key) = &settings.api_key {
            confluence.api_key = Some(api_key.clone());
        }
        if let Some(orgname) = &settings.orgname {
            confluence.orgname = Some(orgname.clone());
        }
        if let Some(url) = &settings.wiki_url {
            confluence.url = Some(url.clone());
        }
        if let Some(nossl) = settings.nossl {
            confluence.nossl = nossl;
        }
    }

    /// Get validated connection credentials.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if username, API key or organisation
    /// cannot be resolved.
    pub fn require_credentials(&self) -> Result<Credentials, ConfigError> {
        self.confluence.credentials()
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Only values that are present are checked; missing credentials are
    /// reported later by [`Config::require_credentials`], after CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = non_empty(self.confluence.url.as_deref()) {
            require_http_url(url, "confluence.url")?;
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let confluence = &mut self.confluence;
        let fields = [
            (&mut confluence.username, "confluence.username"),
            (&mut confluence.api_key, "confluence.api_key"),
            (&mut confluence.orgname, "confluence.orgname"),
            (&mut confluence.url, "confluence.url"),
        ];
        for (value, field) in fields {
            if let Some(raw) = value.as_deref() {
                *value = Some(expand::expand_env(raw, field)?);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn org_config(orgname: &str) -> ConfluenceConfig {
        ConfluenceConfig {
            orgname: Some(orgname.to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.confluence.username.is_none());
        assert!(!config.confluence.nossl);
    }

    #[test]
    fn test_parse_confluence_config() {
        let toml = r#"
[confluence]
username = "me@acme.com"
api_key = "secret"
orgname = "acme"
nossl = true
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.confluence.username.as_deref(), Some("me@acme.com"));
        assert_eq!(config.confluence.api_key.as_deref(), Some("secret"));
        assert_eq!(config.confluence.orgname.as_deref(), Some("acme"));
        assert!(config.confluence.nossl);
    }

    #[test]
    fn test_base_url_from_bare_orgname() {
        assert_eq!(
            org_config("acme").base_url().unwrap(),
            "https://acme.atlassian.net/wiki"
        );
    }

    #[test]
    fn test_base_url_from_dotted_orgname() {
        assert_eq!(
            org_config("wiki.acme.com").base_url().unwrap(),
            "https://wiki.acme.com"
        );
    }

    #[test]
    fn test_base_url_nossl() {
        let config = ConfluenceConfig {
            nossl: true,
            ..org_config("acme")
        };
        assert_eq!(
            config.base_url().unwrap(),
            "http://acme.atlassian.net/wiki"
        );
    }

    #[test]
    fn test_base_url_explicit_url_wins() {
        let config = ConfluenceConfig {
            url: Some("https://confluence.internal/wiki/".to_owned()),
            ..org_config("acme")
        };
        assert_eq!(config.base_url().unwrap(), "https://confluence.internal/wiki");
    }

    #[test]
    fn test_base_url_rejects_non_http_url() {
        let config = ConfluenceConfig {
            url: Some("ftp://confluence.internal".to_owned()),
            ..Default::default()
        };
        let err = config.base_url().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn test_base_url_missing_org() {
        let err = ConfluenceConfig::default().base_url().unwrap_err();
        assert!(err.to_string().contains("organisation"));
    }

    #[test]
    fn test_credentials_complete() {
        let config = ConfluenceConfig {
            username: Some("me".to_owned()),
            api_key: Some("key".to_owned()),
            ..org_config("acme")
        };
        assert_eq!(
            config.credentials().unwrap(),
            Credentials {
                base_url: "https://acme.atlassian.net/wiki".to_owned(),
                username: "me".to_owned(),
                api_key: "key".to_owned(),
            }
        );
    }

    #[test]
    fn test_credentials_missing_username() {
        let config = ConfluenceConfig {
            api_key: Some("key".to_owned()),
            ..org_config("acme")
        };
        let err = config.credentials().unwrap_err();
        assert!(err.to_string().contains("username"));
    }

    #[test]
    fn test_credentials_empty_api_key_is_missing() {
        let config = ConfluenceConfig {
            username: Some("me".to_owned()),
            api_key: Some("  ".to_owned()),
            ..org_config("acme")
        };
        let err = config.credentials().unwrap_err();
        assert!(err.to_string().contains("API key"));
    }

    #[test]
    fn test_apply_cli_settings_overrides_file() {
        let toml = r#"
[confluence]
username = "file-user"
orgname = "file-org"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.apply_cli_settings(&CliSettings {
            username: Some("cli-user".to_owned()),
            api_key: Some("cli-key".to_owned()),
            nossl: Some(true),
            ..Default::default()
        });

        assert_eq!(config.confluence.username.as_deref(), Some("cli-user"));
        assert_eq!(config.confluence.api_key.as_deref(), Some("cli-key"));
        assert_eq!(config.confluence.orgname.as_deref(), Some("file-org"));
        assert!(config.confluence.nossl);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config: Config = toml::from_str("[confluence]\norgname = \"acme\"").unwrap();
        config.apply_cli_settings(&CliSettings::default());
        assert_eq!(config.confluence.orgname.as_deref(), Some("acme"));
        assert!(config.confluence.username.is_none());
    }

    #[test]
    fn test_expand_env_vars_confluence() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("MD2CONF_TEST_API_KEY", "expanded-key");
        }

        let toml = r#"
[confluence]
api_key = "${MD2CONF_TEST_API_KEY}"
orgname = "${MD2CONF_TEST_ORG_UNSET:-acme}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(config.confluence.api_key.as_deref(), Some("expanded-key"));
        assert_eq!(config.confluence.orgname.as_deref(), Some("acme"));

        unsafe {
            std::env::remove_var("MD2CONF_TEST_API_KEY");
        }
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(
            &path,
            "[confluence]\nusername = \"me\"\napi_key = \"k\"\norgname = \"acme\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
        assert_eq!(
            config.require_credentials().unwrap().base_url,
            "https://acme.atlassian.net/wiki"
        );
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/md2conf.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_rejects_invalid_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("md2conf.toml");
        std::fs::write(&path, "[confluence]\nurl = \"confluence.internal\"\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("confluence.url"));
    }
}

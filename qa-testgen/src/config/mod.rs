//! Configuration file loading.
//!
//! `config.toml` is optional. When present it may hold:
//!
//! ```toml
//! prompt-template = "prompt.hbs"   # relative to this file
//!
//! [llm]
//! provider = "anthropic"
//! model = "claude-3-5-sonnet-20241022"
//!
//! [context]
//! code-changes = 8000
//! section = 6000
//!
//! [[environments]]
//! name = "MAINSITE_URL"
//! url = "https://mainsite.qa.example.com"
//! repositories = ["mainsite"]
//! label = "Mainsite"
//! ```

mod error;

pub use error::ConfigError;

use crate::context::ContextLimits;
use crate::llm::LlmConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use url::Url;

/// Parsed `config.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AppConfig {
    /// Model provider settings.
    pub llm: Option<LlmConfig>,

    /// Context budgets.
    #[serde(default)]
    pub context: ContextLimits,

    /// QA environments rendered into the generation prompt.
    #[serde(default)]
    pub environments: Vec<QaEnvironment>,

    /// Custom prompt template, resolved against the config file's directory.
    pub prompt_template: Option<PathBuf>,
}

/// A QA environment and the repositories deployed to it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct QaEnvironment {
    /// Variable-style name, e.g. "LEADS_API_BASE_URL".
    pub name: String,
    pub url: String,
    /// Repository names (without owner) hosted in this environment.
    #[serde(default)]
    pub repositories: Vec<String>,
    /// Optional tag such as "Frontend" or "Backend".
    pub label: Option<String>,
}

impl AppConfig {
    /// Reads the custom prompt template, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::IoError`] if the template cannot be read.
    pub fn load_prompt_template(&self) -> Result<Option<String>, ConfigError> {
        let Some(path) = &self.prompt_template else {
            return Ok(None);
        };
        std::fs::read_to_string(path)
            .map(Some)
            .map_err(|source| ConfigError::IoError {
                path: path.display().to_string(),
                source,
            })
    }
}

/// Loads `config.toml`, returning defaults when the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file can't be read, isn't valid TOML, or
/// declares an environment without a usable name or URL.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "No config file, using defaults");
        return Ok(AppConfig::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
        path: path.display().to_string(),
        source,
    })?;
    let mut config: AppConfig =
        toml::from_str(&contents).map_err(|source| ConfigError::TomlError {
            path: path.display().to_string(),
            source,
        })?;

    validate(&config, path)?;

    if let Some(template) = config.prompt_template.take() {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.prompt_template = Some(base.join(template));
    }

    info!(
        path = %path.display(),
        llm = config.llm.is_some(),
        environments = config.environments.len(),
        "Loaded config"
    );
    Ok(config)
}

fn validate(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        path: path.display().to_string(),
        message,
    };

    for env in &config.environments {
        if env.name.trim().is_empty() {
            return Err(invalid("environment name must not be empty".to_string()));
        }
        if Url::parse(&env.url).is_err() {
            return Err(invalid(format!(
                "environment '{}' has an invalid url '{}'",
                env.name, env.url
            )));
        }
    }

    if config.context.code_changes == 0 || config.context.section == 0 {
        return Err(invalid("context budgets must be greater than zero".to_string()));
    }
    Ok(())
}

/// Ensures `url` ends with '/', so relative endpoint joins keep its path.
#[must_use]
pub(crate) fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(temp: &TempDir, contents: &str) -> PathBuf {
        let path = temp.path().join("config.toml");
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join("missing.toml")).unwrap();

        assert!(config.llm.is_none());
        assert!(config.environments.is_empty());
        assert_eq!(config.context, ContextLimits::default());
    }

    #[test]
    fn parses_environments_and_limits() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
[context]
section = 3000

[[environments]]
name = "LEADS_API_BASE_URL"
url = "https://leads-api.qa.example.com"
repositories = ["leads-api"]

[[environments]]
name = "FRONTEND_URL"
url = "https://qa.example.com/"
repositories = ["web", "web-next"]
label = "Frontend"
"#,
        );

        let config = load_config(&path).unwrap();

        assert_eq!(config.context.section, 3000);
        assert_eq!(config.context.code_changes, 8000);
        assert_eq!(config.environments.len(), 2);
        assert_eq!(config.environments[1].repositories, vec!["web", "web-next"]);
        assert_eq!(config.environments[1].label.as_deref(), Some("Frontend"));
    }

    #[test]
    fn prompt_template_resolves_next_to_config() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("prompt.hbs"), "{{context}}").unwrap();
        let path = write_config(&temp, "prompt-template = \"prompt.hbs\"\n");

        let config = load_config(&path).unwrap();

        assert_eq!(
            config.load_prompt_template().unwrap().as_deref(),
            Some("{{context}}")
        );
    }

    #[test]
    fn rejects_invalid_environment_url() {
        let temp = TempDir::new().unwrap();
        let path = write_config(
            &temp,
            r#"
[[environments]]
name = "BROKEN"
url = "not a url"
"#,
        );

        let error = load_config(&path).unwrap_err();
        assert!(matches!(error, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn reports_invalid_toml() {
        let temp = TempDir::new().unwrap();
        let path = write_config(&temp, "not = [valid");
        let error = load_config(&path).unwrap_err();
        assert!(matches!(error, ConfigError::TomlError { .. }));
    }

    #[test]
    fn appends_trailing_slash_once() {
        let url = Url::parse("https://acme.atlassian.net/wiki").unwrap();
        assert_eq!(
            with_trailing_slash(url).as_str(),
            "https://acme.atlassian.net/wiki/"
        );

        let url = Url::parse("https://acme.atlassian.net/").unwrap();
        assert_eq!(with_trailing_slash(url).as_str(), "https://acme.atlassian.net/");
    }
}

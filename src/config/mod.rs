#[cfg(feature = "cli")]
pub mod cli;

use crate::utils::error::{RepositoryError, Result};
use crate::utils::validation::{
    has_unresolved_placeholder, is_blank, validate_positive_number, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_DELIVERY_URL: &str = "https://cdn.contentful.com";
pub const DEFAULT_PREVIEW_URL: &str = "https://preview.contentful.com";
pub const DEFAULT_MANAGEMENT_URL: &str = "https://api.contentful.com";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

/// Settings as read from the environment or a file; every field may be absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentfulSettings {
    pub delivery_api_key: Option<String>,
    pub management_api_key: Option<String>,
    pub space_id: Option<String>,
    pub preview_api_key: Option<String>,
    pub environment: Option<String>,
    pub delivery_url: Option<String>,
    pub preview_url: Option<String>,
    pub management_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    /// Raw values that could not be parsed; reported by validation.
    #[serde(skip)]
    pub rejected: Vec<String>,
}

impl ContentfulSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from a variable lookup, e.g. `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut rejected = Vec::new();
        let timeout_seconds =
            lookup("CONTENTFUL_TIMEOUT_SECONDS").and_then(|raw| match raw.trim().parse() {
                Ok(seconds) => Some(seconds),
                Err(_) => {
                    rejected.push(format!("timeout_seconds: not a number: {}", raw));
                    None
                }
            });

        Self {
            delivery_api_key: lookup("DELIVERY_API_TOKEN"),
            management_api_key: lookup("MGMT_API_TOKEN"),
            space_id: lookup("SPACE_ID"),
            preview_api_key: lookup("PREVIEW_API_TOKEN"),
            environment: lookup("CONTENTFUL_ENVIRONMENT"),
            delivery_url: lookup("CONTENTFUL_DELIVERY_URL"),
            preview_url: lookup("CONTENTFUL_PREVIEW_URL"),
            management_url: lookup("CONTENTFUL_MANAGEMENT_URL"),
            timeout_seconds,
            rejected,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| RepositoryError::Config {
            missing: Vec::new(),
            invalid: vec![format!("{}: {}", path.as_ref().display(), e)],
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| RepositoryError::Config {
            missing: Vec::new(),
            invalid: vec![format!("TOML parsing error: {}", e)],
        })
    }

    /// Replaces `${VAR}` with the environment value, leaving unknown variables untouched.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").map_err(|e| RepositoryError::Config {
            missing: Vec::new(),
            invalid: vec![format!("placeholder pattern: {}", e)],
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    /// Values set here win over `self`.
    pub fn merge(self, overrides: ContentfulSettings) -> Self {
        let mut rejected = self.rejected;
        rejected.extend(overrides.rejected);
        Self {
            delivery_api_key: overrides.delivery_api_key.or(self.delivery_api_key),
            management_api_key: overrides.management_api_key.or(self.management_api_key),
            space_id: overrides.space_id.or(self.space_id),
            preview_api_key: overrides.preview_api_key.or(self.preview_api_key),
            environment: overrides.environment.or(self.environment),
            delivery_url: overrides.delivery_url.or(self.delivery_url),
            preview_url: overrides.preview_url.or(self.preview_url),
            management_url: overrides.management_url.or(self.management_url),
            timeout_seconds: overrides.timeout_seconds.or(self.timeout_seconds),
            rejected,
        }
    }

    /// Required settings that are absent, blank or still an unresolved `${VAR}`.
    fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("DELIVERY_API_TOKEN", self.delivery_api_key.as_deref()),
            ("MGMT_API_TOKEN", self.management_api_key.as_deref()),
            ("SPACE_ID", self.space_id.as_deref()),
            ("PREVIEW_API_TOKEN", self.preview_api_key.as_deref()),
            ("CONTENTFUL_ENVIRONMENT", self.environment.as_deref()),
        ]
        .into_iter()
        .filter(|(_, value)| is_blank(*value) || has_unresolved_placeholder(*value))
        .map(|(name, _)| name)
        .collect()
    }

    fn invalid_values(&self) -> Vec<String> {
        let urls = [
            ("delivery_url", self.delivery_url.as_deref()),
            ("preview_url", self.preview_url.as_deref()),
            ("management_url", self.management_url.as_deref()),
        ];
        let mut problems = self.rejected.clone();
        problems.extend(
            urls.into_iter()
                .filter_map(|(field, value)| value.and_then(|url| validate_url(field, url).err())),
        );
        if let Some(timeout) = self.timeout_seconds {
            problems.extend(validate_positive_number("timeout_seconds", timeout, 1).err());
        }
        problems
    }

    /// Validates every field at once and produces the explicit configuration.
    pub fn into_config(self) -> Result<ContentfulConfig> {
        self.validate()?;

        let required = |value: Option<String>| value.unwrap_or_default().trim().to_string();
        Ok(ContentfulConfig {
            delivery_api_key: required(self.delivery_api_key),
            management_api_key: required(self.management_api_key),
            space_id: required(self.space_id),
            preview_api_key: required(self.preview_api_key),
            environment: required(self.environment),
            delivery_url: trim_base(self.delivery_url, DEFAULT_DELIVERY_URL),
            preview_url: trim_base(self.preview_url, DEFAULT_PREVIEW_URL),
            management_url: trim_base(self.management_url, DEFAULT_MANAGEMENT_URL),
            timeout: Duration::from_secs(self.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)),
        })
    }
}

fn trim_base(value: Option<String>, default: &str) -> String {
    value
        .unwrap_or_else(|| default.to_string())
        .trim_end_matches('/')
        .to_string()
}

impl Validate for ContentfulSettings {
    fn validate(&self) -> Result<()> {
        let missing = self.missing_fields();
        let invalid = self.invalid_values();
        if missing.is_empty() && invalid.is_empty() {
            return Ok(());
        }
        Err(RepositoryError::Config { missing, invalid })
    }
}

/// Validated connection settings for the CMS.
#[derive(Clone, PartialEq, Eq)]
pub struct ContentfulConfig {
    pub delivery_api_key: String,
    pub management_api_key: String,
    pub space_id: String,
    pub preview_api_key: String,
    pub environment: String,
    pub delivery_url: String,
    pub preview_url: String,
    pub management_url: String,
    pub timeout: Duration,
}

impl fmt::Debug for ContentfulConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentfulConfig")
            .field("delivery_api_key", &"<redacted>")
            .field("management_api_key", &"<redacted>")
            .field("space_id", &self.space_id)
            .field("preview_api_key", &"<redacted>")
            .field("environment", &self.environment)
            .field("delivery_url", &self.delivery_url)
            .field("preview_url", &self.preview_url)
            .field("management_url", &self.management_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

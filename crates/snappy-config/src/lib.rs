//! Snappy configuration
//!
//! Reads sanoid.conf (or an equivalent TOML file) and resolves one flat
//! [`RetentionPolicy`] per dataset. Template inheritance is handled here so
//! the domain layer only ever sees finished policies.
//!
//! ```ini
//! [tank/home]
//!     use_template = production
//!     daily = 7
//!
//! [template_production]
//!     daily = 30
//!     weekly = 8
//!     monthly = 12
//!     yearly = 5
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod sanoid;

pub use error::{ConfigError, Result};

use snappy_domain::name::is_valid_prefix;
use snappy_domain::{RetentionPolicy, Tier, DEFAULT_PREFIX};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default location of the config file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/sanoid/sanoid.conf";

/// Section name prefix marking a template
pub const TEMPLATE_PREFIX: &str = "template_";

/// Key naming the template(s) a section inherits from
pub const USE_TEMPLATE: &str = "use_template";

/// Key holding the snapshot prefix
pub const PREFIX_KEY: &str = "snapshot_prefix";

/// Section name → key → raw value
pub type Sections = BTreeMap<String, BTreeMap<String, String>>;

/// A loaded configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    path: Option<PathBuf>,
    sections: Sections,
}

impl ConfigFile {
    /// Load a config file
    ///
    /// Files ending in `.toml` are read as TOML, everything else as sanoid.conf.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_toml = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
        let mut config = if is_toml {
            Self::from_toml_str(&text)?
        } else {
            Self::from_sanoid_str(&text)?
        };

        tracing::debug!(path = %path.display(), sections = config.sections.len(), "Loaded config");
        config.path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse sanoid.conf text
    pub fn from_sanoid_str(text: &str) -> Result<Self> {
        Ok(Self {
            path: None,
            sections: sanoid::parse(text)?,
        })
    }

    /// Parse TOML text
    ///
    /// Each top-level table is a section. Strings, integers and booleans are
    /// accepted as values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: toml::Table = toml::from_str(text)?;
        let mut sections = Sections::new();

        for (name, value) in table {
            let toml::Value::Table(entries) = value else {
                return Err(ConfigError::InvalidValue {
                    section: String::new(),
                    key: name,
                    value: "expected a table".to_string(),
                });
            };

            let mut section = BTreeMap::new();
            for (key, value) in entries {
                let raw = match value {
                    toml::Value::String(s) => s,
                    toml::Value::Integer(i) => i.to_string(),
                    toml::Value::Boolean(b) => b.to_string(),
                    other => {
                        return Err(ConfigError::InvalidValue {
                            section: name,
                            key,
                            value: other.to_string(),
                        })
                    }
                };
                section.insert(key, raw);
            }
            sections.insert(name, section);
        }

        Ok(Self { path: None, sections })
    }

    /// Path the config was loaded from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Dataset sections (everything that is not a template)
    pub fn datasets(&self) -> Vec<&str> {
        self.sections
            .keys()
            .filter(|name| !name.starts_with(TEMPLATE_PREFIX))
            .map(String::as_str)
            .collect()
    }

    /// Section merged with the templates it references
    ///
    /// `use_template = a, b` applies `template_a`, then `template_b`, then the
    /// section's own keys, later values winning.
    pub fn resolve(&self, dataset: &str) -> Result<BTreeMap<String, String>> {
        let section = self
            .sections
            .get(dataset)
            .ok_or_else(|| ConfigError::UnknownDataset(dataset.to_string()))?;

        let Some(templates) = section.get(USE_TEMPLATE) else {
            return Ok(section.clone());
        };

        let mut merged = BTreeMap::new();
        for template in templates.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let template_section = format!("{}{}", TEMPLATE_PREFIX, template);
            let entries = self
                .sections
                .get(&template_section)
                .ok_or_else(|| ConfigError::MissingTemplate {
                    template: template.to_string(),
                    section: dataset.to_string(),
                })?;
            merged.extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged.extend(section.iter().map(|(k, v)| (k.clone(), v.clone())));

        Ok(merged)
    }

    /// Retention policy for a dataset
    pub fn policy_for(&self, dataset: &str) -> Result<RetentionPolicy> {
        let resolved = self.resolve(dataset)?;

        let count = |tier: Tier| -> Result<u32> {
            match resolved.get(tier.as_str()) {
                None => Ok(0),
                Some(raw) => parse_count(raw).ok_or_else(|| ConfigError::InvalidValue {
                    section: dataset.to_string(),
                    key: tier.as_str().to_string(),
                    value: raw.clone(),
                }),
            }
        };

        let prefix = resolved
            .get(PREFIX_KEY)
            .map(|p| p.trim().to_string())
            .unwrap_or_else(|| DEFAULT_PREFIX.to_string());
        if !is_valid_prefix(&prefix) {
            return Err(ConfigError::InvalidPrefix(prefix));
        }

        for key in resolved.keys() {
            if !is_recognised(key) {
                tracing::debug!(dataset, key = %key, "Ignoring unsupported config key");
            }
        }

        Ok(RetentionPolicy {
            daily: count(Tier::Daily)?,
            weekly: count(Tier::Weekly)?,
            monthly: count(Tier::Monthly)?,
            yearly: count(Tier::Yearly)?,
            prefix,
        })
    }
}

/// Non-negative integer made of ASCII digits only
fn parse_count(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn is_recognised(key: &str) -> bool {
    key == PREFIX_KEY || key == USE_TEMPLATE || Tier::parse(key).is_some()
}

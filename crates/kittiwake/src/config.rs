//! Site configuration.
//!
//! A site is configured by a `config.toml` at its root:
//!
//! ```toml
//! base_url = "https://example.com"
//! title = "My Blog"
//! default_language = "en"
//! timezone = "America/New_York"
//! taxonomies = ["tags", "categories"]
//!
//! [build]
//! include_drafts = false
//! include_future = false
//!
//! [outputs]
//! formats = ["html", "rss", "json"]
//!
//! [outputs.kinds]
//! single = ["html", "json"]
//!
//! [languages.en]
//! name = "English"
//! weight = 1
//!
//! [[languages.en.menu.main]]
//! name = "Archive"
//! url = "/archive/"
//! weight = 5
//!
//! [[menu.main]]
//! name = "GitHub"
//! url = "https://github.com/example"
//! ```
//!
//! Unknown keys are rejected. The configuration is validated once when it is
//! parsed and is immutable afterwards.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_LANGUAGE: &str = "en";

/// The configuration for a site.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub title: Option<String>,
    pub default_language: String,

    /// The timezone used for dates that don't carry an offset.
    pub timezone: Tz,

    /// The taxonomy kinds to group content by, in order.
    pub taxonomies: Vec<String>,

    pub languages: BTreeMap<String, LanguageConfig>,

    /// Site-wide menus, shared by every language.
    pub menus: BTreeMap<String, Vec<MenuEntryConfig>>,

    pub outputs: OutputsConfig,
    pub build: BuildPolicy,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    base_url: String,
    title: Option<String>,
    #[serde(default = "default_language")]
    default_language: String,
    #[serde(default = "default_timezone")]
    timezone: String,
    #[serde(default)]
    taxonomies: Vec<String>,
    #[serde(default)]
    languages: BTreeMap<String, LanguageConfig>,
    #[serde(default)]
    menu: BTreeMap<String, Vec<MenuEntryConfig>>,
    #[serde(default)]
    outputs: OutputsConfig,
    #[serde(default)]
    build: BuildPolicy,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_timezone() -> String {
    "UTC".to_string()
}

/// The configuration for a single language.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LanguageConfig {
    /// The display name. Defaults to the language code.
    pub name: Option<String>,
    pub weight: i64,
    pub direction: TextDirection,

    /// Disabled languages are left out of the build, along with their content.
    pub disabled: bool,

    pub menu: BTreeMap<String, Vec<MenuEntryConfig>>,
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MenuEntryConfig {
    pub name: String,

    /// Either an absolute URL or a path relative to the language root.
    pub url: String,

    #[serde(default)]
    pub weight: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputsConfig {
    /// The output formats enabled for the build.
    ///
    /// These are also the formats emitted for the home page.
    pub formats: Vec<String>,

    /// Per page kind overrides, keyed by page kind.
    pub kinds: BTreeMap<String, Vec<String>>,
}

impl Default for OutputsConfig {
    fn default() -> Self {
        Self {
            formats: vec!["html".to_string(), "rss".to_string()],
            kinds: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildPolicy {
    pub include_drafts: bool,
    pub include_future: bool,
}

impl Config {
    /// Reads and validates the config at the given path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;

        Self::parse(&text)
    }

    /// Parses and validates the given TOML.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text)?;

        Url::parse(&raw.base_url).map_err(|source| ConfigError::InvalidBaseUrl {
            base_url: raw.base_url.clone(),
            source,
        })?;

        let timezone = raw
            .timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone {
                timezone: raw.timezone.clone(),
            })?;

        let mut languages = raw.languages;
        if languages.is_empty() {
            languages.insert(raw.default_language.clone(), LanguageConfig::default());
        }

        match languages.get(&raw.default_language) {
            Some(language) if language.disabled => {
                return Err(ConfigError::DisabledDefaultLanguage {
                    code: raw.default_language,
                })
            }
            Some(_) => {}
            None => {
                return Err(ConfigError::UnknownDefaultLanguage {
                    code: raw.default_language,
                })
            }
        }

        Ok(Self {
            base_url: raw.base_url,
            title: raw.title,
            default_language: raw.default_language,
            timezone,
            taxonomies: raw.taxonomies,
            languages,
            menus: raw.menu,
            outputs: raw.outputs,
            build: raw.build,
        })
    }

    pub fn is_default_language(&self, code: &str) -> bool {
        self.default_language == code
    }

    /// Returns whether the given language is configured and disabled.
    pub fn is_language_disabled(&self, code: &str) -> bool {
        self.languages
            .get(code)
            .map_or(false, |language| language.disabled)
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_minimal_config() {
        let config = Config::parse(r#"base_url = "https://example.com""#).unwrap();

        assert_eq!(config.default_language, "en");
        assert_eq!(config.timezone, Tz::UTC);
        assert_eq!(
            config.languages.keys().collect::<Vec<_>>(),
            vec!["en"],
            "the default language is synthesized"
        );
        assert_eq!(config.outputs.formats, vec!["html", "rss"]);
        assert_eq!(config.build, BuildPolicy::default());
    }

    #[test]
    fn test_full_config() {
        let config = Config::parse(indoc! {r#"
            base_url = "https://example.com"
            title = "Notes"
            default_language = "en"
            timezone = "Europe/Paris"
            taxonomies = ["tags", "series"]

            [build]
            include_drafts = true

            [outputs]
            formats = ["html", "rss", "json"]

            [outputs.kinds]
            single = ["html", "json"]

            [languages.en]
            name = "English"
            weight = 1

            [[languages.en.menu.main]]
            name = "Archive"
            url = "/archive/"
            weight = 5

            [languages.ar]
            name = "العربية"
            weight = 2
            direction = "rtl"
            disabled = true

            [[menu.main]]
            name = "GitHub"
            url = "https://github.com/example"
        "#})
        .unwrap();

        assert_eq!(config.title.as_deref(), Some("Notes"));
        assert_eq!(config.timezone, Tz::Europe__Paris);
        assert_eq!(config.taxonomies, vec!["tags", "series"]);
        assert!(config.build.include_drafts);
        assert!(!config.build.include_future);
        assert_eq!(
            config.outputs.kinds.get("single"),
            Some(&vec!["html".to_string(), "json".to_string()])
        );

        let arabic = &config.languages["ar"];
        assert_eq!(arabic.direction, TextDirection::Rtl);
        assert!(config.is_language_disabled("ar"));
        assert!(!config.is_language_disabled("en"));

        assert_eq!(
            config.languages["en"].menu["main"],
            vec![MenuEntryConfig {
                name: "Archive".to_string(),
                url: "/archive/".to_string(),
                weight: 5
            }]
        );
        assert_eq!(config.menus["main"][0].weight, 0);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = Config::parse(indoc! {r#"
            base_url = "https://example.com"
            base_ulr = "https://example.org"
        "#});

        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = Config::parse(r#"base_url = "example.com""#).unwrap_err();

        assert_snapshot!(err.to_string(), @"invalid `base_url` 'example.com': relative URL without a base");
    }

    #[test]
    fn test_invalid_timezone() {
        let err = Config::parse(indoc! {r#"
            base_url = "https://example.com"
            timezone = "Mars/Olympus_Mons"
        "#})
        .unwrap_err();

        assert_snapshot!(err.to_string(), @"invalid `timezone` 'Mars/Olympus_Mons'");
    }

    #[test]
    fn test_default_language_must_be_configured() {
        let err = Config::parse(indoc! {r#"
            base_url = "https://example.com"
            default_language = "de"

            [languages.en]
            name = "English"
        "#})
        .unwrap_err();

        assert_snapshot!(err.to_string(), @"`default_language` 'de' is not listed under `languages`");
    }

    #[test]
    fn test_default_language_cannot_be_disabled() {
        let err = Config::parse(indoc! {r#"
            base_url = "https://example.com"

            [languages.en]
            disabled = true
        "#})
        .unwrap_err();

        assert!(matches!(err, ConfigError::DisabledDefaultLanguage { code } if code == "en"));
    }
}

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

static TOML_REGEX: OnceLock<Regex> = OnceLock::new();
static YAML_REGEX: OnceLock<Regex> = OnceLock::new();

fn toml_regex() -> &'static Regex {
    TOML_REGEX.get_or_init(|| {
        let pattern = r"^[[:space:]]*\+\+\+(\r?\n(?s).*?(?-s))\+\+\+[[:space:]]*(?:$|(?:\r?\n((?s).*(?-s))$))";
        Regex::new(pattern).expect("failed to compile regex for TOML front matter")
    })
}

fn yaml_regex() -> &'static Regex {
    YAML_REGEX.get_or_init(|| {
        let pattern = r"^[[:space:]]*---(\r?\n(?s).*?(?-s))---[[:space:]]*(?:$|(?:\r?\n((?s).*(?-s))$))";
        Regex::new(pattern).expect("failed to compile regex for YAML front matter")
    })
}

#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("no front matter block found")]
    Missing,

    #[error("{0}")]
    Toml(#[from] toml::de::Error),

    #[error("{0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Splits `content` into its parsed front matter and the remaining body.
///
/// Front matter is either TOML fenced by `+++` or YAML fenced by `---`.
pub fn parse_front_matter<T>(content: &str) -> Result<(T, &str), FrontMatterError>
where
    T: serde::de::DeserializeOwned,
{
    if let Some(captures) = toml_regex().captures(content) {
        let front_matter = captures.get(1).map_or("", |m| m.as_str());
        let body = captures.get(2).map_or("", |m| m.as_str());

        return Ok((toml::from_str(front_matter)?, body));
    }

    if let Some(captures) = yaml_regex().captures(content) {
        let front_matter = captures.get(1).map_or("", |m| m.as_str());
        let body = captures.get(2).map_or("", |m| m.as_str());

        return Ok((serde_yaml::from_str(front_matter)?, body));
    }

    Err(FrontMatterError::Missing)
}

/// The front matter of a content item.
///
/// Everything is optional at this layer so that missing required fields can be
/// reported by name. Keys not listed here are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ItemFrontMatter {
    pub title: Option<String>,

    #[serde(deserialize_with = "from_toml_datetime")]
    pub date: Option<String>,

    #[serde(deserialize_with = "from_toml_datetime")]
    pub updated: Option<String>,

    pub draft: bool,
    pub lang: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,

    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub series: Vec<String>,

    /// Terms for any other taxonomy kinds, keyed by kind.
    pub taxonomies: BTreeMap<String, Vec<String>>,
}

impl ItemFrontMatter {
    /// Returns all of the declared terms, keyed by taxonomy kind.
    pub fn into_terms(self) -> BTreeMap<String, Vec<String>> {
        let mut terms = self.taxonomies;

        for (kind, declared) in [
            ("tags", self.tags),
            ("categories", self.categories),
            ("series", self.series),
        ] {
            if !declared.is_empty() {
                terms.entry(kind.to_string()).or_default().extend(declared);
            }
        }

        terms.retain(|_, declared| !declared.is_empty());
        terms
    }
}

pub fn from_toml_datetime<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use std::str::FromStr;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum DatetimeOrString {
        Datetime(toml::value::Datetime),
        String(String),
    }

    match Option::<DatetimeOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(DatetimeOrString::Datetime(datetime)) => Ok(Some(datetime.to_string())),
        // Strings TOML can't read as a datetime (e.g., `2024-01-02 10:00:00 +0200`
        // from YAML) are passed through as written and validated by the item.
        Some(DatetimeOrString::String(string)) => {
            let string = string.trim();
            match toml::value::Datetime::from_str(string) {
                Ok(datetime) => Ok(Some(datetime.to_string())),
                Err(_) => Ok(Some(string.to_string())),
            }
        }
    }
}

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use derive_more::Deref;
use log::info;
use serde::Serialize;

use crate::config::OutputsConfig;
use crate::error::ConfigError;

/// A kind of artifact a page can be emitted as.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// A hypertext page.
    Html,

    /// A syndication feed.
    Rss,

    /// A structured-data index.
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Rss => "rss",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "rss" => Ok(Self::Rss),
            "json" => Ok(Self::Json),
            _ => Err(()),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A logical kind of page.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Home,
    List,
    Single,
    TaxonomyTerm,
}

impl PageKind {
    pub const ALL: [PageKind; 4] = [
        PageKind::Home,
        PageKind::List,
        PageKind::Single,
        PageKind::TaxonomyTerm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::List => "list",
            Self::Single => "single",
            Self::TaxonomyTerm => "taxonomy_term",
        }
    }
}

impl FromStr for PageKind {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or(())
    }
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The output formats for each page kind.
#[derive(Debug, Clone, PartialEq, Eq, Deref, Serialize)]
#[serde(transparent)]
pub struct OutputTargets(BTreeMap<PageKind, Vec<OutputFormat>>);

impl OutputTargets {
    pub fn formats_for(&self, kind: PageKind) -> Option<&[OutputFormat]> {
        self.0.get(&kind).map(Vec::as_slice)
    }
}

/// Resolves the output formats for every page kind.
///
/// `outputs.formats` is the set of formats enabled for the build, and is what
/// the home page is emitted as. HTML is always enabled. List and taxonomy term
/// pages default to HTML plus RSS (when enabled), and single pages to HTML.
pub fn resolve_output_targets(outputs: &OutputsConfig) -> Result<OutputTargets, ConfigError> {
    const FORMATS_KEY: &str = "outputs.formats";

    if outputs.formats.is_empty() {
        return Err(ConfigError::NoOutputFormats {
            key: FORMATS_KEY.to_string(),
        });
    }

    let mut enabled = parse_formats(FORMATS_KEY, &outputs.formats)?;
    enabled.insert(OutputFormat::Html);

    let feed_or_page = |kind: PageKind| {
        let mut formats = BTreeSet::from([OutputFormat::Html]);
        if enabled.contains(&OutputFormat::Rss) {
            formats.insert(OutputFormat::Rss);
        }

        (kind, formats)
    };

    let mut targets = BTreeMap::from([
        (PageKind::Home, enabled.clone()),
        feed_or_page(PageKind::List),
        (PageKind::Single, BTreeSet::from([OutputFormat::Html])),
        feed_or_page(PageKind::TaxonomyTerm),
    ]);

    for (kind_name, formats) in &outputs.kinds {
        let key = format!("outputs.kinds.{kind_name}");
        let kind = kind_name
            .parse::<PageKind>()
            .map_err(|_| ConfigError::UnknownPageKind { key: key.clone() })?;

        if formats.is_empty() {
            return Err(ConfigError::NoOutputFormats { key });
        }

        let formats = parse_formats(&key, formats)?;
        if let Some(format) = formats.iter().find(|format| !enabled.contains(format)) {
            return Err(ConfigError::OutputFormatNotEnabled {
                key,
                format: format.to_string(),
            });
        }

        targets.insert(kind, formats);
    }

    info!(
        "enabled output formats: {}",
        enabled
            .iter()
            .map(OutputFormat::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(OutputTargets(
        targets
            .into_iter()
            .map(|(kind, formats)| (kind, formats.into_iter().collect()))
            .collect(),
    ))
}

fn parse_formats(key: &str, formats: &[String]) -> Result<BTreeSet<OutputFormat>, ConfigError> {
    formats
        .iter()
        .map(|format| {
            format
                .parse::<OutputFormat>()
                .map_err(|_| ConfigError::UnknownOutputFormat {
                    key: key.to_string(),
                    format: format.clone(),
                })
        })
        .collect()
}

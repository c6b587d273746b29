use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use log::debug;
use serde::Serialize;

use crate::config::Config;
use crate::content::{parse_front_matter, FileInfo, FrontMatterError, ItemFrontMatter};
use crate::date::parse_date;
use crate::error::ContentError;

/// A single piece of content (e.g., a blog post).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentItem {
    pub file: FileInfo,
    pub path: ItemPath,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub date: DateTime<FixedOffset>,
    pub updated: Option<DateTime<FixedOffset>>,
    pub draft: bool,
    pub language: String,

    /// The terms declared for each taxonomy kind, as written.
    pub taxonomies: BTreeMap<String, Vec<String>>,

    #[serde(skip)]
    pub raw_content: String,
}

/// The URL path of a content item, relative to its language root.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Serialize)]
#[serde(transparent)]
pub struct ItemPath(pub(crate) String);

impl fmt::Display for ItemPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ItemPath {
    pub fn new(file: &FileInfo, slug: &str) -> Self {
        if file.components.is_empty() {
            Self(format!("/{slug}"))
        } else {
            Self(format!("/{}/{slug}", file.components.join("/")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ContentItem {
    /// Parses a content item from its source text.
    ///
    /// The language is taken from the front matter, then `discovered_language`,
    /// then the site's default language. A discovered language that isn't
    /// configured is treated as part of the file name instead.
    pub fn parse(
        text: &str,
        file: FileInfo,
        discovered_language: Option<&str>,
        config: &Config,
    ) -> Result<Self, ContentError> {
        let malformed = |reason: String| ContentError::MalformedFrontMatter {
            path: file.path.clone(),
            reason,
        };

        let (front_matter, content) = parse_front_matter::<ItemFrontMatter>(text)
            .map_err(|err: FrontMatterError| malformed(err.to_string()))?;

        let title = front_matter
            .title
            .clone()
            .map(|title| title.trim().to_string())
            .filter(|title| !title.is_empty())
            .ok_or_else(|| malformed("missing required field `title`".to_string()))?;

        let date = match front_matter.date.as_deref() {
            Some(date) => parse_date(date, config.timezone)
                .ok_or_else(|| malformed(format!("unparsable `date` '{date}'")))?,
            None => return Err(malformed("missing required field `date`".to_string())),
        };

        let updated = match front_matter.updated.as_deref() {
            Some(updated) => Some(
                parse_date(updated, config.timezone)
                    .ok_or_else(|| malformed(format!("unparsable `updated` '{updated}'")))?,
            ),
            None => None,
        };

        // A suffix that isn't a configured language is part of the name
        // (e.g., `notes.old.md`).
        let (discovered_language, name) = match discovered_language {
            Some(code) if config.languages.contains_key(code) => (Some(code), file.name.clone()),
            Some(suffix) => {
                debug!(
                    "treating `.{suffix}` in '{}' as part of the name",
                    file.path.display()
                );
                (None, format!("{}.{suffix}", file.name))
            }
            None => (None, file.name.clone()),
        };

        let language = front_matter
            .lang
            .clone()
            .or_else(|| discovered_language.map(ToOwned::to_owned))
            .unwrap_or_else(|| config.default_language.clone());

        let slug = front_matter
            .slug
            .clone()
            .unwrap_or_else(|| slug::slugify(&name));

        let path = ItemPath::new(&file, &slug);
        let draft = front_matter.draft;
        let description = front_matter.description.clone();

        Ok(Self {
            file,
            path,
            slug,
            title,
            description,
            date,
            updated,
            draft,
            language,
            taxonomies: front_matter.into_terms(),
            raw_content: content.to_string(),
        })
    }

    /// Returns the terms this item declares for the given taxonomy kind.
    pub fn terms(&self, kind: &str) -> &[String] {
        self.taxonomies
            .get(kind)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

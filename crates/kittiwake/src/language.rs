use std::collections::{BTreeMap, HashSet};

use log::{debug, info};
use serde::Serialize;
use url::Url;

use crate::config::{Config, MenuEntryConfig, TextDirection};
use crate::content::ContentItem;
use crate::error::ConfigError;
use crate::permalink::Permalink;

/// A language that is part of the build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLanguage {
    pub code: String,
    pub name: String,
    pub weight: i64,
    pub direction: TextDirection,
    pub is_default: bool,

    /// The permalink of the language's home page.
    pub permalink: Permalink,

    /// The language's menus, keyed by menu name.
    pub menus: BTreeMap<String, Vec<MenuEntry>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuEntry {
    pub name: String,

    /// The URL as it was configured.
    pub url: String,

    /// The absolute URL the entry links to.
    pub permalink: Permalink,

    pub weight: i64,
}

/// Resolves the languages of the build, along with their menus.
///
/// Languages are ordered by weight, then by code. Every enabled language is
/// included, whether or not it has any content.
pub fn resolve_languages(
    config: &Config,
    items: &[ContentItem],
) -> Result<Vec<ResolvedLanguage>, ConfigError> {
    for item in items {
        if !config.languages.contains_key(&item.language) {
            return Err(ConfigError::UnknownLanguage {
                path: item.file.path.clone(),
                code: item.language.clone(),
            });
        }
    }

    let mut languages = config
        .languages
        .iter()
        .filter(|(code, language)| {
            if language.disabled {
                debug!("leaving out disabled language `{code}`");
            }

            !language.disabled
        })
        .collect::<Vec<_>>();

    languages.sort_by(|(a_code, a), (b_code, b)| {
        a.weight.cmp(&b.weight).then_with(|| a_code.cmp(b_code))
    });

    let languages = languages
        .into_iter()
        .map(|(code, language)| {
            let permalink = Permalink::from_path(config, code, "/").map_err(|source| {
                ConfigError::InvalidBaseUrl {
                    base_url: config.base_url.clone(),
                    source,
                }
            })?;

            Ok(ResolvedLanguage {
                code: code.clone(),
                name: language.name.clone().unwrap_or_else(|| code.clone()),
                weight: language.weight,
                direction: language.direction,
                is_default: config.is_default_language(code),
                permalink,
                menus: resolve_menus(config, code)?,
            })
        })
        .collect::<Result<Vec<_>, ConfigError>>()?;

    info!(
        "resolved languages: {}",
        languages
            .iter()
            .map(|language| language.code.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    Ok(languages)
}

/// Resolves the menus for a single language.
///
/// A language's own menu replaces a site-wide menu with the same name.
fn resolve_menus(
    config: &Config,
    code: &str,
) -> Result<BTreeMap<String, Vec<MenuEntry>>, ConfigError> {
    let own_menus = config
        .languages
        .get(code)
        .map(|language| &language.menu);

    let mut menus = BTreeMap::new();

    for (name, entries) in &config.menus {
        if own_menus.map_or(false, |own_menus| own_menus.contains_key(name)) {
            continue;
        }

        menus.insert(
            name.clone(),
            resolve_menu(config, code, &format!("menu.{name}"), entries)?,
        );
    }

    for (name, entries) in own_menus.into_iter().flatten() {
        menus.insert(
            name.clone(),
            resolve_menu(
                config,
                code,
                &format!("languages.{code}.menu.{name}"),
                entries,
            )?,
        );
    }

    Ok(menus)
}

fn resolve_menu(
    config: &Config,
    code: &str,
    key: &str,
    entries: &[MenuEntryConfig],
) -> Result<Vec<MenuEntry>, ConfigError> {
    let mut seen = HashSet::new();
    let mut menu = Vec::with_capacity(entries.len());

    for entry in entries {
        if !seen.insert((entry.name.as_str(), entry.url.as_str())) {
            return Err(ConfigError::DuplicateMenuEntry {
                key: key.to_string(),
                name: entry.name.clone(),
                url: entry.url.clone(),
            });
        }

        let invalid_url = |source: url::ParseError| ConfigError::InvalidMenuUrl {
            key: key.to_string(),
            url: entry.url.clone(),
            source,
        };

        let permalink = match Url::parse(&entry.url) {
            Ok(url) => Permalink::from(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Permalink::from_link(config, code, &entry.url).map_err(invalid_url)?
            }
            Err(err) => return Err(invalid_url(err)),
        };

        menu.push(MenuEntry {
            name: entry.name.clone(),
            url: entry.url.clone(),
            permalink,
            weight: entry.weight,
        });
    }

    // `sort_by_key` is stable, so entries with the same weight keep their
    // declaration order.
    menu.sort_by_key(|entry| entry.weight);

    Ok(menu)
}

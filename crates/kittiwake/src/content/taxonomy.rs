use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::PathBuf;
use std::sync::OnceLock;

use derive_more::Deref;
use indexmap::IndexMap;
use log::{debug, info};
use regex::Regex;
use serde::Serialize;

use crate::content::ContentItem;
use crate::error::ConfigError;

static TAXONOMY_NAME_REGEX: OnceLock<Regex> = OnceLock::new();

fn taxonomy_name_regex() -> &'static Regex {
    TAXONOMY_NAME_REGEX.get_or_init(|| {
        Regex::new(r"^[a-z0-9_-]+$").expect("failed to compile regex for taxonomy names")
    })
}

/// A taxonomy (e.g., tags) and its terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Taxonomy {
    pub name: String,
    pub terms: BTreeMap<String, TaxonomyTerm>,
}

/// A taxonomy term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomyTerm {
    /// The normalized term name.
    pub name: String,
    pub slug: String,

    /// The items declaring this term, in content order.
    pub items: Vec<PathBuf>,
}

/// The resolved taxonomies, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref, Serialize)]
#[serde(transparent)]
pub struct Taxonomies(IndexMap<String, Taxonomy>);

/// Normalizes a term so that `Python`, `python`, and ` PYTHON ` are the same
/// term.
///
/// Returns `None` for blank terms.
pub fn normalize_term(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }

    Some(term.to_lowercase())
}

/// Groups the given items into the configured taxonomies.
pub fn resolve_taxonomies(
    kinds: &[String],
    items: &[ContentItem],
) -> Result<Taxonomies, ConfigError> {
    validate_kinds(kinds)?;

    let mut taxonomies = IndexMap::with_capacity(kinds.len());

    for kind in kinds {
        let mut terms: BTreeMap<String, TaxonomyTerm> = BTreeMap::new();

        for item in items {
            let declared = item
                .terms(kind)
                .iter()
                .filter_map(|term| normalize_term(term))
                .collect::<BTreeSet<_>>();

            for name in declared {
                terms
                    .entry(name.clone())
                    .or_insert_with(|| TaxonomyTerm {
                        slug: slug::slugify(&name),
                        name,
                        items: Vec::new(),
                    })
                    .items
                    .push(item.file.path.clone());
            }
        }

        debug!("taxonomy `{kind}` has {} terms", terms.len());

        taxonomies.insert(
            kind.clone(),
            Taxonomy {
                name: kind.clone(),
                terms,
            },
        );
    }

    for item in items {
        for kind in item.taxonomies.keys() {
            if !taxonomies.contains_key(kind) {
                debug!(
                    "ignoring unconfigured taxonomy `{kind}` in '{}'",
                    item.file.path.display()
                );
            }
        }
    }

    info!("resolved {} taxonomies", taxonomies.len());

    Ok(Taxonomies(taxonomies))
}

fn validate_kinds(kinds: &[String]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for kind in kinds {
        let invalid = |reason: &str| ConfigError::UnknownTaxonomy {
            key: format!("taxonomies.{kind}"),
            reason: reason.to_string(),
        };

        if kind.is_empty() {
            return Err(invalid("taxonomy names cannot be empty"));
        }

        if !taxonomy_name_regex().is_match(kind) {
            return Err(invalid(
                "taxonomy names may only contain lowercase letters, digits, `-`, and `_`",
            ));
        }

        if !seen.insert(kind.as_str()) {
            return Err(invalid("taxonomy is listed more than once"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    use crate::config::Config;
    use crate::content::FileInfo;

    use super::*;

    fn make_item(filepath: &str, date: &str, front_matter: &str) -> ContentItem {
        let config = Config::parse(r#"base_url = "https://example.com""#).unwrap();
        let text = format!("+++\ntitle = \"Item\"\ndate = {date}\n{front_matter}\n+++\n");

        ContentItem::parse(&text, FileInfo::new("content", filepath), None, &config).unwrap()
    }

    fn kinds(kinds: &[&str]) -> Vec<String> {
        kinds.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_terms_are_normalized() {
        let items = vec![make_item(
            "content/posts/python.md",
            "2024-01-01",
            r#"tags = ["Python", "python", " PYTHON "]"#,
        )];

        let taxonomies = resolve_taxonomies(&kinds(&["tags"]), &items).unwrap();

        let tags = &taxonomies["tags"];
        assert_eq!(tags.terms.len(), 1);
        assert_eq!(
            tags.terms["python"],
            TaxonomyTerm {
                name: "python".to_string(),
                slug: "python".to_string(),
                items: vec![PathBuf::from("content/posts/python.md")],
            }
        );
    }

    #[test]
    fn test_grouping() {
        let items = vec![
            make_item(
                "content/posts/b.md",
                "2024-02-01",
                r#"tags = ["Rust", "Static Sites"]
                categories = ["code"]"#,
            ),
            make_item("content/posts/a.md", "2024-01-01", r#"tags = ["rust", ""]"#),
            make_item("content/posts/untagged.md", "2023-01-01", ""),
        ];

        let taxonomies = resolve_taxonomies(&kinds(&["tags", "categories"]), &items).unwrap();

        assert_eq!(
            taxonomies.keys().collect::<Vec<_>>(),
            vec!["tags", "categories"],
            "taxonomies keep configuration order"
        );

        let tags = &taxonomies["tags"];
        assert_eq!(
            tags.terms.keys().collect::<Vec<_>>(),
            vec!["rust", "static sites"]
        );
        assert_eq!(
            tags.terms["rust"].items,
            vec![
                PathBuf::from("content/posts/b.md"),
                PathBuf::from("content/posts/a.md"),
            ]
        );
        assert_eq!(tags.terms["static sites"].slug, "static-sites");

        let categories = &taxonomies["categories"];
        assert_eq!(
            categories.terms["code"].items,
            vec![PathBuf::from("content/posts/b.md")]
        );
    }

    #[test]
    fn test_unconfigured_taxonomies_are_ignored() {
        let items = vec![make_item(
            "content/posts/a.md",
            "2024-01-01",
            r#"series = ["Intro"]"#,
        )];

        let taxonomies = resolve_taxonomies(&kinds(&["tags"]), &items).unwrap();

        assert_eq!(taxonomies.len(), 1);
        assert!(taxonomies["tags"].terms.is_empty());
    }

    #[test]
    fn test_invalid_taxonomy_names() {
        let err = resolve_taxonomies(&kinds(&["Tags"]), &[]).unwrap_err();
        assert_snapshot!(err.to_string(), @"invalid taxonomy `taxonomies.Tags`: taxonomy names may only contain lowercase letters, digits, `-`, and `_`");

        let err = resolve_taxonomies(&kinds(&["tags", "tags"]), &[]).unwrap_err();
        assert_snapshot!(err.to_string(), @"invalid taxonomy `taxonomies.tags`: taxonomy is listed more than once");

        let err = resolve_taxonomies(&kinds(&[""]), &[]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownTaxonomy { .. }));
    }
}

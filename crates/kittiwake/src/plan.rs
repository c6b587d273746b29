use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};

use log::info;
use serde::Serialize;

use crate::config::Config;
use crate::content::{ContentItem, Taxonomies};
use crate::error::AssemblyError;
use crate::language::ResolvedLanguage;
use crate::output::{OutputFormat, OutputTargets, PageKind};
use crate::permalink::Permalink;

/// The resolved description of everything a build must render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildPlan {
    /// The site title, if one is configured.
    pub title: Option<String>,

    pub languages: Vec<ResolvedLanguage>,
    pub taxonomies: Taxonomies,
    pub output_targets: OutputTargets,
    pub pages: Vec<PlannedPage>,

    /// Every item in the build, newest first.
    pub content_index: Vec<ContentItem>,
}

/// A page to be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedPage {
    pub kind: PageKind,
    pub language: String,
    pub permalink: Permalink,
    pub subject: PageSubject,
    pub output_formats: Vec<OutputFormat>,
}

/// What a page is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PageSubject {
    Home,
    List { section: String },
    Single { path: PathBuf },
    TaxonomyTerm { taxonomy: String, term: String },
}

impl fmt::Display for PageSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => write!(f, "home page"),
            Self::List { section } => write!(f, "section `{section}`"),
            Self::Single { path } => write!(f, "'{}'", path.display()),
            Self::TaxonomyTerm { taxonomy, term } => {
                write!(f, "term '{term}' in taxonomy `{taxonomy}`")
            }
        }
    }
}

impl BuildPlan {
    /// Returns the content item at the given path.
    pub fn item(&self, path: impl AsRef<Path>) -> Option<&ContentItem> {
        let path = path.as_ref();
        self.content_index.iter().find(|item| item.file.path == path)
    }

    pub fn language(&self, code: &str) -> Option<&ResolvedLanguage> {
        self.languages.iter().find(|language| language.code == code)
    }

    /// Returns the pages planned for the given language.
    pub fn pages_for<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a PlannedPage> + 'a {
        self.pages.iter().filter(move |page| page.language == code)
    }
}

/// Composes the output of each resolver into a [`BuildPlan`].
///
/// Fails if the resolved parts don't agree with each other.
pub fn assemble(
    config: &Config,
    content_index: Vec<ContentItem>,
    taxonomies: Taxonomies,
    languages: Vec<ResolvedLanguage>,
    output_targets: OutputTargets,
) -> Result<BuildPlan, AssemblyError> {
    let items_by_path = content_index
        .iter()
        .map(|item| (item.file.path.as_path(), item))
        .collect::<HashMap<_, _>>();

    check_taxonomies(&taxonomies, &items_by_path)?;

    for (code, language) in &config.languages {
        if !language.disabled && !languages.iter().any(|resolved| &resolved.code == code) {
            return Err(AssemblyError::MissingMenus { code: code.clone() });
        }
    }

    let mut pages = Vec::new();
    let mut page = |kind: PageKind,
                    language: &ResolvedLanguage,
                    path: &str,
                    subject: PageSubject|
     -> Result<(), AssemblyError> {
        let permalink = Permalink::from_path(config, &language.code, path).map_err(|source| {
            AssemblyError::InvalidPermalink {
                path: path.to_string(),
                source,
            }
        })?;

        let output_formats = output_targets
            .formats_for(kind)
            .ok_or(AssemblyError::MissingOutputTargets { kind })?
            .to_vec();

        pages.push(PlannedPage {
            kind,
            language: language.code.clone(),
            permalink,
            subject,
            output_formats,
        });

        Ok(())
    };

    for language in &languages {
        let items = content_index
            .iter()
            .filter(|item| item.language == language.code)
            .collect::<Vec<_>>();

        page(PageKind::Home, language, "/", PageSubject::Home)?;

        let sections = items
            .iter()
            .filter_map(|item| item.file.section())
            .collect::<BTreeSet<_>>();

        for section in sections {
            page(
                PageKind::List,
                language,
                &format!("/{section}"),
                PageSubject::List {
                    section: section.to_string(),
                },
            )?;
        }

        for item in &items {
            page(
                PageKind::Single,
                language,
                item.path.as_str(),
                PageSubject::Single {
                    path: item.file.path.clone(),
                },
            )?;
        }

        for (name, taxonomy) in taxonomies.iter() {
            for term in taxonomy.terms.values() {
                let in_language = term
                    .items
                    .iter()
                    .any(|path| items_by_path[path.as_path()].language == language.code);

                if !in_language {
                    continue;
                }

                page(
                    PageKind::TaxonomyTerm,
                    language,
                    &format!("/{name}/{}", term.slug),
                    PageSubject::TaxonomyTerm {
                        taxonomy: name.clone(),
                        term: term.name.clone(),
                    },
                )?;
            }
        }
    }

    for item in &content_index {
        if !languages.iter().any(|language| language.code == item.language) {
            return Err(AssemblyError::UnknownPageLanguage {
                permalink: item.path.to_string(),
                code: item.language.clone(),
            });
        }
    }

    check_permalinks(&pages)?;

    info!(
        "assembled build plan with {} pages across {} languages",
        pages.len(),
        languages.len()
    );

    Ok(BuildPlan {
        title: config.title.clone(),
        languages,
        taxonomies,
        output_targets,
        pages,
        content_index,
    })
}

/// Ensures no two pages are rendered to the same URL.
fn check_permalinks(pages: &[PlannedPage]) -> Result<(), AssemblyError> {
    let mut seen: HashMap<&Permalink, &PlannedPage> = HashMap::with_capacity(pages.len());

    for page in pages {
        if let Some(first) = seen.insert(&page.permalink, page) {
            return Err(AssemblyError::DuplicatePermalink {
                permalink: page.permalink.to_string(),
                first: first.subject.to_string(),
                second: page.subject.to_string(),
            });
        }
    }

    Ok(())
}

fn check_taxonomies(
    taxonomies: &Taxonomies,
    items_by_path: &HashMap<&Path, &ContentItem>,
) -> Result<(), AssemblyError> {
    for (name, taxonomy) in taxonomies.iter() {
        for term in taxonomy.terms.values() {
            if term.items.is_empty() {
                return Err(AssemblyError::EmptyTerm {
                    taxonomy: name.clone(),
                    term: term.name.clone(),
                });
            }

            if let Some(path) = term
                .items
                .iter()
                .find(|path| !items_by_path.contains_key(path.as_path()))
            {
                return Err(AssemblyError::DanglingTerm {
                    taxonomy: name.clone(),
                    term: term.name.clone(),
                    path: path.clone(),
                });
            }
        }
    }

    Ok(())
}

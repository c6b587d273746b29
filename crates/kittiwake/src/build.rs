//! Resolves a [`BuildPlan`] by running each resolver as its own task.
//!
//! Content loading and output target resolution start right away. Taxonomy
//! and language resolution start as soon as the content is loaded. Every task
//! works on immutable inputs, so nothing is shared mutably between them.
//!
//! The plan is assembled once every task has finished. If any task fails the
//! remaining tasks are cancelled and the error is returned; a partial plan is
//! never produced.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{debug, info};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::content::{
    resolve_taxonomies, ContentItem, ContentLoader, ContentSource, Taxonomies,
};
use crate::error::{AssemblyError, BuildError};
use crate::language::{resolve_languages, ResolvedLanguage};
use crate::output::{resolve_output_targets, OutputTargets};
use crate::plan::{assemble, BuildPlan};

/// Options for a single build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub include_drafts: bool,
    pub include_future: bool,

    /// The reference time for deciding which content is in the future.
    pub now: DateTime<Utc>,
}

impl BuildOptions {
    /// Returns the [`BuildOptions`] from the config's build policy.
    pub fn from_config(config: &Config) -> Self {
        Self {
            include_drafts: config.build.include_drafts,
            include_future: config.build.include_future,
            now: Utc::now(),
        }
    }
}

enum StageOutput {
    Content(Vec<ContentItem>),
    Taxonomies(Taxonomies),
    Languages(Vec<ResolvedLanguage>),
    OutputTargets(OutputTargets),
}

impl StageOutput {
    fn name(&self) -> &'static str {
        match self {
            Self::Content(_) => "content",
            Self::Taxonomies(_) => "taxonomies",
            Self::Languages(_) => "languages",
            Self::OutputTargets(_) => "output targets",
        }
    }
}

/// Resolves the [`BuildPlan`] for the given config and content.
pub async fn resolve_build_plan(
    config: Arc<Config>,
    sources: Vec<ContentSource>,
    options: BuildOptions,
) -> Result<BuildPlan, BuildError> {
    let cancellation = CancellationToken::new();
    let mut stages: JoinSet<Result<StageOutput, BuildError>> = JoinSet::new();

    {
        let config = config.clone();
        let cancellation = cancellation.clone();
        stages.spawn_blocking(move || {
            ContentLoader::new(&config, &options)
                .load_with_cancellation(&sources, &cancellation)?
                .map(StageOutput::Content)
                .ok_or(BuildError::Cancelled)
        });
    }

    {
        let config = config.clone();
        stages.spawn_blocking(move || {
            Ok(StageOutput::OutputTargets(resolve_output_targets(
                &config.outputs,
            )?))
        });
    }

    let mut content = None;
    let mut taxonomies = None;
    let mut languages = None;
    let mut output_targets = None;

    while let Some(joined) = stages.join_next().await {
        let output = match joined {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                cancellation.cancel();
                stages.abort_all();
                return Err(err);
            }
            Err(err) => {
                cancellation.cancel();
                stages.abort_all();
                return Err(AssemblyError::StageAborted {
                    reason: err.to_string(),
                }
                .into());
            }
        };

        debug!("{} stage finished", output.name());

        match output {
            StageOutput::Content(items) => {
                let items = Arc::new(items);

                {
                    let config = config.clone();
                    let items = items.clone();
                    stages.spawn_blocking(move || {
                        Ok(StageOutput::Taxonomies(resolve_taxonomies(
                            &config.taxonomies,
                            &items,
                        )?))
                    });
                }

                {
                    let config = config.clone();
                    let items = items.clone();
                    stages.spawn_blocking(move || {
                        Ok(StageOutput::Languages(resolve_languages(&config, &items)?))
                    });
                }

                content = Some(items);
            }
            StageOutput::Taxonomies(resolved) => taxonomies = Some(resolved),
            StageOutput::Languages(resolved) => languages = Some(resolved),
            StageOutput::OutputTargets(resolved) => output_targets = Some(resolved),
        }
    }

    let (Some(content), Some(taxonomies), Some(languages), Some(output_targets)) =
        (content, taxonomies, languages, output_targets)
    else {
        return Err(AssemblyError::StageAborted {
            reason: "a build stage finished without producing output".to_string(),
        }
        .into());
    };

    let content_index = Arc::try_unwrap(content).unwrap_or_else(|items| (*items).clone());
    let plan = assemble(&config, content_index, taxonomies, languages, output_targets)?;

    info!(
        "resolved build plan: {} items, {} pages",
        plan.content_index.len(),
        plan.pages.len()
    );

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use indoc::indoc;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_config(text: &str) -> Arc<Config> {
        Arc::new(Config::parse(text).unwrap())
    }

    fn make_options() -> BuildOptions {
        BuildOptions {
            include_drafts: false,
            include_future: false,
            now: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
        }
    }

    const CONFIG: &str = indoc! {r#"
        base_url = "https://example.com"
        taxonomies = ["tags"]

        [outputs]
        formats = ["html", "rss", "json"]

        [languages.en]
        weight = 1

        [[languages.en.menu.main]]
        name = "Tags"
        url = "/tags/"
        weight = 10

        [[languages.en.menu.main]]
        name = "Archive"
        url = "/archive/"
        weight = 5

        [languages.fr]
        weight = 2
    "#};

    fn make_sources() -> Vec<ContentSource> {
        vec![
            ContentSource::inline(
                "content",
                "content/posts/python.md",
                "+++\ntitle = \"Python\"\ndate = 2024-01-01\ntags = [\"Python\", \"python\", \" PYTHON \"]\n+++\n",
            ),
            ContentSource::inline(
                "content",
                "content/posts/secret.md",
                "+++\ntitle = \"Secret\"\ndate = 2024-02-01\ndraft = true\ntags = [\"hidden\"]\n+++\n",
            ),
            ContentSource::inline(
                "content",
                "content/posts/rust.md",
                "+++\ntitle = \"Rust\"\ndate = 2024-03-01\ntags = [\"rust\"]\n+++\n",
            ),
        ]
    }

    #[tokio::test]
    async fn test_resolve_build_plan() {
        let plan = resolve_build_plan(make_config(CONFIG), make_sources(), make_options())
            .await
            .unwrap();

        let content_index = plan
            .content_index
            .iter()
            .map(|item| item.title.as_str())
            .collect::<Vec<_>>();
        assert_eq!(content_index, vec!["Rust", "Python"]);

        let english = plan.language("en").unwrap();
        let menu = english.menus["main"]
            .iter()
            .map(|entry| entry.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(menu, vec!["Archive", "Tags"]);

        let python = &plan.taxonomies["tags"].terms["python"];
        assert_eq!(python.items.len(), 1);
        assert!(!plan.taxonomies["tags"].terms.contains_key("hidden"));
    }

    #[tokio::test]
    async fn test_drafts_are_excluded_everywhere() {
        let plan = resolve_build_plan(make_config(CONFIG), make_sources(), make_options())
            .await
            .unwrap();

        assert!(plan.content_index.iter().all(|item| !item.draft));
        assert!(plan.taxonomies.values().all(|taxonomy| taxonomy
            .terms
            .values()
            .all(|term| term.items.iter().all(|path| !path.ends_with("secret.md")))));
    }

    #[tokio::test]
    async fn test_resolving_is_deterministic() {
        let first = resolve_build_plan(make_config(CONFIG), make_sources(), make_options())
            .await
            .unwrap();
        let second = resolve_build_plan(make_config(CONFIG), make_sources(), make_options())
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_empty_output_formats() {
        let config = make_config(indoc! {r#"
            base_url = "https://example.com"

            [outputs]
            formats = []
        "#});

        let err = resolve_build_plan(config, make_sources(), make_options())
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::Config(_)));
        assert_snapshot!(err.to_string(), @"no output formats in `outputs.formats`");
    }

    #[tokio::test]
    async fn test_unknown_language() {
        let sources = vec![ContentSource::inline(
            "content",
            "content/posts/hallo.de.md",
            "+++\ntitle = \"Hallo\"\ndate = 2024-01-01\nlang = \"de\"\n+++\n",
        )];

        let err = resolve_build_plan(make_config(CONFIG), sources, make_options())
            .await
            .unwrap_err();

        assert_snapshot!(err.to_string(), @"unknown language `de` in 'content/posts/hallo.de.md'");
    }

    #[tokio::test]
    async fn test_dotted_file_name_is_not_a_language() {
        let sources = vec![ContentSource::inline(
            "content",
            "content/posts/notes.old.md",
            "+++\ntitle = \"Notes\"\ndate = 2024-01-01\n+++\n",
        )];

        let plan = resolve_build_plan(make_config(CONFIG), sources, make_options())
            .await
            .unwrap();

        assert_eq!(plan.content_index[0].language, "en");
        assert_eq!(plan.content_index[0].path.as_str(), "/posts/notes-old");
    }

    #[tokio::test]
    async fn test_malformed_content_aborts_the_build() {
        let mut sources = make_sources();
        sources.push(ContentSource::inline(
            "content",
            "content/posts/broken.md",
            "+++\ndate = 2024-01-01\n+++\n",
        ));

        let err = resolve_build_plan(make_config(CONFIG), sources, make_options())
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::Content(_)));
    }
}

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::build::{resolve_build_plan, BuildOptions};
use crate::config::Config;
use crate::content::{discover_sources, ContentSource};
use crate::error::{BuildError, ConfigError, ContentError};
use crate::plan::BuildPlan;

/// A site on disk: a `config.toml` and a `content` directory.
pub struct Site {
    root_path: PathBuf,
    content_path: PathBuf,
    config: Arc<Config>,
    options: BuildOptions,
    sources: Vec<ContentSource>,
}

impl Site {
    pub fn builder() -> SiteBuilder<()> {
        SiteBuilder::new()
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn content_path(&self) -> &Path {
        &self.content_path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn sources(&self) -> &[ContentSource] {
        &self.sources
    }

    /// Discovers the content of the site.
    pub fn load(&mut self) -> Result<(), ContentError> {
        self.sources = discover_sources(&self.content_path)?;

        Ok(())
    }

    /// Resolves the [`BuildPlan`] for the loaded content.
    pub async fn plan(&self) -> Result<BuildPlan, BuildError> {
        resolve_build_plan(
            self.config.clone(),
            self.sources.clone(),
            self.options.clone(),
        )
        .await
    }
}

pub struct SiteBuilder<T> {
    state: T,
}

impl SiteBuilder<()> {
    pub fn new() -> Self {
        Self { state: () }
    }

    pub fn root(self, root_path: impl AsRef<Path>) -> SiteBuilder<WithRootPath> {
        SiteBuilder {
            state: WithRootPath {
                root_path: root_path.as_ref().to_owned(),
            },
        }
    }
}

pub struct WithRootPath {
    root_path: PathBuf,
}

impl SiteBuilder<WithRootPath> {
    /// Reads the config from `config.toml` in the site root.
    pub fn load_config(self) -> Result<SiteBuilder<WithConfig>, ConfigError> {
        let config = Config::from_path(self.state.root_path.join("config.toml"))?;

        Ok(self.config(config))
    }

    pub fn config(self, config: Config) -> SiteBuilder<WithConfig> {
        SiteBuilder {
            state: WithConfig {
                options: BuildOptions::from_config(&config),
                with_root_path: self.state,
                config,
            },
        }
    }
}

pub struct WithConfig {
    with_root_path: WithRootPath,
    config: Config,
    options: BuildOptions,
}

impl SiteBuilder<WithConfig> {
    pub fn include_drafts(mut self, include_drafts: bool) -> Self {
        self.state.options.include_drafts = include_drafts;
        self
    }

    pub fn include_future(mut self, include_future: bool) -> Self {
        self.state.options.include_future = include_future;
        self
    }

    /// Sets the reference time used to decide which content is in the future.
    pub fn now(mut self, now: DateTime<Utc>) -> Self {
        self.state.options.now = now;
        self
    }

    pub fn build(self) -> Site {
        let root_path = self.state.with_root_path.root_path;

        Site {
            content_path: root_path.join("content"),
            root_path,
            config: Arc::new(self.state.config),
            options: self.state.options,
            sources: Vec::new(),
        }
    }
}

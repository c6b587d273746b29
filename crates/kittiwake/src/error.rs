use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::output::PageKind;

/// An error in a piece of content.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("failed to walk content directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed front matter in '{path}': {reason}")]
    MalformedFrontMatter { path: PathBuf, reason: String },
}

/// An error in the site configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid `base_url` '{base_url}': {source}")]
    InvalidBaseUrl {
        base_url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid `timezone` '{timezone}'")]
    InvalidTimezone { timezone: String },

    #[error("`default_language` '{code}' is not listed under `languages`")]
    UnknownDefaultLanguage { code: String },

    #[error("`default_language` '{code}' cannot be disabled")]
    DisabledDefaultLanguage { code: String },

    #[error("invalid taxonomy `{key}`: {reason}")]
    UnknownTaxonomy { key: String, reason: String },

    #[error("unknown language `{code}` in '{path}'")]
    UnknownLanguage { path: PathBuf, code: String },

    #[error("duplicate entry '{name}' ({url}) in `{key}`")]
    DuplicateMenuEntry {
        key: String,
        name: String,
        url: String,
    },

    #[error("invalid URL '{url}' in `{key}`: {source}")]
    InvalidMenuUrl {
        key: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("no output formats in `{key}`")]
    NoOutputFormats { key: String },

    #[error("unknown output format '{format}' in `{key}`")]
    UnknownOutputFormat { key: String, format: String },

    #[error("output format '{format}' in `{key}` is not enabled in `outputs.formats`")]
    OutputFormatNotEnabled { key: String, format: String },

    #[error("unknown page kind `{key}`")]
    UnknownPageKind { key: String },
}

/// A broken invariant found while assembling a build plan.
///
/// These indicate a bug in one of the resolvers rather than bad input.
#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("term '{term}' in taxonomy `{taxonomy}` references '{path}', which is not in the content index")]
    DanglingTerm {
        taxonomy: String,
        term: String,
        path: PathBuf,
    },

    #[error("term '{term}' in taxonomy `{taxonomy}` has no content")]
    EmptyTerm { taxonomy: String, term: String },

    #[error("language `{code}` has no resolved menus")]
    MissingMenus { code: String },

    #[error("no output targets for page kind `{kind}`")]
    MissingOutputTargets { kind: PageKind },

    #[error("page '{permalink}' belongs to unresolved language `{code}`")]
    UnknownPageLanguage { permalink: String, code: String },

    #[error("{first} and {second} both resolve to {permalink}")]
    DuplicatePermalink {
        permalink: String,
        first: String,
        second: String,
    },

    #[error("failed to build permalink for '{path}': {source}")]
    InvalidPermalink {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("build stage aborted: {reason}")]
    StageAborted { reason: String },
}

/// An error that aborts a build.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error("build cancelled")]
    Cancelled,
}

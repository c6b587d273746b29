use std::path::Path;
use std::{fs, io};

use chrono::Utc;
use log::{debug, info, warn};
use tokio_util::sync::CancellationToken;

use crate::build::BuildOptions;
use crate::config::Config;
use crate::content::{sort_items_by, ContentItem, ContentSource, SortBy};
use crate::error::ContentError;

/// The number of times a file read is attempted before giving up.
const MAX_READ_ATTEMPTS: usize = 3;

/// Loads [`ContentItem`]s from their sources, applying the build policy.
pub struct ContentLoader<'a> {
    config: &'a Config,
    options: &'a BuildOptions,
}

impl<'a> ContentLoader<'a> {
    pub fn new(config: &'a Config, options: &'a BuildOptions) -> Self {
        Self { config, options }
    }

    /// Loads the given sources.
    ///
    /// Returns the items that survive the build policy, newest first.
    pub fn load(&self, sources: &[ContentSource]) -> Result<Vec<ContentItem>, ContentError> {
        self.load_with_cancellation(sources, &CancellationToken::new())
            .map(Option::unwrap_or_default)
    }

    /// Loads the given sources, stopping early once `cancellation` fires.
    ///
    /// Returns `None` if loading was cancelled.
    pub fn load_with_cancellation(
        &self,
        sources: &[ContentSource],
        cancellation: &CancellationToken,
    ) -> Result<Option<Vec<ContentItem>>, ContentError> {
        let mut items = Vec::with_capacity(sources.len());

        for source in sources {
            if cancellation.is_cancelled() {
                debug!("content loading cancelled");
                return Ok(None);
            }

            if let Some(item) = self.load_source(source)? {
                items.push(item);
            }
        }

        sort_items_by(SortBy::Date, &mut items);

        info!(
            "loaded {} of {} content items",
            items.len(),
            sources.len()
        );

        Ok(Some(items))
    }

    fn load_source(&self, source: &ContentSource) -> Result<Option<ContentItem>, ContentError> {
        let text = match source.text.as_ref() {
            Some(text) => text.clone(),
            None => read_source(&source.file.path)?,
        };

        let item = ContentItem::parse(
            &text,
            source.file.clone(),
            source.language.as_deref(),
            self.config,
        )?;

        let path = item.file.path.display();

        if item.draft && !self.options.include_drafts {
            debug!("skipping draft '{path}'");
            return Ok(None);
        }

        if item.date.with_timezone(&Utc) > self.options.now && !self.options.include_future {
            debug!("skipping future item '{path}' dated {}", item.date);
            return Ok(None);
        }

        if self.config.is_language_disabled(&item.language) {
            debug!("skipping '{path}' in disabled language `{}`", item.language);
            return Ok(None);
        }

        Ok(Some(item))
    }
}

fn read_source(path: &Path) -> Result<String, ContentError> {
    read_with_retry(path, || fs::read_to_string(path))
}

/// Calls `read` until it succeeds, retrying transient errors.
fn read_with_retry(
    path: &Path,
    mut read: impl FnMut() -> io::Result<String>,
) -> Result<String, ContentError> {
    let mut attempt = 1;

    loop {
        match read() {
            Ok(text) => return Ok(text),
            Err(err) if is_transient(&err) && attempt < MAX_READ_ATTEMPTS => {
                warn!(
                    "retrying read of '{}' after attempt {attempt} failed: {err}",
                    path.display()
                );
                attempt += 1;
            }
            Err(err) => {
                return Err(ContentError::Read {
                    path: path.to_owned(),
                    source: err,
                })
            }
        }
    }
}

fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

use std::path::Path;

use walkdir::WalkDir;

use crate::content::FileInfo;
use crate::error::ContentError;

/// A content file to be loaded.
#[derive(Debug, Clone)]
pub struct ContentSource {
    pub file: FileInfo,

    /// The language code found in the file name, if any.
    pub language: Option<String>,

    /// The source text, when it has already been read.
    ///
    /// Sources without text are read from disk when they are loaded.
    pub text: Option<String>,
}

impl ContentSource {
    /// Returns a [`ContentSource`] that will be read from `path`.
    pub fn from_path(root_path: impl AsRef<Path>, path: impl AsRef<Path>) -> Self {
        let file = FileInfo::new(root_path, path);

        Self {
            language: file.language.clone(),
            file,
            text: None,
        }
    }

    /// Returns a [`ContentSource`] with the given text.
    pub fn inline(
        root_path: impl AsRef<Path>,
        path: impl AsRef<Path>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::from_path(root_path, path)
        }
    }
}

/// Finds all of the Markdown content under `content_path`.
///
/// Hidden files and section indices (`_index.md`) are skipped. Sources are
/// returned in path order.
pub fn discover_sources(content_path: impl AsRef<Path>) -> Result<Vec<ContentSource>, ContentError> {
    let content_path = content_path.as_ref();
    let walker = WalkDir::new(content_path)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter();

    let mut sources = Vec::new();

    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_dir() {
            continue;
        }

        let Some(filename) = entry.file_name().to_str() else {
            continue;
        };

        if !filename.ends_with(".md") || filename.starts_with('.') || filename == "_index.md" {
            continue;
        }

        sources.push(ContentSource::from_path(content_path, entry.path()));
    }

    log::debug!(
        "discovered {} content files in {}",
        sources.len(),
        content_path.display()
    );

    Ok(sources)
}

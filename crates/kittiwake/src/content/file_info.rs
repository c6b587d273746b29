use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

static LANGUAGE_SUFFIX_REGEX: OnceLock<Regex> = OnceLock::new();

fn language_suffix_regex() -> &'static Regex {
    LANGUAGE_SUFFIX_REGEX.get_or_init(|| {
        Regex::new(r"^[a-z]{2,3}(?:-[A-Za-z0-9]{2,8})?$")
            .expect("failed to compile regex for language suffixes")
    })
}

#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct FileInfo {
    pub path: PathBuf,
    #[serde(skip)]
    pub parent: PathBuf,

    /// The directories between the content root and the file.
    #[serde(skip)]
    pub components: Vec<String>,

    /// The file stem, without any language suffix.
    #[serde(skip)]
    pub name: String,

    /// The language suffix of the file name (e.g., `fr` in `hello.fr.md`).
    #[serde(skip)]
    pub language: Option<String>,
}

impl FileInfo {
    pub fn new(root_path: impl AsRef<Path>, path: impl AsRef<Path>) -> Self {
        let root_path = root_path.as_ref();
        let path = path.as_ref();
        let (name, language) = Self::name_and_language(path);

        Self {
            path: path.to_owned(),
            parent: path.parent().unwrap_or(root_path).to_owned(),
            components: Self::components(root_path, path),
            name,
            language,
        }
    }

    /// Returns the top-level section the file lives in, if any.
    pub fn section(&self) -> Option<&str> {
        self.components.first().map(String::as_str)
    }

    fn components(root_path: impl AsRef<Path>, path: impl AsRef<Path>) -> Vec<String> {
        let path = path.as_ref();
        path.strip_prefix(root_path)
            .unwrap_or(path)
            .parent()
            .map(|parent| {
                parent
                    .components()
                    .map(|component| component.as_os_str().to_string_lossy().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn name_and_language(path: &Path) -> (String, Option<String>) {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();

        match stem.rsplit_once('.') {
            Some((name, suffix))
                if !name.is_empty() && language_suffix_regex().is_match(suffix) =>
            {
                (name.to_string(), Some(suffix.to_string()))
            }
            _ => (stem, None),
        }
    }
}

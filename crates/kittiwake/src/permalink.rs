use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use url::Url;

use crate::config::Config;

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Serialize)]
#[serde(transparent)]
pub struct Permalink(Url);

impl Permalink {
    /// Returns the permalink for a page at `path` in the given language.
    ///
    /// Page permalinks always end with a trailing slash.
    pub fn from_path(config: &Config, language: &str, path: &str) -> Result<Self, url::ParseError> {
        let suffix = if path.ends_with('/') || path.is_empty() {
            ""
        } else {
            "/"
        };

        Self::build(config, language, &format!("{path}{suffix}"))
    }

    /// Returns the permalink for a link to `path` in the given language.
    ///
    /// Unlike [`Permalink::from_path`] the path is kept verbatim, so links to
    /// files (e.g., `/index.xml`) stay intact.
    pub fn from_link(config: &Config, language: &str, path: &str) -> Result<Self, url::ParseError> {
        Self::build(config, language, path)
    }

    fn build(config: &Config, language: &str, path: &str) -> Result<Self, url::ParseError> {
        let base_url = config.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');

        let url = if config.is_default_language(language) {
            format!("{base_url}/{path}")
        } else {
            format!("{base_url}/{language}/{path}")
        };

        Url::from_str(&url).map(Self)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn path(&self) -> &str {
        self.0.path()
    }
}

impl From<Url> for Permalink {
    fn from(url: Url) -> Self {
        Self(url)
    }
}

impl fmt::Display for Permalink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use indoc::formatdoc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn make_config(base_url: &str) -> Config {
        Config::parse(&formatdoc! {r#"
            base_url = "{base_url}"

            [languages.en]
            [languages.fr]
        "#})
        .unwrap()
    }

    #[test]
    fn test_permalink() {
        assert_eq!(
            Permalink::from_path(&make_config("https://example.com/"), "en", "/").unwrap(),
            Permalink("https://example.com/".parse().unwrap())
        );
        assert_eq!(
            Permalink::from_path(&make_config("https://example.com"), "en", "/").unwrap(),
            Permalink("https://example.com/".parse().unwrap())
        );
        assert_eq!(
            Permalink::from_path(&make_config("https://example.com"), "en", "").unwrap(),
            Permalink("https://example.com/".parse().unwrap())
        );
        assert_eq!(
            Permalink::from_path(&make_config("https://example.com"), "en", "/posts/hello")
                .unwrap(),
            Permalink("https://example.com/posts/hello/".parse().unwrap())
        );
    }

    #[test]
    fn test_permalink_for_other_language() {
        let config = make_config("https://example.com/blog/");

        assert_eq!(
            Permalink::from_path(&config, "fr", "/").unwrap().as_str(),
            "https://example.com/blog/fr/"
        );
        assert_eq!(
            Permalink::from_path(&config, "fr", "/tags/rust").unwrap().as_str(),
            "https://example.com/blog/fr/tags/rust/"
        );
    }

    #[test]
    fn test_link_keeps_path_verbatim() {
        let config = make_config("https://example.com");

        assert_eq!(
            Permalink::from_link(&config, "en", "/index.xml").unwrap().as_str(),
            "https://example.com/index.xml"
        );
        assert_eq!(
            Permalink::from_link(&config, "fr", "archive").unwrap().as_str(),
            "https://example.com/fr/archive"
        );
    }

    #[test]
    fn test_permalink_path() {
        let permalink = Permalink("https://example.com/this/is/a/cool/site/".parse().unwrap());
        assert_eq!(permalink.path(), "/this/is/a/cool/site/");
    }
}
